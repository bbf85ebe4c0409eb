//! Focus - block distracting domains through the hosts file for a while.

pub mod backup;
pub mod cli;
pub mod config;
pub mod duration;
pub mod error;
pub mod hosts;
pub mod platform;
pub mod session;
pub mod store;
