fn main() {
    if let Err(e) = focus::cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(focus::error::exit_code(&e));
    }
}
