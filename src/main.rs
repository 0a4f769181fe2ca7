fn main() {
    use clap::Parser;
    use std::error::Error;
    let args = match mastofollows::cli::Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(mastofollows::cli::usage_exit_code(&e));
        }
    };
    if let Err(e) = mastofollows::logging::init_logging(args.verbose) {
        eprintln!("Warning: could not set up logging: {}", e);
    }
    if let Err(e) = mastofollows::cli::run(&args) {
        eprintln!("{}", e);
        if args.verbose {
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  cause: {}", s);
                source = s.source();
            }
        }
        std::process::exit(e.exit_code());
    }
}
