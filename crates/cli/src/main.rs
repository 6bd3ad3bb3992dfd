//! Entry point for the `advisor` CLI (spec.md §6).

use clap::Parser;

use advisor_cli::args::Cli;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    if let Err(err) = advisor_cli::run(&cli, &mut lock) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("advisor_cli=info,advisor_session=info"),
            2 => EnvFilter::new("advisor_cli=debug,advisor_session=debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
