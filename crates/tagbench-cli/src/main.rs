//! `tagbench` binary

use tagbench_cli::{command, run};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = command().get_matches();

    let default_level = if matches.get_flag("verbose") { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    let code = match run(&matches, &mut stdout.lock()) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            2
        }
    };
    std::process::exit(code);
}
