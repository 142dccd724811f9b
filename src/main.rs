//! ghrel - manage GitHub releases, assets and git references.

use ghrel::cli;
use ghrel::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = cli::run().await {
        let output = OutputManager::new();
        output.error(&format!("{e}"));
        process::exit(1);
    }
}
