//! mempush entry point.

use mempush_lib::cli::{self, Cli};

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Only --check-config returns Ok; the agent itself runs until it fails.
    if let Err(e) = cli::execute(cli).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
