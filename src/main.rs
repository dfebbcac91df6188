// QueryMind: a natural-language database agent for the terminal
//
// This is the main entry point for the QueryMind application.

use anyhow::Result;
use querymind::cli::Repl;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut repl = Repl::new()?;
    repl.run().await?;

    Ok(())
}
