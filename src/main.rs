use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    bunyang::cli::run().await
}
