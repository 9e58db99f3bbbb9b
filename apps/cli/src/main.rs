//! # Taximeter Entry Point
//!
//! Runtime setup only. Everything else lives in the library so it can be
//! tested.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    taxi_cli::run().await
}
