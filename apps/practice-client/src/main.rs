use clap::Parser;
use lingo_practice_client::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lingo_practice_client::run(Cli::parse()).await
}
