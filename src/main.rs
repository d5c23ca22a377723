use clap::Parser;
use resumo_meteo::cli::{run, Cli};
use resumo_meteo::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
