use anyhow::Result;
use clap::Parser;
use funnel_webdash::{init_tracing, run_funnel_webdash_server, Cli, FunnelWebdashConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = FunnelWebdashConfig::from_cli(cli)?;
    run_funnel_webdash_server(config).await
}
