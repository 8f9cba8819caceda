use amc2::shared::{Config, ServiceContext};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let _context = ServiceContext::build(&config).await?;

    tracing::info!("anime metadata service configured and ready");
    Ok(())
}
