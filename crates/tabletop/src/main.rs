use tabletop::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<(), TabletopError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr = std::env::var("TABLETOP_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let server = TabletopServer::builder().bind(&addr).build().await?;
    server.run().await
}
