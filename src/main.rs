use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use yatube::{
    init_db, make_router, page_cache::InMemoryPageCache, run_app, Config, Result, Services,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("yatube=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let addr = config.bind_addr;
    let pool = init_db(&config.database_url).await?;
    let cache = Arc::new(InMemoryPageCache::new(config.index_cache_capacity));
    let services = Services::new(pool, config, cache);
    let router = make_router(services);

    if let Err(error) = run_app(router, addr).await {
        tracing::error!(%error, "server stopped");
        return Err(error);
    }
    Ok(())
}
