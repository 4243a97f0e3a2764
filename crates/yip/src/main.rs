use std::sync::Arc;

use yip_core::{config::Config, ports::RouterPort};
use yip_router_http::HttpRouter;

#[tokio::main]
async fn main() -> Result<(), yip_core::Error> {
    yip_core::logging::init("yip")?;

    let cfg = Arc::new(Config::load()?);
    let router: Arc<dyn RouterPort> = Arc::new(HttpRouter::from_config(&cfg)?);

    yip_telegram::router::run_polling(cfg, router)
        .await
        .map_err(|e| yip_core::Error::External(format!("telegram bot failed: {e}")))?;

    tracing::info!("shutting down");
    Ok(())
}
