use anyhow::Result;
use wardline::api::logging::init_tracing;
use wardline::app::App;
use wardline::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing();
    config.validate()?;
    tracing::info!(
        url = %config.run_url(),
        local = config.is_local_endpoint(),
        "starting wardline"
    );

    let mut app = App::new(config)?;
    app.run().await
}
