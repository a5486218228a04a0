#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use school_briefing::{
        ClientConfig, DataOrchestrator, JsonFileSettingsStore, Session, SessionEvent, Sources,
        http_api, logging,
    };

    logging::init();

    let config = ClientConfig::from_env()?;
    let addr: SocketAddr = config.http_addr.parse()?;

    let settings = Arc::new(JsonFileSettingsStore::new(&config.settings_path));
    let today = chrono::Local::now().date_naive();
    let session = Session::restore(settings.as_ref(), today)?;

    let sources = Sources::connect(&config)?;
    let orchestrator =
        DataOrchestrator::new(sources, session).with_forecast_days(config.forecast_days);
    orchestrator.dispatch(SessionEvent::Today(today)).await;

    tracing::info!(%addr, settings = %config.settings_path.display(), "school-briefing HTTP API listening");
    let state = http_api::AppState::new(orchestrator, settings);
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
