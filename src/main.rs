use anyhow::Context;
use library_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Library API settings")?;
    library_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        address = %settings.server.bind_address(),
        "library-api bootstrap starting"
    );

    library_api::run(settings, library_http::shutdown_signal()).await?;

    tracing::info!("library-api shut down");
    Ok(())
}
