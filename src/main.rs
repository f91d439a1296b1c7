use anyhow::Context;
use bookclub_app::modules;
use bookclub_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookclub settings")?;
    bookclub_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.endpoint,
        "bookclub-app bootstrap starting"
    );

    let store = bookclub_db::connect(&settings.database.endpoint)
        .await
        .with_context(|| format!("failed to open store '{}'", settings.database.endpoint))?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &store)?;

    let ctx = InitCtx {
        settings: &settings,
        store: &store,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("bookclub-app bootstrap complete");

    let served = bookclub_http::start_server(&registry, &settings, store.clone()).await;
    registry.stop_modules().await?;
    served
}
