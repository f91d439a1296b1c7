//! Insert the sample catalog entry into the configured store.

use anyhow::Context;
use bookclub_app::books::{models::NewBook, service::BookService};
use bookclub_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookclub settings")?;
    bookclub_telemetry::init(&settings.telemetry)?;

    let store = bookclub_db::connect(&settings.database.endpoint)
        .await
        .with_context(|| format!("failed to open store '{}'", settings.database.endpoint))?;
    let service = BookService::new(store);

    let sample = NewBook {
        genre: Some("Fiction".to_string()),
        published_year: Some(1925),
        ..NewBook::new("The Great Gatsby", "F. Scott Fitzgerald")
    };

    let book = service
        .create(sample)
        .await
        .with_context(|| "failed to save sample book")?;
    tracing::info!(book_id = %book.id, title = %book.title, "sample book saved");
    Ok(())
}
