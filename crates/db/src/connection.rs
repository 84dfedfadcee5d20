use meethub_config::Settings;
use mongodb::{Client, Database, options::ClientOptions};
use tracing::info;

/// Open the MongoDB client with pool bounds from the settings and fail
/// fast with a ping before handing the database out.
pub async fn connect(settings: &Settings) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&settings.database.url).await?;
    options.max_pool_size = settings.database.max_pool_size.or(options.max_pool_size);
    options.min_pool_size = settings.database.min_pool_size.or(options.min_pool_size);

    let client = Client::with_options(options)?;
    client
        .database("admin")
        .run_command(bson::doc! { "ping": 1 })
        .await?;

    info!(db = %settings.database.name, "MongoDB connection established");
    Ok(client.database(&settings.database.name))
}
