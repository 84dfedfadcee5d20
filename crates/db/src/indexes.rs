use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Rooms
    create_indexes(
        db,
        "rooms",
        vec![
            index_unique(bson::doc! { "room_id": 1 }),
            index(bson::doc! { "auto_deletion_date": 1, "marked_for_deletion": 1 }),
            index(bson::doc! { "status": 1 }),
        ],
    )
    .await?;

    // Recordings
    create_indexes(
        db,
        "recordings",
        vec![
            index_unique(bson::doc! { "recording_id": 1 }),
            index(bson::doc! { "room_id": 1, "created_at": -1 }),
            index(bson::doc! { "status": 1, "updated_at": 1 }),
        ],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
