pub mod base;
pub mod cache;
pub mod recording;
pub mod room;

pub use base::BaseDao;
pub use cache::Cache;
pub use recording::MongoRecordingStore;
pub use room::MongoRoomStore;

use crate::store::StoreResult;

/// Settle a concurrent write to both tiers. The durable tier is
/// authoritative: its result becomes the outcome, and durable state is
/// never undone because the cache misbehaved. The flag tells the caller
/// to drop the cache entry, so neither a failed cache write nor a cache
/// entry for a failed durable write can be served later.
fn settle_dual_write(
    durable: StoreResult<()>,
    cached: StoreResult<()>,
) -> (StoreResult<()>, bool) {
    match (durable, cached) {
        (Ok(()), Ok(())) => (Ok(()), false),
        (Ok(()), Err(_)) => (Ok(()), true),
        (Err(e), _) => (Err(e), true),
    }
}
