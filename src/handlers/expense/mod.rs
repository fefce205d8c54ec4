// handlers/expense/mod.rs - Per-account expense tracker
//
// Every document is owned by the account in the caller's token. Reads are
// scoped to the owner; writes on someone else's document are refused.

pub mod category;
pub mod item;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::database::Repository;
use crate::error::{ApiError, StoreResultExt};
use crate::filter::Filter;

pub(crate) fn owned_by(id: Uuid, owner: Uuid) -> Filter {
    Filter::by_id(id).eq("user_id", owner)
}

/// Fetch `id` scoped to `owner`. When the scoped lookup misses but the
/// document exists, the caller gets `forbidden` instead of `not_found`.
pub(crate) async fn load_owned<T>(
    repo: &Repository<T>,
    id: Uuid,
    owner: Uuid,
    not_found: &str,
    forbidden: &str,
) -> Result<T, ApiError>
where
    T: Serialize + DeserializeOwned + Send,
{
    let context = format!("Error retrieving {}", repo.collection());
    if let Some(found) = repo.select_one(owned_by(id, owner)).await.or_internal(&context)? {
        return Ok(found);
    }

    let exists = repo.count(Filter::by_id(id)).await.or_internal(&context)?;
    if exists > 0 {
        tracing::warn!("Account {} tried to reach {} {} owned by another account", owner, repo.collection(), id);
        Err(ApiError::forbidden(forbidden))
    } else {
        Err(ApiError::not_found(not_found))
    }
}
