use crate::model::role::Role;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// user id -> role id. Short TTL so a role change (e.g. someone made
/// fine-exempt) is picked up without restarting the service.
static ROLE_CACHE: Lazy<Cache<u64, u8>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(600))
        .build()
});

/// Resolve a user's role by its stable id, one indexed query, cache-fronted.
pub async fn get_role(pool: &MySqlPool, user_id: u64) -> Result<Option<Role>, sqlx::Error> {
    if let Some(role_id) = ROLE_CACHE.get(&user_id).await {
        return Ok(Role::from_id(role_id));
    }

    let role_id =
        sqlx::query_scalar::<_, u8>("SELECT role_id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    if let Some(role_id) = role_id {
        ROLE_CACHE.insert(user_id, role_id).await;
    }

    Ok(role_id.and_then(Role::from_id))
}
