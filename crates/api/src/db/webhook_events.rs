//! Webhook idempotency guard.
//!
//! Each Stripe event id is recorded exactly once; a conflicting insert
//! means the event was already handled and its side effects must not run
//! again.

use sqlx::PgConnection;

use super::RepositoryError;

/// Record an event id. Returns `true` when this call claimed the event,
/// `false` when it was already processed.
///
/// Runs on a connection so the claim commits atomically with the side
/// effects it guards.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn record(
    conn: &mut PgConnection,
    event_id: &str,
    event_type: &str,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        "INSERT INTO processed_webhook_events (event_id, event_type)
         VALUES ($1, $2)
         ON CONFLICT (event_id) DO NOTHING",
    )
    .bind(event_id)
    .bind(event_type)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}
