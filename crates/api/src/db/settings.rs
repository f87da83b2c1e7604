//! Settings singleton storage.
//!
//! Exactly one row exists, pinned by a `singleton` check constraint. The
//! row is created once at process startup under a single authoritative
//! write; request handlers only ever read or update it.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::settings::{Settings, SettingsPatch};

const SETTINGS_COLUMNS: &str = "site_name, site_description, contact_email, contact_phone, \
     currency, timezone, maintenance_mode, updated_at";

/// Create the settings row with schema defaults if it does not exist.
///
/// Runs at startup. Concurrent first boots race harmlessly: the singleton
/// constraint makes the insert idempotent.
///
/// # Errors
///
/// Returns an error if the insert or the follow-up read fails.
pub async fn ensure_initialized(pool: &PgPool) -> Result<Settings, RepositoryError> {
    sqlx::query("INSERT INTO settings (singleton) VALUES (TRUE) ON CONFLICT (singleton) DO NOTHING")
        .execute(pool)
        .await?;

    get(pool).await
}

/// Get the settings row.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the row is missing, which can
/// only happen when startup initialization was skipped.
pub async fn get(pool: &PgPool) -> Result<Settings, RepositoryError> {
    let settings: Option<Settings> =
        sqlx::query_as(&format!("SELECT {SETTINGS_COLUMNS} FROM settings WHERE singleton"))
            .fetch_optional(pool)
            .await?;

    settings.ok_or(RepositoryError::NotFound)
}

/// Apply a typed patch: only `Some` fields change.
///
/// Reads the current row, merges in memory, and writes every column back
/// in one statement. Concurrent updates are last-write-wins.
///
/// # Errors
///
/// Returns an error if the read or the write fails.
pub async fn update(pool: &PgPool, patch: SettingsPatch) -> Result<Settings, RepositoryError> {
    let merged = get(pool).await?.apply(patch);

    let settings: Settings = sqlx::query_as(&format!(
        "UPDATE settings SET \
         site_name = $1, site_description = $2, contact_email = $3, contact_phone = $4, \
         currency = $5, timezone = $6, maintenance_mode = $7, updated_at = NOW() \
         WHERE singleton \
         RETURNING {SETTINGS_COLUMNS}"
    ))
    .bind(&merged.site_name)
    .bind(&merged.site_description)
    .bind(&merged.contact_email)
    .bind(&merged.contact_phone)
    .bind(merged.currency)
    .bind(&merged.timezone)
    .bind(merged.maintenance_mode)
    .fetch_one(pool)
    .await?;

    Ok(settings)
}
