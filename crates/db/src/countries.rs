//! Country queries.

use crate::error::{is_unique_violation, DbError, Result};
use crate::models::{validate_country_name, Country};
use crate::pool::DbPool;
use tracing::debug;

/// Fetch the country with the given name, inserting it if absent.
///
/// # Returns
/// The country and whether it was created by this call.
pub async fn get_or_create(db: &DbPool, name: &str) -> Result<(Country, bool)> {
    validate_country_name(name)?;

    let inserted = sqlx::query_as::<_, Country>(
        "INSERT INTO countries (name) VALUES (?) ON CONFLICT (name) DO NOTHING RETURNING id, name",
    )
    .bind(name)
    .fetch_optional(db.pool())
    .await?;

    if let Some(country) = inserted {
        debug!("Created country {} ({})", country.name, country.id);
        return Ok((country, true));
    }

    let existing = sqlx::query_as::<_, Country>("SELECT id, name FROM countries WHERE name = ?")
        .bind(name)
        .fetch_one(db.pool())
        .await?;
    Ok((existing, false))
}

/// All countries, ordered by name.
pub async fn list(db: &DbPool) -> Result<Vec<Country>> {
    let countries = sqlx::query_as::<_, Country>("SELECT id, name FROM countries ORDER BY name")
        .fetch_all(db.pool())
        .await?;
    Ok(countries)
}

pub async fn get(db: &DbPool, id: i64) -> Result<Country> {
    sqlx::query_as::<_, Country>("SELECT id, name FROM countries WHERE id = ?")
        .bind(id)
        .fetch_optional(db.pool())
        .await?
        .ok_or_else(|| DbError::not_found("Country", id))
}

/// Insert a new country. Fails with `Duplicate` if the name is taken.
pub async fn create(db: &DbPool, name: &str) -> Result<Country> {
    validate_country_name(name)?;

    sqlx::query_as::<_, Country>("INSERT INTO countries (name) VALUES (?) RETURNING id, name")
        .bind(name)
        .fetch_one(db.pool())
        .await
        .map_err(|e| duplicate_name(e, name))
}

pub async fn rename(db: &DbPool, id: i64, name: &str) -> Result<Country> {
    validate_country_name(name)?;

    sqlx::query_as::<_, Country>("UPDATE countries SET name = ? WHERE id = ? RETURNING id, name")
        .bind(name)
        .bind(id)
        .fetch_optional(db.pool())
        .await
        .map_err(|e| duplicate_name(e, name))?
        .ok_or_else(|| DbError::not_found("Country", id))
}

/// Delete a country along with all of its records.
pub async fn delete(db: &DbPool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM countries WHERE id = ?")
        .bind(id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Country", id));
    }
    debug!("Deleted country {}", id);
    Ok(())
}

fn duplicate_name(err: sqlx::Error, name: &str) -> DbError {
    if is_unique_violation(&err) {
        DbError::Duplicate(format!("Country {:?} already exists", name))
    } else {
        err.into()
    }
}
