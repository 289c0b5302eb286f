//! Country name lookups for the loader.

use std::collections::HashMap;
use temperature_db::{countries, DbError, DbPool};
use tracing::{debug, info};

/// Maps country names to ids, creating countries on first reference.
pub struct CountryCache {
    ids: HashMap<String, i64>,
}

impl CountryCache {
    /// Create a cache preloaded with every country in the database.
    ///
    /// # Arguments
    /// * `db` - Database pool
    pub async fn new(db: &DbPool) -> Result<Self, DbError> {
        let mut cache = Self {
            ids: HashMap::new(),
        };
        cache.refresh(db).await?;
        Ok(cache)
    }

    /// Resolve a country name to its id, creating the country if absent.
    ///
    /// # Returns
    /// The country id and whether the country was created by this call
    pub async fn resolve(&mut self, db: &DbPool, name: &str) -> Result<(i64, bool), DbError> {
        if let Some(&id) = self.ids.get(name) {
            return Ok((id, false));
        }

        let (country, created) = countries::get_or_create(db, name).await?;
        if created {
            debug!("Country {} created on first reference", name);
        }
        self.ids.insert(country.name, country.id);
        Ok((country.id, created))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Reload the name list from the database.
    pub async fn refresh(&mut self, db: &DbPool) -> Result<(), DbError> {
        self.ids = countries::list(db)
            .await?
            .into_iter()
            .map(|country| (country.name, country.id))
            .collect();

        info!("Loaded {} known countries", self.ids.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_creates_once() {
        let db = DbPool::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let mut cache = CountryCache::new(&db).await.unwrap();
        assert!(cache.is_empty());

        let (id, created) = cache.resolve(&db, "France").await.unwrap();
        assert!(created);
        let (again, created) = cache.resolve(&db, "France").await.unwrap();
        assert!(!created);
        assert_eq!(id, again);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_new_preloads_existing_countries() {
        let db = DbPool::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let existing = countries::create(&db, "Spain").await.unwrap();

        let mut cache = CountryCache::new(&db).await.unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.resolve(&db, "Spain").await.unwrap(), (existing.id, false));
    }
}
