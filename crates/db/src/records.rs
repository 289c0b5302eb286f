//! Record queries.

use crate::error::{is_foreign_key_violation, is_unique_violation, DbError, Result};
use crate::models::{NewRecord, Record, RecordRow, MAX_YEAR, MIN_YEAR};
use crate::pagination::{num_pages, Page, PageNumber};
use crate::pool::DbPool;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

const RECORD_COLUMNS: &str = "id, date, temperature, uncertainty, country_id";

/// Narrowing applied to record listings.
///
/// `month` requires `year`, and `day` requires `month`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecordFilter {
    pub country_id: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl RecordFilter {
    /// Inclusive date range `[first, last]` selected by the year/month/day fields.
    fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let invalid = || DbError::Validation(format!("invalid date filter {:?}", self));

        if let Some(year) = self.year {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(invalid());
            }
        }

        match (self.year, self.month, self.day) {
            (None, None, None) => Ok(None),
            (Some(year), None, None) => {
                let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
                let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
                Ok(Some((first, last)))
            }
            (Some(year), Some(month), None) => {
                let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
                let last = first
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .ok_or_else(invalid)?;
                Ok(Some((first, last)))
            }
            (Some(year), Some(month), Some(day)) => {
                let day = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
                Ok(Some((day, day)))
            }
            _ => Err(invalid()),
        }
    }

    fn push_where(&self, query: &mut QueryBuilder<'_, Sqlite>) -> Result<()> {
        query.push(" WHERE 1 = 1");
        if let Some(country_id) = self.country_id {
            query.push(" AND r.country_id = ").push_bind(country_id);
        }
        if let Some((first, last)) = self.date_range()? {
            query.push(" AND r.date >= ").push_bind(first);
            query.push(" AND r.date <= ").push_bind(last);
        }
        Ok(())
    }
}

/// Drill-down level returned by [`date_drilldown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateLevel {
    Year,
    Month,
    Day,
}

/// Distinct dates at one level of the year/month/day hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateDrilldown {
    pub level: DateLevel,
    pub values: Vec<i32>,
}

/// Insert a record unless one already exists for the same (date, country).
///
/// # Returns
/// The stored record, or `None` when the pair was already present.
pub async fn insert_if_absent(db: &DbPool, new: NewRecord) -> Result<Option<Record>> {
    let new = new.normalized()?;

    let inserted = sqlx::query_as::<_, Record>(&format!(
        "INSERT INTO records (date, temperature, uncertainty, country_id) VALUES (?, ?, ?, ?) \
         ON CONFLICT (date, country_id) DO NOTHING RETURNING {}",
        RECORD_COLUMNS
    ))
    .bind(new.date)
    .bind(new.temperature.map(|d| d.to_string()))
    .bind(new.uncertainty.map(|d| d.to_string()))
    .bind(new.country_id)
    .fetch_optional(db.pool())
    .await
    .map_err(|e| constraint_error(e, &new))?;

    if inserted.is_none() {
        debug!("Record for country {} on {} already exists", new.country_id, new.date);
    }
    Ok(inserted)
}

/// Insert a record. Fails with `Duplicate` if the (date, country) pair exists.
pub async fn create(db: &DbPool, new: NewRecord) -> Result<Record> {
    let new = new.normalized()?;

    sqlx::query_as::<_, Record>(&format!(
        "INSERT INTO records (date, temperature, uncertainty, country_id) VALUES (?, ?, ?, ?) \
         RETURNING {}",
        RECORD_COLUMNS
    ))
    .bind(new.date)
    .bind(new.temperature.map(|d| d.to_string()))
    .bind(new.uncertainty.map(|d| d.to_string()))
    .bind(new.country_id)
    .fetch_one(db.pool())
    .await
    .map_err(|e| constraint_error(e, &new))
}

pub async fn get(db: &DbPool, id: i64) -> Result<Record> {
    sqlx::query_as::<_, Record>(&format!("SELECT {} FROM records WHERE id = ?", RECORD_COLUMNS))
        .bind(id)
        .fetch_optional(db.pool())
        .await?
        .ok_or_else(|| DbError::not_found("Record", id))
}

/// Replace every field of an existing record.
pub async fn update(db: &DbPool, id: i64, new: NewRecord) -> Result<Record> {
    let new = new.normalized()?;

    sqlx::query_as::<_, Record>(&format!(
        "UPDATE records SET date = ?, temperature = ?, uncertainty = ?, country_id = ? \
         WHERE id = ? RETURNING {}",
        RECORD_COLUMNS
    ))
    .bind(new.date)
    .bind(new.temperature.map(|d| d.to_string()))
    .bind(new.uncertainty.map(|d| d.to_string()))
    .bind(new.country_id)
    .bind(id)
    .fetch_optional(db.pool())
    .await
    .map_err(|e| constraint_error(e, &new))?
    .ok_or_else(|| DbError::not_found("Record", id))
}

pub async fn delete(db: &DbPool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM records WHERE id = ?")
        .bind(id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Record", id));
    }
    Ok(())
}

pub async fn count(db: &DbPool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records")
        .fetch_one(db.pool())
        .await?;
    Ok(total)
}

/// One page of records joined with their country, ordered by (country, date).
pub async fn page(
    db: &DbPool,
    filter: &RecordFilter,
    page: PageNumber,
    per_page: u32,
) -> Result<Page<RecordRow>> {
    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM records r");
    filter.push_where(&mut count_query)?;
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(db.pool())
        .await?;

    let num_pages = num_pages(total, per_page);
    let page = page.resolve(num_pages)?;

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT r.id, r.date, r.temperature, r.uncertainty, r.country_id, c.name AS country \
         FROM records r JOIN countries c ON c.id = r.country_id",
    );
    filter.push_where(&mut query)?;
    query
        .push(" ORDER BY c.name, r.date LIMIT ")
        .push_bind(i64::from(per_page))
        .push(" OFFSET ")
        .push_bind(Page::<RecordRow>::offset(page, per_page));

    let items = query
        .build_query_as::<RecordRow>()
        .fetch_all(db.pool())
        .await?;

    Ok(Page {
        items,
        page,
        per_page,
        num_pages,
        total,
    })
}

/// Distinct years, months of a year, or days of a month that hold records.
///
/// The level follows the filter: no year lists years, a year lists its
/// months, a year and month list its days.
pub async fn date_drilldown(db: &DbPool, filter: &RecordFilter) -> Result<DateDrilldown> {
    let level = match (filter.year, filter.month) {
        (None, _) => DateLevel::Year,
        (Some(_), None) => DateLevel::Month,
        (Some(_), Some(_)) => DateLevel::Day,
    };
    let drill_filter = RecordFilter {
        day: None,
        ..filter.clone()
    };

    let mut query = QueryBuilder::<Sqlite>::new("SELECT DISTINCT r.date FROM records r");
    drill_filter.push_where(&mut query)?;
    query.push(" ORDER BY r.date");
    let dates: Vec<NaiveDate> = query.build_query_scalar().fetch_all(db.pool()).await?;

    let mut values: Vec<i32> = dates
        .iter()
        .map(|date| match level {
            DateLevel::Year => date.year(),
            DateLevel::Month => date.month() as i32,
            DateLevel::Day => date.day() as i32,
        })
        .collect();
    values.dedup();

    Ok(DateDrilldown { level, values })
}

fn constraint_error(err: sqlx::Error, new: &NewRecord) -> DbError {
    if is_unique_violation(&err) {
        DbError::Duplicate(format!(
            "Record for country {} on {} already exists",
            new.country_id, new.date
        ))
    } else if is_foreign_key_violation(&err) {
        DbError::Validation(format!("country {} does not exist", new.country_id))
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries;
    use crate::models::parse_decimal;

    async fn setup() -> DbPool {
        let db = DbPool::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_record(country_id: i64, date: NaiveDate, temperature: &str) -> NewRecord {
        NewRecord {
            date,
            temperature: parse_decimal(temperature).unwrap(),
            uncertainty: None,
            country_id,
        }
    }

    #[tokio::test]
    async fn test_insert_if_absent_keeps_first_record() {
        let db = setup().await;
        let (france, _) = countries::get_or_create(&db, "France").await.unwrap();

        let first = insert_if_absent(&db, new_record(france.id, date(2020, 1, 1), "15.234"))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = insert_if_absent(&db, new_record(france.id, date(2020, 1, 1), "16.0"))
            .await
            .unwrap();
        assert!(second.is_none());

        assert_eq!(count(&db).await.unwrap(), 1);
        let stored = get(&db, first.unwrap().id).await.unwrap();
        assert_eq!(stored.temperature.unwrap().to_string(), "15.234");
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let db = setup().await;
        let (france, _) = countries::get_or_create(&db, "France").await.unwrap();
        create(&db, new_record(france.id, date(2020, 1, 1), "1"))
            .await
            .unwrap();

        let err = create(&db, new_record(france.id, date(2020, 1, 1), "2"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_create_with_unknown_country_fails() {
        let db = setup().await;
        let err = create(&db, new_record(42, date(2020, 1, 1), "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_deleting_country_cascades_to_records() {
        let db = setup().await;
        let (france, _) = countries::get_or_create(&db, "France").await.unwrap();
        let (spain, _) = countries::get_or_create(&db, "Spain").await.unwrap();
        create(&db, new_record(france.id, date(2020, 1, 1), "1")).await.unwrap();
        create(&db, new_record(france.id, date(2020, 1, 2), "2")).await.unwrap();
        create(&db, new_record(spain.id, date(2020, 1, 1), "3")).await.unwrap();

        countries::delete(&db, france.id).await.unwrap();
        assert_eq!(count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_record() {
        let db = setup().await;
        let (france, _) = countries::get_or_create(&db, "France").await.unwrap();
        let record = create(&db, new_record(france.id, date(2020, 1, 1), "1"))
            .await
            .unwrap();

        let updated = update(&db, record.id, new_record(france.id, date(2020, 2, 1), ""))
            .await
            .unwrap();
        assert_eq!(updated.date, date(2020, 2, 1));
        assert_eq!(updated.temperature, None);

        assert!(matches!(
            update(&db, 999, new_record(france.id, date(2020, 2, 1), "")).await,
            Err(DbError::NotFound { .. })
        ));
        delete(&db, record.id).await.unwrap();
        assert!(matches!(delete(&db, record.id).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_page_orders_by_country_then_date() {
        let db = setup().await;
        let (spain, _) = countries::get_or_create(&db, "Spain").await.unwrap();
        let (austria, _) = countries::get_or_create(&db, "Austria").await.unwrap();
        create(&db, new_record(spain.id, date(2020, 1, 1), "1")).await.unwrap();
        create(&db, new_record(austria.id, date(2020, 1, 2), "2")).await.unwrap();
        create(&db, new_record(austria.id, date(2020, 1, 1), "3")).await.unwrap();

        let page = page(&db, &RecordFilter::default(), PageNumber::First, 50)
            .await
            .unwrap();
        let order: Vec<(String, NaiveDate)> = page
            .items
            .into_iter()
            .map(|r| (r.country, r.date))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Austria".to_string(), date(2020, 1, 1)),
                ("Austria".to_string(), date(2020, 1, 2)),
                ("Spain".to_string(), date(2020, 1, 1)),
            ]
        );
    }

    #[tokio::test]
    async fn test_page_splits_and_rejects_out_of_range() {
        let db = setup().await;
        let (france, _) = countries::get_or_create(&db, "France").await.unwrap();
        let start = date(2020, 1, 1);
        for offset in 0..120 {
            let day = start + chrono::Duration::days(offset);
            create(&db, new_record(france.id, day, "1")).await.unwrap();
        }

        let first = page(&db, &RecordFilter::default(), PageNumber::First, 50)
            .await
            .unwrap();
        assert_eq!(first.items.len(), 50);
        assert_eq!(first.num_pages, 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = page(&db, &RecordFilter::default(), PageNumber::Last, 50)
            .await
            .unwrap();
        assert_eq!(last.page, 3);
        assert_eq!(last.items.len(), 20);

        let err = page(&db, &RecordFilter::default(), PageNumber::Number(4), 50)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidPage(_)));
    }

    #[tokio::test]
    async fn test_empty_table_has_one_page() {
        let db = setup().await;
        let page = page(&db, &RecordFilter::default(), PageNumber::First, 50)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.num_pages, 1);
    }

    #[tokio::test]
    async fn test_filter_by_country_and_date() {
        let db = setup().await;
        let (france, _) = countries::get_or_create(&db, "France").await.unwrap();
        let (spain, _) = countries::get_or_create(&db, "Spain").await.unwrap();
        create(&db, new_record(france.id, date(2019, 12, 31), "1")).await.unwrap();
        create(&db, new_record(france.id, date(2020, 1, 1), "2")).await.unwrap();
        create(&db, new_record(france.id, date(2020, 2, 1), "3")).await.unwrap();
        create(&db, new_record(spain.id, date(2020, 1, 1), "4")).await.unwrap();

        let filter = RecordFilter {
            country_id: Some(france.id),
            year: Some(2020),
            ..Default::default()
        };
        let found = page(&db, &filter, PageNumber::First, 50).await.unwrap();
        assert_eq!(found.total, 2);

        let filter = RecordFilter {
            year: Some(2020),
            month: Some(1),
            day: Some(1),
            ..Default::default()
        };
        let found = page(&db, &filter, PageNumber::First, 50).await.unwrap();
        assert_eq!(found.total, 2);

        let bad = RecordFilter {
            month: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            page(&db, &bad, PageNumber::First, 50).await,
            Err(DbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_signed_year_is_rejected() {
        let db = setup().await;
        let (france, _) = countries::get_or_create(&db, "France").await.unwrap();

        let err = insert_if_absent(&db, new_record(france.id, date(-1, 6, 1), "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(count(&db).await.unwrap(), 0);

        let filter = RecordFilter {
            year: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            date_drilldown(&db, &filter).await,
            Err(DbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_filter_on_last_supported_year() {
        let db = setup().await;
        let (france, _) = countries::get_or_create(&db, "France").await.unwrap();
        create(&db, new_record(france.id, date(9999, 12, 31), "1")).await.unwrap();
        create(&db, new_record(france.id, date(1, 1, 1), "1")).await.unwrap();

        let filter = RecordFilter {
            year: Some(9999),
            month: Some(12),
            ..Default::default()
        };
        let found = page(&db, &filter, PageNumber::First, 50).await.unwrap();
        assert_eq!(found.total, 1);

        let years = date_drilldown(&db, &RecordFilter::default()).await.unwrap();
        assert_eq!(years.values, vec![1, 9999]);
    }

    #[tokio::test]
    async fn test_date_drilldown_levels() {
        let db = setup().await;
        let (france, _) = countries::get_or_create(&db, "France").await.unwrap();
        for d in [date(2019, 5, 3), date(2020, 1, 1), date(2020, 1, 7), date(2020, 3, 1)] {
            create(&db, new_record(france.id, d, "1")).await.unwrap();
        }

        let years = date_drilldown(&db, &RecordFilter::default()).await.unwrap();
        assert_eq!(years.level, DateLevel::Year);
        assert_eq!(years.values, vec![2019, 2020]);

        let months = date_drilldown(
            &db,
            &RecordFilter {
                year: Some(2020),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(months.level, DateLevel::Month);
        assert_eq!(months.values, vec![1, 3]);

        let days = date_drilldown(
            &db,
            &RecordFilter {
                year: Some(2020),
                month: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(days.level, DateLevel::Day);
        assert_eq!(days.values, vec![1, 7]);
    }
}
