//! Database models and types.

use crate::error::{DbError, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::str::FromStr;

/// Number of fractional digits kept for temperature values.
pub const DECIMAL_PLACES: u32 = 3;

/// Total number of digits allowed for temperature values.
pub const MAX_DIGITS: u32 = 6;

/// Range of years a record date may fall in.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Longest country name accepted by the schema.
pub const MAX_COUNTRY_NAME_LEN: usize = 100;

/// Country where the data have been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Country {
    pub id: i64,
    pub name: String,
}

/// Temperature record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub date: NaiveDate,
    /// Average temperature, in Celsius.
    pub temperature: Option<Decimal>,
    /// The 95% confidence interval around the average.
    pub uncertainty: Option<Decimal>,
    pub country_id: i64,
}

/// A record joined with the name of its country, as shown in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    pub id: i64,
    pub country: String,
    pub country_id: i64,
    pub date: NaiveDate,
    pub temperature: Option<Decimal>,
    pub uncertainty: Option<Decimal>,
}

/// Field values for a record that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub date: NaiveDate,
    pub temperature: Option<Decimal>,
    pub uncertainty: Option<Decimal>,
    pub country_id: i64,
}

impl NewRecord {
    /// Check the date and quantize both decimal fields to the stored precision.
    pub fn normalized(self) -> Result<Self> {
        validate_date(self.date)?;
        Ok(Self {
            temperature: self.temperature.map(quantize).transpose()?,
            uncertainty: self.uncertainty.map(quantize).transpose()?,
            ..self
        })
    }
}

/// Dates are stored as `YYYY-MM-DD` text, so only four-digit positive
/// years keep their lexicographic order.
pub fn validate_date(date: NaiveDate) -> Result<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(DbError::Validation(format!(
            "date {} is outside years {}..={}",
            date, MIN_YEAR, MAX_YEAR
        )));
    }
    Ok(())
}

/// Round a value to three decimal places and check it fits six digits.
pub fn quantize(value: Decimal) -> Result<Decimal> {
    let mut rounded =
        value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(DECIMAL_PLACES);

    let limit = Decimal::from(10i64.pow(MAX_DIGITS - DECIMAL_PLACES));
    if rounded.abs() >= limit {
        return Err(DbError::Validation(format!(
            "{} has more than {} digits",
            value, MAX_DIGITS
        )));
    }
    Ok(rounded)
}

/// Parse an optional decimal field, treating an empty string as absent.
pub fn parse_decimal(raw: &str) -> Result<Option<Decimal>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value = Decimal::from_str(raw)
        .map_err(|e| DbError::Validation(format!("invalid decimal {:?}: {}", raw, e)))?;
    quantize(value).map(Some)
}

/// Check a country name against the schema constraints.
pub fn validate_country_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DbError::Validation("country name must not be empty".into()));
    }
    if name.chars().count() > MAX_COUNTRY_NAME_LEN {
        return Err(DbError::Validation(format!(
            "country name is longer than {} characters",
            MAX_COUNTRY_NAME_LEN
        )));
    }
    Ok(())
}

fn decode_decimal(row: &SqliteRow, column: &str) -> std::result::Result<Option<Decimal>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| {
        Decimal::from_str(&s).map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
    })
    .transpose()
}

impl<'r> FromRow<'r, SqliteRow> for Record {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            date: row.try_get("date")?,
            temperature: decode_decimal(row, "temperature")?,
            uncertainty: decode_decimal(row, "uncertainty")?,
            country_id: row.try_get("country_id")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for RecordRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            country: row.try_get("country")?,
            country_id: row.try_get("country_id")?,
            date: row.try_get("date")?,
            temperature: decode_decimal(row, "temperature")?,
            uncertainty: decode_decimal(row, "uncertainty")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_empty_is_none() {
        assert_eq!(parse_decimal("").unwrap(), None);
        assert_eq!(parse_decimal("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_decimal_rescales_to_three_places() {
        let value = parse_decimal("16.0").unwrap().unwrap();
        assert_eq!(value.to_string(), "16.000");

        let value = parse_decimal("-3.14159").unwrap().unwrap();
        assert_eq!(value.to_string(), "-3.142");
    }

    #[test]
    fn test_quantize_uses_bankers_rounding() {
        let value = quantize(Decimal::from_str("0.0125").unwrap()).unwrap();
        assert_eq!(value.to_string(), "0.012");
    }

    #[test]
    fn test_quantize_rejects_too_many_digits() {
        assert!(quantize(Decimal::from_str("999.999").unwrap()).is_ok());
        assert!(matches!(
            quantize(Decimal::from_str("1000").unwrap()),
            Err(DbError::Validation(_))
        ));
        // Rounds up past the limit.
        assert!(quantize(Decimal::from_str("999.9996").unwrap()).is_err());
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(matches!(parse_decimal("warm"), Err(DbError::Validation(_))));
    }

    #[test]
    fn test_validate_date_rejects_years_outside_four_digits() {
        assert!(validate_date(NaiveDate::from_ymd_opt(1743, 11, 1).unwrap()).is_ok());
        assert!(validate_date(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()).is_ok());
        assert!(validate_date(NaiveDate::from_ymd_opt(0, 6, 1).unwrap()).is_err());
        assert!(validate_date(NaiveDate::from_ymd_opt(-1, 6, 1).unwrap()).is_err());
        assert!(validate_date(NaiveDate::from_ymd_opt(10000, 1, 1).unwrap()).is_err());
    }

    #[test]
    fn test_validate_country_name() {
        assert!(validate_country_name("France").is_ok());
        assert!(validate_country_name("").is_err());
        assert!(validate_country_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_record_row_serializes_missing_values_as_null() {
        let row = RecordRow {
            id: 1,
            country: "France".into(),
            country_id: 1,
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            temperature: None,
            uncertainty: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json["temperature"].is_null());
        assert_eq!(json["date"], "2020-01-01");
    }
}
