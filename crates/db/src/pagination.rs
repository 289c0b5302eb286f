//! Page arithmetic shared by the listing queries.

use crate::error::{DbError, Result};
use serde::Serialize;
use std::str::FromStr;

/// A requested page: a 1-based number or the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageNumber {
    #[default]
    First,
    Number(u32),
    Last,
}

impl FromStr for PageNumber {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "last" {
            return Ok(PageNumber::Last);
        }
        s.parse::<u32>()
            .map(PageNumber::Number)
            .map_err(|_| DbError::InvalidPage(format!("{:?} is not a page number", s)))
    }
}

impl PageNumber {
    /// Resolve against the total number of pages.
    ///
    /// Fails for page zero and for pages past the end. An empty listing
    /// still has a first page.
    pub fn resolve(self, num_pages: u32) -> Result<u32> {
        match self {
            PageNumber::First => Ok(1),
            PageNumber::Last => Ok(num_pages),
            PageNumber::Number(n) if n >= 1 && n <= num_pages => Ok(n),
            PageNumber::Number(n) => Err(DbError::InvalidPage(format!(
                "page {} is out of range (1..={})",
                n, num_pages
            ))),
        }
    }
}

/// Number of pages needed to hold `total` items, never less than one.
pub fn num_pages(total: i64, per_page: u32) -> u32 {
    let per_page = i64::from(per_page.max(1));
    let pages = (total.max(0) + per_page - 1) / per_page;
    pages.max(1) as u32
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub num_pages: u32,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    /// SQL offset of the first item on this page.
    pub(crate) fn offset(page: u32, per_page: u32) -> i64 {
        i64::from(page.saturating_sub(1)) * i64::from(per_page)
    }
}
