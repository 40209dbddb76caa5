//! Catalog entities: watches, brands and paginated listings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of results the API returns per page.
pub const PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Brand {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum WatchType {
    Analog,
    Digital,
    Smart,
}

impl WatchType {
    pub const ALL: [WatchType; 3] = [WatchType::Analog, WatchType::Digital, WatchType::Smart];

    /// Wire value used in filters and forms.
    pub fn as_param(&self) -> &'static str {
        match self {
            WatchType::Analog => "ANALOG",
            WatchType::Digital => "DIGITAL",
            WatchType::Smart => "SMART",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WatchType::Analog => "Analog",
            WatchType::Digital => "Digital",
            WatchType::Smart => "Smart",
        }
    }

    /// Parse a filter value, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_param().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for WatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Watch {
    pub id: i64,
    pub name: String,
    pub brand: Brand,
    #[serde(default)]
    pub description: String,
    /// Decimal string, e.g. "1250.00"
    pub price: String,
    pub watch_type: WatchType,
    #[serde(default)]
    pub image: Option<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

impl Watch {
    pub fn availability(&self) -> &'static str {
        if self.in_stock {
            "In stock"
        } else {
            "Out of stock"
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Total number of pages, at least 1.
    pub fn total_pages(&self) -> u64 {
        total_pages(self.count)
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// Pages needed to show `count` items.
pub fn total_pages(count: u64) -> u64 {
    count.div_ceil(PAGE_SIZE).max(1)
}
