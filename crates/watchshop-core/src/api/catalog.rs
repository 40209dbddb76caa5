//! Public catalog endpoints: watch listings, watch details and brands.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Brand, Page, Watch, WatchType};

use super::{ApiClient, ApiError, ApiRequest};

const WATCHES_PATH: &str = "/api/watches/";
const BRANDS_PATH: &str = "/api/brands/";

/// Catalog filters. Empty filters are left out of the query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub brand_name: Option<String>,
    pub watch_type: Option<WatchType>,
    pub in_stock: bool,
    pub search: Option<String>,
    /// Field to order by, `-` prefix for descending (e.g. `-price`).
    pub ordering: Option<String>,
    pub page: u64,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            brand_name: None,
            watch_type: None,
            in_stock: false,
            search: None,
            ordering: None,
            page: 1,
        }
    }
}

impl CatalogQuery {
    pub fn in_stock_by(ordering: &str) -> Self {
        Self {
            in_stock: true,
            ordering: Some(ordering.to_string()),
            ..Self::default()
        }
    }

    pub fn with_brand(self, brand: &str) -> Self {
        Self {
            brand_name: non_blank(brand),
            page: 1,
            ..self
        }
    }

    pub fn with_watch_type(self, watch_type: Option<WatchType>) -> Self {
        Self {
            watch_type,
            page: 1,
            ..self
        }
    }

    pub fn with_in_stock(self, in_stock: bool) -> Self {
        Self {
            in_stock,
            page: 1,
            ..self
        }
    }

    pub fn with_search(self, search: &str) -> Self {
        Self {
            search: non_blank(search),
            page: 1,
            ..self
        }
    }

    pub fn with_ordering(self, ordering: &str) -> Self {
        Self {
            ordering: non_blank(ordering),
            page: 1,
            ..self
        }
    }

    /// Move to another page, keeping the filters.
    pub fn with_page(self, page: u64) -> Self {
        Self {
            page: page.max(1),
            ..self
        }
    }

    /// Drop every filter and go back to the first page.
    pub fn reset(self) -> Self {
        Self::default()
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(ref brand) = self.brand_name {
            pairs.push(("brand__name".to_string(), brand.clone()));
        }
        if let Some(watch_type) = self.watch_type {
            pairs.push(("watch_type".to_string(), watch_type.as_param().to_string()));
        }
        if self.in_stock {
            pairs.push(("in_stock".to_string(), "true".to_string()));
        }
        if let Some(ref search) = self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(ref ordering) = self.ordering {
            pairs.push(("ordering".to_string(), ordering.clone()));
        }
        pairs.push(("page".to_string(), self.page.max(1).to_string()));
        pairs
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// The three shelves shown on the home page.
#[derive(Debug, Clone)]
pub struct HomeShelves {
    pub newest: Vec<Watch>,
    pub premium: Vec<Watch>,
    pub affordable: Vec<Watch>,
}

impl ApiClient {
    /// Fetch one page of the catalog.
    pub async fn list_watches(&self, query: &CatalogQuery) -> Result<Page<Watch>, ApiError> {
        self.fetch_json(ApiRequest::get(WATCHES_PATH).query(query.to_query_pairs()))
            .await
    }

    pub async fn get_watch(&self, id: i64) -> Result<Watch, ApiError> {
        self.get_json(&format!("{}{}/", WATCHES_PATH, id)).await
    }

    pub async fn list_brands(&self) -> Result<Vec<Brand>, ApiError> {
        let page: Page<Brand> = self.get_json(BRANDS_PATH).await?;
        Ok(page.results)
    }

    /// Brands for the filter sidebar. A failure only costs the sidebar.
    pub async fn list_brands_or_empty(&self) -> Vec<Brand> {
        match self.list_brands().await {
            Ok(brands) => brands,
            Err(e) => {
                warn!(error = %e, "Failed to load brands");
                Vec::new()
            }
        }
    }

    /// Load the home page shelves concurrently.
    pub async fn home_shelves(&self) -> Result<HomeShelves, ApiError> {
        let newest_query = CatalogQuery::default();
        let premium_query = CatalogQuery::in_stock_by("-price");
        let affordable_query = CatalogQuery::in_stock_by("price");

        let (newest, premium, affordable) = futures::try_join!(
            self.list_watches(&newest_query),
            self.list_watches(&premium_query),
            self.list_watches(&affordable_query),
        )?;

        Ok(HomeShelves {
            newest: newest.results,
            premium: premium.results,
            affordable: affordable.results,
        })
    }
}
