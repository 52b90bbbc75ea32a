use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::design_model::FurnitureCatalogEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSort {
    /// Alphabetical, case-insensitive.
    #[default]
    Name,
    /// Cheapest first.
    Price,
    /// Best rated first.
    Rating,
}

/// What the catalog screen is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    /// Case-insensitive substring of the name or description.
    pub search: String,
    /// `None` shows every category.
    pub category: Option<String>,
    pub sort: CatalogSort,
}

/// Filters and sorts catalog entries without touching the cache.
pub fn query(entries: &[FurnitureCatalogEntry], query: &CatalogQuery) -> Vec<FurnitureCatalogEntry> {
    let needle = query.search.to_lowercase();

    let mut matches: Vec<FurnitureCatalogEntry> = entries
        .iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.name.to_lowercase().contains(&needle)
                || entry.description.to_lowercase().contains(&needle)
        })
        .filter(|entry| match &query.category {
            Some(category) => entry.category == *category,
            None => true,
        })
        .cloned()
        .collect();

    match query.sort {
        CatalogSort::Name => {
            matches.sort_by_cached_key(|entry| entry.name.to_lowercase());
        }
        CatalogSort::Price => {
            matches.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal));
        }
        CatalogSort::Rating => {
            matches.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
        }
    }

    matches
}
