//! Common types used throughout storefront-fetch
//!
//! Page requests and results, the identity trait used for deduplication,
//! and the catalog models returned by the backend.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::hash::Hash;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// First page number used by the backend
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when none is configured
pub const DEFAULT_PER_PAGE: u32 = 25;

// ============================================================================
// Identity
// ============================================================================

/// A record with a stable identity
///
/// Deduplication across pages compares `id()` alone.
pub trait Identified {
    /// Identifier type
    type Id: Eq + Hash + Clone;

    /// The record's identifier
    fn id(&self) -> Self::Id;
}

// ============================================================================
// Page Request / Result
// ============================================================================

/// Parameters for fetching one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl PageRequest {
    /// Create a page request, rejecting zero page or page size
    pub fn new(page: u32, per_page: u32) -> Result<Self> {
        if page == 0 {
            return Err(Error::validation("page must be >= 1"));
        }
        if per_page == 0 {
            return Err(Error::validation("per_page must be >= 1"));
        }
        Ok(Self { page, per_page })
    }

    /// First page with the given size
    pub fn first(per_page: u32) -> Result<Self> {
        Self::new(DEFAULT_PAGE, per_page)
    }

    /// Query parameters for this request
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results, normalized from the server envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Whether another page exists after this one
    pub has_more: bool,
    /// Total number of items across all pages, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Page number reported by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    /// Last page number reported by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_page: Option<u32>,
    /// Next page number reported by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
}

impl<T> PageResult<T> {
    /// Create a page with only items and the continuation flag
    pub fn new(items: Vec<T>, has_more: bool) -> Self {
        Self {
            items,
            has_more,
            total: None,
            current_page: None,
            last_page: None,
            next_page: None,
        }
    }

    /// Set the total count
    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Catalog Models
// ============================================================================

/// Treat an explicit `null` like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Identified for Category {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_hot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u64>,
}

impl Identified for Product {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

/// Cached user profile, stored next to the auth token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
