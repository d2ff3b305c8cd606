//! Product catalog fetchers

use super::envelope::{decode_item, decode_page};
use super::fetcher::ResourceFetcher;
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::messages::Messages;
use crate::types::{Category, PageRequest, PageResult, Product};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Backend routes, relative to the API base URL
pub mod endpoints {
    /// Home feed listing
    pub const HOME_LIST: &str = "/home";
    /// Keyword search
    pub const SEARCH: &str = "/search";
    /// Category listing
    pub const CATEGORIES: &str = "/products/categories";

    /// Product detail route
    pub fn product_detail(id: u64) -> String {
        format!("/products/{id}")
    }
}

/// Typed access to the product endpoints
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    client: Arc<HttpClient>,
    messages: Messages,
}

impl ProductCatalog {
    /// Create a catalog over `client`
    pub fn new(client: Arc<HttpClient>, messages: Messages) -> Self {
        Self { client, messages }
    }

    /// The shared HTTP client
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// List the home feed
    pub async fn list_products(&self, request: PageRequest) -> Result<PageResult<Product>> {
        let config = RequestConfig::new()
            .query("page", request.page.to_string())
            .query("per_page", request.per_page.to_string());

        let response = self
            .client
            .get_with_config(endpoints::HOME_LIST, config)
            .await?;
        let page = decode_page(&response.body, self.messages.retry_hint())?;
        debug!(
            page = request.page,
            items = page.len(),
            has_more = page.has_more,
            "Fetched product page"
        );
        Ok(page)
    }

    /// Search products by keyword
    pub async fn search_products(
        &self,
        query: &str,
        request: PageRequest,
    ) -> Result<PageResult<Product>> {
        let config = RequestConfig::new()
            .query("q", query)
            .query("per_page", request.per_page.to_string())
            .query("page", request.page.to_string());

        let response = self.client.get_with_config(endpoints::SEARCH, config).await?;
        let page = decode_page(&response.body, self.messages.retry_hint())?;
        debug!(
            query,
            page = request.page,
            items = page.len(),
            "Fetched search page"
        );
        Ok(page)
    }

    /// Fetch one product
    pub async fn product(&self, id: u64) -> Result<Product> {
        let response = self.client.get(&endpoints::product_detail(id)).await?;
        decode_item(&response.body, self.messages.retry_hint())
    }

    /// Fetch all categories
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let response = self.client.get(endpoints::CATEGORIES).await?;
        decode_item(&response.body, self.messages.retry_hint())
    }

    /// Fetcher for the home feed
    pub fn home(&self) -> HomeListing {
        HomeListing {
            catalog: self.clone(),
        }
    }

    /// Fetcher for a keyword search
    pub fn search(&self, query: impl Into<String>) -> SearchListing {
        SearchListing {
            catalog: self.clone(),
            query: query.into(),
        }
    }
}

/// Home feed as a paginated resource
#[derive(Debug, Clone)]
pub struct HomeListing {
    catalog: ProductCatalog,
}

#[async_trait]
impl ResourceFetcher for HomeListing {
    type Item = Product;

    async fn list(&self, request: PageRequest) -> Result<PageResult<Product>> {
        self.catalog.list_products(request).await
    }
}

/// Search results as a paginated resource
#[derive(Debug, Clone)]
pub struct SearchListing {
    catalog: ProductCatalog,
    query: String,
}

impl SearchListing {
    /// The search keyword
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[async_trait]
impl ResourceFetcher for SearchListing {
    type Item = Product;

    async fn list(&self, request: PageRequest) -> Result<PageResult<Product>> {
        self.catalog.search_products(&self.query, request).await
    }
}
