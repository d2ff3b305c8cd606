//! Resource fetcher trait and closure adapter

use crate::error::Result;
use crate::types::{PageRequest, PageResult};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;

/// A paginated resource
///
/// Implementations must propagate every error unchanged; an absent items
/// collection is a validation error, never an empty page.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Record type of the resource
    type Item: Send;

    /// Fetch one page
    async fn list(&self, request: PageRequest) -> Result<PageResult<Self::Item>>;
}

#[async_trait]
impl<F: ResourceFetcher + ?Sized> ResourceFetcher for Arc<F> {
    type Item = F::Item;

    async fn list(&self, request: PageRequest) -> Result<PageResult<Self::Item>> {
        (**self).list(request).await
    }
}

type ListFn<T> = dyn Fn(PageRequest) -> BoxFuture<'static, Result<PageResult<T>>> + Send + Sync;

/// Adapts an async closure into a [`ResourceFetcher`]
pub struct FnFetcher<T> {
    f: Box<ListFn<T>>,
}

impl<T: Send + 'static> FnFetcher<T> {
    /// Wrap `f`
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PageResult<T>>> + Send + 'static,
    {
        Self {
            f: Box::new(move |request| f(request).boxed()),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> ResourceFetcher for FnFetcher<T> {
    type Item = T;

    async fn list(&self, request: PageRequest) -> Result<PageResult<T>> {
        (self.f)(request).await
    }
}

impl<T> std::fmt::Debug for FnFetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish_non_exhaustive()
    }
}
