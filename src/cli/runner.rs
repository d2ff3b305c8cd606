//! CLI runner - executes commands

use crate::auth::Credentials;
use crate::cli::commands::{Cli, Commands, OutputFormat, PagingArgs, TokenAction};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::fetch::{ProductCatalog, ResourceFetcher};
use crate::http::HttpClient;
use crate::messages::{ErrorInfo, Messages};
use crate::pagination::{FetchOutcome, PaginationController};
use crate::storage::{CredentialStore, FileStore, MemoryStore};
use crate::types::Product;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

/// Everything a command needs, built once per run
struct Session {
    config: AppConfig,
    messages: Messages,
    credentials: Credentials,
    catalog: ProductCatalog,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let session = self.open_session()?;

        match &self.cli.command {
            Commands::Products { paging } => {
                self.list(&session, session.catalog.home(), *paging).await
            }
            Commands::Search { query, paging } => {
                self.list(&session, session.catalog.search(query.clone()), *paging)
                    .await
            }
            Commands::Product { id } => self.product(&session, *id).await,
            Commands::Categories => self.categories(&session).await,
            Commands::Token { action } => self.token(&session, action).await,
        }
    }

    /// Load configuration and wire the transport
    fn open_session(&self) -> Result<Session> {
        let mut config = AppConfig::load(self.cli.config.as_deref())?;
        config.override_base_url(self.cli.base_url.clone())?;
        debug!(base_url = %config.api.base_url, locale = ?config.locale, "Configuration loaded");

        let store: Arc<dyn CredentialStore> =
            match self.cli.store.as_ref().or(config.storage.path.as_ref()) {
                Some(path) => Arc::new(FileStore::open(path)?),
                None => Arc::new(MemoryStore::new()),
            };
        let credentials = Credentials::new(store);

        let messages = Messages::new(config.locale);
        let client = HttpClient::with_credentials(config.http_config(), credentials.clone())?;
        let catalog = ProductCatalog::new(Arc::new(client), messages);

        Ok(Session {
            config,
            messages,
            credentials,
            catalog,
        })
    }

    /// Page through a product listing
    async fn list<F>(&self, session: &Session, fetcher: F, paging: PagingArgs) -> Result<()>
    where
        F: ResourceFetcher<Item = Product>,
    {
        let mut options = session.config.pagination_options();
        if let Some(per_page) = paging.per_page {
            options = options.per_page(per_page);
        }
        if let Some(page) = paging.page {
            options = options.initial_page(page);
        }

        let controller = PaginationController::new(fetcher, options, session.messages);
        let start = Instant::now();
        let outcome = if paging.all {
            controller.load_all(paging.max_pages).await
        } else {
            controller.refresh().await
        };

        if let FetchOutcome::Failed(info) = outcome {
            return Err(self.report(&info));
        }

        let state = controller.state();
        for product in &state.items {
            self.output_message(&json!({
                "type": "RECORD",
                "record": product
            }));
        }
        self.output_message(&json!({
            "type": "PAGE",
            "page": {
                "current_page": state.current_page,
                "has_more": state.has_more,
                "total": state.total,
                "count": state.items.len()
            }
        }));

        info!(
            items = state.items.len(),
            page = state.current_page,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Listing complete"
        );
        Ok(())
    }

    /// Show one product
    async fn product(&self, session: &Session, id: u64) -> Result<()> {
        match session.catalog.product(id).await {
            Ok(product) => {
                self.output_message(&json!({
                    "type": "PRODUCT",
                    "product": product
                }));
                Ok(())
            }
            Err(e) => Err(self.report(&ErrorInfo::from_error(&e, &session.messages))),
        }
    }

    /// List categories
    async fn categories(&self, session: &Session) -> Result<()> {
        match session.catalog.categories().await {
            Ok(categories) => {
                self.output_message(&json!({
                    "type": "CATEGORIES",
                    "categories": categories
                }));
                Ok(())
            }
            Err(e) => Err(self.report(&ErrorInfo::from_error(&e, &session.messages))),
        }
    }

    /// Manage the stored token
    async fn token(&self, session: &Session, action: &TokenAction) -> Result<()> {
        let credentials = &session.credentials;
        match action {
            TokenAction::Set { value } => {
                if value.trim().is_empty() {
                    return Err(Error::validation("token cannot be blank"));
                }
                credentials.set_token(value.trim()).await?;
                self.output_message(&json!({
                    "type": "TOKEN",
                    "token": {"stored": true}
                }));
            }
            TokenAction::Clear => {
                credentials.evict().await?;
                self.output_message(&json!({
                    "type": "TOKEN",
                    "token": {"stored": false}
                }));
            }
            TokenAction::Show => {
                let token = credentials.bearer_token().await;
                let profile = credentials.profile().await?;
                self.output_message(&json!({
                    "type": "TOKEN",
                    "token": {
                        "stored": token.is_some(),
                        "preview": token.as_deref().map(mask_token),
                        "profile": profile
                    }
                }));
            }
        }
        Ok(())
    }

    /// Emit an error message and turn it into the process error
    fn report(&self, info: &ErrorInfo) -> Error {
        self.output_message(&json!({
            "type": "ERROR",
            "error": {
                "kind": info.kind,
                "message": info.message
            }
        }));
        Error::Other(info.message.clone())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// First four characters of a token, the rest elided
fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcdefgh"), "abcd…");
        assert_eq!(mask_token("ab"), "ab…");
    }

    #[tokio::test]
    async fn test_token_roundtrip_through_file_store() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("store.json");
        let store_arg = store.to_string_lossy().to_string();

        let set = Runner::new(Cli::parse_from([
            "storefront",
            "--store",
            &store_arg,
            "token",
            "set",
            "secret-token",
        ]));
        set.run().await.unwrap();

        let reopened = Credentials::new(Arc::new(FileStore::open(&store).unwrap()));
        assert_eq!(reopened.bearer_token().await.as_deref(), Some("secret-token"));

        let clear = Runner::new(Cli::parse_from([
            "storefront",
            "--store",
            &store_arg,
            "token",
            "clear",
        ]));
        clear.run().await.unwrap();

        let reopened = Credentials::new(Arc::new(FileStore::open(&store).unwrap()));
        assert!(reopened.bearer_token().await.is_none());
    }

    #[tokio::test]
    async fn test_blank_token_rejected() {
        let runner = Runner::new(Cli::parse_from(["storefront", "token", "set", "  "]));
        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
