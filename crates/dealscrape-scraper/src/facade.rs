//! The `Scraper` facade: resolve, bind a content model, delegate.
//!
//! Everything below the facade is strict; the facade is not. Unknown URLs,
//! failed fetches and extraction errors are logged and come back as empty
//! results.

use std::sync::Arc;
use std::time::Duration;

use dealscrape_core::{AppConfig, DealDetail, DealSummary, TargetConfig};

use crate::error::ScraperError;
use crate::fetch::{FetchOptions, FetchOutcome, FetchPipeline};
use crate::model::{ContentModel, ModelRegistry, ScrapeContext};
use crate::registry::TargetRegistry;
use crate::resolver::{ResolvedContext, TargetResolver};

/// A model instance bound to the parser id it was created for.
struct BoundModel {
    parser_id: String,
    model: Arc<dyn ContentModel>,
}

pub struct Scraper {
    context: ScrapeContext,
    models: ModelRegistry,
    active: Option<BoundModel>,
}

impl Scraper {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(
        targets: TargetRegistry,
        models: ModelRegistry,
        options: FetchOptions,
    ) -> Result<Self, ScraperError> {
        let context = ScrapeContext::new(
            TargetResolver::new(targets),
            FetchPipeline::new()?,
            options,
        );
        Ok(Self {
            context,
            models,
            active: None,
        })
    }

    /// Builds a scraper with the built-in models and fetch options taken from
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidPattern`] if a target pattern does not
    /// compile, or [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig, targets: &[TargetConfig]) -> Result<Self, ScraperError> {
        let options = FetchOptions {
            proxy: config.proxy.clone(),
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            ..FetchOptions::default()
        };
        Self::new(
            TargetRegistry::from_configs(targets)?,
            ModelRegistry::builtin(),
            options,
        )
    }

    #[must_use]
    pub fn targets(&self) -> &TargetRegistry {
        self.context.resolver().registry()
    }

    #[must_use]
    pub fn fetch_options(&self) -> &FetchOptions {
        self.context.options()
    }

    /// Name of the currently bound model, if any.
    #[must_use]
    pub fn active_model(&self) -> Option<&str> {
        self.active.as_ref().map(|bound| bound.model.name())
    }

    /// Resolves `url`, binding the content model of the matching target.
    ///
    /// The bound model is kept while URLs keep resolving to the same parser
    /// id. Returns `None` for empty or unknown URLs.
    pub fn resolve_url(&mut self, url: &str) -> Option<ResolvedContext> {
        if url.trim().is_empty() {
            return None;
        }
        let mut context = match self.context.resolver().resolve(url) {
            Ok(context) => context,
            Err(e) => {
                tracing::debug!(url, error = %e, "unresolved URL");
                return None;
            }
        };
        if let Some(model) = self.bind(&context.parser_id) {
            context.apply(model.url_info_hook(&context));
        }
        Some(context)
    }

    /// Fetches `url` with the scraper's default options.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        self.context.fetch(url).await
    }

    /// Deals listed at `url`; empty on any failure.
    pub async fn list_deals(&mut self, url: &str) -> Vec<DealSummary> {
        let Some(model) = self.model_for(url) else {
            return Vec::new();
        };
        match model.list_deals(&self.context, url).await {
            Ok(deals) => deals,
            Err(e) => {
                tracing::warn!(url, model = model.name(), error = %e, "listing deals failed");
                Vec::new()
            }
        }
    }

    /// Details of the deal at `url`; `None` on any failure.
    pub async fn get_deal(&mut self, url: &str) -> Option<DealDetail> {
        let model = self.model_for(url)?;
        match model.get_deal_detail(&self.context, url).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                tracing::warn!(url, model = model.name(), error = %e, "deal detail failed");
                None
            }
        }
    }

    fn model_for(&mut self, url: &str) -> Option<Arc<dyn ContentModel>> {
        self.resolve_url(url)?;
        let model = self.active.as_ref().map(|bound| Arc::clone(&bound.model));
        if model.is_none() {
            tracing::debug!(url, "no content model bound");
        }
        model
    }

    fn bind(&mut self, parser_id: &str) -> Option<Arc<dyn ContentModel>> {
        if let Some(bound) = self.active.as_ref().filter(|b| b.parser_id == parser_id) {
            return Some(Arc::clone(&bound.model));
        }
        self.active = self.models.create(parser_id).map(|model| {
            tracing::debug!(parser_id, model = model.name(), "using model");
            BoundModel {
                parser_id: parser_id.to_owned(),
                model,
            }
        });
        if self.active.is_none() {
            tracing::warn!(parser_id, "no content model registered for parser");
        }
        self.active.as_ref().map(|bound| Arc::clone(&bound.model))
    }
}

impl std::fmt::Debug for Scraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scraper")
            .field("targets", &self.targets().len())
            .field("models", &self.models)
            .field("active", &self.active_model())
            .finish_non_exhaustive()
    }
}
