//! Content-model contract and the id → factory registry.
//!
//! A content model knows one site's markup. The facade binds a model by the
//! `parser` id of the target a URL resolves to and hands it a
//! [`ScrapeContext`] for fetching and resolving follow-up links.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dealscrape_core::{DealDetail, DealSummary};
use futures::future::BoxFuture;

use crate::error::ScraperError;
use crate::fetch::{FetchOptions, FetchOutcome, FetchPipeline};
use crate::models::groupon::{self, GrouponModel};
use crate::resolver::{ResolvedContext, TargetResolver};

/// Fields a model wants to override on a freshly resolved context. `None`
/// leaves the resolver's value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlInfo {
    pub location: Option<String>,
    pub category: Option<String>,
    pub rel_id: Option<String>,
}

/// What a bound model may use: the resolver, the pipeline, and the default
/// fetch options of the scraper that bound it.
#[derive(Debug, Clone)]
pub struct ScrapeContext {
    resolver: TargetResolver,
    pipeline: FetchPipeline,
    options: FetchOptions,
}

impl ScrapeContext {
    #[must_use]
    pub fn new(resolver: TargetResolver, pipeline: FetchPipeline, options: FetchOptions) -> Self {
        Self {
            resolver,
            pipeline,
            options,
        }
    }

    #[must_use]
    pub fn resolver(&self) -> &TargetResolver {
        &self.resolver
    }

    #[must_use]
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetches `url` with the default options.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        self.pipeline.fetch(url, &self.options).await
    }

    /// Resolves `url` and lets `model` overlay its own reading of the
    /// captures.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::NoTargetMatch`] when nothing matches.
    pub fn resolve_with(
        &self,
        model: &dyn ContentModel,
        url: &str,
    ) -> Result<ResolvedContext, ScraperError> {
        let mut context = self.resolver.resolve(url)?;
        let info = model.url_info_hook(&context);
        context.apply(info);
        Ok(context)
    }
}

/// Site-specific deal extraction.
pub trait ContentModel: Send + Sync {
    /// Human-readable name, for logs.
    fn name(&self) -> &str;

    /// Model-specific reading of a resolved context. The default changes
    /// nothing.
    fn url_info_hook(&self, _context: &ResolvedContext) -> UrlInfo {
        UrlInfo::default()
    }

    /// Deals listed at `url` (usually a feed or index page).
    fn list_deals<'a>(
        &'a self,
        ctx: &'a ScrapeContext,
        url: &'a str,
    ) -> BoxFuture<'a, Result<Vec<DealSummary>, ScraperError>>;

    /// Details of the single deal page at `url`.
    fn get_deal_detail<'a>(
        &'a self,
        ctx: &'a ScrapeContext,
        url: &'a str,
    ) -> BoxFuture<'a, Result<DealDetail, ScraperError>>;
}

type ModelFactory = Box<dyn Fn() -> Arc<dyn ContentModel> + Send + Sync>;

/// Maps parser ids to model constructors.
pub struct ModelRegistry {
    factories: HashMap<String, ModelFactory>,
}

impl ModelRegistry {
    /// A registry with no models.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// The models shipped with this crate.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(groupon::PARSER_ID, || Arc::new(GrouponModel));
        registry
    }

    /// Adds or replaces the factory for `id`.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn ContentModel> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
    }

    /// A fresh model for `id`, if one is registered.
    #[must_use]
    pub fn create(&self, id: &str) -> Option<Arc<dyn ContentModel>> {
        self.factories.get(id).map(|factory| factory())
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}
