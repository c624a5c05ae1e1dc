pub mod address;
pub mod error;
pub mod facade;
pub mod fetch;
pub mod hash;
pub mod model;
pub mod models;
pub mod numeric;
pub mod registry;
pub mod resolver;
pub mod text;

pub use address::clean_address_lines;
pub use error::ScraperError;
pub use facade::Scraper;
pub use fetch::{
    pick_user_agent, ContentType, Document, FailureKind, FetchOptions, FetchOutcome, FetchPipeline,
    Header,
};
pub use hash::deal_hash;
pub use model::{ContentModel, ModelRegistry, ScrapeContext, UrlInfo};
pub use models::groupon::GrouponModel;
pub use numeric::{extract_float_from_markup, extract_float_from_string};
pub use registry::{Target, TargetRegistry};
pub use resolver::{ResolvedContext, TargetResolver};
