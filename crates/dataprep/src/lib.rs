//! Data preparation — CSV ingestion, outcome derivation, one-hot encoding,
//! and business-unit filtering for the attribution pipeline.

pub mod cache;
pub mod encode;
pub mod filter;
pub mod loader;

pub use cache::CachedLoader;
pub use encode::{encode_categoricals, EncodedFeatureMatrix};
pub use filter::filter_by_business_unit;
pub use loader::{derive_outcomes, load_records};
