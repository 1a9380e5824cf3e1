//! Profile catalog content and loaders.
//!
//! This crate owns the candidate profiles ("KOLs") the game is played over:
//! - The embedded default catalog (`data/kols.json`)
//! - File loaders for JSON/TOML catalogs
//! - Lookup and search helpers used by guess input
//! - Deterministic, catalog-order-dependent target selection
//!
//! Content is loaded once per session and never mutated afterwards.

pub mod catalog;
pub mod provider;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{Catalog, CatalogError, ProfileSpec};
pub use provider::{CatalogProvider, StaticCatalogProvider};

#[cfg(feature = "loaders")]
pub use loaders::CatalogLoader;
