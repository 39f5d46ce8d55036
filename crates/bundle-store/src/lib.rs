//! Region bundle resolution.
//!
//! Given a region key, decides which on-disk representation exists, loads and
//! reconciles it, and returns one normalized [`RegionBundle`]:
//! - [`locator`] probes candidate formats in priority order
//! - [`loaders`] parse each format into a partial [`RawBundle`]
//! - [`normalize`] fills defaults so every bundle has the same shape
//! - [`cache`] memoizes bundles per region when the policy allows
//! - [`regions`] enumerates the regions available under the data root
//!
//! [`RegionBundle`]: forecast_common::RegionBundle

pub mod cache;
pub mod csv_rows;
pub mod layout;
pub mod loaders;
pub mod locator;
pub mod normalize;
pub mod raw;
pub mod regions;
pub mod resolver;
pub mod store;

pub use cache::{BundleCache, CachePolicy, CacheStats};
pub use layout::DataLayout;
pub use loaders::{FormatLoader, LoadOutcome};
pub use locator::SourceKind;
pub use normalize::normalize;
pub use raw::{RawBundle, RawManifest};
pub use regions::RegionLister;
pub use resolver::BundleResolver;
pub use store::{CountingStore, DataStore, LocalStore};
