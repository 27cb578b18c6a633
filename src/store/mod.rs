//! Persistence of analysis bundles.
//!
//! [`BundleStore`] is the async trait for saving a finished bundle.
//! [`LocalStore`] writes CSV tables and a JSON bundle into a directory.
//! [`S3Store`] uploads the JSON bundle to an S3 bucket.
//!
//! Stores are built by the caller and passed to whatever saves results; the
//! pipeline itself never touches storage.

mod local;
mod s3;

pub use local::LocalStore;
pub use s3::S3Store;

use anyhow::Result;

use crate::analyzers::types::AnalysisBundle;

/// Destination for a finished [`AnalysisBundle`].
#[async_trait::async_trait]
pub trait BundleStore: Send + Sync {
    async fn save(&self, bundle: &AnalysisBundle) -> Result<()>;
}
