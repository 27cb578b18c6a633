use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::BundleStore;
use crate::analyzers::types::AnalysisBundle;
use crate::output::write_bundle_tables;

/// Writes one CSV per table plus `bundle.json` into a directory.
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait::async_trait]
impl BundleStore for LocalStore {
    async fn save(&self, bundle: &AnalysisBundle) -> Result<()> {
        let written = write_bundle_tables(&self.dir, bundle)
            .with_context(|| format!("writing tables to '{}'", self.dir.display()))?;

        let json_path = self.dir.join("bundle.json");
        fs::write(&json_path, serde_json::to_vec_pretty(bundle)?)
            .with_context(|| format!("writing '{}'", json_path.display()))?;

        info!(dir = %self.dir.display(), files = written.len() + 1, "Bundle saved locally");
        Ok(())
    }
}
