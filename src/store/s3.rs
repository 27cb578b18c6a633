use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::io::Write;
use tracing::info;

use super::BundleStore;
use crate::analyzers::types::{AnalysisBundle, ClusterSummary, CoverageSummary, DistrictLeader};

/// Uploads bundles as JSON objects to S3.
///
/// Writes `<prefix>/bundle.json` and `<prefix>/summary.json`, each with a
/// `.gz` suffix when gzip is enabled.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
    gzip: bool,
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    coverage: &'a CoverageSummary,
    clusters: &'a ClusterSummary,
    leaders: &'a [DistrictLeader],
}

impl S3Store {
    /// Creates a store using the ambient AWS configuration already loaded by
    /// `aws_config::load_from_env`.
    pub fn new(config: &aws_config::SdkConfig, bucket: impl Into<String>, gzip: bool) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
            bucket: bucket.into(),
            prefix: "aggregates".to_string(),
            gzip,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    fn object_key(&self, name: &str) -> String {
        let suffix = if self.gzip { ".gz" } else { "" };
        if self.prefix.is_empty() {
            format!("{name}.json{suffix}")
        } else {
            format!("{}/{name}.json{suffix}", self.prefix)
        }
    }

    /// Serializes a value to JSON and uploads it with `application/json` content type.
    async fn put_json(&self, name: &str, value: &impl Serialize) -> Result<()> {
        let key = self.object_key(name);
        let body = encode_body(&serde_json::to_vec(value)?, self.gzip)?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body.into())
            .content_type("application/json");
        if self.gzip {
            request = request.content_encoding("gzip");
        }

        request
            .send()
            .await
            .with_context(|| format!("S3 PutObject failed for '{key}'"))?;

        info!(bucket = %self.bucket, key = %key, "Uploaded to S3");
        Ok(())
    }
}

fn encode_body(json: &[u8], gzip: bool) -> Result<Vec<u8>> {
    if !gzip {
        return Ok(json.to_vec());
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json)?;
    Ok(encoder.finish()?)
}

#[async_trait::async_trait]
impl BundleStore for S3Store {
    async fn save(&self, bundle: &AnalysisBundle) -> Result<()> {
        self.put_json("bundle", bundle).await?;

        let summary = SummaryDocument {
            coverage: &bundle.coverage_summary,
            clusters: &bundle.cluster_summary,
            leaders: &bundle.district_leader,
        };
        self.put_json("summary", &summary).await?;

        Ok(())
    }
}
