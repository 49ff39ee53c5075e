use anyhow::{Context, Result};
use object_store::{ObjectStore, aws::AmazonS3Builder};
use std::sync::Arc;
use url::Url;

use crate::config::Configuration;

/// Create the object store holding the shadow indexing bucket
pub fn create_object_store(config: &Configuration) -> Result<Arc<dyn ObjectStore>> {
    let builder = create_s3_builder(config)?;
    let store = builder
        .build()
        .with_context(|| format!("Failed to build S3 client for bucket '{}'", config.bucket))?;
    Ok(Arc::new(store))
}

/// Create an S3 builder for an S3-compatible endpoint (MinIO, AWS, ...)
pub fn create_s3_builder(config: &Configuration) -> Result<AmazonS3Builder> {
    if config.bucket.is_empty() {
        anyhow::bail!("S3 configuration must specify a bucket");
    }

    let endpoint = config.s3_url();
    let url = Url::parse(&endpoint)
        .map_err(|e| anyhow::anyhow!("Invalid S3 endpoint '{}': {}", endpoint, e))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => anyhow::bail!("Unsupported S3 endpoint scheme: {scheme}. Supported: http, https"),
    }

    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_endpoint(&endpoint)
        .with_allow_http(url.scheme() == "http")
        // MinIO requires path-style URLs
        .with_virtual_hosted_style_request(false);

    if !config.access_key.is_empty() {
        builder = builder
            .with_access_key_id(&config.access_key)
            .with_secret_access_key(&config.secret_key);
    } else {
        if let Ok(env_key) = std::env::var("AWS_ACCESS_KEY_ID") {
            builder = builder.with_access_key_id(env_key);
        }
        if let Ok(env_secret) = std::env::var("AWS_SECRET_ACCESS_KEY") {
            builder = builder.with_secret_access_key(env_secret);
        }
    }

    Ok(builder)
}
