use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml, Yaml},
};

/// Config file names searched in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["rpksi.toml", "rpksi.yaml"];

/// Environment variable prefix, nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "RPKSI__";

/// Keys written by older releases of the tool, mapped to their current names.
const LEGACY_KEYS: [(&str, &str); 3] = [
    ("accessKey", "access_key"),
    ("secretKey", "secret_key"),
    ("useSSL", "use_ssl"),
];

/// Shape of the object keys written by the shadow indexing archiver.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Third key component that marks metadata objects
    pub namespace: String,
    /// Filename identifying a partition manifest
    pub manifest_file: String,
    /// Literal suffix stripped from segment object filenames
    pub segment_suffix: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            namespace: "kafka".to_string(),
            manifest_file: "manifest.json".to_string(),
            segment_suffix: ".1".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    /// Kafka API endpoint (informational, shown by get-config)
    pub kafka: String,
    /// Admin API endpoint, `host:port` or a full URL
    pub admin: String,
    /// S3-compatible endpoint, `host:port` or a full URL
    pub s3: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Use https for both the object store and the admin API
    pub use_ssl: bool,
    pub layout: LayoutConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            kafka: "localhost:9092".to_string(),
            admin: "localhost:9644".to_string(),
            s3: "localhost:9000".to_string(),
            region: "local".to_string(),
            bucket: "redpanda".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            use_ssl: false,
            layout: LayoutConfig::default(),
        }
    }
}

/// Values passed on the command line. Only the fields that are set take
/// precedence over files and environment.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kafka: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ssl: Option<bool>,
}

impl Configuration {
    /// Build the layered figment: defaults, config file(s), environment.
    pub fn figment(config_path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Configuration::default()));

        match config_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Configuration file not found: {}", path.display());
                }
                log::info!("Loading configuration from: {}", path.display());
                figment = match path.extension().and_then(|ext| ext.to_str()) {
                    Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                    _ => figment.merge(Toml::file(path)),
                };
            }
            None => {
                figment = figment
                    .merge(Toml::file(DEFAULT_CONFIG_FILES[0]))
                    .merge(Yaml::file(DEFAULT_CONFIG_FILES[1]));
            }
        }

        let figment = rename_legacy_keys(figment);
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load the configuration, applying command line overrides last.
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let config = Self::figment(config_path)?
            .merge(Serialized::defaults(overrides))
            .extract::<Configuration>()
            .context("Failed to extract configuration")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            anyhow::bail!("Bucket name cannot be empty");
        }

        if self.s3.is_empty() {
            anyhow::bail!("S3 endpoint cannot be empty");
        }

        if self.admin.is_empty() {
            anyhow::bail!("Admin endpoint cannot be empty");
        }

        if self.layout.namespace.is_empty() || self.layout.manifest_file.is_empty() {
            anyhow::bail!("Layout namespace and manifest_file cannot be empty");
        }

        Ok(())
    }

    fn scheme(&self) -> &'static str {
        if self.use_ssl { "https" } else { "http" }
    }

    /// Admin API base URL without a trailing slash.
    pub fn admin_url(&self) -> String {
        with_scheme(&self.admin, self.scheme())
    }

    /// Object store endpoint URL without a trailing slash.
    pub fn s3_url(&self) -> String {
        with_scheme(&self.s3, self.scheme())
    }

    /// Flattened `(parameter, value)` pairs sorted by parameter, secret masked.
    pub fn parameters(&self) -> Vec<(String, String)> {
        let secret = if self.secret_key.is_empty() {
            String::new()
        } else {
            "********".to_string()
        };

        let mut params = vec![
            ("access_key".to_string(), self.access_key.clone()),
            ("admin".to_string(), self.admin.clone()),
            ("bucket".to_string(), self.bucket.clone()),
            ("kafka".to_string(), self.kafka.clone()),
            ("layout.manifest_file".to_string(), self.layout.manifest_file.clone()),
            ("layout.namespace".to_string(), self.layout.namespace.clone()),
            ("layout.segment_suffix".to_string(), self.layout.segment_suffix.clone()),
            ("region".to_string(), self.region.clone()),
            ("s3".to_string(), self.s3.clone()),
            ("secret_key".to_string(), secret),
            ("use_ssl".to_string(), self.use_ssl.to_string()),
        ];
        params.sort();
        params
    }
}

fn with_scheme(endpoint: &str, scheme: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("{scheme}://{endpoint}")
    }
}

fn rename_legacy_keys(figment: Figment) -> Figment {
    LEGACY_KEYS
        .iter()
        .fold(figment, |figment, (legacy, current)| {
            match figment.find_value(legacy) {
                Ok(value) => {
                    log::debug!("Config key '{legacy}' is deprecated, use '{current}'");
                    figment.merge(Serialized::default(current, value))
                }
                Err(_) => figment,
            }
        })
}
