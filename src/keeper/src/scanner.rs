//! Single pass over the bucket that collects segment objects and manifests.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::StreamExt;
use object_store::ObjectStore;
use object_store::path::Path as ObjectPath;

use crate::error::{KeeperError, Result};
use crate::layout::{JoinKey, KeyLayout, ObjectKind};
use crate::manifest::Manifest;

/// A segment data object found in the bucket, before it is joined with its
/// manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentObject {
    pub path: ObjectPath,
    /// `<partition>_<revision>` directory the object was found in
    pub partition_dir: String,
}

/// Everything one scan of the bucket produced.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Segment names repeat across partitions of a topic, so one join key
    /// can own several objects, at most one per partition directory.
    pub segment_objects: BTreeMap<JoinKey, Vec<SegmentObject>>,
    /// Manifests keyed by their object path, already filtered by topic
    pub manifests: BTreeMap<ObjectPath, Manifest>,
}

pub struct ManifestScanner {
    object_store: Arc<dyn ObjectStore>,
    layout: KeyLayout,
}

impl ManifestScanner {
    pub fn new(object_store: Arc<dyn ObjectStore>, layout: KeyLayout) -> Self {
        Self {
            object_store,
            layout,
        }
    }

    /// List the whole bucket once, recursively.
    ///
    /// Any listing, read, or parse error aborts the scan. Manifests whose
    /// topic differs from `topic_filter` are dropped after parsing.
    pub async fn scan(&self, topic_filter: Option<&str>) -> Result<ScanResult> {
        let mut result = ScanResult::default();
        let mut listed = 0usize;
        let mut ignored = 0usize;
        let mut filtered = 0usize;

        let mut listing = self.object_store.list(None);
        while let Some(entry) = listing.next().await {
            let meta = entry.map_err(KeeperError::Listing)?;
            listed += 1;

            match self.layout.classify(meta.location.as_ref()) {
                ObjectKind::Segment {
                    topic,
                    partition_dir,
                    segment_name,
                } => {
                    let key = JoinKey::new(topic, segment_name);
                    let object = SegmentObject {
                        path: meta.location.clone(),
                        partition_dir: partition_dir.to_string(),
                    };
                    let objects = result.segment_objects.entry(key.clone()).or_default();
                    match objects.iter().position(|o| o.partition_dir == partition_dir) {
                        Some(index) => {
                            tracing::warn!(
                                key = %key,
                                partition_dir,
                                previous = %objects[index].path,
                                current = %meta.location,
                                "Duplicate segment object in partition, keeping the last one"
                            );
                            objects[index] = object;
                        }
                        None => objects.push(object),
                    }
                }
                ObjectKind::Manifest { partition_dir, .. } => {
                    let manifest = self.read_manifest(&meta.location).await?;

                    if let Some(topic) = topic_filter {
                        if manifest.topic != topic {
                            filtered += 1;
                            continue;
                        }
                    }

                    tracing::debug!(
                        path = %meta.location,
                        topic = %manifest.topic,
                        partition = manifest.partition,
                        partition_dir,
                        segments = manifest.segments.len(),
                        "Loaded partition manifest"
                    );
                    result.manifests.insert(meta.location.clone(), manifest);
                }
                ObjectKind::Ignored => {
                    tracing::trace!(path = %meta.location, "Ignoring object");
                    ignored += 1;
                }
            }
        }

        tracing::info!(
            objects = listed,
            segment_objects = result.segment_objects.len(),
            manifests = result.manifests.len(),
            filtered_manifests = filtered,
            ignored,
            "Scanned bucket"
        );

        Ok(result)
    }

    async fn read_manifest(&self, path: &ObjectPath) -> Result<Manifest> {
        let fetch_error = |source| KeeperError::ManifestFetch {
            path: path.to_string(),
            source,
        };

        let data = self
            .object_store
            .get(path)
            .await
            .map_err(fetch_error)?
            .bytes()
            .await
            .map_err(fetch_error)?;

        Manifest::from_json(&data).map_err(|source| KeeperError::ManifestParse {
            path: path.to_string(),
            source,
        })
    }
}
