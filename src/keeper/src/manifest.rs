//! Partition manifest model.
//!
//! [`ManifestDocument`] is the JSON wire format stored next to the segment
//! data. [`Manifest`] is the in-memory entity used by the pipeline; it adds
//! the transient rewrite flag, which only exists between pruning and
//! persistence and is never part of the document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One remote segment as described by a partition manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub is_compacted: bool,
    pub size_bytes: u64,
    pub committed_offset: u64,
    pub base_offset: u64,
    pub base_timestamp: u64,
    pub max_timestamp: u64,
    pub delta_offset: u64,
    pub archiver_term: i64,
    /// Fields added by newer archiver versions, written back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire format of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestDocument {
    pub version: i32,
    pub namespace: String,
    pub topic: String,
    pub partition: i32,
    pub revision: i64,
    pub last_offset: u64,
    #[serde(default)]
    pub segments: BTreeMap<String, Segment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A parsed partition manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub version: i32,
    pub namespace: String,
    pub topic: String,
    pub partition: i32,
    pub revision: i64,
    pub last_offset: u64,
    /// Segment filename to segment; filenames are unique within a manifest
    pub segments: BTreeMap<String, Segment>,
    extra: Map<String, Value>,
    needs_rewrite: bool,
}

impl Manifest {
    pub fn from_json(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice::<ManifestDocument>(data).map(Self::from)
    }

    /// Serialize the wire document. The rewrite flag is not part of it.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_document())
    }

    pub fn to_document(&self) -> ManifestDocument {
        ManifestDocument {
            version: self.version,
            namespace: self.namespace.clone(),
            topic: self.topic.clone(),
            partition: self.partition,
            revision: self.revision,
            last_offset: self.last_offset,
            segments: self.segments.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Drop every segment whose offset range matches `predicate`, marking the
    /// manifest for rewrite when anything was removed. Returns the names of
    /// the removed segments.
    pub fn prune<F>(&mut self, mut predicate: F) -> Vec<String>
    where
        F: FnMut(&Segment) -> bool,
    {
        let pruned: Vec<String> = self
            .segments
            .iter()
            .filter(|(_, segment)| predicate(segment))
            .map(|(name, _)| name.clone())
            .collect();

        for name in &pruned {
            self.segments.remove(name);
        }
        if !pruned.is_empty() {
            self.needs_rewrite = true;
        }

        pruned
    }

    pub fn needs_rewrite(&self) -> bool {
        self.needs_rewrite
    }

    /// `<partition>_<revision>`, the key directory holding this partition's
    /// segment objects.
    pub fn partition_dir(&self) -> String {
        format!("{}_{}", self.partition, self.revision)
    }
}

impl From<ManifestDocument> for Manifest {
    fn from(doc: ManifestDocument) -> Self {
        Self {
            version: doc.version,
            namespace: doc.namespace,
            topic: doc.topic,
            partition: doc.partition,
            revision: doc.revision,
            last_offset: doc.last_offset,
            segments: doc.segments,
            extra: doc.extra,
            needs_rewrite: false,
        }
    }
}
