//! Object key layout of the shadow indexing archiver.
//!
//! Keys are fixed-depth, `/`-separated paths:
//!
//! ```text
//! segment data: <hash>/<ns>/<topic>/<partition>_<revision>/<segment-name><suffix>
//! manifest:     <hash>/meta/<namespace>/<topic>/<partition>_<revision>/manifest.json
//! ```
//!
//! The third component tells the two apart: it equals the namespace marker
//! for metadata objects and the topic name for segment data. All positional
//! parsing of keys lives in [`KeyLayout::classify`].

use std::fmt;

use common::config::LayoutConfig;

/// Component that holds the namespace marker (metadata) or the topic (data)
const MARKER_INDEX: usize = 2;

const SEGMENT_DEPTH: usize = 5;
const SEGMENT_PARTITION_INDEX: usize = 3;
const SEGMENT_FILE_INDEX: usize = 4;

const MANIFEST_DEPTH: usize = 6;
const MANIFEST_TOPIC_INDEX: usize = 3;
const MANIFEST_PARTITION_INDEX: usize = 4;
const MANIFEST_FILE_INDEX: usize = 5;

/// Classification of a single object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind<'a> {
    /// Segment data uploaded by the archiver
    Segment {
        topic: &'a str,
        /// `<partition>_<revision>` directory holding the object
        partition_dir: &'a str,
        /// Filename with the archiver suffix removed, as used in manifests
        segment_name: &'a str,
    },
    /// Partition manifest document
    Manifest {
        topic: &'a str,
        /// `<partition>_<revision>` directory owning the manifest
        partition_dir: &'a str,
    },
    /// Anything else: topic manifests, foreign objects, short keys
    Ignored,
}

/// `topic:segment-name`, correlates a segment object with its manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinKey(String);

impl JoinKey {
    pub fn new(topic: &str, segment_name: &str) -> Self {
        Self(format!("{topic}:{segment_name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyLayout {
    config: LayoutConfig,
}

impl KeyLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Classify an object key. Every key maps to exactly one kind.
    pub fn classify<'a>(&self, key: &'a str) -> ObjectKind<'a> {
        let parts: Vec<&str> = key.split('/').collect();

        let Some(marker) = parts.get(MARKER_INDEX) else {
            return ObjectKind::Ignored;
        };

        if *marker == self.config.namespace {
            if parts.len() == MANIFEST_DEPTH && parts[MANIFEST_FILE_INDEX] == self.config.manifest_file
            {
                return ObjectKind::Manifest {
                    topic: parts[MANIFEST_TOPIC_INDEX],
                    partition_dir: parts[MANIFEST_PARTITION_INDEX],
                };
            }
            return ObjectKind::Ignored;
        }

        if parts.len() != SEGMENT_DEPTH || marker.is_empty() {
            return ObjectKind::Ignored;
        }

        let filename = parts[SEGMENT_FILE_INDEX];
        let segment_name = filename
            .strip_suffix(self.config.segment_suffix.as_str())
            .unwrap_or(filename);
        if segment_name.is_empty() {
            return ObjectKind::Ignored;
        }

        ObjectKind::Segment {
            topic: marker,
            partition_dir: parts[SEGMENT_PARTITION_INDEX],
            segment_name,
        }
    }
}
