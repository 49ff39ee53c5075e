//! Joined view of segment objects and manifest entries, plus per-topic totals.

use std::collections::BTreeMap;

use common::bytesize::byte_count_binary;
use object_store::path::Path as ObjectPath;

use crate::layout::JoinKey;
use crate::retention::RetentionFilter;
use crate::scanner::ScanResult;

/// A manifest entry that has a matching object in the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRecord {
    /// Set by the retention filter
    pub delete: bool,
    pub object_path: ObjectPath,
    /// Manifest listing this segment
    pub manifest_path: ObjectPath,
    pub partition: i32,
    pub topic: String,
    pub segment_name: String,
    pub size_bytes: u64,
    pub base_offset: u64,
    pub committed_offset: u64,
    pub base_timestamp: u64,
    pub max_timestamp: u64,
}

impl SegmentRecord {
    /// Offset range `(base_offset, committed_offset)`, the identity used to
    /// find the entry in its manifest.
    pub fn offset_range(&self) -> (u64, u64) {
        (self.base_offset, self.committed_offset)
    }
}

/// Per-topic aggregate over the manifest entries admitted by the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSummary {
    pub topic: String,
    pub size_bytes: u64,
    pub segment_count: usize,
    /// Lowest base offset among admitted entries, `None` when there are none
    pub min_base_offset: Option<u64>,
    /// Highest `last_offset` over the topic's partition manifests
    pub last_offset: u64,
}

impl TopicSummary {
    pub fn size(&self) -> String {
        byte_count_binary(self.size_bytes)
    }
}

/// Join every manifest entry with its segment object.
///
/// An entry only matches an object with the same join key that lives in the
/// manifest's own `<partition>_<revision>` directory. Entries without an
/// object, and objects without an entry, are left out. Output is ordered by
/// topic, partition, and base offset.
pub fn join(scan: &ScanResult) -> Vec<SegmentRecord> {
    let mut records = Vec::new();
    let mut unmatched = 0usize;

    for (manifest_path, manifest) in &scan.manifests {
        let partition_dir = manifest.partition_dir();

        for (name, segment) in &manifest.segments {
            let key = JoinKey::new(&manifest.topic, name);
            let object = scan
                .segment_objects
                .get(&key)
                .and_then(|objects| objects.iter().find(|o| o.partition_dir == partition_dir));
            let Some(object) = object else {
                tracing::debug!(
                    key = %key,
                    partition_dir = %partition_dir,
                    "Manifest entry has no segment object"
                );
                unmatched += 1;
                continue;
            };

            records.push(SegmentRecord {
                delete: false,
                object_path: object.path.clone(),
                manifest_path: manifest_path.clone(),
                partition: manifest.partition,
                topic: manifest.topic.clone(),
                segment_name: name.clone(),
                size_bytes: segment.size_bytes,
                base_offset: segment.base_offset,
                committed_offset: segment.committed_offset,
                base_timestamp: segment.base_timestamp,
                max_timestamp: segment.max_timestamp,
            });
        }
    }

    records.sort_by(|a, b| {
        (&a.topic, a.partition, a.base_offset, &a.segment_name).cmp(&(
            &b.topic,
            b.partition,
            b.base_offset,
            &b.segment_name,
        ))
    });

    if unmatched > 0 {
        tracing::info!(
            unmatched,
            joined = records.len(),
            "Some manifest entries have no matching segment object"
        );
    }

    records
}

/// Aggregate each topic's partition manifests, counting only entries the
/// filter admits. Ordered by topic name.
pub fn summarize(scan: &ScanResult, filter: &RetentionFilter) -> Vec<TopicSummary> {
    let mut topics: BTreeMap<&str, TopicSummary> = BTreeMap::new();

    for manifest in scan.manifests.values() {
        let summary = topics
            .entry(manifest.topic.as_str())
            .or_insert_with(|| TopicSummary {
                topic: manifest.topic.clone(),
                size_bytes: 0,
                segment_count: 0,
                min_base_offset: None,
                last_offset: 0,
            });

        summary.last_offset = summary.last_offset.max(manifest.last_offset);

        for segment in manifest.segments.values().filter(|s| filter.admits(s)) {
            summary.size_bytes += segment.size_bytes;
            summary.segment_count += 1;
            summary.min_base_offset = Some(
                summary
                    .min_base_offset
                    .map_or(segment.base_offset, |min| min.min(segment.base_offset)),
            );
        }
    }

    topics.into_values().collect()
}
