//! Destructive reconciliation of the bucket, the admin API, and manifests.
//!
//! The steps run strictly in this order, each over the full set of flagged
//! segments before the next one starts:
//!
//! 1. delete the segment objects
//! 2. ask the admin API to resynchronize every touched partition once
//! 3. prune the matching entries from the manifests
//! 4. upload the manifests that changed
//!
//! Objects go first so that an interrupted run leaves manifests pointing at
//! missing objects, which a re-run repairs, and never objects that no
//! manifest references. Any failure stops the run where it is.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};

use crate::admin::AdminApi;
use crate::error::{KeeperError, Result};
use crate::index::SegmentRecord;
use crate::manifest::Manifest;

/// A manifest entry removed during pruning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedSegment {
    pub manifest_path: ObjectPath,
    pub segment_name: String,
}

/// A manifest that was (or, in dry-run mode, would have been) uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenManifest {
    pub path: ObjectPath,
    /// Serialized document as uploaded
    pub document: String,
}

/// What a reconciliation did. In dry-run mode it lists what would be done.
///
/// Entries are appended as each action succeeds, so after a failure the
/// report still holds everything that happened before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub dry_run: bool,
    pub deleted_objects: Vec<ObjectPath>,
    pub synced_partitions: Vec<(String, i32)>,
    pub pruned_segments: Vec<PrunedSegment>,
    pub rewritten_manifests: Vec<RewrittenManifest>,
    /// Set once all four steps ran
    pub complete: bool,
}

pub struct Reconciler<A> {
    object_store: Arc<dyn ObjectStore>,
    admin: A,
    dry_run: bool,
}

impl<A: AdminApi> Reconciler<A> {
    pub fn new(object_store: Arc<dyn ObjectStore>, admin: A, dry_run: bool) -> Self {
        Self {
            object_store,
            admin,
            dry_run,
        }
    }

    pub fn admin(&self) -> &A {
        &self.admin
    }

    /// Reconcile the records flagged for deletion. Unflagged records are
    /// ignored; with nothing flagged, nothing is touched.
    pub async fn reconcile(
        &self,
        records: &[SegmentRecord],
        manifests: &mut BTreeMap<ObjectPath, Manifest>,
    ) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        self.reconcile_into(records, manifests, &mut report).await?;
        Ok(report)
    }

    /// Same as [`Reconciler::reconcile`], filling a caller-owned report that
    /// stays readable when a step fails.
    pub async fn reconcile_into(
        &self,
        records: &[SegmentRecord],
        manifests: &mut BTreeMap<ObjectPath, Manifest>,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let flagged: Vec<&SegmentRecord> = records.iter().filter(|r| r.delete).collect();
        report.dry_run = self.dry_run;

        if flagged.is_empty() {
            tracing::info!("No segments flagged for deletion");
            report.complete = true;
            return Ok(());
        }

        tracing::info!(
            segments = flagged.len(),
            manifests = manifests.len(),
            dry_run = self.dry_run,
            "Starting reconciliation"
        );

        self.delete_objects(&flagged, report).await?;
        self.sync_partitions(&flagged, report).await?;
        report.pruned_segments = prune_manifests(&flagged, manifests);
        self.persist_manifests(manifests, report).await?;
        report.complete = true;

        tracing::info!(
            deleted = report.deleted_objects.len(),
            partitions = report.synced_partitions.len(),
            pruned = report.pruned_segments.len(),
            manifests = report.rewritten_manifests.len(),
            dry_run = self.dry_run,
            "Reconciliation complete"
        );

        Ok(())
    }

    async fn delete_objects(
        &self,
        flagged: &[&SegmentRecord],
        report: &mut ReconcileReport,
    ) -> Result<()> {
        for record in flagged {
            if self.dry_run {
                tracing::info!(
                    path = %record.object_path,
                    size_bytes = record.size_bytes,
                    "[DRY-RUN] Would delete segment object"
                );
            } else {
                self.object_store
                    .delete(&record.object_path)
                    .await
                    .map_err(|source| KeeperError::DeleteObject {
                        path: record.object_path.to_string(),
                        source,
                    })?;
                tracing::info!(
                    path = %record.object_path,
                    size_bytes = record.size_bytes,
                    "Deleted segment object"
                );
            }
            report.deleted_objects.push(record.object_path.clone());
        }

        Ok(())
    }

    async fn sync_partitions(
        &self,
        flagged: &[&SegmentRecord],
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let partitions: BTreeSet<(String, i32)> = flagged
            .iter()
            .map(|record| (record.topic.clone(), record.partition))
            .collect();

        for (topic, partition) in partitions {
            if self.dry_run {
                tracing::info!(
                    topic = %topic,
                    partition,
                    "[DRY-RUN] Would request local state synchronization"
                );
            } else {
                self.admin.sync_local_state(&topic, partition).await?;
                tracing::info!(topic = %topic, partition, "Requested local state synchronization");
            }
            report.synced_partitions.push((topic, partition));
        }

        Ok(())
    }

    async fn persist_manifests(
        &self,
        manifests: &BTreeMap<ObjectPath, Manifest>,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        for (path, manifest) in manifests.iter().filter(|(_, m)| m.needs_rewrite()) {
            let document = manifest
                .to_json()
                .map_err(|source| KeeperError::ManifestEncode {
                    path: path.to_string(),
                    source,
                })?;

            if self.dry_run {
                tracing::info!(path = %path, "[DRY-RUN] Would upload manifest");
            } else {
                self.object_store
                    .put(path, PutPayload::from(document.clone().into_bytes()))
                    .await
                    .map_err(|source| KeeperError::ManifestUpload {
                        path: path.to_string(),
                        source,
                    })?;
                tracing::info!(
                    path = %path,
                    segments = manifest.segments.len(),
                    "Uploaded manifest"
                );
            }

            report.rewritten_manifests.push(RewrittenManifest {
                path: path.clone(),
                document,
            });
        }

        Ok(())
    }
}

/// Remove from each record's own manifest the entry whose
/// `(base_offset, committed_offset)` pair equals the record's. Manifests do
/// not store object paths, so the offset range is the only identity
/// available inside a manifest.
pub fn prune_manifests(
    flagged: &[&SegmentRecord],
    manifests: &mut BTreeMap<ObjectPath, Manifest>,
) -> Vec<PrunedSegment> {
    let mut ranges: HashMap<&ObjectPath, HashSet<(u64, u64)>> = HashMap::new();
    for record in flagged {
        ranges
            .entry(&record.manifest_path)
            .or_default()
            .insert(record.offset_range());
    }

    let mut pruned = Vec::new();
    for (path, manifest) in manifests.iter_mut() {
        let Some(ranges) = ranges.get(path) else {
            continue;
        };
        let removed = manifest.prune(|segment| {
            ranges.contains(&(segment.base_offset, segment.committed_offset))
        });

        for segment_name in removed {
            tracing::info!(manifest = %path, segment = %segment_name, "Removing segment from manifest");
            pruned.push(PrunedSegment {
                manifest_path: path.clone(),
                segment_name,
            });
        }
    }

    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::join;
    use crate::layout::KeyLayout;
    use crate::retention::RetentionFilter;
    use crate::scanner::ManifestScanner;
    use crate::scanner::tests::orders_bucket;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream, StreamExt};
    use object_store::memory::InMemory;
    use object_store::{
        GetOptions, GetResult, ListResult, MultipartUpload, ObjectMeta, PutMultipartOpts,
        PutOptions, PutResult,
    };
    use std::fmt;
    use std::sync::Mutex;

    const ORDERS_MANIFEST_PATH: &str = "50000000/meta/kafka/orders/0_12/manifest.json";
    const SEGMENT_A: &str = "a1b2c3d4/kafka/orders/0_12/0-1-v1.log.1";
    const SEGMENT_B: &str = "e5f6a7b8/kafka/orders/0_12/101-1-v1.log.1";

    /// Records every call instead of talking to a broker
    #[derive(Default)]
    struct RecordingAdmin {
        calls: Mutex<Vec<(String, i32)>>,
        fail: bool,
    }

    impl RecordingAdmin {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<(String, i32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AdminApi for RecordingAdmin {
        async fn sync_local_state(&self, topic: &str, partition: i32) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((topic.to_string(), partition));
            if self.fail {
                return Err(KeeperError::AdminSync {
                    topic: topic.to_string(),
                    partition,
                    message: "connection refused".to_string(),
                });
            }
            Ok(())
        }
    }

    /// In-memory bucket whose selected operations always fail
    #[derive(Debug)]
    struct FailingStore {
        inner: InMemory,
        fail_delete: bool,
        fail_put: bool,
        fail_list: bool,
    }

    impl FailingStore {
        async fn orders() -> Self {
            let store = Self {
                inner: InMemory::new(),
                fail_delete: false,
                fail_put: false,
                fail_list: false,
            };
            let source = orders_bucket().await;
            let keys: Vec<ObjectPath> = source
                .list(None)
                .map(|meta| meta.unwrap().location)
                .collect()
                .await;
            for key in keys {
                let data = source.get(&key).await.unwrap().bytes().await.unwrap();
                store.inner.put(&key, PutPayload::from(data)).await.unwrap();
            }
            store
        }

        fn injected() -> object_store::Error {
            object_store::Error::Generic {
                store: "failing",
                source: "injected failure".into(),
            }
        }
    }

    impl fmt::Display for FailingStore {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "FailingStore({})", self.inner)
        }
    }

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn put_opts(
            &self,
            location: &ObjectPath,
            payload: PutPayload,
            opts: PutOptions,
        ) -> object_store::Result<PutResult> {
            if self.fail_put {
                return Err(Self::injected());
            }
            self.inner.put_opts(location, payload, opts).await
        }

        async fn put_multipart_opts(
            &self,
            location: &ObjectPath,
            opts: PutMultipartOpts,
        ) -> object_store::Result<Box<dyn MultipartUpload>> {
            if self.fail_put {
                return Err(Self::injected());
            }
            self.inner.put_multipart_opts(location, opts).await
        }

        async fn get_opts(
            &self,
            location: &ObjectPath,
            options: GetOptions,
        ) -> object_store::Result<GetResult> {
            self.inner.get_opts(location, options).await
        }

        async fn delete(&self, location: &ObjectPath) -> object_store::Result<()> {
            if self.fail_delete {
                return Err(Self::injected());
            }
            self.inner.delete(location).await
        }

        fn list(
            &self,
            prefix: Option<&ObjectPath>,
        ) -> BoxStream<'static, object_store::Result<ObjectMeta>> {
            if self.fail_list {
                return stream::once(async { Err(FailingStore::injected()) }).boxed();
            }
            self.inner.list(prefix)
        }

        async fn list_with_delimiter(
            &self,
            prefix: Option<&ObjectPath>,
        ) -> object_store::Result<ListResult> {
            if self.fail_list {
                return Err(Self::injected());
            }
            self.inner.list_with_delimiter(prefix).await
        }

        async fn copy(&self, from: &ObjectPath, to: &ObjectPath) -> object_store::Result<()> {
            self.inner.copy(from, to).await
        }

        async fn copy_if_not_exists(
            &self,
            from: &ObjectPath,
            to: &ObjectPath,
        ) -> object_store::Result<()> {
            self.inner.copy_if_not_exists(from, to).await
        }
    }

    async fn exists(store: &InMemory, key: &str) -> bool {
        store.head(&ObjectPath::from(key)).await.is_ok()
    }

    /// Scan the orders bucket and flag segments with the given filter.
    async fn prepare(
        store: Arc<dyn ObjectStore>,
        filter: RetentionFilter,
    ) -> (Vec<SegmentRecord>, BTreeMap<ObjectPath, Manifest>) {
        let scanner = ManifestScanner::new(store, KeyLayout::default());
        let scan = scanner.scan(Some("orders")).await.unwrap();
        let mut records = join(&scan);
        filter.apply(&mut records);
        (records, scan.manifests)
    }

    #[tokio::test]
    async fn test_live_run_deletes_syncs_and_rewrites() {
        let store = orders_bucket().await;
        let (records, mut manifests) =
            prepare(store.clone(), RetentionFilter::new(Some(600), None)).await;

        let reconciler = Reconciler::new(store.clone(), RecordingAdmin::default(), false);
        let report = reconciler.reconcile(&records, &mut manifests).await.unwrap();

        assert_eq!(report.deleted_objects, vec![ObjectPath::from(SEGMENT_A)]);
        assert!(!exists(&store, SEGMENT_A).await);
        assert!(exists(&store, SEGMENT_B).await);

        assert_eq!(reconciler.admin().calls(), vec![("orders".to_string(), 0)]);
        assert_eq!(report.synced_partitions, vec![("orders".to_string(), 0)]);

        assert_eq!(report.pruned_segments.len(), 1);
        assert_eq!(report.pruned_segments[0].segment_name, "0-1-v1.log");

        let data = store
            .get(&ObjectPath::from(ORDERS_MANIFEST_PATH))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        let uploaded = Manifest::from_json(&data).unwrap();
        let names: Vec<&String> = uploaded.segments.keys().collect();
        assert_eq!(names, vec!["101-1-v1.log"]);
        assert_eq!(report.rewritten_manifests[0].document.as_bytes(), &data[..]);
    }

    #[tokio::test]
    async fn test_dry_run_changes_nothing() {
        let store = orders_bucket().await;
        let (records, mut manifests) =
            prepare(store.clone(), RetentionFilter::new(Some(600), None)).await;
        let original = store
            .get(&ObjectPath::from(ORDERS_MANIFEST_PATH))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();

        let reconciler = Reconciler::new(store.clone(), RecordingAdmin::default(), true);
        let report = reconciler.reconcile(&records, &mut manifests).await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.deleted_objects, vec![ObjectPath::from(SEGMENT_A)]);
        assert!(exists(&store, SEGMENT_A).await);
        assert!(reconciler.admin().calls().is_empty());
        assert_eq!(report.synced_partitions, vec![("orders".to_string(), 0)]);

        // The would-be document is reported, the stored one is untouched
        assert_eq!(report.rewritten_manifests.len(), 1);
        assert!(!report.rewritten_manifests[0].document.contains("0-1-v1.log"));
        let stored = store
            .get(&ObjectPath::from(ORDERS_MANIFEST_PATH))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(stored, original);
    }

    #[tokio::test]
    async fn test_dry_run_reports_what_live_run_deletes() {
        let filter = RetentionFilter::new(Some(600), Some(301));

        let dry_store = orders_bucket().await;
        let (records, mut manifests) = prepare(dry_store.clone(), filter).await;
        let dry = Reconciler::new(dry_store, RecordingAdmin::default(), true)
            .reconcile(&records, &mut manifests)
            .await
            .unwrap();

        let live_store = orders_bucket().await;
        let (records, mut manifests) = prepare(live_store.clone(), filter).await;
        let live = Reconciler::new(live_store, RecordingAdmin::default(), false)
            .reconcile(&records, &mut manifests)
            .await
            .unwrap();

        assert_eq!(dry.deleted_objects, live.deleted_objects);
        assert_eq!(dry.deleted_objects.len(), 2);
        assert_eq!(dry.synced_partitions, live.synced_partitions);
        assert_eq!(dry.pruned_segments, live.pruned_segments);
    }

    #[tokio::test]
    async fn test_one_sync_per_partition() {
        let store = orders_bucket().await;
        let (records, mut manifests) =
            prepare(store.clone(), RetentionFilter::new(None, Some(1_000))).await;
        assert_eq!(records.iter().filter(|r| r.delete).count(), 2);

        let reconciler = Reconciler::new(store, RecordingAdmin::default(), false);
        reconciler.reconcile(&records, &mut manifests).await.unwrap();

        assert_eq!(reconciler.admin().calls(), vec![("orders".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_nothing_flagged_touches_nothing() {
        let store = orders_bucket().await;
        let (records, mut manifests) = prepare(store.clone(), RetentionFilter::default()).await;

        let reconciler = Reconciler::new(store.clone(), RecordingAdmin::default(), false);
        let report = reconciler.reconcile(&records, &mut manifests).await.unwrap();

        assert!(report.complete);
        assert!(report.deleted_objects.is_empty());
        assert!(report.synced_partitions.is_empty());
        assert!(report.rewritten_manifests.is_empty());
        assert!(exists(&store, SEGMENT_A).await);
        assert!(reconciler.admin().calls().is_empty());
        assert!(manifests.values().all(|m| !m.needs_rewrite()));
    }

    #[tokio::test]
    async fn test_admin_failure_stops_before_manifest_rewrite() {
        let store = orders_bucket().await;
        let (records, mut manifests) =
            prepare(store.clone(), RetentionFilter::new(Some(600), None)).await;

        let reconciler = Reconciler::new(store.clone(), RecordingAdmin::failing(), false);
        let err = reconciler
            .reconcile(&records, &mut manifests)
            .await
            .unwrap_err();

        assert!(matches!(err, KeeperError::AdminSync { .. }));
        // Step 1 already ran, steps 3 and 4 never did
        assert!(!exists(&store, SEGMENT_A).await);
        assert!(manifests.values().all(|m| !m.needs_rewrite()));
        let stored = store
            .get(&ObjectPath::from(ORDERS_MANIFEST_PATH))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        let stored = Manifest::from_json(&stored).unwrap();
        assert_eq!(stored.segments.len(), 2);
    }

    #[test]
    fn test_pruning_matches_exact_offset_pairs() {
        let mut manifests = BTreeMap::new();
        manifests.insert(
            ObjectPath::from(ORDERS_MANIFEST_PATH),
            Manifest::from_json(crate::manifest::tests::ORDERS_MANIFEST.as_bytes()).unwrap(),
        );

        // Same base offset, different committed offset: no match
        let near_miss = SegmentRecord {
            delete: true,
            object_path: ObjectPath::from(SEGMENT_A),
            manifest_path: ObjectPath::from(ORDERS_MANIFEST_PATH),
            partition: 0,
            topic: "orders".to_string(),
            segment_name: "0-1-v1.log".to_string(),
            size_bytes: 1024,
            base_offset: 0,
            committed_offset: 99,
            base_timestamp: 100,
            max_timestamp: 500,
        };
        let pruned = prune_manifests(&[&near_miss], &mut manifests);
        assert!(pruned.is_empty());

        let exact = SegmentRecord {
            committed_offset: 100,
            ..near_miss
        };
        let pruned = prune_manifests(&[&exact], &mut manifests);
        assert_eq!(pruned.len(), 1);

        let manifest = &manifests[&ObjectPath::from(ORDERS_MANIFEST_PATH)];
        assert!(manifest.needs_rewrite());
        assert!(manifest.segments.values().all(|s| (s.base_offset, s.committed_offset) != (0, 100)));
        assert_eq!(manifest.segments.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_stops_before_admin_and_manifests() {
        let store = Arc::new(FailingStore {
            fail_delete: true,
            ..FailingStore::orders().await
        });
        let (records, mut manifests) =
            prepare(store.clone(), RetentionFilter::new(Some(600), None)).await;

        let reconciler = Reconciler::new(store.clone(), RecordingAdmin::default(), false);
        let mut report = ReconcileReport::default();
        let err = reconciler
            .reconcile_into(&records, &mut manifests, &mut report)
            .await
            .unwrap_err();

        match err {
            KeeperError::DeleteObject { path, .. } => assert_eq!(path, SEGMENT_A),
            other => panic!("unexpected error: {other}"),
        }
        assert!(reconciler.admin().calls().is_empty());
        assert!(manifests.values().all(|m| !m.needs_rewrite()));
        assert!(report.deleted_objects.is_empty());
        assert!(!report.complete);
        assert!(exists(&store.inner, SEGMENT_A).await);
    }

    #[tokio::test]
    async fn test_manifest_upload_failure_is_reported() {
        let store = Arc::new(FailingStore {
            fail_put: true,
            ..FailingStore::orders().await
        });
        let (records, mut manifests) =
            prepare(store.clone(), RetentionFilter::new(Some(600), None)).await;

        let reconciler = Reconciler::new(store.clone(), RecordingAdmin::default(), false);
        let mut report = ReconcileReport::default();
        let err = reconciler
            .reconcile_into(&records, &mut manifests, &mut report)
            .await
            .unwrap_err();

        match err {
            KeeperError::ManifestUpload { path, .. } => assert_eq!(path, ORDERS_MANIFEST_PATH),
            other => panic!("unexpected error: {other}"),
        }
        // Everything up to the upload happened
        assert!(!exists(&store.inner, SEGMENT_A).await);
        assert_eq!(reconciler.admin().calls(), vec![("orders".to_string(), 0)]);
        assert_eq!(report.pruned_segments.len(), 1);
        assert!(report.rewritten_manifests.is_empty());
        assert!(!report.complete);
    }

    #[tokio::test]
    async fn test_listing_failure_is_reported() {
        let store = Arc::new(FailingStore {
            fail_list: true,
            ..FailingStore::orders().await
        });
        let scanner = ManifestScanner::new(store, KeyLayout::default());

        let err = scanner.scan(Some("orders")).await.unwrap_err();

        assert!(matches!(err, KeeperError::Listing(_)));
    }

    #[tokio::test]
    async fn test_report_keeps_deletions_when_admin_fails() {
        let store = orders_bucket().await;
        let (records, mut manifests) =
            prepare(store.clone(), RetentionFilter::new(Some(600), None)).await;

        let reconciler = Reconciler::new(store.clone(), RecordingAdmin::failing(), false);
        let mut report = ReconcileReport::default();
        let result = reconciler
            .reconcile_into(&records, &mut manifests, &mut report)
            .await;

        assert!(matches!(result, Err(KeeperError::AdminSync { .. })));
        assert_eq!(report.deleted_objects, vec![ObjectPath::from(SEGMENT_A)]);
        assert!(report.synced_partitions.is_empty());
        assert!(report.pruned_segments.is_empty());
        assert!(!report.complete);
    }

    #[test]
    fn test_pruning_is_scoped_to_the_owning_manifest() {
        let other_path = ObjectPath::from("60000000/meta/kafka/orders/1_12/manifest.json");
        let mut manifests = BTreeMap::new();
        let orders = Manifest::from_json(crate::manifest::tests::ORDERS_MANIFEST.as_bytes()).unwrap();
        manifests.insert(ObjectPath::from(ORDERS_MANIFEST_PATH), orders.clone());
        manifests.insert(other_path.clone(), orders);

        // Flagged from partition 0 only; partition 1 has the same offset pair
        let record = SegmentRecord {
            delete: true,
            object_path: ObjectPath::from(SEGMENT_A),
            manifest_path: ObjectPath::from(ORDERS_MANIFEST_PATH),
            partition: 0,
            topic: "orders".to_string(),
            segment_name: "0-1-v1.log".to_string(),
            size_bytes: 1024,
            base_offset: 0,
            committed_offset: 100,
            base_timestamp: 100,
            max_timestamp: 500,
        };
        let pruned = prune_manifests(&[&record], &mut manifests);

        assert_eq!(
            pruned,
            vec![PrunedSegment {
                manifest_path: ObjectPath::from(ORDERS_MANIFEST_PATH),
                segment_name: "0-1-v1.log".to_string(),
            }]
        );
        assert!(!manifests[&other_path].needs_rewrite());
        assert_eq!(manifests[&other_path].segments.len(), 2);
    }
}
