//! Inspection and pruning of shadow indexing data in an S3 bucket.
//!
//! A run is a pipeline: [`ManifestScanner::scan`] lists the bucket once,
//! [`join`] pairs manifest entries with segment objects, a
//! [`RetentionFilter`] flags what to remove and a [`Reconciler`] removes it.

pub mod admin;
pub mod error;
pub mod index;
pub mod layout;
pub mod manifest;
pub mod reconcile;
pub mod retention;
pub mod scanner;

pub use admin::{AdminApi, AdminClient};
pub use error::{KeeperError, Result};
pub use index::{SegmentRecord, TopicSummary, join, summarize};
pub use layout::{JoinKey, KeyLayout, ObjectKind};
pub use manifest::{Manifest, ManifestDocument, Segment};
pub use reconcile::{ReconcileReport, Reconciler};
pub use retention::{OFFSET_UNSET, RetentionFilter};
pub use scanner::{ManifestScanner, ScanResult, SegmentObject};
