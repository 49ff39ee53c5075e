//! Operator retention rules.
//!
//! A segment is eligible for deletion when it is older than the `older-than`
//! cutoff or lies entirely below the `offset` ceiling. Either rule is enough,
//! so combining both flags selects the union.

use crate::index::SegmentRecord;
use crate::manifest::Segment;

/// Offset value used on the command line to leave the ceiling unset.
pub const OFFSET_UNSET: i64 = -1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionFilter {
    /// Segments whose `max_timestamp` is strictly below this are eligible
    pub older_than: Option<u64>,
    /// Segments whose `committed_offset` is strictly below this are eligible
    pub offset: Option<u64>,
}

impl RetentionFilter {
    pub fn new(older_than: Option<u64>, offset: Option<u64>) -> Self {
        Self { older_than, offset }
    }

    /// Build from command line values, where a negative offset means unset.
    pub fn from_flags(older_than: Option<u64>, offset: i64) -> Self {
        Self {
            older_than,
            offset: u64::try_from(offset).ok(),
        }
    }

    /// True when at least one rule was supplied.
    pub fn is_active(&self) -> bool {
        self.older_than.is_some() || self.offset.is_some()
    }

    pub fn is_eligible(&self, max_timestamp: u64, committed_offset: u64) -> bool {
        let too_old = self.older_than.is_some_and(|cutoff| cutoff > max_timestamp);
        let below_ceiling = self.offset.is_some_and(|ceiling| ceiling > committed_offset);
        too_old || below_ceiling
    }

    /// Whether a manifest entry shows up in filtered views. Without any rule
    /// every segment does.
    pub fn admits(&self, segment: &Segment) -> bool {
        !self.is_active() || self.is_eligible(segment.max_timestamp, segment.committed_offset)
    }

    /// Set the deletion flag on eligible records and return how many were
    /// marked. Records are never unmarked.
    pub fn apply(&self, records: &mut [SegmentRecord]) -> usize {
        let mut marked = 0;
        for record in records.iter_mut() {
            if self.is_eligible(record.max_timestamp, record.committed_offset) {
                record.delete = true;
                marked += 1;
            }
        }

        tracing::debug!(
            older_than = ?self.older_than,
            offset = ?self.offset,
            evaluated = records.len(),
            marked,
            "Applied retention filter"
        );

        marked
    }
}
