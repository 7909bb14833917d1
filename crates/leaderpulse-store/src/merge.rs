//! Union of the stored dataset with a freshly collected batch.

use std::collections::{BTreeMap, HashSet};

use leaderpulse_core::PostRecord;

/// A merge adding fewer genuinely new posts than this is not written back.
pub const MIN_NEW_RECORDS_TO_PERSIST: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Union of both inputs, one record per id, newest id first.
    pub records: Vec<PostRecord>,
    /// Rows in the existing dataset before the merge.
    pub previous_count: usize,
    /// Incoming ids that were not in the existing dataset.
    pub new_count: usize,
    /// Incoming ids that replaced an existing record.
    pub replaced_count: usize,
}

impl MergeOutcome {
    /// Whether the merged dataset is worth rewriting to disk.
    #[must_use]
    pub fn should_persist(&self) -> bool {
        self.new_count >= MIN_NEW_RECORDS_TO_PERSIST
    }
}

/// Merge `incoming` into `existing`.
///
/// On an id present in both, the incoming record wins. Duplicate ids inside
/// either input collapse to the last occurrence.
#[must_use]
pub fn merge(existing: Vec<PostRecord>, incoming: Vec<PostRecord>) -> MergeOutcome {
    let previous_count = existing.len();
    let mut by_id: BTreeMap<u64, PostRecord> = existing.into_iter().map(|p| (p.id, p)).collect();

    let mut new_ids = HashSet::new();
    let mut replaced_ids = HashSet::new();
    for post in incoming {
        let id = post.id;
        if by_id.insert(id, post).is_some() {
            if !new_ids.contains(&id) {
                replaced_ids.insert(id);
            }
        } else {
            new_ids.insert(id);
        }
    }

    let records: Vec<PostRecord> = by_id.into_values().rev().collect();
    tracing::debug!(
        previous = previous_count,
        merged = records.len(),
        new = new_ids.len(),
        replaced = replaced_ids.len(),
        "merged dataset"
    );

    MergeOutcome {
        records,
        previous_count,
        new_count: new_ids.len(),
        replaced_count: replaced_ids.len(),
    }
}
