//! Per-handle summaries of a dataset.

use chrono::NaiveDate;

use leaderpulse_core::PostRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleStats {
    pub count: usize,
    pub newest_id: u64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Count, newest id and date range of `handle`'s posts, or `None` if it has
/// none. `newest_id` is the refresh cursor. Handles compare case-insensitively.
#[must_use]
pub fn handle_stats(records: &[PostRecord], handle: &str) -> Option<HandleStats> {
    records
        .iter()
        .filter(|p| p.handle.eq_ignore_ascii_case(handle))
        .fold(None, |acc: Option<HandleStats>, p| {
            Some(match acc {
                None => HandleStats {
                    count: 1,
                    newest_id: p.id,
                    first_date: p.date,
                    last_date: p.date,
                },
                Some(s) => HandleStats {
                    count: s.count + 1,
                    newest_id: s.newest_id.max(p.id),
                    first_date: s.first_date.min(p.date),
                    last_date: s.last_date.max(p.date),
                },
            })
        })
}
