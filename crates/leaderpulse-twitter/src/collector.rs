//! Id-cursor pagination over a user timeline.
//!
//! Two strategies share the same page handling:
//!
//! - **Backfill** walks backwards from the newest post, moving the cursor to
//!   `min(id) - 1` after every page, until a page is empty or any of the
//!   plan's stop conditions holds: the iteration cap is hit, or the oldest
//!   post on a page is on or before a floor date.
//! - **Refresh** fetches only posts newer than the newest id already stored
//!   (`since_id`) and stops as soon as a page yields fewer than
//!   [`REFRESH_MIN_NEW_POSTS`] new posts.
//!
//! Errors never escape a collection run. A failed request or a page with an
//! unparseable post ends pagination for that handle and the posts gathered
//! so far are returned with [`StopReason::Failed`].

use std::collections::HashSet;
use std::future::Future;

use chrono::NaiveDate;

use leaderpulse_core::PostRecord;

use crate::error::TwitterError;
use crate::types::{RawTweet, TimelineQuery};

/// A refresh page adding fewer new posts than this ends the refresh.
pub const REFRESH_MIN_NEW_POSTS: usize = 3;

/// Hard ceiling on requests per handle, whatever the stop condition.
pub const MAX_PAGES: usize = 1000;

/// Anything that can serve one page of a user timeline.
pub trait TimelineSource {
    fn user_timeline(
        &self,
        query: &TimelineQuery,
    ) -> impl Future<Output = Result<Vec<RawTweet>, TwitterError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// Stop after this many pages.
    MaxIterations(usize),
    /// Stop once the oldest post of a page is on or before this date.
    FloorDate(NaiveDate),
}

impl StopCondition {
    /// Checked after `pages` pages, the last of which reached back to `oldest`.
    fn reached(self, pages: usize, oldest: NaiveDate) -> Option<StopReason> {
        match self {
            Self::MaxIterations(limit) if pages >= limit => Some(StopReason::IterationLimit),
            Self::FloorDate(floor) if oldest <= floor => Some(StopReason::ReachedFloorDate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillPlan {
    pub handle: String,
    pub page_size: u32,
    pub include_retweets: bool,
    /// Any one of these ends the walk, checked in order.
    pub stops: Vec<StopCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshPlan {
    pub handle: String,
    pub page_size: u32,
    pub include_retweets: bool,
    /// Newest id already stored for this handle.
    pub since_id: u64,
    pub max_iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EmptyPage,
    IterationLimit,
    ReachedFloorDate,
    FewNewPosts,
    /// A page contained only ids already seen in this run.
    NoProgress,
    PageLimit,
    /// Request or conversion failure; the message is kept for the summary.
    Failed(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPage => f.write_str("empty page"),
            Self::IterationLimit => f.write_str("iteration limit"),
            Self::ReachedFloorDate => f.write_str("reached floor date"),
            Self::FewNewPosts => f.write_str("few new posts"),
            Self::NoProgress => f.write_str("no progress"),
            Self::PageLimit => f.write_str("page limit"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Result of collecting one handle. `posts` holds each id once, newest first.
#[derive(Debug, Clone)]
pub struct CollectOutcome {
    pub handle: String,
    pub posts: Vec<PostRecord>,
    pub pages: usize,
    pub stop_reason: StopReason,
}

impl CollectOutcome {
    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self.stop_reason, StopReason::Failed(_))
    }
}

/// Accumulates unique posts across pages.
struct PageAccumulator {
    seen: HashSet<u64>,
    posts: Vec<PostRecord>,
}

impl PageAccumulator {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            posts: Vec::new(),
        }
    }

    /// Adds posts not seen before; returns how many were new.
    fn absorb(&mut self, page: Vec<PostRecord>) -> usize {
        let before = self.posts.len();
        for post in page {
            if self.seen.insert(post.id) {
                self.posts.push(post);
            }
        }
        self.posts.len() - before
    }

    fn finish(mut self, handle: &str, pages: usize, stop_reason: StopReason) -> CollectOutcome {
        self.posts.sort_by(|a, b| b.id.cmp(&a.id));
        CollectOutcome {
            handle: handle.to_string(),
            posts: self.posts,
            pages,
            stop_reason,
        }
    }
}

/// Convert a whole page; one bad post discards the page.
fn convert_page(page: Vec<RawTweet>, handle: &str) -> Result<Vec<PostRecord>, TwitterError> {
    page.into_iter().map(|tweet| tweet.into_post(handle)).collect()
}

async fn fetch_converted<S: TimelineSource>(
    source: &S,
    query: &TimelineQuery,
) -> Result<Vec<PostRecord>, TwitterError> {
    let page = source.user_timeline(query).await?;
    convert_page(page, &query.screen_name)
}

/// Walks a handle's timeline backwards from the newest post.
pub async fn collect_backfill<S: TimelineSource>(source: &S, plan: &BackfillPlan) -> CollectOutcome {
    let mut query = TimelineQuery::new(&plan.handle, plan.page_size, plan.include_retweets);
    let mut acc = PageAccumulator::new();
    let mut pages = 0usize;

    let stop_reason = loop {
        if pages >= MAX_PAGES {
            break StopReason::PageLimit;
        }

        let page = match fetch_converted(source, &query).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(handle = %plan.handle, pages, error = %e, "backfill stopped early");
                break StopReason::Failed(e.to_string());
            }
        };
        pages += 1;

        let (Some(min_id), Some(oldest)) = (
            page.iter().map(|p| p.id).min(),
            page.iter().map(|p| p.date).min(),
        ) else {
            break StopReason::EmptyPage;
        };

        let added = acc.absorb(page);
        tracing::debug!(handle = %plan.handle, page = pages, added, min_id, %oldest, "backfill page");
        if added == 0 {
            break StopReason::NoProgress;
        }

        if let Some(reason) = plan.stops.iter().find_map(|stop| stop.reached(pages, oldest)) {
            break reason;
        }

        let Some(next) = min_id.checked_sub(1) else {
            break StopReason::EmptyPage;
        };
        query.max_id = Some(next);
    };

    let outcome = acc.finish(&plan.handle, pages, stop_reason);
    tracing::info!(
        handle = %outcome.handle,
        posts = outcome.posts.len(),
        pages = outcome.pages,
        stop = %outcome.stop_reason,
        "backfill complete"
    );
    outcome
}

/// Fetches posts newer than `plan.since_id`.
///
/// Pages are walked newest first inside the `(since_id, ∞)` window, so a gap
/// larger than one page is still covered as long as each page keeps yielding
/// at least [`REFRESH_MIN_NEW_POSTS`] new posts.
pub async fn collect_refresh<S: TimelineSource>(source: &S, plan: &RefreshPlan) -> CollectOutcome {
    let mut query = TimelineQuery::new(&plan.handle, plan.page_size, plan.include_retweets);
    query.since_id = Some(plan.since_id);
    let mut acc = PageAccumulator::new();
    let mut pages = 0usize;

    let stop_reason = loop {
        if pages >= MAX_PAGES {
            break StopReason::PageLimit;
        }

        let page = match fetch_converted(source, &query).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(handle = %plan.handle, pages, error = %e, "refresh stopped early");
                break StopReason::Failed(e.to_string());
            }
        };
        pages += 1;

        let page: Vec<PostRecord> = page.into_iter().filter(|p| p.id > plan.since_id).collect();
        let Some(min_id) = page.iter().map(|p| p.id).min() else {
            break StopReason::EmptyPage;
        };

        let added = acc.absorb(page);
        tracing::debug!(handle = %plan.handle, page = pages, added, min_id, "refresh page");
        if added < REFRESH_MIN_NEW_POSTS {
            break StopReason::FewNewPosts;
        }
        if pages >= plan.max_iterations {
            break StopReason::IterationLimit;
        }

        query.max_id = Some(min_id - 1);
    };

    let outcome = acc.finish(&plan.handle, pages, stop_reason);
    tracing::info!(
        handle = %outcome.handle,
        since_id = plan.since_id,
        posts = outcome.posts.len(),
        pages = outcome.pages,
        stop = %outcome.stop_reason,
        "refresh complete"
    );
    outcome
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
