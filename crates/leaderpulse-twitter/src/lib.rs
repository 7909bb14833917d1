//! Timeline collection for tracked handles.
//!
//! [`TwitterClient`] talks to the paginated user-timeline endpoint and hides
//! rate-limit backoff; [`collector`] drives the id-cursor pagination on top of
//! any [`TimelineSource`] and converts wire tweets into
//! [`leaderpulse_core::PostRecord`]s.

pub mod client;
pub mod collector;
pub mod error;
pub mod types;

mod retry;

pub use client::{ClientSettings, TwitterClient};
pub use collector::{
    collect_backfill, collect_refresh, BackfillPlan, CollectOutcome, RefreshPlan, StopCondition,
    StopReason, TimelineSource,
};
pub use error::TwitterError;
pub use types::{RawTweet, TimelineQuery};
