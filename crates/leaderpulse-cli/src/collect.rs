//! `collect` command: pull timelines, merge into the raw table, persist.
//!
//! Handles are collected one after another against a single client. A
//! handle whose collection fails part-way keeps what it gathered; the run
//! only aborts on configuration, credential or persistence errors.

use anyhow::Context;

use leaderpulse_core::{AppConfig, EntityConfig, PostRecord};
use leaderpulse_store::{handle_stats, HandleStats};
use leaderpulse_twitter::{
    collect_backfill, collect_refresh, BackfillPlan, ClientSettings, CollectOutcome, RefreshPlan,
    StopCondition, TimelineSource, TwitterClient,
};

use crate::CollectMode;

/// What a collect run will do for one handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HandlePlan {
    Backfill(BackfillPlan),
    Refresh(RefreshPlan),
}

impl HandlePlan {
    fn describe(&self) -> String {
        match self {
            HandlePlan::Backfill(p) => {
                let stops: Vec<String> = p
                    .stops
                    .iter()
                    .map(|stop| match stop {
                        StopCondition::FloorDate(d) => format!("back to {d}"),
                        StopCondition::MaxIterations(n) => format!("up to {n} pages"),
                    })
                    .collect();
                let stop = if stops.is_empty() {
                    "to the oldest post".to_string()
                } else {
                    stops.join(" or ")
                };
                format!("{}: backfill {stop}, {} per page", p.handle, p.page_size)
            }
            HandlePlan::Refresh(p) => format!(
                "{}: refresh newer than id {}, up to {} pages of {}",
                p.handle, p.since_id, p.max_iterations, p.page_size
            ),
        }
    }
}

/// Choose backfill or refresh for `entity`.
///
/// Build mode always backfills, stopping at the configured floor date or
/// after the configured iteration cap, whichever comes first. Refresh mode
/// continues from the newest stored id, falling back to the same backfill
/// for a handle with no stored posts.
pub(crate) fn plan_for(
    config: &AppConfig,
    entity: &EntityConfig,
    mode: CollectMode,
    stored: Option<&HandleStats>,
) -> HandlePlan {
    match (mode, stored) {
        (CollectMode::Refresh, Some(stats)) => HandlePlan::Refresh(RefreshPlan {
            handle: entity.handle.clone(),
            page_size: config.page_size,
            include_retweets: config.include_retweets,
            since_id: stats.newest_id,
            max_iterations: config.max_iterations,
        }),
        _ => HandlePlan::Backfill(BackfillPlan {
            handle: entity.handle.clone(),
            page_size: config.page_size,
            include_retweets: config.include_retweets,
            stops: vec![
                StopCondition::FloorDate(config.floor_date),
                StopCondition::MaxIterations(config.max_iterations),
            ],
        }),
    }
}

/// Run the `collect` command for `entities`.
///
/// When `dry_run` is `true` the function prints the plan for each handle
/// and returns without reading the dataset or calling the API.
///
/// # Errors
///
/// Returns an error if credentials are missing, the bearer token cannot be
/// obtained, or the raw table cannot be read or written.
pub(crate) async fn run_collect(
    config: &AppConfig,
    entities: &[EntityConfig],
    mode: CollectMode,
    dry_run: bool,
) -> anyhow::Result<()> {
    if dry_run {
        println!(
            "dry-run: {mode} collection for {} handles into {}",
            entities.len(),
            config.raw_table_path().display()
        );
        for entity in entities {
            let stop = match mode {
                CollectMode::Build => format!("backfill back to {}", config.floor_date),
                CollectMode::Refresh => format!(
                    "refresh up to {} pages, or backfill back to {} if nothing is stored",
                    config.max_iterations, config.floor_date
                ),
            };
            println!("  {}: {stop}", entity.handle);
        }
        return Ok(());
    }

    let credentials =
        leaderpulse_core::load_credentials(&config.credentials_path, |key| std::env::var(key))
            .context("missing API credentials")?;

    let raw_path = config.raw_table_path();
    let existing = leaderpulse_store::read_posts_if_exists(&raw_path)
        .with_context(|| format!("failed to read {}", raw_path.display()))?;
    println!("loaded {} stored posts from {}", existing.len(), raw_path.display());

    let client = TwitterClient::connect(&credentials, &ClientSettings::from_config(config))
        .await
        .context("failed to authenticate with the timeline API")?;

    let plans: Vec<HandlePlan> = entities
        .iter()
        .map(|e| plan_for(config, e, mode, handle_stats(&existing, &e.handle).as_ref()))
        .collect();
    let incoming = collect_all(&client, &plans).await;

    let before = existing.len();
    let merged = leaderpulse_store::merge(existing, incoming);
    println!(
        "merged: {before} -> {} posts ({} new, {} updated)",
        merged.records.len(),
        merged.new_count,
        merged.replaced_count
    );
    for entity in entities {
        println!("  {}", range_line(&merged.records, &entity.handle));
    }

    if merged.should_persist() {
        leaderpulse_store::write_posts(&raw_path, &merged.records)
            .with_context(|| format!("failed to write {}", raw_path.display()))?;
        println!("wrote {} posts to {}", merged.records.len(), raw_path.display());
    } else {
        println!(
            "skipped write: {} new posts is below the threshold of {}",
            merged.new_count,
            leaderpulse_store::MIN_NEW_RECORDS_TO_PERSIST
        );
    }

    Ok(())
}

/// Execute `plans` in order, printing a summary line per handle.
pub(crate) async fn collect_all<S: TimelineSource>(source: &S, plans: &[HandlePlan]) -> Vec<PostRecord> {
    let mut incoming = Vec::new();
    for plan in plans {
        tracing::info!(plan = %plan.describe(), "collecting");
        let outcome = match plan {
            HandlePlan::Backfill(p) => collect_backfill(source, p).await,
            HandlePlan::Refresh(p) => collect_refresh(source, p).await,
        };
        if outcome.is_partial() {
            tracing::warn!(
                handle = %outcome.handle,
                kept = outcome.posts.len(),
                reason = %outcome.stop_reason,
                "collection stopped early, keeping partial result"
            );
        }
        println!("{}", outcome_line(&outcome));
        incoming.extend(outcome.posts);
    }
    incoming
}

fn outcome_line(outcome: &CollectOutcome) -> String {
    format!(
        "{}: +{} posts over {} pages ({})",
        outcome.handle,
        outcome.posts.len(),
        outcome.pages,
        outcome.stop_reason
    )
}

fn range_line(records: &[PostRecord], handle: &str) -> String {
    match handle_stats(records, handle) {
        Some(s) => format!(
            "{handle}: {} posts from {} to {}",
            s.count, s.first_date, s.last_date
        ),
        None => format!("{handle}: no posts"),
    }
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
