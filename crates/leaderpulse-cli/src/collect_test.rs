use std::path::PathBuf;

use chrono::{NaiveDate, TimeZone, Utc};
use leaderpulse_core::{MentionMatch, NormalizeMode};
use leaderpulse_twitter::StopReason;

use super::*;

fn test_config() -> AppConfig {
    AppConfig {
        data_dir: PathBuf::from("data"),
        entities_path: PathBuf::from("config/entities.yaml"),
        credentials_path: PathBuf::from("twitter_credentials.json"),
        log_level: "info".to_string(),
        twitter_base_url: "https://api.twitter.com/".to_string(),
        request_timeout_secs: 30,
        user_agent: "leaderpulse/0.1".to_string(),
        max_retries: 3,
        retry_backoff_base_secs: 1,
        page_size: 200,
        max_iterations: 5,
        floor_date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
        include_retweets: true,
        normalize_mode: NormalizeMode::Lemmatize,
        mention_match: MentionMatch::Substring,
        word_min_df: 1,
        phrase_ngram_min: 2,
        phrase_ngram_max: 3,
        phrase_min_df: 2,
        max_frequency_rows: 5000,
    }
}

fn entity(handle: &str) -> EntityConfig {
    EntityConfig {
        handle: handle.to_string(),
        name: handle.to_string(),
        key: handle.to_lowercase(),
        aliases: vec![handle.to_lowercase()],
    }
}

fn post(id: u64, handle: &str, day: u32) -> PostRecord {
    PostRecord::new(
        id,
        handle,
        handle,
        Utc.with_ymd_and_hms(2020, 6, day, 12, 0, 0).unwrap(),
        "en",
        "text",
        false,
        0,
        0,
    )
}

#[test]
fn refresh_with_stored_posts_continues_from_newest_id() {
    let config = test_config();
    let stored = vec![post(10, "JustinTrudeau", 1), post(42, "JustinTrudeau", 3)];
    let stats = handle_stats(&stored, "JustinTrudeau");

    let plan = plan_for(
        &config,
        &entity("JustinTrudeau"),
        CollectMode::Refresh,
        stats.as_ref(),
    );

    assert_eq!(
        plan,
        HandlePlan::Refresh(RefreshPlan {
            handle: "JustinTrudeau".to_string(),
            page_size: 200,
            include_retweets: true,
            since_id: 42,
            max_iterations: 5,
        })
    );
}

#[test]
fn refresh_without_stored_posts_backfills() {
    let config = test_config();
    let plan = plan_for(&config, &entity("ElizabethMay"), CollectMode::Refresh, None);
    assert!(matches!(
        plan,
        HandlePlan::Backfill(BackfillPlan { ref stops, .. })
            if stops.contains(&StopCondition::FloorDate(config.floor_date))
    ));
}

#[test]
fn build_mode_backfills_even_with_stored_posts() {
    let config = test_config();
    let stored = vec![post(7, "AndrewScheer", 2)];
    let stats = handle_stats(&stored, "AndrewScheer");
    let plan = plan_for(
        &config,
        &entity("AndrewScheer"),
        CollectMode::Build,
        stats.as_ref(),
    );
    assert!(matches!(plan, HandlePlan::Backfill(_)));
}

#[test]
fn backfill_honours_floor_date_and_iteration_cap() {
    let mut config = test_config();
    config.max_iterations = 7;
    let plan = plan_for(&config, &entity("AndrewScheer"), CollectMode::Build, None);

    assert_eq!(
        plan,
        HandlePlan::Backfill(BackfillPlan {
            handle: "AndrewScheer".to_string(),
            page_size: 200,
            include_retweets: true,
            stops: vec![
                StopCondition::FloorDate(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()),
                StopCondition::MaxIterations(7),
            ],
        })
    );
}

#[test]
fn plan_description_names_the_cursor() {
    let config = test_config();
    let stored = vec![post(42, "JustinTrudeau", 3)];
    let stats = handle_stats(&stored, "JustinTrudeau");
    let refresh = plan_for(&config, &entity("JustinTrudeau"), CollectMode::Refresh, stats.as_ref());
    assert_eq!(
        refresh.describe(),
        "JustinTrudeau: refresh newer than id 42, up to 5 pages of 200"
    );

    let backfill = plan_for(&config, &entity("JustinTrudeau"), CollectMode::Build, None);
    assert_eq!(
        backfill.describe(),
        "JustinTrudeau: backfill back to 2019-01-01 or up to 5 pages, 200 per page"
    );
}

#[test]
fn outcome_line_reports_gain_and_stop_reason() {
    let outcome = CollectOutcome {
        handle: "theJagmeetSingh".to_string(),
        posts: vec![post(3, "theJagmeetSingh", 2), post(2, "theJagmeetSingh", 1)],
        pages: 2,
        stop_reason: StopReason::Failed("timeout".to_string()),
    };
    assert_eq!(
        outcome_line(&outcome),
        "theJagmeetSingh: +2 posts over 2 pages (failed: timeout)"
    );
}

#[test]
fn range_line_covers_present_and_absent_handles() {
    let records = vec![post(1, "MaximeBernier", 1), post(2, "MaximeBernier", 9)];
    assert_eq!(
        range_line(&records, "MaximeBernier"),
        "MaximeBernier: 2 posts from 2020-06-01 to 2020-06-09"
    );
    assert_eq!(range_line(&records, "ElizabethMay"), "ElizabethMay: no posts");
}
