//! `analyze` command: rebuild the derived tables from the raw table.

use anyhow::Context;

use leaderpulse_analysis::{analyze, AnalysisOptions};
use leaderpulse_core::{AppConfig, CleanedPost, EntityConfig};

/// Normalize, score and count the stored posts, then rewrite the cleaned,
/// word and phrase tables. An empty or missing raw table is reported and
/// leaves the derived tables untouched.
///
/// # Errors
///
/// Returns an error if the raw table cannot be read, analysis options are
/// invalid, or any derived table cannot be written.
pub(crate) fn run_analyze(config: &AppConfig, roster: &[EntityConfig]) -> anyhow::Result<()> {
    let raw_path = config.raw_table_path();
    let posts = leaderpulse_store::read_posts_if_exists(&raw_path)
        .with_context(|| format!("failed to read {}", raw_path.display()))?;
    if posts.is_empty() {
        println!("no posts in {}; run collect first", raw_path.display());
        return Ok(());
    }

    let options = AnalysisOptions::from_config(config);
    let output = analyze(&posts, roster, &options).context("analysis failed")?;

    let clean_path = config.clean_table_path();
    leaderpulse_store::write_cleaned(&clean_path, &output.cleaned, &output.mention_columns)
        .with_context(|| format!("failed to write {}", clean_path.display()))?;
    println!("wrote {} cleaned posts to {}", output.cleaned.len(), clean_path.display());

    for (path, rows, label) in [
        (config.word_count_path(), &output.words, "word"),
        (config.phrase_count_path(), &output.phrases, "phrase"),
    ] {
        leaderpulse_store::write_frequencies(&path, rows)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {} {label} rows to {}", rows.len(), path.display());
    }

    for entity in roster {
        println!("  {}", sentiment_line(&output.cleaned, &entity.handle));
    }

    Ok(())
}

fn sentiment_line(cleaned: &[CleanedPost], handle: &str) -> String {
    let (count, polarity, subjectivity) = cleaned
        .iter()
        .filter(|c| c.post.handle.eq_ignore_ascii_case(handle))
        .fold((0u32, 0.0, 0.0), |(n, p, s), c| {
            (n + 1, p + c.polarity, s + c.subjectivity)
        });
    if count == 0 {
        return format!("{handle}: no posts");
    }
    let n = f64::from(count);
    format!(
        "{handle}: {count} posts, mean polarity {:.3}, mean subjectivity {:.3}",
        polarity / n,
        subjectivity / n
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use leaderpulse_core::PostRecord;

    use super::*;

    fn cleaned(handle: &str, polarity: f64, subjectivity: f64) -> CleanedPost {
        CleanedPost {
            post: PostRecord::new(
                1,
                handle,
                handle,
                Utc.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap(),
                "en",
                "text",
                false,
                0,
                0,
            ),
            clean_text: "text".to_string(),
            break_text: "text<br>".to_string(),
            polarity,
            subjectivity,
            mentions: Vec::new(),
        }
    }

    #[test]
    fn sentiment_line_averages_per_handle() {
        let rows = vec![
            cleaned("JustinTrudeau", 0.5, 1.0),
            cleaned("JustinTrudeau", -0.25, 0.0),
            cleaned("AndrewScheer", -1.0, 1.0),
        ];
        assert_eq!(
            sentiment_line(&rows, "JustinTrudeau"),
            "JustinTrudeau: 2 posts, mean polarity 0.125, mean subjectivity 0.500"
        );
        assert_eq!(sentiment_line(&rows, "ElizabethMay"), "ElizabethMay: no posts");
    }
}
