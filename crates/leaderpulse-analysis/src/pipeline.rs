//! Full analysis pass over an in-memory dataset.

use leaderpulse_core::{
    AppConfig, CleanedPost, EntityConfig, FrequencyRecord, MentionMatch, NormalizeMode,
    PostRecord,
};

use crate::frequency::{count_terms, FrequencyOptions};
use crate::mentions::MentionMatcher;
use crate::normalize::{break_text, Normalizer};
use crate::sentiment::score_texts;
use crate::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub normalize_mode: NormalizeMode,
    pub mention_match: MentionMatch,
    pub words: FrequencyOptions,
    pub phrases: FrequencyOptions,
}

impl AnalysisOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            normalize_mode: config.normalize_mode,
            mention_match: config.mention_match,
            words: FrequencyOptions::words(config.word_min_df, config.max_frequency_rows),
            phrases: FrequencyOptions {
                ngram_min: config.phrase_ngram_min,
                ngram_max: config.phrase_ngram_max,
                min_doc_freq: config.phrase_min_df,
                max_rows: config.max_frequency_rows,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// One entry per input post, in input order.
    pub cleaned: Vec<CleanedPost>,
    /// `about_<key>` columns in roster order.
    pub mention_columns: Vec<String>,
    pub words: Vec<FrequencyRecord>,
    pub phrases: Vec<FrequencyRecord>,
}

/// Normalize, score and flag every post, then build the frequency tables.
///
/// Mentions are matched against the raw text; sentiment and frequencies use
/// the normalized text. Retweets are kept in the cleaned table but left out
/// of the frequency tables.
///
/// # Errors
///
/// Returns [`AnalysisError`] for invalid frequency options or an alias that
/// cannot be compiled into a pattern.
pub fn analyze(
    posts: &[PostRecord],
    entities: &[EntityConfig],
    options: &AnalysisOptions,
) -> Result<AnalysisOutput, AnalysisError> {
    let normalizer = Normalizer::new(options.normalize_mode);
    let matcher = MentionMatcher::new(entities, options.mention_match)?;

    let clean_texts: Vec<String> = posts
        .iter()
        .map(|p| normalizer.normalize(&p.full_text))
        .collect();
    let (polarity, subjectivity) = score_texts(&clean_texts);

    let cleaned: Vec<CleanedPost> = posts
        .iter()
        .zip(clean_texts.iter())
        .zip(polarity.into_iter().zip(subjectivity))
        .map(|((post, clean), (pol, subj))| CleanedPost {
            post: post.clone(),
            clean_text: clean.clone(),
            break_text: break_text(&post.full_text),
            polarity: pol,
            subjectivity: subj,
            mentions: matcher.flags(&post.full_text),
        })
        .collect();

    let roster: Vec<String> = entities.iter().map(|e| e.handle.clone()).collect();
    let documents: Vec<(&str, &str)> = posts
        .iter()
        .zip(clean_texts.iter())
        .filter(|(post, _)| !post.is_retweet)
        .map(|(post, clean)| (post.handle.as_str(), clean.as_str()))
        .collect();

    let words = count_terms(documents.iter().copied(), &roster, &options.words)?;
    let phrases = count_terms(documents.iter().copied(), &roster, &options.phrases)?;

    tracing::info!(
        posts = cleaned.len(),
        documents = documents.len(),
        words = words.len(),
        phrases = phrases.len(),
        mode = %normalizer.mode(),
        "analysis complete"
    );

    Ok(AnalysisOutput {
        cleaned,
        mention_columns: matcher.columns(),
        words,
        phrases,
    })
}
