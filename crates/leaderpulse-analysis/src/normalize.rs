//! Text normalization and display formatting.

use std::collections::HashSet;

use regex::Regex;

use leaderpulse_core::NormalizeMode;

use crate::lemma::lemma;
use crate::stopwords::STOPWORDS;

/// Marker inserted by [`break_text`].
pub const BREAK_MARKER: &str = "<br>";

/// Characters per line in [`break_text`].
pub const BREAK_WIDTH: usize = 60;

/// HTML-entity residue left by `&amp;` once punctuation is stripped.
const ENTITY_RESIDUE: &[&str] = &["amp"];

/// Deterministic cleaner turning raw post text into a token string.
///
/// Both modes remove URLs and every character outside `[A-Za-z0-9\s]`,
/// lowercase, drop stopwords and entity residue, and collapse whitespace.
/// [`NormalizeMode::Lemmatize`] additionally singularizes every remaining
/// token and reduces it to its lemma under its suffix-derived part of speech.
#[derive(Debug)]
pub struct Normalizer {
    mode: NormalizeMode,
    url_re: Regex,
    non_alnum_re: Regex,
    stopwords: HashSet<&'static str>,
}

impl Normalizer {
    #[must_use]
    pub fn new(mode: NormalizeMode) -> Self {
        Self {
            mode,
            url_re: Regex::new(r"http\S+").expect("valid url regex"),
            non_alnum_re: Regex::new(r"[^A-Za-z0-9\s]").expect("valid punctuation regex"),
            stopwords: STOPWORDS.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> NormalizeMode {
        self.mode
    }

    /// Normalize `raw`. Empty or all-punctuation input yields `""`.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let without_urls = self.url_re.replace_all(raw, " ");
        let alnum = self.non_alnum_re.replace_all(&without_urls, "");
        let lowered = alnum.to_lowercase();

        let kept = lowered
            .split_whitespace()
            .filter(|w| !self.stopwords.contains(w) && !ENTITY_RESIDUE.contains(w));

        let tokens: Vec<String> = match self.mode {
            NormalizeMode::StripOnly => kept.map(str::to_string).collect(),
            NormalizeMode::Lemmatize => kept
                .map(lemma)
                .filter(|w| !self.stopwords.contains(w.as_str()))
                .collect(),
        };
        tokens.join(" ")
    }
}

/// Insert [`BREAK_MARKER`] after every [`BREAK_WIDTH`] characters of `raw`,
/// including after the final partial line. Stripping the markers gives back
/// `raw` whenever `raw` does not itself contain the marker.
#[must_use]
pub fn break_text(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len() + (chars.len() / BREAK_WIDTH + 1) * BREAK_MARKER.len());
    for chunk in chars.chunks(BREAK_WIDTH) {
        out.extend(chunk);
        out.push_str(BREAK_MARKER);
    }
    out
}
