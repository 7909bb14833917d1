//! Lexicon-based polarity and subjectivity scoring.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::lemma::lemma;

/// Embedded lexicon, one `word<TAB>polarity<TAB>subjectivity` row per line.
/// Blank lines and lines starting with `#` are skipped.
const LEXICON_TSV: &str = include_str!("../data/sentiment-lexicon.tsv");

/// Word weights as `word -> (polarity, subjectivity)`.
///
/// Polarity is in `[-1.0, 1.0]`, subjectivity in `[0.0, 1.0]`. Every listed
/// surface form is also indexed under the lemma the normalizer reduces it to,
/// so raw and normalized text score alike. A listed form keeps its own
/// weights when it is also another entry's lemma.
static LEXICON: LazyLock<HashMap<String, (f64, f64)>> = LazyLock::new(|| {
    let rows = parse_lexicon(LEXICON_TSV);
    let mut lexicon: HashMap<String, (f64, f64)> = rows
        .iter()
        .map(|&(word, p, s)| (word.to_string(), (p, s)))
        .collect();
    for &(word, p, s) in &rows {
        lexicon.entry(lemma(word)).or_insert((p, s));
    }
    lexicon
});

fn parse_lexicon(source: &str) -> Vec<(&str, f64, f64)> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let word = fields.next()?;
            let polarity = fields.next()?.parse().ok()?;
            let subjectivity = fields.next()?.parse().ok()?;
            Some((word, polarity, subjectivity))
        })
        .collect()
}

/// Words that scale the next scored word.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 1.5),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("really", 1.3),
    ("so", 1.3),
    ("truly", 1.3),
    ("very", 1.3),
];

/// Words that flip and soften the next scored word.
const NEGATIONS: &[&str] = &["never", "no", "not", "dont", "cant", "wont", "isnt", "nt"];

const NEGATION_FACTOR: f64 = -0.5;

fn lexicon_entry(word: &str) -> Option<(f64, f64)> {
    LEXICON.get(word).copied()
}

fn intensity(word: &str) -> Option<f64> {
    INTENSIFIERS.iter().find(|(w, _)| *w == word).map(|&(_, f)| f)
}

/// Score one text as `(polarity, subjectivity)`.
///
/// Tokens are lowercased alphanumeric runs. Each lexicon hit contributes its
/// weights, scaled by a directly preceding intensifier and flipped by
/// [`NEGATION_FACTOR`] after a negation. Results are the mean over hits,
/// clamped to range. Text with no hits, including `""`, scores `(0.0, 0.0)`.
#[must_use]
pub fn score_text(text: &str) -> (f64, f64) {
    let lowered = text.to_lowercase();
    let tokens = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty());

    let mut polarity_sum = 0.0;
    let mut subjectivity_sum = 0.0;
    let mut hits = 0u32;
    let mut negate = false;
    let mut scale = 1.0;

    for token in tokens {
        if NEGATIONS.contains(&token) {
            negate = true;
            continue;
        }
        if let Some(factor) = intensity(token) {
            scale *= factor;
            continue;
        }
        if let Some((polarity, subjectivity)) = lexicon_entry(token) {
            let mut p = polarity * scale;
            if negate {
                p *= NEGATION_FACTOR;
            }
            polarity_sum += p.clamp(-1.0, 1.0);
            subjectivity_sum += (subjectivity * scale).clamp(0.0, 1.0);
            hits += 1;
        }
        negate = false;
        scale = 1.0;
    }

    if hits == 0 {
        return (0.0, 0.0);
    }
    let n = f64::from(hits);
    (
        (polarity_sum / n).clamp(-1.0, 1.0),
        (subjectivity_sum / n).clamp(0.0, 1.0),
    )
}

/// Score each text, preserving order. Both outputs have `texts.len()` entries.
#[must_use]
pub fn score_texts<S: AsRef<str>>(texts: &[S]) -> (Vec<f64>, Vec<f64>) {
    texts.iter().map(|t| score_text(t.as_ref())).unzip()
}
