//! Word and phrase frequency tables.
//!
//! Every document is a `(handle, clean_text)` pair. Terms are word n-grams
//! built inside a single document and joined with a space. Counts are kept
//! globally and per handle; terms are ranked by global count with ties
//! broken by the order in which terms were first seen.

use std::collections::{HashMap, HashSet};

use leaderpulse_core::FrequencyRecord;

use crate::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyOptions {
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Terms found in fewer documents than this are dropped. `0` and `1`
    /// keep everything.
    pub min_doc_freq: usize,
    /// Row cap applied after ranking.
    pub max_rows: usize,
}

impl FrequencyOptions {
    #[must_use]
    pub fn words(min_doc_freq: usize, max_rows: usize) -> Self {
        Self {
            ngram_min: 1,
            ngram_max: 1,
            min_doc_freq,
            max_rows,
        }
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        if self.ngram_min == 0 || self.ngram_min > self.ngram_max {
            return Err(AnalysisError::InvalidOptions(format!(
                "n-gram range {}..={} is empty or starts at zero",
                self.ngram_min, self.ngram_max
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct TermStats {
    first_seen: usize,
    total: u64,
    doc_freq: usize,
    per_handle: HashMap<usize, u64>,
}

/// Stable handle numbering: roster handles first, others as they appear.
struct HandleIndex {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl HandleIndex {
    fn new(roster: &[String]) -> Self {
        let mut this = Self {
            names: Vec::new(),
            index: HashMap::new(),
        };
        for handle in roster {
            this.get_or_insert(handle);
        }
        this
    }

    fn get_or_insert(&mut self, handle: &str) -> usize {
        if let Some(&i) = self.index.get(handle) {
            return i;
        }
        let i = self.names.len();
        self.names.push(handle.to_string());
        self.index.insert(handle.to_string(), i);
        i
    }
}

/// Build the frequency table for `documents`.
///
/// Rows are ordered by rank, then by per-handle count descending, then by
/// the handle's position in `roster`. Only `(term, handle)` pairs with a
/// nonzero count appear.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidOptions`] for an empty n-gram range.
pub fn count_terms<'a, I>(
    documents: I,
    roster: &[String],
    options: &FrequencyOptions,
) -> Result<Vec<FrequencyRecord>, AnalysisError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    options.validate()?;

    let mut handles = HandleIndex::new(roster);
    let mut terms: HashMap<String, TermStats> = HashMap::new();
    let mut documents_seen = 0usize;

    for (handle, text) in documents {
        documents_seen += 1;
        let h = handles.get_or_insert(handle);
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut in_doc: HashSet<String> = HashSet::new();

        for n in options.ngram_min..=options.ngram_max {
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                let next_index = terms.len();
                let stats = terms.entry(gram.clone()).or_insert_with(|| TermStats {
                    first_seen: next_index,
                    total: 0,
                    doc_freq: 0,
                    per_handle: HashMap::new(),
                });
                stats.total += 1;
                *stats.per_handle.entry(h).or_insert(0) += 1;
                if in_doc.insert(gram) {
                    stats.doc_freq += 1;
                }
            }
        }
    }

    let mut ranked: Vec<(String, TermStats)> = terms
        .into_iter()
        .filter(|(_, s)| s.doc_freq >= options.min_doc_freq)
        .collect();
    ranked.sort_by(|(_, a), (_, b)| b.total.cmp(&a.total).then(a.first_seen.cmp(&b.first_seen)));

    let mut rows = Vec::new();
    'terms: for (i, (term, stats)) in ranked.iter().enumerate() {
        let mut per_handle: Vec<(usize, u64)> =
            stats.per_handle.iter().map(|(&h, &c)| (h, c)).collect();
        per_handle.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        for (h, count) in per_handle {
            if rows.len() >= options.max_rows {
                break 'terms;
            }
            rows.push(FrequencyRecord {
                term: term.clone(),
                handle: handles.names[h].clone(),
                count,
                total_count: stats.total,
                rank: i + 1,
            });
        }
    }

    tracing::debug!(
        documents = documents_seen,
        terms = ranked.len(),
        rows = rows.len(),
        ngram_min = options.ngram_min,
        ngram_max = options.ngram_max,
        "counted terms"
    );
    Ok(rows)
}
