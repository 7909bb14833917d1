//! Cross-mention detection by alias keyword.

use regex::Regex;

use leaderpulse_core::{EntityConfig, MentionMatch};

use crate::AnalysisError;

#[derive(Debug)]
struct EntityAliases {
    column: String,
    aliases: Vec<String>,
    word_re: Option<Regex>,
}

/// Flags, per roster entity, whether a text mentions any of its aliases.
///
/// In [`MentionMatch::Substring`] mode an alias matches anywhere, so `may`
/// also matches `mayor`. [`MentionMatch::WordBoundary`] requires the alias
/// to stand as a whole word.
#[derive(Debug)]
pub struct MentionMatcher {
    mode: MentionMatch,
    entities: Vec<EntityAliases>,
}

impl MentionMatcher {
    /// # Errors
    ///
    /// Returns [`AnalysisError::Pattern`] if a word-boundary pattern cannot
    /// be compiled.
    pub fn new(entities: &[EntityConfig], mode: MentionMatch) -> Result<Self, AnalysisError> {
        let entities = entities
            .iter()
            .map(|e| {
                let aliases: Vec<String> = e.aliases.iter().map(|a| a.to_lowercase()).collect();
                let word_re = match mode {
                    MentionMatch::Substring => None,
                    MentionMatch::WordBoundary => Some(word_pattern(&aliases)?),
                };
                Ok(EntityAliases {
                    column: e.mention_column(),
                    aliases,
                    word_re,
                })
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;
        Ok(Self { mode, entities })
    }

    /// `about_<key>` column names in roster order.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.entities.iter().map(|e| e.column.clone()).collect()
    }

    /// `(column, flag)` for each entity, in roster order.
    #[must_use]
    pub fn flags(&self, text: &str) -> Vec<(String, bool)> {
        let lowered = text.to_lowercase();
        self.entities
            .iter()
            .map(|e| {
                let hit = match (&self.mode, &e.word_re) {
                    (MentionMatch::WordBoundary, Some(re)) => re.is_match(&lowered),
                    _ => e.aliases.iter().any(|a| lowered.contains(a.as_str())),
                };
                (e.column.clone(), hit)
            })
            .collect()
    }
}

fn word_pattern(aliases: &[String]) -> Result<Regex, AnalysisError> {
    let alternation = aliases
        .iter()
        .map(|a| regex::escape(a))
        .collect::<Vec<_>>()
        .join("|");
    Ok(Regex::new(&format!(r"\b(?:{alternation})\b"))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(handle: &str, key: &str, aliases: &[&str]) -> EntityConfig {
        EntityConfig {
            handle: handle.to_string(),
            name: handle.to_string(),
            key: key.to_string(),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    fn roster() -> Vec<EntityConfig> {
        vec![
            entity("JustinTrudeau", "trudeau", &["trudeau", "justin"]),
            entity("ElizabethMay", "may", &["may", "elizabeth", "ElizabethMay"]),
        ]
    }

    #[test]
    fn alias_match_is_case_insensitive() {
        let m = MentionMatcher::new(&roster(), MentionMatch::Substring).unwrap();
        assert_eq!(
            m.flags("Justin spoke today"),
            vec![
                ("about_trudeau".to_string(), true),
                ("about_may".to_string(), false)
            ]
        );
    }

    #[test]
    fn unrelated_text_flags_nothing() {
        let m = MentionMatcher::new(&roster(), MentionMatch::Substring).unwrap();
        assert!(m.flags("nothing relevant").iter().all(|(_, f)| !f));
    }

    #[test]
    fn substring_mode_matches_inside_words() {
        let m = MentionMatcher::new(&roster(), MentionMatch::Substring).unwrap();
        let flags = m.flags("Lunch with the mayor, extra mayo");
        assert_eq!(flags[1], ("about_may".to_string(), true));
    }

    #[test]
    fn word_mode_requires_whole_words() {
        let m = MentionMatcher::new(&roster(), MentionMatch::WordBoundary).unwrap();
        assert!(!m.flags("Lunch with the mayor")[1].1);
        assert!(m.flags("Thanks @ElizabethMay for the debate")[1].1);
        assert!(m.flags("May I add something")[1].1);
    }

    #[test]
    fn post_can_mention_several_entities() {
        let m = MentionMatcher::new(&roster(), MentionMatch::Substring).unwrap();
        assert!(m
            .flags("Trudeau and Elizabeth debated")
            .iter()
            .all(|(_, f)| *f));
    }

    #[test]
    fn columns_follow_roster_order() {
        let m = MentionMatcher::new(&roster(), MentionMatch::WordBoundary).unwrap();
        assert_eq!(m.columns(), vec!["about_trudeau", "about_may"]);
    }
}
