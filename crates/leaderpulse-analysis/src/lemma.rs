//! Suffix-driven part-of-speech tagging and lemmatization.
//!
//! Tags are the four coarse classes a dictionary lemmatizer understands.
//! Anything the suffix rules cannot place is a noun. Lemmatization is purely
//! rule based with small exception tables, so the same word always maps to
//! the same lemma.
//!
//! [`lemma`] is the full per-token reduction: every token is singularized
//! first, then tagged and lemmatized.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pos {
    Adjective,
    Noun,
    Verb,
    Adverb,
}

/// Irregular verb forms and their base form.
const IRREGULAR_VERBS: &[(&str, &str)] = &[
    ("became", "become"),
    ("began", "begin"),
    ("begun", "begin"),
    ("bought", "buy"),
    ("brought", "bring"),
    ("built", "build"),
    ("came", "come"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("done", "do"),
    ("felt", "feel"),
    ("fought", "fight"),
    ("found", "find"),
    ("gave", "give"),
    ("given", "give"),
    ("gone", "go"),
    ("got", "get"),
    ("gotten", "get"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("heard", "hear"),
    ("held", "hold"),
    ("kept", "keep"),
    ("knew", "know"),
    ("known", "know"),
    ("led", "lead"),
    ("left", "leave"),
    ("lost", "lose"),
    ("made", "make"),
    ("meant", "mean"),
    ("met", "meet"),
    ("misled", "mislead"),
    ("paid", "pay"),
    ("ran", "run"),
    ("said", "say"),
    ("saw", "see"),
    ("seen", "see"),
    ("sent", "send"),
    ("sought", "seek"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("spent", "spend"),
    ("stood", "stand"),
    ("taken", "take"),
    ("taught", "teach"),
    ("thought", "think"),
    ("told", "tell"),
    ("took", "take"),
    ("understood", "understand"),
    ("used", "use"),
    ("using", "use"),
    ("went", "go"),
    ("wrote", "write"),
    ("written", "write"),
];

/// Irregular plurals and their singular.
const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("lives", "life"),
    ("men", "man"),
    ("mice", "mouse"),
    ("people", "person"),
    ("teeth", "tooth"),
    ("wives", "wife"),
    ("women", "woman"),
];

/// Irregular comparatives and superlatives.
const IRREGULAR_ADJECTIVES: &[(&str, &str)] = &[
    ("best", "good"),
    ("better", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
];

/// Words ending in `s` that are not plurals.
const INVARIANT_NOUNS: &[&str] = &[
    "always", "bias", "chaos", "covid", "economics", "gas", "lens", "means", "minus", "news",
    "overseas", "perhaps", "plus", "politics", "series", "species", "thus", "towards", "yes",
];

/// `-ing` words that are nouns in practice.
const ING_NOUNS: &[&str] = &[
    "anything", "briefing", "building", "ceiling", "clothing", "during", "evening", "everything",
    "funding", "housing", "king", "meeting", "morning", "nothing", "offspring", "ring", "sibling",
    "something", "spring", "string", "thing", "training", "wedding",
];

/// `-ed` words that are not past tenses.
const ED_NON_VERBS: &[&str] = &[
    "bed", "bleed", "breed", "deed", "exceed", "feed", "greed", "hundred", "indeed", "need",
    "proceed", "red", "seed", "shed", "speed", "succeed", "weed",
];

/// `-ier` nouns that are not comparatives.
const IER_NOUNS: &[&str] = &[
    "barrier", "carrier", "cashier", "courier", "dossier", "frontier", "premier", "soldier",
    "supplier",
];

/// `-ly` words that are not adverbs.
const LY_NON_ADVERBS: &[&str] = &["apply", "family", "italy", "july", "reply", "supply"];

/// Base forms the stem rules in [`needs_final_e`] would get wrong, either by
/// missing a dropped `e` (`excit` -> `excite`) or by adding one (`visit`).
const KNOWN_VERBS: &[&str] = &[
    "abuse", "accuse", "acquire", "add", "adore", "arrange", "assume", "beat", "become", "bias",
    "bloat", "breathe", "cause", "challenge", "change", "cheat", "combat", "combine", "compare",
    "compete", "complete", "confine", "confuse", "console", "consume", "credit", "declare",
    "decline", "defeat", "define", "delete", "deplore", "describe", "determine", "devote",
    "dislike", "eat", "edit", "err", "escape", "examine", "exchange", "excite", "excuse", "exhibit",
    "explore", "float", "focus", "guide", "heat", "ignite", "ignore", "imagine", "implore",
    "incite", "input", "inquire", "invite", "invoke", "limit", "misuse", "outline", "output",
    "pause", "postpone", "prepare", "prescribe", "presume", "promote", "provoke", "quote", "range",
    "recite", "refine", "refuse", "repeat", "require", "restore", "resume", "reuse", "revoke",
    "schedule", "scout", "seat", "shout", "sprout", "style", "subscribe", "taste", "treat",
    "undermine", "unite", "use", "visit", "wait", "waste", "welcome",
];

/// Stem endings that only occur once a final `e` was dropped.
const E_STEM_ENDINGS: &[&str] = &[
    "ag", "as", "at", "az", "dg", "ez", "is", "iz", "ns", "os", "ps", "rg", "rs", "ut", "ys",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ical", "ish"];

fn lookup(table: &[(&str, &'static str)], word: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == word).map(|(_, v)| *v)
}

/// Coarse part of speech for a lowercase token.
#[must_use]
pub fn tag(word: &str) -> Pos {
    let len = word.chars().count();
    if lookup(IRREGULAR_ADJECTIVES, word).is_some() {
        return Pos::Adjective;
    }
    if lookup(IRREGULAR_VERBS, word).is_some() {
        return Pos::Verb;
    }
    if lookup(IRREGULAR_NOUNS, word).is_some() {
        return Pos::Noun;
    }
    if len > 4 && word.ends_with("ly") && !LY_NON_ADVERBS.contains(&word) {
        return Pos::Adverb;
    }
    if len > 5 && word.ends_with("ing") && !ING_NOUNS.contains(&word) {
        return Pos::Verb;
    }
    if len > 4 && word.ends_with("ed") && !ED_NON_VERBS.contains(&word) {
        return Pos::Verb;
    }
    if len > 5
        && (word.ends_with("ier") || word.ends_with("iest"))
        && !IER_NOUNS.contains(&word)
    {
        return Pos::Adjective;
    }
    if len > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) {
        return Pos::Adjective;
    }
    Pos::Noun
}

/// Singularize `word`, then lemmatize it under its own tag.
#[must_use]
pub fn lemma(word: &str) -> String {
    let singular = singularize(word);
    lemmatize(&singular, tag(&singular))
}

/// Lemma of `word` read as `pos`.
#[must_use]
pub fn lemmatize(word: &str, pos: Pos) -> String {
    match pos {
        Pos::Noun => singularize(word),
        Pos::Verb => verb_base(word),
        Pos::Adjective => adjective_base(word),
        Pos::Adverb => word.to_string(),
    }
}

/// Singular form of a (possibly) plural noun.
#[must_use]
pub fn singularize(word: &str) -> String {
    if let Some(singular) = lookup(IRREGULAR_NOUNS, word) {
        return singular.to_string();
    }
    let len = word.len();
    if len <= 3 || !word.ends_with('s') || INVARIANT_NOUNS.contains(&word) {
        return word.to_string();
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    if len > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..len - 3]);
    }
    if ["sses", "xes", "zes", "ches", "shes"]
        .iter()
        .any(|s| word.ends_with(s))
    {
        return word[..len - 2].to_string();
    }
    word[..len - 1].to_string()
}

fn verb_base(word: &str) -> String {
    if let Some(base) = lookup(IRREGULAR_VERBS, word) {
        return base.to_string();
    }
    let len = word.len();
    if len > 5 && word.ends_with("ing") {
        return restore_stem(&word[..len - 3]);
    }
    if len > 4 && word.ends_with("ied") {
        return format!("{}y", &word[..len - 3]);
    }
    if len > 4 && word.ends_with("eed") {
        return word[..len - 1].to_string();
    }
    if len > 4 && word.ends_with("ed") {
        return restore_stem(&word[..len - 2]);
    }
    if len > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..len - 3]);
    }
    if len > 3 && word.ends_with('s') && !word.ends_with("ss") {
        return singularize(word);
    }
    word.to_string()
}

/// Undo consonant doubling and the dropped final `e` of a suffixed stem.
fn restore_stem(stem: &str) -> String {
    let with_e = format!("{stem}e");
    if KNOWN_VERBS.contains(&with_e.as_str()) {
        return with_e;
    }
    if KNOWN_VERBS.contains(&stem) {
        return stem.to_string();
    }
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n >= 3 {
        let (a, b) = (bytes[n - 2], bytes[n - 1]);
        if a == b && is_consonant(b) && !matches!(b, b'f' | b'l' | b's' | b'z') {
            return stem[..n - 1].to_string();
        }
        // travell, controll; not call, install
        if a == b'l'
            && b == b'l'
            && matches!(bytes[n - 3], b'e' | b'o')
            && vowel_groups(bytes) > 1
        {
            return stem[..n - 1].to_string();
        }
    }
    if needs_final_e(stem) {
        return with_e;
    }
    stem.to_string()
}

/// Whether an undoubled stem is missing the `e` of its base form.
///
/// Verb base forms do not end in `c`, `u` or `v`, nor in a consonant
/// followed by `l` (`handl`). A one-syllable stem ending consonant, vowel,
/// consonant (`vot`, `hop`) would have doubled its last letter if it had no
/// `e`; the same holds for longer stems ending that way in `d` (`decid`).
fn needs_final_e(stem: &str) -> bool {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    let Some(&last) = bytes.last() else {
        return false;
    };
    if matches!(last, b'c' | b'u' | b'v') {
        return true;
    }
    if E_STEM_ENDINGS.iter().any(|e| stem.ends_with(e)) {
        return true;
    }
    if n < 3 {
        return false;
    }
    let before = bytes[n - 2];
    if last == b'l' && is_consonant(before) && !matches!(before, b'l' | b'r' | b'w' | b'y') {
        return true;
    }
    // admir, secur; not repair, pour
    if matches!(&bytes[n - 2..], [b'i' | b'u', b'r']) && is_consonant(bytes[n - 3]) {
        return true;
    }
    let cvc = is_consonant(bytes[n - 3])
        && is_vowel(before)
        && is_consonant(last)
        && !matches!(last, b'w' | b'x' | b'y');
    cvc && (last == b'd' || vowel_groups(bytes) == 1)
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn is_consonant(b: u8) -> bool {
    b.is_ascii_lowercase() && !is_vowel(b)
}

fn vowel_groups(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .zip(std::iter::once(&b' ').chain(bytes.iter()))
        .filter(|&(&b, &prev)| is_vowel(b) && !is_vowel(prev))
        .count()
}

fn adjective_base(word: &str) -> String {
    if let Some(base) = lookup(IRREGULAR_ADJECTIVES, word) {
        return base.to_string();
    }
    let len = word.len();
    if len > 5 && word.ends_with("iest") {
        return format!("{}y", &word[..len - 4]);
    }
    if len > 5 && word.ends_with("ier") {
        return format!("{}y", &word[..len - 3]);
    }
    word.to_string()
}
