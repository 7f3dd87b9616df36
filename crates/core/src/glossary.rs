//! User-defined term substitutions applied to provider output.
//!
//! Rules run in insertion order and each one rewrites the output of the
//! previous rule, so `a=b` followed by `b=c` turns `a` into `c`.

use crate::lang::Direction;
use regex::{NoExpand, RegexBuilder};

/// Ordered term → replacement rules for one direction. Persisted through
/// [`GlossaryMap::to_text`] so keys stay unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlossaryMap {
    entries: Vec<(String, String)>,
}

impl GlossaryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a rule. An existing term keeps its position and gets the new
    /// replacement, returning the old one.
    pub fn insert<K, V>(&mut self, term: K, replacement: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let term = term.into();
        let replacement = replacement.into();
        match self.entries.iter_mut().find(|(k, _)| *k == term) {
            Some((_, v)) => Some(std::mem::replace(v, replacement)),
            None => {
                self.entries.push((term, replacement));
                None
            }
        }
    }

    pub fn remove(&mut self, term: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == term)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, term: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == term)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parses `term=replacement` lines. Blank lines and `#` comments are
    /// ignored; the first `=` separates term from replacement.
    pub fn parse(text: &str) -> Self {
        let mut map = Self::new();
        for (line_num, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match trimmed.split_once('=') {
                Some((term, replacement)) if !term.trim().is_empty() => {
                    map.insert(term.trim(), replacement.trim());
                }
                _ => {
                    tracing::warn!("ignoring glossary line {}: {}", line_num + 1, line);
                }
            }
        }
        map
    }

    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GlossaryMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Glossaries {
    pub ja_to_en: GlossaryMap,
    pub en_to_ja: GlossaryMap,
}

impl Glossaries {
    pub fn for_direction(&self, direction: Direction) -> &GlossaryMap {
        match direction {
            Direction::JaToEn => &self.ja_to_en,
            Direction::EnToJa => &self.en_to_ja,
        }
    }

    pub fn for_direction_mut(&mut self, direction: Direction) -> &mut GlossaryMap {
        match direction {
            Direction::JaToEn => &mut self.ja_to_en,
            Direction::EnToJa => &mut self.en_to_ja,
        }
    }
}

/// Applies every rule of `map` to `text` in order.
///
/// `EnToJa` matches case-insensitively and requires a word boundary at each end
/// of the term that is an ASCII word character, so `cat` skips `category` while
/// `猫` still matches inside unspaced Japanese. `JaToEn` replaces literal,
/// case-sensitive substrings. Terms are always literal, never patterns.
pub fn apply(text: &str, map: &GlossaryMap, direction: Direction) -> String {
    let mut out = text.to_owned();
    for (term, replacement) in map.iter() {
        if term.is_empty() {
            continue;
        }
        out = match direction {
            Direction::JaToEn => out.replace(term, replacement),
            Direction::EnToJa => replace_whole_word(&out, term, replacement),
        };
    }
    out
}

fn replace_whole_word(text: &str, term: &str, replacement: &str) -> String {
    let boundary = |c: Option<char>| match c {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => r"\b",
        _ => "",
    };
    let pattern = format!(
        "{}{}{}",
        boundary(term.chars().next()),
        regex::escape(term),
        boundary(term.chars().next_back())
    );
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.replace_all(text, NoExpand(replacement)).into_owned(),
        Err(e) => {
            tracing::warn!(term, error = %e, "skipping glossary term");
            text.to_owned()
        }
    }
}
