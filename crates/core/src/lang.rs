use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Pane {
    Ja,
    En,
}

impl Pane {
    pub fn other(self) -> Self {
        match self {
            Pane::Ja => Pane::En,
            Pane::En => Pane::Ja,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    JaToEn,
    EnToJa,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::JaToEn, Direction::EnToJa];

    pub fn source_pane(self) -> Pane {
        match self {
            Direction::JaToEn => Pane::Ja,
            Direction::EnToJa => Pane::En,
        }
    }

    pub fn target_pane(self) -> Pane {
        self.source_pane().other()
    }

    pub fn for_source_pane(pane: Pane) -> Self {
        match pane {
            Pane::Ja => Direction::JaToEn,
            Pane::En => Direction::EnToJa,
        }
    }

    pub fn source_lang(self) -> &'static str {
        match self {
            Direction::JaToEn => "ja",
            Direction::EnToJa => "en",
        }
    }

    pub fn target_lang(self) -> &'static str {
        match self {
            Direction::JaToEn => "en",
            Direction::EnToJa => "ja",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source_lang(), self.target_lang())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown direction {0:?}, expected ja-en or en-ja")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja-en" | "ja2en" => Ok(Direction::JaToEn),
            "en-ja" | "en2ja" => Ok(Direction::EnToJa),
            other => Err(ParseDirectionError(other.to_owned())),
        }
    }
}

fn is_japanese_char(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}' // hiragana, katakana
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}')
}

/// True when the text contains any kana or CJK ideograph.
pub fn is_japanese(text: &str) -> bool {
    text.chars().any(is_japanese_char)
}
