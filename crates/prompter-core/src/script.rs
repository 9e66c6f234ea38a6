//! Script text and its word units
//!
//! A script is split into an ordered sequence of tokens: runs of non-whitespace
//! and runs of whitespace alternate, so joining the tokens gives back the
//! original text exactly. Token indices are stable for the life of a `Script`.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Script shown when no file is supplied
pub const DEFAULT_SCRIPT: &str = "Like what you see?

Check out our Teleprompter App! Level up your speaking today and download the Teleprompter App. You can even record directly in there. What are you waiting for?";

/// Reading pace used for time estimates
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 150;

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// One token of the script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub index: usize,
    pub text: String,
    pub is_whitespace: bool,
}

impl Word {
    /// Number of line breaks carried by a whitespace token
    pub fn line_breaks(&self) -> usize {
        if self.is_whitespace {
            self.text.matches('\n').count()
        } else {
            0
        }
    }
}

/// Immutable script text plus its tokenization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    text: String,
    words: Vec<Word>,
}

/// Summary shown by `prompter stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScriptStats {
    pub words: usize,
    pub tokens: usize,
    pub characters: usize,
    pub estimated_minutes: u32,
}

impl Default for Script {
    fn default() -> Self {
        Self::new(DEFAULT_SCRIPT)
    }
}

impl Script {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let words = tokenize(&text);
        Self { text, words }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Join the tokens back together
    pub fn reconstruct(&self) -> String {
        self.words.iter().map(|w| w.text.as_str()).collect()
    }

    /// Word count and reading-time estimate at the given pace
    pub fn stats(&self, words_per_minute: u32) -> ScriptStats {
        let words = self.words.iter().filter(|w| !w.is_whitespace).count();
        let wpm = words_per_minute.max(1) as usize;
        ScriptStats {
            words,
            tokens: self.words.len(),
            characters: self.text.chars().count(),
            estimated_minutes: words.div_ceil(wpm) as u32,
        }
    }
}

fn tokenize(text: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut push = |slice: &str, is_whitespace: bool| {
        if !slice.is_empty() {
            words.push(Word {
                index: words.len(),
                text: slice.to_string(),
                is_whitespace,
            });
        }
    };

    let mut cursor = 0;
    for m in whitespace_run().find_iter(text) {
        push(&text[cursor..m.start()], false);
        push(m.as_str(), true);
        cursor = m.end();
    }
    push(&text[cursor..], false);

    words
}
