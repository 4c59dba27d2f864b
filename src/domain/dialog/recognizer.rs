//! Recognizers turn raw user text into typed slot values.
//!
//! A recognizer returns every candidate parse it finds, ordered by position
//! in the utterance. The prompt takes the first candidate and asks the
//! recognizer to resolve it into a [`ScalarValue`].

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

use super::value::ScalarValue;

/// One candidate parse of an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The span of the utterance that matched.
    pub text: String,
    /// Normalized resolution, e.g. `"8.5"` for `"8,5"` in a French locale.
    pub resolution: String,
}

impl Candidate {
    fn new(text: impl Into<String>, resolution: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            resolution: resolution.into(),
        }
    }
}

/// Outcome of recognizing one utterance, handed to validators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionResult {
    pub value: Option<ScalarValue>,
}

impl RecognitionResult {
    pub fn succeeded(&self) -> bool {
        self.value.is_some()
    }
}

/// Pluggable per-slot recognizer.
pub trait Recognizer: Send + Sync + fmt::Debug {
    /// Returns all candidate parses, empty if none.
    fn recognize(&self, text: &str, locale: &str) -> Vec<Candidate>;

    /// Resolves a candidate into a typed value.
    fn resolve(&self, candidate: &Candidate) -> ScalarValue;

    /// Recognizes an utterance and resolves its first candidate.
    fn recognize_value(&self, text: &str, locale: &str) -> RecognitionResult {
        let value = self
            .recognize(text, locale)
            .first()
            .map(|candidate| self.resolve(candidate));
        RecognitionResult { value }
    }
}

/// Accepts any non-blank text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRecognizer;

impl Recognizer for TextRecognizer {
    fn recognize(&self, text: &str, _locale: &str) -> Vec<Candidate> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        vec![Candidate::new(trimmed, trimmed)]
    }

    fn resolve(&self, candidate: &Candidate) -> ScalarValue {
        ScalarValue::Text(candidate.resolution.clone())
    }
}

/// Parses a numeric resolution.
///
/// A candidate whose resolution does not parse, or parses to NaN or an
/// infinity, resolves to 0 so a "successful" recognition always carries a
/// finite number.
pub fn resolve_number(resolution: &str) -> f64 {
    resolution
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

static EN_NUMBER_WORDS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
        "eighteen", "nineteen", "twenty",
    ]
    .into_iter()
    .zip(0..)
    .collect()
});

static FR_NUMBER_WORDS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    [
        "zéro", "un", "deux", "trois", "quatre", "cinq", "six", "sept", "huit", "neuf", "dix",
        "onze", "douze", "treize", "quatorze", "quinze", "seize", "dix-sept", "dix-huit",
        "dix-neuf", "vingt",
    ]
    .into_iter()
    .zip(0..)
    .collect()
});

const COMMA_DECIMAL_LANGUAGES: &[&str] = &["fr", "de", "es", "it", "pt", "nl"];

fn language(locale: &str) -> String {
    locale
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Recognizes digit literals and small number words.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberRecognizer;

impl NumberRecognizer {
    fn decimal_separator(locale: &str) -> char {
        if COMMA_DECIMAL_LANGUAGES.contains(&language(locale).as_str()) {
            ','
        } else {
            '.'
        }
    }

    fn number_words(locale: &str) -> &'static HashMap<&'static str, u32> {
        match language(locale).as_str() {
            "fr" => &*FR_NUMBER_WORDS,
            _ => &*EN_NUMBER_WORDS,
        }
    }

    /// Digit literals as (byte offset, candidate).
    fn digit_literals(text: &str, separator: char) -> Vec<(usize, Candidate)> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut found = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let (start, c) = chars[i];
            let negative = c == '-'
                && chars.get(i + 1).is_some_and(|(_, next)| next.is_ascii_digit())
                && (i == 0 || chars[i - 1].1.is_whitespace());

            if !c.is_ascii_digit() && !negative {
                i += 1;
                continue;
            }

            let mut j = if negative { i + 1 } else { i };
            while j < chars.len() && chars[j].1.is_ascii_digit() {
                j += 1;
            }
            if j + 1 < chars.len() && chars[j].1 == separator && chars[j + 1].1.is_ascii_digit() {
                j += 1;
                while j < chars.len() && chars[j].1.is_ascii_digit() {
                    j += 1;
                }
            }

            let end = chars.get(j).map(|(offset, _)| *offset).unwrap_or(text.len());
            let literal = &text[start..end];
            found.push((start, Candidate::new(literal, literal.replace(separator, "."))));
            i = j;
        }

        found
    }

    /// Number words as (byte offset, candidate).
    fn word_literals(text: &str, locale: &str) -> Vec<(usize, Candidate)> {
        let words = Self::number_words(locale);
        let mut found = Vec::new();
        let mut start = None;

        // Offsets index the original text so they line up with digit literals.
        for (index, c) in text.char_indices().chain([(text.len(), ' ')]) {
            let in_word = c.is_alphabetic() || c == '-';
            match (start, in_word) {
                (None, true) => start = Some(index),
                (Some(from), false) => {
                    let token = &text[from..index];
                    if let Some(value) = words.get(token.to_lowercase().as_str()) {
                        found.push((from, Candidate::new(token, value.to_string())));
                    }
                    start = None;
                }
                _ => {}
            }
        }

        found
    }
}

impl Recognizer for NumberRecognizer {
    fn recognize(&self, text: &str, locale: &str) -> Vec<Candidate> {
        let mut found = Self::digit_literals(text, Self::decimal_separator(locale));
        found.extend(Self::word_literals(text, locale));
        found.sort_by_key(|(offset, _)| *offset);
        found.into_iter().map(|(_, candidate)| candidate).collect()
    }

    fn resolve(&self, candidate: &Candidate) -> ScalarValue {
        ScalarValue::Number(resolve_number(&candidate.resolution))
    }
}

/// Picks one of a fixed list of choices.
///
/// Matches the choice text exactly (ignoring case), by 1-based ordinal,
/// or by the choice text appearing in the utterance.
#[derive(Debug, Clone, Default)]
pub struct ChoiceRecognizer {
    choices: Vec<String>,
}

impl ChoiceRecognizer {
    pub fn new(choices: Vec<String>) -> Self {
        Self { choices }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl Recognizer for ChoiceRecognizer {
    fn recognize(&self, text: &str, _locale: &str) -> Vec<Candidate> {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }

        if let Some(choice) = self
            .choices
            .iter()
            .find(|choice| choice.to_lowercase() == normalized)
        {
            return vec![Candidate::new(text.trim(), choice.clone())];
        }

        if let Ok(ordinal) = normalized.parse::<usize>() {
            if let Some(choice) = ordinal.checked_sub(1).and_then(|i| self.choices.get(i)) {
                return vec![Candidate::new(text.trim(), choice.clone())];
            }
        }

        let mut contained: Vec<(usize, &String)> = self
            .choices
            .iter()
            .filter_map(|choice| {
                normalized
                    .find(&choice.to_lowercase())
                    .map(|offset| (offset, choice))
            })
            .collect();
        contained.sort_by_key(|(offset, choice)| (*offset, std::cmp::Reverse(choice.len())));

        contained
            .into_iter()
            .map(|(_, choice)| Candidate::new(choice.clone(), choice.clone()))
            .collect()
    }

    fn resolve(&self, candidate: &Candidate) -> ScalarValue {
        let index = self
            .choices
            .iter()
            .position(|choice| *choice == candidate.resolution)
            .unwrap_or(0);
        ScalarValue::Choice {
            value: candidate.resolution.clone(),
            index,
        }
    }
}
