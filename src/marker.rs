// src/marker.rs
//
// Invisible integer markers: each decimal digit maps to a zero-width code
// point, most significant digit first. Text rendered by a client shows nothing.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

/// Digit alphabet, index = digit value.
pub const DIGITS: [char; 10] = [
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{FEFF}', // zero width no-break space
    '\u{2061}', // function application
    '\u{2062}', // invisible times
    '\u{2063}', // invisible separator
    '\u{2064}', // invisible plus
    '\u{034F}', // combining grapheme joiner
];

static DIGIT_OF: Lazy<HashMap<char, u8>> = Lazy::new(|| {
    DIGITS
        .iter()
        .enumerate()
        .map(|(d, &c)| (c, d as u8))
        .collect()
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkerError {
    #[error("marker value does not fit in 64 bits")]
    Overflow,
}

pub fn is_marker(c: char) -> bool {
    DIGIT_OF.contains_key(&c)
}

pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return DIGITS[0].to_string();
    }
    let mut digits = Vec::with_capacity(20);
    while n > 0 {
        digits.push(DIGITS[(n % 10) as usize]);
        n /= 10;
    }
    digits.iter().rev().collect()
}

/// Read the marker digits in `s`, skipping every other char.
/// A string without markers decodes to 0.
pub fn decode(s: &str) -> Result<u64, MarkerError> {
    s.chars()
        .filter_map(|c| DIGIT_OF.get(&c))
        .try_fold(0u64, |acc, &d| {
            acc.checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(d)))
                .ok_or(MarkerError::Overflow)
        })
}

/// Maximal runs of marker chars, in order of appearance.
pub fn find_sequences(s: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in s.char_indices() {
        match (is_marker(c), start) {
            (true, None) => start = Some(i),
            (false, Some(st)) => {
                runs.push(&s[st..i]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(st) = start {
        runs.push(&s[st..]);
    }
    runs
}

pub fn strip(s: &str) -> String {
    s.chars().filter(|&c| !is_marker(c)).collect()
}
