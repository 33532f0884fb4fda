//! Plain-text word lists: one `<term> <count>` pair per line.

use crate::dictionary::FrequencyDictionary;
use crate::error::{FdicError, Result};

/// Parse a word list. Blank lines are skipped; the term is everything before
/// the first space.
pub fn parse_word_list(text: &str) -> Result<FrequencyDictionary> {
    let mut dict = FrequencyDictionary::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let (term, count) = line.split_once(' ').ok_or_else(|| FdicError::WordList {
            line: i + 1,
            reason: "expected \"<term> <count>\"".to_string(),
        })?;
        let count = count.trim().parse::<u64>().map_err(|e| FdicError::WordList {
            line: i + 1,
            reason: format!("invalid count {:?}: {}", count, e),
        })?;
        dict.insert(term, count);
    }
    Ok(dict)
}

/// Render `dict` as `<term> <count>` lines in iteration order.
pub fn format_word_list(dict: &FrequencyDictionary) -> String {
    let mut text = String::new();
    for (term, frequency) in dict.iter() {
        text.push_str(&format!("{} {}\n", term, frequency));
    }
    text
}
