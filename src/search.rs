use regex::Regex;

use crate::record::Record;

/// One match inside the visible window: the line's index within the
/// window plus the matched column span.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    pub line_index: usize,
    pub start_col: usize,
    pub end_col: usize,
}

/// Active search pattern, applied to whatever the cache currently serves.
/// Search is chunk-local by design: it never forces stream reads.
#[derive(Default)]
pub struct SearchState {
    pub pattern: Option<Regex>,
    pub pattern_str: String,
}

impl SearchState {
    pub fn set_pattern(&mut self, pattern_str: &str) -> Result<(), String> {
        match Regex::new(pattern_str) {
            Ok(regex) => {
                self.pattern = Some(regex);
                self.pattern_str = pattern_str.to_string();
                Ok(())
            }
            Err(e) => Err(format!("invalid regex: {}", e)),
        }
    }

    pub fn clear(&mut self) {
        self.pattern = None;
        self.pattern_str.clear();
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    /// Column spans of every match in one line of text.
    pub fn match_spans(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.pattern {
            Some(pattern) => pattern
                .find_iter(text)
                .map(|m| (m.start(), m.end()))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// All matches across a window of records.
pub fn search_records(pattern: &Regex, records: &[Record]) -> Vec<SearchMatch> {
    let mut matches = Vec::new();
    for (line_index, record) in records.iter().enumerate() {
        for mat in pattern.find_iter(&record.text) {
            matches.push(SearchMatch {
                line_index,
                start_col: mat.start(),
                end_col: mat.end(),
            });
        }
    }
    matches
}
