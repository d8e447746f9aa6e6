//! Search primitives and the incremental find state machine.
//!
//! The primitives ([`find_next`], [`find_prev`]) are stateless queries over a `&str` snapshot,
//! using **character offsets** (not byte offsets) for all public inputs/outputs. Plain queries
//! are escaped and compiled into a regex so that case folding and whole-word matching share one
//! code path with user-supplied regex patterns.
//!
//! [`FindState`] layers the stateful part on top: a cursor at the boundary of the last match
//! that makes repeated forward/backward calls step strictly through occurrences, wrapping
//! around the document once before reporting a miss.

use regex::{Regex, RegexBuilder};

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, matches only whole words (ASCII-alphanumeric and `_`).
    pub whole_word: bool,
    /// If `true`, treats the query as a regex pattern.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

/// A match returned by the search APIs, expressed as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl SearchMatch {
    /// Returns the length of the match in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The provided regex pattern failed to compile.
    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}

#[derive(Debug)]
struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte
            .get(clamped)
            .cloned()
            .unwrap_or(self.text_len)
    }

    fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }

    fn char_at(&self, text: &str, char_offset: usize) -> Option<char> {
        if char_offset >= self.char_count() {
            return None;
        }
        let start = self.char_to_byte[char_offset];
        let end = self.char_to_byte[char_offset + 1];
        text.get(start..end)?.chars().next()
    }
}

fn compile_search_regex(query: &str, options: SearchOptions) -> Result<Regex, SearchError> {
    let pattern = if options.regex {
        query.to_string()
    } else {
        regex::escape(query)
    };

    RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .multi_line(true)
        .build()
        .map_err(SearchError::InvalidRegex)
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

fn is_whole_word(text: &str, index: &CharIndex, m: SearchMatch) -> bool {
    if m.is_empty() {
        return false;
    }

    let before = if m.start == 0 {
        None
    } else {
        index.char_at(text, m.start.saturating_sub(1))
    };
    let after = index.char_at(text, m.end);

    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Find the next occurrence of `query` in `text`, searching forward from `from_char`.
///
/// - Returns `Ok(None)` if no match is found (or if `query` is empty).
/// - Match ranges are character offsets and are half-open (`[start, end)`).
pub fn find_next(
    text: &str,
    query: &str,
    options: SearchOptions,
    from_char: usize,
) -> Result<Option<SearchMatch>, SearchError> {
    if query.is_empty() {
        return Ok(None);
    }

    let re = compile_search_regex(query, options)?;
    let index = CharIndex::new(text);

    let mut start_char = from_char.min(index.char_count());
    loop {
        let start_byte = index.char_to_byte(start_char);
        let Some(m) = re.find_at(text, start_byte) else {
            return Ok(None);
        };

        let start = index.byte_to_char(m.start());
        let end = index.byte_to_char(m.end());
        let candidate = SearchMatch { start, end };

        if candidate.is_empty() {
            if end >= index.char_count() {
                return Ok(None);
            }
            start_char = end + 1;
            continue;
        }

        if options.whole_word && !is_whole_word(text, &index, candidate) {
            start_char = candidate.end;
            continue;
        }

        return Ok(Some(candidate));
    }
}

/// Find the previous occurrence of `query` in `text`: the last match ending at or before
/// `from_char`.
///
/// - Returns `Ok(None)` if no match is found (or if `query` is empty).
/// - Match ranges are character offsets and are half-open (`[start, end)`).
pub fn find_prev(
    text: &str,
    query: &str,
    options: SearchOptions,
    from_char: usize,
) -> Result<Option<SearchMatch>, SearchError> {
    if query.is_empty() {
        return Ok(None);
    }

    let re = compile_search_regex(query, options)?;
    let index = CharIndex::new(text);

    let limit_char = from_char.min(index.char_count());
    let limit_byte = index.char_to_byte(limit_char);

    let mut last: Option<SearchMatch> = None;
    for m in re.find_iter(&text[..limit_byte]) {
        let start = index.byte_to_char(m.start());
        let end = index.byte_to_char(m.end());
        let candidate = SearchMatch { start, end };

        if candidate.is_empty() {
            continue;
        }
        if options.whole_word && !is_whole_word(text, &index, candidate) {
            continue;
        }

        last = Some(candidate);
    }

    Ok(last)
}

/// Outcome of one incremental find step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOutcome {
    /// A match was found and the cursor moved to its boundary.
    Found {
        /// Inclusive start character offset of the match.
        start: usize,
        /// Exclusive end character offset of the match.
        end: usize,
        /// `true` if the match was only found after wrapping around the document.
        wrapped: bool,
    },
    /// No occurrence anywhere in the document.
    NotFound,
}

/// Incremental find state for the active document.
///
/// The cursor sits at the boundary of the last match: the position *after* a forward match and
/// the position *before* a backward match. The asymmetry makes repeated calls in either
/// direction step strictly through occurrences without re-matching the same one, while a
/// backward step immediately after a forward step lands back on (at most) the same match.
///
/// Changing the query or any search option discards the cursor: stale offsets from a different
/// query or folding mode are never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindState {
    query: String,
    options: SearchOptions,
    cursor: usize,
}

impl Default for FindState {
    fn default() -> Self {
        Self::new()
    }
}

impl FindState {
    /// Create a fresh find state with no active query.
    pub fn new() -> Self {
        Self {
            query: String::new(),
            options: SearchOptions::default(),
            cursor: 0,
        }
    }

    /// The last query searched for; empty means no active search.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The cursor the next search starts from (character offset).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Forget the active search entirely. Called when the active document changes, since
    /// match offsets are meaningless in another buffer.
    pub fn reset(&mut self) {
        self.query.clear();
        self.cursor = 0;
    }

    fn retarget(&mut self, query: &str, options: SearchOptions, cursor: usize) {
        if query == self.query && options == self.options {
            return;
        }
        self.query = query.to_string();
        self.options = options;
        self.cursor = cursor;
    }

    /// Step forward to the next occurrence of `query` in `text`.
    ///
    /// Searches from the cursor to the end; on a miss, retries from the document start up to
    /// the original cursor and flags the result as wrapped. A full miss resets the cursor to
    /// the document start.
    pub fn next(
        &mut self,
        text: &str,
        query: &str,
        options: SearchOptions,
    ) -> Result<FindOutcome, SearchError> {
        if query.is_empty() {
            self.reset();
            return Ok(FindOutcome::NotFound);
        }

        // A new query or changed options start over from the document start.
        self.retarget(query, options, 0);
        let origin = self.cursor;

        if let Some(m) = find_next(text, query, options, origin)? {
            self.cursor = m.end;
            return Ok(FindOutcome::Found {
                start: m.start,
                end: m.end,
                wrapped: false,
            });
        }

        if let Some(m) = find_next(text, query, options, 0)?
            && m.start < origin
        {
            self.cursor = m.end;
            return Ok(FindOutcome::Found {
                start: m.start,
                end: m.end,
                wrapped: true,
            });
        }

        self.cursor = 0;
        Ok(FindOutcome::NotFound)
    }

    /// Step backward to the previous occurrence of `query` in `text`.
    ///
    /// A new query starts from `caret` (the current insertion point). Searches from the cursor
    /// back to the document start; on a miss, retries from the document end down to the
    /// original cursor and flags the result as wrapped. A full miss resets the cursor to
    /// `caret`.
    pub fn prev(
        &mut self,
        text: &str,
        caret: usize,
        query: &str,
        options: SearchOptions,
    ) -> Result<FindOutcome, SearchError> {
        if query.is_empty() {
            self.reset();
            return Ok(FindOutcome::NotFound);
        }

        self.retarget(query, options, caret);
        let origin = self.cursor;

        if let Some(m) = find_prev(text, query, options, origin)? {
            self.cursor = m.start;
            return Ok(FindOutcome::Found {
                start: m.start,
                end: m.end,
                wrapped: false,
            });
        }

        let char_count = text.chars().count();
        if let Some(m) = find_prev(text, query, options, char_count)?
            && m.start >= origin
        {
            self.cursor = m.start;
            return Ok(FindOutcome::Found {
                start: m.start,
                end: m.end,
                wrapped: true,
            });
        }

        self.cursor = caret;
        Ok(FindOutcome::NotFound)
    }
}
