//! `edit-session-highlight-simple` - Simple (regex-based) highlighting helpers.
//!
//! This crate is intended for hosts that want lightweight syntax coloring without a parser or
//! language server. Highlighting is a pure function over the full text: every call recomputes
//! spans from scratch, so callers can rerun it after each edit burst with no incremental state
//! to invalidate.

use regex::Regex;

/// Highlight classification attached to a span. The UI/theme layer maps tags to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightTag {
    /// Language keyword.
    Keyword,
    /// Line comment.
    Comment,
    /// Single-line string literal.
    String,
    /// Triple-quoted (multi-line) string literal.
    MultilineString,
}

/// A highlighted half-open span, in **character offsets** into the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Tag to style the span with.
    pub tag: HighlightTag,
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

/// A single regex highlighting rule.
#[derive(Debug, Clone)]
pub struct RegexRule {
    regex: Regex,
    tag: HighlightTag,
    capture_group: Option<usize>,
}

impl RegexRule {
    pub fn new(pattern: &str, tag: HighlightTag) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            tag,
            capture_group: None,
        })
    }

    /// Highlight only a capture group of each match instead of the whole match.
    pub fn with_capture_group(mut self, group: usize) -> Self {
        self.capture_group = Some(group);
        self
    }

    pub fn tag(&self) -> HighlightTag {
        self.tag
    }
}

/// A simple regex-based syntax highlighter.
///
/// Rules run in order over the whole text; when spans overlap, later rules win at the
/// rendering layer (the span list preserves rule order). It is *not* intended to be a parser.
#[derive(Debug, Clone)]
pub struct RegexHighlighter {
    rules: Vec<RegexRule>,
}

impl RegexHighlighter {
    pub fn new(rules: Vec<RegexRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RegexRule] {
        &self.rules
    }

    /// Run all rules over `text` and return spans (char offsets), in rule order then match
    /// order.
    pub fn highlight(&self, text: &str) -> Vec<HighlightSpan> {
        let mut spans = Vec::new();
        for rule in &self.rules {
            if let Some(group) = rule.capture_group {
                for caps in rule.regex.captures_iter(text) {
                    let Some(m) = caps.get(group) else {
                        continue;
                    };
                    push_span(text, m.start(), m.end(), rule.tag, &mut spans);
                }
            } else {
                for m in rule.regex.find_iter(text) {
                    push_span(text, m.start(), m.end(), rule.tag, &mut spans);
                }
            }
        }
        spans
    }

    /// A small default Python grammar: keywords, `#` comments, and string literals.
    pub fn python_default() -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            RegexRule::new(
                r"\b(?:def|class|if|elif|else|for|while|return|import|from|try|except|finally|with|as|True|False|None|and|or|not|is|in|lambda|global|nonlocal|yield|async|await|pass|break|continue)\b",
                HighlightTag::Keyword,
            )?,
            RegexRule::new(r#"(?s)"{3}.*?"{3}"#, HighlightTag::MultilineString)?,
            RegexRule::new(r"(?s)'{3}.*?'{3}", HighlightTag::MultilineString)?,
            RegexRule::new(r#""[^"\n]*"|'[^'\n]*'"#, HighlightTag::String)?,
            RegexRule::new(r"#[^\n]*", HighlightTag::Comment)?,
        ]))
    }
}

fn push_span(
    text: &str,
    match_start_byte: usize,
    match_end_byte: usize,
    tag: HighlightTag,
    spans: &mut Vec<HighlightSpan>,
) {
    if match_start_byte >= match_end_byte || match_end_byte > text.len() {
        return;
    }

    let start = text[..match_start_byte].chars().count();
    let end = start + text[match_start_byte..match_end_byte].chars().count();
    spans.push(HighlightSpan { tag, start, end });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_with_tag(spans: &[HighlightSpan], tag: HighlightTag) -> Vec<(usize, usize)> {
        spans
            .iter()
            .filter(|span| span.tag == tag)
            .map(|span| (span.start, span.end))
            .collect()
    }

    #[test]
    fn python_keywords_and_comments() {
        let text = "def main():\n    return 1  # done\n";
        let highlighter = RegexHighlighter::python_default().unwrap();
        let spans = highlighter.highlight(text);

        assert_eq!(spans_with_tag(&spans, HighlightTag::Keyword), vec![(0, 3), (16, 22)]);
        assert_eq!(spans_with_tag(&spans, HighlightTag::Comment), vec![(26, 32)]);
    }

    #[test]
    fn strings_and_triple_quoted_strings() {
        let text = "s = 'a'\nd = \"\"\"two\nlines\"\"\"\n";
        let highlighter = RegexHighlighter::python_default().unwrap();
        let spans = highlighter.highlight(text);

        assert!(spans_with_tag(&spans, HighlightTag::String).contains(&(4, 7)));
        assert_eq!(
            spans_with_tag(&spans, HighlightTag::MultilineString),
            vec![(12, 27)]
        );
    }

    #[test]
    fn offsets_are_char_based_for_non_ascii_text() {
        let text = "x = '值'  # 注释\n";
        let highlighter = RegexHighlighter::python_default().unwrap();
        let spans = highlighter.highlight(text);

        assert_eq!(spans_with_tag(&spans, HighlightTag::String), vec![(4, 7)]);
        assert_eq!(spans_with_tag(&spans, HighlightTag::Comment), vec![(9, 13)]);
    }

    #[test]
    fn capture_group_limits_the_span() {
        let rule = RegexRule::new(r"(\w+)\s*=", HighlightTag::Keyword)
            .unwrap()
            .with_capture_group(1);
        let spans = RegexHighlighter::new(vec![rule]).highlight("key = value");
        assert_eq!(spans, vec![HighlightSpan { tag: HighlightTag::Keyword, start: 0, end: 3 }]);
    }

    #[test]
    fn keywords_do_not_match_inside_identifiers() {
        let highlighter = RegexHighlighter::python_default().unwrap();
        let spans = highlighter.highlight("classify = 1");
        assert!(spans_with_tag(&spans, HighlightTag::Keyword).is_empty());
    }
}
