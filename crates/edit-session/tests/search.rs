//! Incremental find behavior: wraparound, direction-dependent cursor semantics, option
//! changes, and the session-level highlight/caret/status side effects.

mod common;

use common::TestHosts;
use edit_session::{FindOutcome, FindState, SearchOptions, Session};
use pretty_assertions::assert_eq;

fn found(start: usize, end: usize, wrapped: bool) -> FindOutcome {
    FindOutcome::Found {
        start,
        end,
        wrapped,
    }
}

fn case_insensitive() -> SearchOptions {
    SearchOptions {
        case_sensitive: false,
        ..SearchOptions::default()
    }
}

#[test]
fn forward_steps_through_occurrences_and_wraps() {
    let text = "ab..ab";
    let mut find = FindState::new();
    let options = SearchOptions::default();

    assert_eq!(find.next(text, "ab", options).unwrap(), found(0, 2, false));
    assert_eq!(find.next(text, "ab", options).unwrap(), found(4, 6, false));
    // Past the last occurrence the search restarts from the top.
    assert_eq!(find.next(text, "ab", options).unwrap(), found(0, 2, true));
}

#[test]
fn miss_resets_the_cursor_to_the_document_start() {
    let mut find = FindState::new();
    let options = SearchOptions::default();

    assert_eq!(find.next("abc", "foo", options).unwrap(), FindOutcome::NotFound);
    assert_eq!(find.cursor(), 0);

    // Same query over edited text finds the new occurrence from the start.
    assert_eq!(
        find.next("foo bar", "foo", options).unwrap(),
        found(0, 3, false)
    );
}

#[test]
fn changing_the_query_starts_over_from_the_top() {
    let text = "one two one two";
    let mut find = FindState::new();
    let options = SearchOptions::default();

    assert_eq!(find.next(text, "two", options).unwrap(), found(4, 7, false));
    // A different query must not reuse the old cursor.
    assert_eq!(find.next(text, "one", options).unwrap(), found(0, 3, false));
}

#[test]
fn changing_options_starts_over_from_the_top() {
    let text = "ab ab";
    let mut find = FindState::new();

    assert_eq!(
        find.next(text, "ab", SearchOptions::default()).unwrap(),
        found(0, 2, false)
    );
    // Toggling case sensitivity is a fresh pass, not a continuation.
    assert_eq!(
        find.next(text, "ab", case_insensitive()).unwrap(),
        found(0, 2, false)
    );
}

#[test]
fn case_folding_is_controlled_by_the_option() {
    let mut find = FindState::new();
    assert_eq!(
        find.next("say X now", "x", case_insensitive()).unwrap(),
        found(4, 5, false)
    );

    let mut find = FindState::new();
    assert_eq!(
        find.next("say X now", "x", SearchOptions::default()).unwrap(),
        FindOutcome::NotFound
    );
}

#[test]
fn backward_returns_to_the_match_just_found() {
    let text = "x ab y ab z";
    let mut find = FindState::new();
    let options = SearchOptions::default();

    assert_eq!(find.next(text, "ab", options).unwrap(), found(2, 4, false));
    // Backward immediately after forward lands on the same match, not the one before it.
    assert_eq!(
        find.prev(text, 4, "ab", options).unwrap(),
        found(2, 4, false)
    );
    // And a further backward step wraps to the last occurrence.
    assert_eq!(find.prev(text, 4, "ab", options).unwrap(), found(7, 9, true));
}

#[test]
fn backward_starts_from_the_caret_for_a_fresh_query() {
    let text = "ab ab ab";
    let mut find = FindState::new();
    let options = SearchOptions::default();

    // Caret sits after the second occurrence; the fresh backward search finds it.
    assert_eq!(
        find.prev(text, 5, "ab", options).unwrap(),
        found(3, 5, false)
    );
    assert_eq!(
        find.prev(text, 5, "ab", options).unwrap(),
        found(0, 2, false)
    );
    // Before the first occurrence the search wraps to the document end.
    assert_eq!(find.prev(text, 5, "ab", options).unwrap(), found(6, 8, true));
}

#[test]
fn empty_query_means_no_active_search() {
    let mut find = FindState::new();
    let options = SearchOptions::default();
    find.next("ab", "ab", options).unwrap();
    assert_eq!(find.query(), "ab");

    assert_eq!(find.next("ab", "", options).unwrap(), FindOutcome::NotFound);
    assert_eq!(find.query(), "");
    assert_eq!(find.cursor(), 0);
}

#[test]
fn offsets_are_character_based() {
    let text = "héllo wörld wörld";
    let mut find = FindState::new();
    let options = SearchOptions::default();

    assert_eq!(find.next(text, "wörld", options).unwrap(), found(6, 11, false));
    assert_eq!(
        find.next(text, "wörld", options).unwrap(),
        found(12, 17, false)
    );
}

#[test]
fn whole_word_skips_embedded_matches() {
    let options = SearchOptions {
        whole_word: true,
        ..SearchOptions::default()
    };
    let mut find = FindState::new();
    assert_eq!(
        find.next("scab ab abs", "ab", options).unwrap(),
        found(5, 7, false)
    );
    assert_eq!(
        find.next("scab ab abs", "ab", options).unwrap(),
        found(5, 7, true)
    );
}

#[test]
fn regex_queries_match_patterns() {
    let options = SearchOptions {
        regex: true,
        ..SearchOptions::default()
    };
    let mut find = FindState::new();
    assert_eq!(
        find.next("v1 v22 v333", r"v\d\d", options).unwrap(),
        found(3, 6, false)
    );
}

// --- Session-level wiring: highlight, caret, reveal, status ---

fn session_with(text: &str) -> (Session, TestHosts, edit_session::DocumentId) {
    let mut th = TestHosts::default();
    let mut session = Session::new();
    let id = session.new_untitled(&mut th.hosts());
    session.document_mut(id).unwrap().set_text(text);
    (session, th, id)
}

#[test]
fn find_next_highlights_and_moves_the_caret_to_the_match_end() {
    let (mut session, mut th, id) = session_with("ab..ab");
    let outcome = session
        .find_next_in_active("ab", SearchOptions::default(), &mut th.hosts())
        .unwrap();

    assert_eq!(outcome, found(0, 2, false));
    assert_eq!(th.view.highlight, Some((id, 0, 2)));
    assert_eq!(th.view.carets.get(&id), Some(&2));
    assert_eq!(th.view.revealed.last(), Some(&(id, 0)));
    assert_eq!(th.status.last_status(), "Found: 'ab'");
}

#[test]
fn find_prev_moves_the_caret_to_the_match_start() {
    let (mut session, mut th, id) = session_with("ab..ab");
    session
        .find_next_in_active("ab", SearchOptions::default(), &mut th.hosts())
        .unwrap();
    let outcome = session
        .find_prev_in_active("ab", SearchOptions::default(), &mut th.hosts())
        .unwrap();

    assert_eq!(outcome, found(0, 2, false));
    assert_eq!(th.view.carets.get(&id), Some(&0));
}

#[test]
fn wrapped_and_missing_matches_are_reported() {
    let (mut session, mut th, _id) = session_with("ab..ab");
    let options = SearchOptions::default();
    session.find_next_in_active("ab", options, &mut th.hosts()).unwrap();
    session.find_next_in_active("ab", options, &mut th.hosts()).unwrap();
    session.find_next_in_active("ab", options, &mut th.hosts()).unwrap();
    assert_eq!(th.status.last_status(), "Wrapped around. Found: 'ab'");

    session.find_next_in_active("zz", options, &mut th.hosts()).unwrap();
    assert_eq!(th.status.last_status(), "'zz' not found.");
    assert_eq!(th.view.highlight, None);
}

#[test]
fn empty_query_clears_the_highlight() {
    let (mut session, mut th, id) = session_with("ab");
    session
        .find_next_in_active("ab", SearchOptions::default(), &mut th.hosts())
        .unwrap();
    assert_eq!(th.view.highlight, Some((id, 0, 2)));

    session
        .find_next_in_active("", SearchOptions::default(), &mut th.hosts())
        .unwrap();
    assert_eq!(th.view.highlight, None);
}

#[test]
fn invalid_regex_is_reported_as_an_error() {
    let (mut session, mut th, _id) = session_with("text");
    let options = SearchOptions {
        regex: true,
        ..SearchOptions::default()
    };
    let result = session.find_next_in_active("(unclosed", options, &mut th.hosts());
    assert!(result.is_err());
    assert_eq!(th.status.errors.len(), 1);
}

#[test]
fn switching_tabs_resets_the_search() {
    let (mut session, mut th, first) = session_with("ab..ab");
    let options = SearchOptions::default();
    // Step past the first occurrence so the cursor is mid-document.
    session.find_next_in_active("ab", options, &mut th.hosts()).unwrap();
    session.find_next_in_active("ab", options, &mut th.hosts()).unwrap();

    let second = session.new_untitled(&mut th.hosts());
    session.document_mut(second).unwrap().set_text("ab");

    // A fresh document starts a fresh search: first match, no wraparound.
    let outcome = session
        .find_next_in_active("ab", options, &mut th.hosts())
        .unwrap();
    assert_eq!(outcome, found(0, 2, false));

    // Switching back also starts over.
    session.activate(first, &mut th.hosts()).unwrap();
    let outcome = session
        .find_next_in_active("ab", options, &mut th.hosts())
        .unwrap();
    assert_eq!(outcome, found(0, 2, false));
}

#[test]
fn find_with_no_documents_is_a_quiet_no_op() {
    let mut th = TestHosts::default();
    let mut session = Session::new();
    let outcome = session
        .find_next_in_active("ab", SearchOptions::default(), &mut th.hosts())
        .unwrap();
    assert_eq!(outcome, FindOutcome::NotFound);
    assert!(th.status.statuses.is_empty());
}
