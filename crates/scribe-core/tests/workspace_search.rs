use scribe_core::{SearchOptions, SearchQuery, SplitDirection, Workspace};

fn options() -> SearchOptions {
    SearchOptions::default()
}

#[test]
fn matches_collected_across_documents_in_id_order() {
    let mut ws = Workspace::new();
    let (doc_a, view_a) = ws.open_untitled(None);
    ws.type_text(view_a, "alpha beta alpha").unwrap();
    let (doc_b, view_b) = ws.open_untitled(None);
    ws.type_text(view_b, "beta alpha").unwrap();

    let query = SearchQuery::new("alpha", options()).unwrap();
    let hits = ws.search_open_documents(&query);
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].0, doc_a);
    assert_eq!(hits[1].0, doc_a);
    assert_eq!(hits[2].0, doc_b);
    assert_eq!(hits[2].1.start, 5);
    assert_eq!(hits[2].1.end, 10);
}

#[test]
fn matches_are_char_offsets_on_multibyte_text() {
    let mut ws = Workspace::new();
    let (doc_id, view) = ws.open_untitled(None);
    ws.type_text(view, "日本語 find 日本語 find").unwrap();

    let query = SearchQuery::new("find", options()).unwrap();
    let hits = ws.search_open_documents(&query);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].1.start, 4);
    assert_eq!(hits[1].1.start, 13);

    // The reported range slices the document correctly.
    let doc = ws.document(doc_id).unwrap();
    assert_eq!(doc.slice(hits[1].1.start, hits[1].1.len()).unwrap(), "find");
}

#[test]
fn replace_all_updates_every_view() {
    let mut ws = Workspace::new();
    let (doc_id, view_a) = ws.open_untitled(Some(40));
    ws.type_text(view_a, "old habits, old code, old tests").unwrap();
    let view_b = ws.split_view(view_a, SplitDirection::Horizontal).unwrap();
    ws.move_cursor(view_b, 31, false).unwrap();

    let count = ws.replace_all(doc_id, "old", options(), "new").unwrap();
    assert_eq!(count, 3);
    assert_eq!(
        ws.document(doc_id).unwrap().text(),
        "new habits, new code, new tests"
    );
    for view in [view_a, view_b] {
        assert_eq!(
            ws.view(view).unwrap().layout().line_text(0),
            Some("new habits, new code, new tests")
        );
    }
}

#[test]
fn replace_all_with_regex_and_different_lengths() {
    let mut ws = Workspace::new();
    let (doc_id, view) = ws.open_untitled(None);
    ws.type_text(view, "x=1 y=22 z=333").unwrap();

    let regex = SearchOptions {
        regex: true,
        ..options()
    };
    let count = ws.replace_all(doc_id, r"\d+", regex, "0").unwrap();
    assert_eq!(count, 3);
    assert_eq!(ws.document(doc_id).unwrap().text(), "x=0 y=0 z=0");

    // One undo restores all three.
    assert!(ws.undo(view).unwrap());
    assert_eq!(ws.document(doc_id).unwrap().text(), "x=1 y=22 z=333");
}

#[test]
fn whole_word_search_through_workspace() {
    let mut ws = Workspace::new();
    let (_, view) = ws.open_untitled(None);
    ws.type_text(view, "log logger log_file dialog log").unwrap();

    let query = SearchQuery::new(
        "log",
        SearchOptions {
            whole_word: true,
            ..options()
        },
    )
    .unwrap();
    let hits = ws.search_open_documents(&query);
    let starts: Vec<usize> = hits.iter().map(|(_, m)| m.start).collect();
    assert_eq!(starts, vec![0, 27]);
}

#[test]
fn replace_all_without_matches_is_not_an_edit() {
    let mut ws = Workspace::new();
    let (doc_id, view) = ws.open_untitled(None);
    ws.type_text(view, "stable").unwrap();
    ws.commit_undo_boundary(view).unwrap();
    let revision = ws.document(doc_id).unwrap().revision();

    let count = ws.replace_all(doc_id, "missing", options(), "x").unwrap();
    assert_eq!(count, 0);
    assert_eq!(ws.document(doc_id).unwrap().revision(), revision);
}
