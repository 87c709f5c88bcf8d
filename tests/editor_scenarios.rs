
use pretty_assertions::assert_eq;
use tape_readline::{
    AutocompleteProvider, CommandAutocompleteProvider, Key, KeyBindings, KeyEvent, LineEditor,
    Modifiers, StaticAutocompleteProvider, Terminal,
};

use screen::{assert_in_sync, prompted, prompted_at_bottom};

fn type_text<T: Terminal>(editor: &mut LineEditor<'_, T>, text: &str) {
    for ch in text.chars() {
        editor.handle(&KeyEvent::from_char(ch)).expect("type");
    }
}

fn press<T: Terminal>(editor: &mut LineEditor<'_, T>, event: KeyEvent, times: usize) {
    for _ in 0..times {
        editor.handle(&event).expect("press");
    }
}

fn history() -> Vec<String> {
    ["ls -a", "dotnet run", "git init"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn git_provider() -> StaticAutocompleteProvider {
    StaticAutocompleteProvider::new(["init", "clone", "pull", "push"])
}

#[test]
fn history_walks_back_to_oldest_and_forward_to_blank() {
    let mut terminal = prompted(40, 5);
    let bindings = KeyBindings::default();
    let history = history();
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, None);
    let up = KeyEvent::named(Key::UpArrow);
    let down = KeyEvent::named(Key::DownArrow);

    press(&mut editor, up, 1);
    assert_eq!(editor.text(), "git init");
    press(&mut editor, up, 2);
    assert_eq!(editor.text(), "ls -a");
    assert_eq!(editor.history_index(), 0);

    press(&mut editor, up, 1);
    assert_eq!(editor.text(), "ls -a");
    assert_in_sync(editor.terminal(), "ls -a", 5);

    press(&mut editor, down, 1);
    assert_eq!(editor.text(), "dotnet run");
    assert_in_sync(editor.terminal(), "dotnet run", 10);

    press(&mut editor, down, 2);
    assert_eq!(editor.text(), "");
    assert!(!editor.is_browsing_history());
    assert_in_sync(editor.terminal(), "", 0);

    press(&mut editor, down, 1);
    assert_eq!(editor.text(), "");
}

#[test]
fn history_entry_replaces_typed_text() {
    let mut terminal = prompted(40, 5);
    let bindings = KeyBindings::default();
    let history = history();
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, None);

    type_text(&mut editor, "something long typed");
    editor.handle(&KeyEvent::ctrl('p')).expect("ctrl-p");
    assert_eq!(editor.text(), "git init");
    assert_in_sync(editor.terminal(), "git init", 8);
}

#[test]
fn tab_cycles_candidates_forward_and_back() {
    let mut terminal = prompted(40, 5);
    let bindings = KeyBindings::default();
    let history: Vec<String> = Vec::new();
    let provider = git_provider();
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, Some(&provider));
    let tab = KeyEvent::named(Key::Tab);
    let shift_tab = KeyEvent::chord(Key::Tab, Modifiers::SHIFT);

    type_text(&mut editor, "git ");
    press(&mut editor, tab, 1);
    assert_eq!(editor.text(), "git init");
    press(&mut editor, tab, 1);
    assert_eq!(editor.text(), "git clone");
    press(&mut editor, shift_tab, 1);
    assert_eq!(editor.text(), "git init");
    assert_in_sync(editor.terminal(), "git init", 8);

    // Reverse from the first candidate wraps to the last.
    press(&mut editor, shift_tab, 1);
    assert_eq!(editor.text(), "git push");
    assert_in_sync(editor.terminal(), "git push", 8);
}

#[test]
fn completion_replaces_partial_token_and_ends_on_other_keys() {
    let mut terminal = prompted(40, 5);
    let bindings = KeyBindings::default();
    let history: Vec<String> = Vec::new();
    let provider = CommandAutocompleteProvider::new().with_command("git", ["pull", "push"]);
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, Some(&provider));

    type_text(&mut editor, "git pu");
    press(&mut editor, KeyEvent::named(Key::Tab), 1);
    assert_eq!(editor.text(), "git pull");
    assert_eq!(editor.completion().map(|session| session.start_offset()), Some(4));

    press(&mut editor, KeyEvent::named(Key::LeftArrow), 1);
    assert!(!editor.is_completing());

    // Not at end of line: Tab starts nothing.
    press(&mut editor, KeyEvent::named(Key::Tab), 1);
    assert!(!editor.is_completing());
    assert_eq!(editor.text(), "git pull");
    assert_in_sync(editor.terminal(), "git pull", 7);
}

#[test]
fn separators_come_from_the_provider() {
    let mut terminal = prompted(40, 5);
    let bindings = KeyBindings::default();
    let history: Vec<String> = Vec::new();
    let provider = StaticAutocompleteProvider::new(["main.rs"]).with_separators(['/']);
    assert_eq!(provider.separators(), ['/']);
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, Some(&provider));

    type_text(&mut editor, "open src/ma");
    press(&mut editor, KeyEvent::named(Key::Tab), 1);
    assert_eq!(editor.text(), "open src/main.rs");
}

#[test]
fn mid_line_insertion() {
    let mut terminal = prompted(40, 5);
    let bindings = KeyBindings::default();
    let history: Vec<String> = Vec::new();
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, None);

    type_text(&mut editor, "hello");
    press(&mut editor, KeyEvent::named(Key::Home), 1);
    press(&mut editor, KeyEvent::named(Key::RightArrow), 2);
    type_text(&mut editor, "XY");

    assert_eq!(editor.text(), "heXYllo");
    assert_eq!(editor.cursor(), 4);
    assert_in_sync(editor.terminal(), "heXYllo", 4);
}

#[test]
fn transpose_at_end_keeps_cursor_at_end() {
    let mut terminal = prompted(40, 5);
    let bindings = KeyBindings::default();
    let history: Vec<String> = Vec::new();
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, None);

    type_text(&mut editor, "ab");
    editor.handle(&KeyEvent::ctrl('t')).expect("ctrl-t");
    assert_eq!(editor.text(), "ba");
    assert_eq!(editor.cursor(), 2);
    assert_in_sync(editor.terminal(), "ba", 2);
}

#[test]
fn kill_and_delete_keys() {
    let mut terminal = prompted(40, 5);
    let bindings = KeyBindings::default();
    let history: Vec<String> = Vec::new();
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, None);

    type_text(&mut editor, "echo hello world");
    press(&mut editor, KeyEvent::named(Key::LeftArrow), 6);
    editor.handle(&KeyEvent::ctrl('k')).expect("ctrl-k");
    assert_eq!(editor.text(), "echo hello");
    assert_in_sync(editor.terminal(), "echo hello", 10);

    press(&mut editor, KeyEvent::named(Key::Home), 1);
    press(&mut editor, KeyEvent::named(Key::Delete), 5);
    assert_eq!(editor.text(), "hello");
    assert_in_sync(editor.terminal(), "hello", 0);

    // Delete at end is a no-op.
    press(&mut editor, KeyEvent::named(Key::End), 1);
    editor.handle(&KeyEvent::ctrl('d')).expect("ctrl-d");
    assert_eq!(editor.text(), "hello");

    press(&mut editor, KeyEvent::named(Key::Escape), 1);
    assert_eq!(editor.text(), "");
    assert_in_sync(editor.terminal(), "", 0);
}

#[test]
fn typing_past_the_right_edge_wraps() {
    let mut terminal = prompted(10, 5);
    let bindings = KeyBindings::default();
    let history: Vec<String> = Vec::new();
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, None);

    type_text(&mut editor, "abcdefghijkl");
    assert_eq!(editor.terminal().line(0), "> abcdefgh");
    assert_eq!(editor.terminal().line(1), "ijkl");
    assert_in_sync(editor.terminal(), "abcdefghijkl", 12);

    press(&mut editor, KeyEvent::named(Key::Home), 1);
    type_text(&mut editor, "X");
    assert_eq!(editor.terminal().line(0), "> Xabcdefg");
    assert_eq!(editor.terminal().line(1), "hijkl");
    assert_in_sync(editor.terminal(), "Xabcdefghijkl", 1);

    press(&mut editor, KeyEvent::named(Key::End), 1);
    press(&mut editor, KeyEvent::named(Key::Backspace), 1);
    assert_in_sync(editor.terminal(), "Xabcdefghijk", 12);
}

#[test]
fn left_from_column_zero_moves_to_previous_row() {
    let mut terminal = prompted(10, 5);
    let bindings = KeyBindings::default();
    let history: Vec<String> = Vec::new();
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, None);

    type_text(&mut editor, "abcdefgh");
    assert_eq!(
        (editor.terminal().cursor_column(), editor.terminal().cursor_row()),
        (0, 1)
    );

    press(&mut editor, KeyEvent::named(Key::LeftArrow), 1);
    assert_eq!(
        (editor.terminal().cursor_column(), editor.terminal().cursor_row()),
        (9, 0)
    );

    type_text(&mut editor, "Z");
    assert_eq!(editor.text(), "abcdefgZh");
    assert_eq!(editor.terminal().line(0), "> abcdefgZ");
    assert_eq!(editor.terminal().line(1), "h");
    assert_in_sync(editor.terminal(), "abcdefgZh", 8);

    press(&mut editor, KeyEvent::named(Key::RightArrow), 1);
    assert_in_sync(editor.terminal(), "abcdefgZh", 9);
}

#[test]
fn wrapped_history_entry_clears_fully() {
    let mut terminal = prompted(8, 5);
    let bindings = KeyBindings::default();
    let history = vec!["a much longer entry".to_string(), "ls".to_string()];
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, None);

    press(&mut editor, KeyEvent::named(Key::UpArrow), 2);
    assert_in_sync(editor.terminal(), "a much longer entry", 19);
    press(&mut editor, KeyEvent::named(Key::DownArrow), 1);
    assert_in_sync(editor.terminal(), "ls", 2);
}

#[test]
fn mid_line_insert_on_the_bottom_row_follows_the_scroll() {
    let mut terminal = prompted_at_bottom(10, 2);
    let bindings = KeyBindings::default();
    let history: Vec<String> = Vec::new();
    let mut editor = LineEditor::new(&mut terminal, &history, &bindings, None);

    type_text(&mut editor, "abcdefg");
    press(&mut editor, KeyEvent::named(Key::LeftArrow), 5);
    type_text(&mut editor, "X");

    assert_eq!(editor.text(), "abXcdefg");
    assert_eq!(editor.cursor(), 3);
    assert_eq!(
        editor.terminal().screen(),
        vec!["> abXcdefg".to_string(), String::new()]
    );
    assert_eq!(
        (editor.terminal().cursor_column(), editor.terminal().cursor_row()),
        (5, 0)
    );
    assert_in_sync(editor.terminal(), "abXcdefg", 3);

    press(&mut editor, KeyEvent::named(Key::Delete), 1);
    assert_in_sync(editor.terminal(), "abXdefg", 3);
    press(&mut editor, KeyEvent::named(Key::Backspace), 2);
    assert_in_sync(editor.terminal(), "adefg", 1);
}
