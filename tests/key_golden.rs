
use tape_readline::core::input::parse_key_event;
use tape_readline::core::keybindings::chord_for_event;
use tape_readline::platform::stdin_buffer::StdinBuffer;

#[test]
fn key_vectors_match_fixture() {
    let rows = fixture::read_rows("key_vectors.tsv");
    assert!(!rows.is_empty(), "fixture has no vectors");

    for (line_num, parts) in rows {
        assert_eq!(
            parts.len(),
            2,
            "line {line_num}: expected 2 columns, got {}",
            parts.len()
        );
        let input = fixture::unescape(&parts[0]);
        let expected = parts[1].trim();
        let actual = parse_key_event(&input).map(|event| chord_for_event(&event));
        match expected {
            "none" => assert_eq!(actual, None, "line {line_num}: {input:?} should not decode"),
            chord => assert_eq!(
                actual.as_deref(),
                Some(chord),
                "line {line_num}: parse_key_event({input:?}) chord mismatch"
            ),
        }
    }
}

#[test]
fn key_vectors_survive_stdin_splitting() {
    // Every key vector fed as one chunk comes back out of the buffer whole.
    for (line_num, parts) in fixture::read_rows("key_vectors.tsv") {
        let input = fixture::unescape(&parts[0]);
        if parts[1].trim() == "none" {
            continue;
        }
        let mut buffer = StdinBuffer::new(10);
        let mut sequences = buffer.process(input.as_bytes());
        sequences.extend(buffer.flush());
        assert_eq!(sequences, vec![input.clone()], "line {line_num}: split {input:?}");
    }
}
