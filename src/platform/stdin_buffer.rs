//! Splits raw stdin bytes into whole key sequences.

use std::time::{Duration, Instant};

const ESC: u8 = 0x1b;

#[derive(Debug, PartialEq, Eq)]
enum SequenceStatus {
    Complete,
    Incomplete,
}

/// Buffers stdin bytes until they form complete sequences.
///
/// A lone `ESC` (or any escape prefix) is held until either more bytes
/// arrive or the timeout passes, at which point it is flushed verbatim so a
/// bare Escape press still reaches the caller. Split UTF-8 characters are
/// held the same way.
#[derive(Debug)]
pub struct StdinBuffer {
    pending: Vec<u8>,
    timeout_ms: u64,
    flush_deadline: Option<Instant>,
}

impl StdinBuffer {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            pending: Vec::new(),
            timeout_ms,
            flush_deadline: None,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Append `data` and return every sequence that is now complete.
    pub fn process(&mut self, data: &[u8]) -> Vec<String> {
        self.flush_deadline = None;
        self.pending.extend_from_slice(data);

        let (sequences, consumed) = extract_complete_sequences(&self.pending);
        self.pending.drain(..consumed);

        if !self.pending.is_empty() {
            self.flush_deadline = Some(Instant::now() + Duration::from_millis(self.timeout_ms));
        }
        sequences
    }

    /// Flush the held tail once its deadline has passed.
    pub fn flush_due(&mut self, now: Instant) -> Vec<String> {
        if self.pending.is_empty() {
            self.flush_deadline = None;
            return Vec::new();
        }
        match self.flush_deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => Vec::new(),
        }
    }

    /// Milliseconds until the held tail is due, capped at `default_ms`.
    pub fn next_timeout_ms(&self, now: Instant, default_ms: i32) -> i32 {
        match self.flush_deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(now);
                let ms = remaining.as_millis().min(i32::MAX as u128) as i32;
                ms.min(default_ms).max(0)
            }
            None => default_ms,
        }
    }

    /// Emit the held tail as-is.
    pub fn flush(&mut self) -> Vec<String> {
        self.flush_deadline = None;
        if self.pending.is_empty() {
            return Vec::new();
        }
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        vec![tail]
    }

    pub fn clear(&mut self) {
        self.flush_deadline = None;
        self.pending.clear();
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Returns the complete sequences and how many bytes they used.
fn extract_complete_sequences(bytes: &[u8]) -> (Vec<String>, usize) {
    let mut sequences = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == ESC {
            match escape_sequence_len(&bytes[pos..]) {
                Some(len) => {
                    sequences.push(String::from_utf8_lossy(&bytes[pos..pos + len]).into_owned());
                    pos += len;
                }
                None => break,
            }
            continue;
        }

        let width = utf8_width(bytes[pos]);
        if pos + width > bytes.len() {
            break;
        }
        sequences.push(String::from_utf8_lossy(&bytes[pos..pos + width]).into_owned());
        pos += width;
    }

    (sequences, pos)
}

fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        // Stray continuation byte; emitted alone as a replacement char.
        _ => 1,
    }
}

/// Length of the escape sequence at the start of `data`, or `None` while it
/// is still incomplete.
fn escape_sequence_len(data: &[u8]) -> Option<usize> {
    (2..=data.len()).find(|&end| sequence_status(&data[..end]) == SequenceStatus::Complete)
}

fn sequence_status(data: &[u8]) -> SequenceStatus {
    match data.get(1) {
        None => SequenceStatus::Incomplete,
        Some(b'[') => csi_status(data),
        Some(b']') => string_status(data, true),
        Some(b'P') | Some(b'_') => string_status(data, false),
        Some(b'O') => {
            if data.len() >= 3 {
                SequenceStatus::Complete
            } else {
                SequenceStatus::Incomplete
            }
        }
        Some(&next) if next >= 0x80 => {
            // Alt+<multibyte char>: wait for the whole character.
            if data.len() >= 1 + utf8_width(next) {
                SequenceStatus::Complete
            } else {
                SequenceStatus::Incomplete
            }
        }
        Some(_) => SequenceStatus::Complete,
    }
}

fn csi_status(data: &[u8]) -> SequenceStatus {
    // Linux console function keys: `ESC [ [ A`.
    let body = match data.get(2..) {
        Some([b'[', rest @ ..]) => rest,
        Some(rest) => rest,
        None => return SequenceStatus::Incomplete,
    };
    match body {
        [.., last] if (0x40..=0x7e).contains(last) => SequenceStatus::Complete,
        // rxvt shifted editing keys: `ESC [ 2 $`.
        [params @ .., b'$'] if !params.is_empty() && params.iter().all(u8::is_ascii_digit) => {
            SequenceStatus::Complete
        }
        _ => SequenceStatus::Incomplete,
    }
}

fn string_status(data: &[u8], bell_terminates: bool) -> SequenceStatus {
    if data.len() > 2 && (data.ends_with(b"\x1b\\") || (bell_terminates && data.ends_with(b"\x07")))
    {
        SequenceStatus::Complete
    } else {
        SequenceStatus::Incomplete
    }
}

#[cfg(test)]
mod tests {
    use super::StdinBuffer;
    use std::time::{Duration, Instant};

    #[test]
    fn legacy_console_sequences_are_complete() {
        let mut buffer = StdinBuffer::new(10);
        assert!(buffer.process(b"\x1b[[").is_empty());
        assert_eq!(buffer.process(b"A\x1b[3$x"), vec!["\x1b[[A", "\x1b[3$", "x"]);
        assert_eq!(buffer.process(b"\x1b[[5~"), vec!["\x1b[[5~"]);
    }

    #[test]
    fn splits_plain_bytes_into_characters() {
        let mut buffer = StdinBuffer::new(10);
        assert_eq!(buffer.process(b"ab\r"), vec!["a", "b", "\r"]);
        assert!(!buffer.is_pending());
    }

    #[test]
    fn joins_csi_split_across_reads() {
        let mut buffer = StdinBuffer::new(10);
        assert!(buffer.process(b"\x1b").is_empty());
        assert!(buffer.process(b"[1;5").is_empty());
        assert_eq!(buffer.process(b"D"), vec!["\x1b[1;5D"]);
    }

    #[test]
    fn ss3_and_alt_pairs_are_complete() {
        let mut buffer = StdinBuffer::new(10);
        assert_eq!(buffer.process(b"\x1bOH\x1bb"), vec!["\x1bOH", "\x1bb"]);
        assert!(buffer.process(b"\x1bO").is_empty());
        assert_eq!(buffer.process(b"F"), vec!["\x1bOF"]);
    }

    #[test]
    fn holds_split_utf8_until_complete() {
        let mut buffer = StdinBuffer::new(10);
        let bytes = "é".as_bytes();
        assert!(buffer.process(&bytes[..1]).is_empty());
        assert!(buffer.is_pending());
        assert_eq!(buffer.process(&bytes[1..]), vec!["é"]);
    }

    #[test]
    fn lone_escape_flushes_only_after_deadline() {
        let mut buffer = StdinBuffer::new(25);
        assert!(buffer.process(b"\x1b").is_empty());

        let now = Instant::now();
        assert!(buffer.next_timeout_ms(now, 1000) <= 25);
        assert!(buffer.flush_due(now).is_empty());

        let flushed = buffer.flush_due(now + Duration::from_millis(50));
        assert_eq!(flushed, vec!["\x1b"]);
        assert!(buffer
            .flush_due(now + Duration::from_millis(100))
            .is_empty());
        assert_eq!(buffer.next_timeout_ms(now, 77), 77);
    }

    #[test]
    fn osc_waits_for_terminator() {
        let mut buffer = StdinBuffer::new(10);
        assert!(buffer.process(b"\x1b]11;rgb:0/0/0").is_empty());
        assert_eq!(
            buffer.process(b"\x07x"),
            vec!["\x1b]11;rgb:0/0/0\x07", "x"]
        );
    }

    #[test]
    fn clear_drops_pending_tail() {
        let mut buffer = StdinBuffer::new(10);
        assert!(buffer.process(b"\x1b[").is_empty());
        buffer.clear();
        assert!(!buffer.is_pending());
        assert_eq!(buffer.next_timeout_ms(Instant::now(), 5), 5);
        assert!(buffer.flush().is_empty());
    }
}
