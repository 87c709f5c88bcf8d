//! Text buffer with a logical cursor.

/// Characters of the line being edited plus the logical cursor.
///
/// `limit` tracks the length separately from `chars` so the editor can do
/// its terminal arithmetic against it; every mutation keeps
/// `cursor <= limit == chars.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    chars: Vec<char>,
    cursor: usize,
    limit: usize,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_start(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_end(&self) -> bool {
        self.cursor == self.limit
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Text from `index` to the end.
    pub fn suffix(&self, index: usize) -> String {
        self.chars[index.min(self.chars.len())..].iter().collect()
    }

    /// Character just before the cursor.
    pub fn char_before_cursor(&self) -> Option<char> {
        self.cursor.checked_sub(1).map(|index| self.chars[index])
    }

    /// Move the cursor by `delta`, clamped to `[0, limit]`. Returns the
    /// distance actually travelled.
    pub fn shift_cursor(&mut self, delta: isize) -> isize {
        let before = self.cursor;
        self.cursor = if delta < 0 {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta.unsigned_abs()).min(self.limit)
        };
        self.cursor as isize - before as isize
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.limit);
    }

    /// Insert at the cursor without moving it.
    pub fn insert(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.limit += 1;
    }

    /// Remove up to `count` characters starting at the cursor. Returns how
    /// many were removed.
    pub fn remove(&mut self, count: usize) -> usize {
        let end = self.cursor.saturating_add(count).min(self.limit);
        let removed = end - self.cursor;
        self.chars.drain(self.cursor..end);
        self.limit -= removed;
        removed
    }

    /// Swap the characters at `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.chars.swap(a, b);
    }
}
