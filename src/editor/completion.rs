//! Tab-completion cycling state.

/// Candidates being cycled for one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSession {
    candidates: Vec<String>,
    start_offset: usize,
    index: usize,
}

impl CompletionSession {
    /// Start at the first candidate. Returns `None` for an empty list.
    pub fn start(candidates: Vec<String>, start_offset: usize) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        Some(Self {
            candidates,
            start_offset,
            index: 0,
        })
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn current(&self) -> &str {
        &self.candidates[self.index]
    }

    pub fn advance(&mut self) -> &str {
        self.index = (self.index + 1) % self.candidates.len();
        self.current()
    }

    pub fn retreat(&mut self) -> &str {
        let len = self.candidates.len();
        self.index = (self.index + len - 1) % len;
        self.current()
    }
}
