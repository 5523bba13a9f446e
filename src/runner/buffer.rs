use std::collections::VecDeque;

/// Number of output lines retained per subprocess invocation.
pub const MAX_LINES: usize = 200;

/// FIFO-bounded line store: once full, each push evicts the oldest line.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LINES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines.into()
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
