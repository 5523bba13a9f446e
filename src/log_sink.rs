//! Append-only, size-bounded progress log shared by runner and orchestrators.

use std::sync::{Mutex, MutexGuard};

/// Default capacity of the log, in characters.
pub const DEFAULT_CAPACITY: usize = 150_000;

type Listener = Box<dyn Fn(&str) + Send + Sync>;

struct Inner {
    text: String,
    /// Length of `text` in characters.
    chars: usize,
    listener: Option<Listener>,
}

/// The user-facing progress log.
///
/// Every append goes through one mutex, and the optional listener is called
/// while that mutex is held, so a presentation layer sees lines one at a time
/// and in append order regardless of which thread produced them.
pub struct LogSink {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl LogSink {
    /// Create a sink holding at most `capacity` characters (never less than 2).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                text: String::new(),
                chars: 0,
                listener: None,
            }),
            capacity: capacity.max(2),
        }
    }

    /// Create a sink that also hands each appended line to `listener`.
    pub fn with_listener<F>(capacity: usize, listener: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let sink = Self::new(capacity);
        sink.lock().listener = Some(Box::new(listener));
        sink
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append `line` followed by a newline.
    ///
    /// When the log grows past its capacity (counted in characters) only the
    /// most recent half of the capacity is kept.
    pub fn append(&self, line: &str) {
        let mut inner = self.lock();
        inner.text.push_str(line);
        inner.text.push('\n');
        inner.chars += line.chars().count() + 1;

        if inner.chars > self.capacity {
            let keep = self.capacity / 2;
            let excess = inner.chars - keep;
            let start = inner
                .text
                .char_indices()
                .nth(excess)
                .map_or(inner.text.len(), |(i, _)| i);
            inner.text.drain(..start);
            inner.chars = keep;
        }

        if let Some(listener) = &inner.listener {
            listener(line);
        }
    }

    /// A copy of the current log contents.
    pub fn contents(&self) -> String {
        self.lock().text.clone()
    }

    /// Current size of the log, in characters.
    pub fn len(&self) -> usize {
        self.lock().chars
    }

    pub fn is_empty(&self) -> bool {
        self.lock().text.is_empty()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
