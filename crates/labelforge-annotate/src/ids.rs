//! Correlation id generators.
//!
//! Ids only need to be unique within one task; the producer re-checks every
//! id against those already issued for the task.

use uuid::Uuid;

/// Length of ids issued by [`UuidIds`].
pub const DEFAULT_ID_LEN: usize = 10;

pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random ids: a UUID v4 truncated to a short prefix.
#[derive(Debug, Clone)]
pub struct UuidIds {
    len: usize,
}

impl Default for UuidIds {
    fn default() -> Self {
        Self {
            len: DEFAULT_ID_LEN,
        }
    }
}

impl UuidIds {
    pub fn with_len(len: usize) -> Self {
        Self { len: len.max(1) }
    }
}

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        let mut id = Uuid::new_v4().to_string();
        id.truncate(self.len);
        id
    }
}

/// Deterministic ids: `r0`, `r1`, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("r{}", self.next);
        self.next += 1;
        id
    }
}
