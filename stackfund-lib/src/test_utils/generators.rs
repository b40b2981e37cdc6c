//! Deterministic id generators.

use crate::id::LinkIdGenerator;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Hands out a fixed script of ids, then repeats the last one forever.
///
/// Repeating the tail makes "always collides" scenarios easy to express.
pub struct ScriptedIdGenerator {
    script: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    calls: AtomicU64,
}

impl ScriptedIdGenerator {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script: VecDeque<String> = ids.into_iter().map(Into::into).collect();
        let last = script.back().cloned().unwrap_or_else(|| "00000000".to_string());
        Self {
            script: Mutex::new(script),
            last: Mutex::new(last),
            calls: AtomicU64::new(0),
        }
    }

    /// Number of ids handed out so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LinkIdGenerator for ScriptedIdGenerator {
    fn generate(&self) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(id) => id,
            None => self.last.lock().unwrap_or_else(|e| e.into_inner()).clone(),
        }
    }
}
