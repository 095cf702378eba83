//! User-facing activity lines.
//!
//! These are what the user reads ("logged in", "error whilst getting ..."),
//! kept apart from diagnostic tracing output.

use std::sync::{Mutex, PoisonError};

pub trait ActivityLog: Send + Sync {
    fn info(&self, line: &str);
    fn error(&self, line: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub text: String,
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<LogLine>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lock().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.texts(LogLevel::Info)
    }

    pub fn errors(&self) -> Vec<String> {
        self.texts(LogLevel::Error)
    }

    fn texts(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|line| line.level == level)
            .map(|line| line.text.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, text: &str) {
        self.lock().push(LogLine {
            level,
            text: text.to_string(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogLine>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ActivityLog for MemoryLog {
    fn info(&self, line: &str) {
        self.push(LogLevel::Info, line);
    }

    fn error(&self, line: &str) {
        self.push(LogLevel::Error, line);
    }
}
