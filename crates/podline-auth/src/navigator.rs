//! The location the user is looking at.
//!
//! A [`Navigator`] owns the "current URL" of the presentation shell. Replacing
//! it rewrites the current history entry in place; navigating leaves for
//! another location (the identity provider).

use std::sync::{Mutex, PoisonError};

use url::Url;

pub trait Navigator: Send + Sync {
    fn current_url(&self) -> Url;

    /// Rewrites the current entry without loading anything.
    fn replace_url(&self, url: &Url);

    /// Leaves for `url`.
    fn navigate(&self, url: &Url);
}

#[derive(Debug)]
struct NavigatorState {
    current: Url,
    replaced: Vec<Url>,
    navigated: Vec<Url>,
}

/// Navigator that records every call.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavigatorState>,
}

impl MemoryNavigator {
    pub fn new(current: Url) -> Self {
        Self {
            state: Mutex::new(NavigatorState {
                current,
                replaced: Vec::new(),
                navigated: Vec::new(),
            }),
        }
    }

    /// URLs passed to `replace_url`, oldest first.
    pub fn replaced(&self) -> Vec<Url> {
        self.lock().replaced.clone()
    }

    /// URLs passed to `navigate`, oldest first.
    pub fn navigated(&self) -> Vec<Url> {
        self.lock().navigated.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavigatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for MemoryNavigator {
    fn current_url(&self) -> Url {
        self.lock().current.clone()
    }

    fn replace_url(&self, url: &Url) {
        let mut state = self.lock();
        state.current = url.clone();
        state.replaced.push(url.clone());
    }

    fn navigate(&self, url: &Url) {
        let mut state = self.lock();
        state.current = url.clone();
        state.navigated.push(url.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_replacements_and_navigation() {
        let start = Url::parse("http://localhost:3000/?code=1").unwrap();
        let nav = MemoryNavigator::new(start.clone());
        assert_eq!(nav.current_url(), start);

        let clean = Url::parse("http://localhost:3000/").unwrap();
        nav.replace_url(&clean);
        assert_eq!(nav.current_url(), clean);
        assert_eq!(nav.replaced(), vec![clean]);

        let idp = Url::parse("https://idp.example/authorize").unwrap();
        nav.navigate(&idp);
        assert_eq!(nav.navigated(), vec![idp.clone()]);
        assert_eq!(nav.current_url(), idp);
    }
}
