use std::sync::{Mutex, PoisonError};

use colored::Colorize;
use podline_auth::Navigator;
use url::Url;

/// The terminal has no address bar: the current URL is the one the command
/// was started with, and leaving means asking the user to open a link.
pub struct TerminalNavigator {
    current: Mutex<Url>,
}

impl TerminalNavigator {
    pub fn new(current: Url) -> Self {
        Self {
            current: Mutex::new(current),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_url(&self) -> Url {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_url(&self, url: &Url) {
        tracing::debug!(%url, "location replaced");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = url.clone();
    }

    fn navigate(&self, url: &Url) {
        println!("Open this URL in your browser to log in:");
        println!("  {}", url.as_str().cyan());
        println!(
            "Then run {} with the URL you are sent back to.",
            "podline callback <url>".cyan()
        );
    }
}
