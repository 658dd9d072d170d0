use colored::Colorize;
use sankofa_client::{Navigator, Route};

/// Announces each screen change on stdout.
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl TerminalNavigator {
    pub fn new() -> Self {
        Self
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route, replace: bool) {
        tracing::debug!(%route, replace, "Navigate");
        println!("{} {}", "→".bright_cyan(), route.path().dimmed());
    }
}
