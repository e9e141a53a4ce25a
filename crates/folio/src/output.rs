//! Terminal output for CLI messages.
//!
//! Everything goes to stderr so stdout stays free for tooling.

use console::{Style, Term};

/// Labelled, colored messages on stderr.
pub(crate) struct Output {
    term: Term,
    ok: Style,
    warn: Style,
    fail: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            fail: Style::new().red().bold(),
        }
    }

    /// Plain line.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// `ok:` line.
    pub(crate) fn success(&self, msg: &str) {
        self.labelled(&self.ok, "ok", msg);
    }

    /// `warning:` line.
    pub(crate) fn warning(&self, msg: &str) {
        self.labelled(&self.warn, "warning", msg);
    }

    /// `error:` line.
    pub(crate) fn error(&self, msg: &str) {
        self.labelled(&self.fail, "error", msg);
    }

    fn labelled(&self, style: &Style, label: &str, msg: &str) {
        let _ = self
            .term
            .write_line(&format!("{}: {msg}", style.apply_to(label)));
    }
}
