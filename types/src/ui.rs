//! User-notification boundary.
//!
//! Stands in for the host editor's message and status-bar primitives so
//! the resolver, installer, and bridge never talk to a host API directly.
//! The CLI implements this against the console; tests substitute a
//! recording implementation.

/// Host-facing notification surface.
///
/// All methods are fire-and-forget side effects except [`Ui::confirm`],
/// which blocks the triggering request (never the host event loop) until
/// the user answers.
pub trait Ui {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// Yes-or-cancel prompt; `true` means proceed.
    fn confirm(&self, prompt: &str) -> bool;

    /// Show a transient status indicator. Paired with [`Ui::end_progress`]
    /// through the [`Progress`] guard; prefer [`progress`] over calling
    /// these directly.
    fn begin_progress(&self, message: &str);
    fn end_progress(&self);
}

/// RAII guard that hides the status indicator when dropped, on success
/// and failure paths alike.
pub struct Progress<'a> {
    ui: &'a dyn Ui,
}

impl Drop for Progress<'_> {
    fn drop(&mut self) {
        self.ui.end_progress();
    }
}

/// Show a status indicator for the lifetime of the returned guard.
#[must_use]
pub fn progress<'a>(ui: &'a dyn Ui, message: &str) -> Progress<'a> {
    ui.begin_progress(message);
    Progress { ui }
}

/// A [`Ui`] that swallows everything and answers "yes" to prompts.
///
/// For embedders that have no user to ask, and for tests that don't care.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUi;

impl Ui for NullUi {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}

    fn confirm(&self, _prompt: &str) -> bool {
        true
    }

    fn begin_progress(&self, _message: &str) {}
    fn end_progress(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct CountingUi {
        events: RefCell<Vec<String>>,
    }

    impl Ui for CountingUi {
        fn info(&self, message: &str) {
            self.events.borrow_mut().push(format!("info:{message}"));
        }
        fn warn(&self, message: &str) {
            self.events.borrow_mut().push(format!("warn:{message}"));
        }
        fn error(&self, message: &str) {
            self.events.borrow_mut().push(format!("error:{message}"));
        }
        fn confirm(&self, _prompt: &str) -> bool {
            false
        }
        fn begin_progress(&self, message: &str) {
            self.events.borrow_mut().push(format!("begin:{message}"));
        }
        fn end_progress(&self) {
            self.events.borrow_mut().push("end".to_string());
        }
    }

    #[test]
    fn progress_guard_ends_on_drop() {
        let ui = CountingUi::default();
        {
            let _guard = progress(&ui, "installing");
            assert_eq!(ui.events.borrow().as_slice(), ["begin:installing"]);
        }
        assert_eq!(ui.events.borrow().as_slice(), ["begin:installing", "end"]);
    }

    #[test]
    fn progress_guard_ends_on_early_return() {
        let ui = CountingUi::default();
        let failing = || -> Result<(), ()> {
            let _guard = progress(&ui, "working");
            Err(())
        };
        assert!(failing().is_err());
        assert_eq!(ui.events.borrow().last().unwrap(), "end");
    }

    #[test]
    fn null_ui_confirms() {
        assert!(NullUi.confirm("Install?"));
    }
}
