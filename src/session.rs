//! Highlighting session.
//!
//! A [`Session`] owns everything a host needs to highlight one document: the
//! settings that were in effect when it was created, the compiled rules, the
//! [`Scheduler`], the [`Completer`] and the active [`Theme`]. Flags that the host
//! toggles at runtime are changed through the session and read by each cycle or
//! keystroke as plain input.

use crate::complete::{Completer, Completion};
use crate::config::Configuration;
use crate::error::Result;
use crate::schedule::{Cycle, Host, Scheduler, Stats, Timer, TimerHandle};
use crate::syntax::Mode;
use crate::theme::{Appearance, Theme};
use std::sync::Arc;

pub struct Session {
    themes: Vec<(Appearance, Theme)>,
    theme: Theme,
    scheduler: Scheduler,
    completer: Completer,
}

impl Session {
    pub fn new(config: &Configuration) -> Result<Session> {
        let settings = &config.settings;
        let library = Arc::new(config.library()?);
        let scheduler = Scheduler::new(
            library,
            settings.interval(),
            settings.budget(),
            settings.background,
        )?;
        let completer = Completer::new(settings.tag_completion, settings.safe_mode)?;
        let themes = Appearance::ALL
            .iter()
            .map(|a| (*a, config.theme(*a)))
            .collect();
        Ok(Session {
            themes,
            theme: config.theme(settings.theme),
            scheduler,
            completer,
        })
    }

    /// Begins highlighting by arming `timer`.
    pub fn start<T: Timer + ?Sized>(&mut self, timer: &mut T) {
        self.scheduler.activate(timer);
    }

    /// Handles the wake-up identified by `handle`.
    pub fn tick<H, T>(&mut self, handle: TimerHandle, host: &mut H, timer: &mut T) -> Cycle
    where
        H: Host + ?Sized,
        T: Timer + ?Sized,
    {
        self.scheduler.fire(handle, host, timer, &self.theme)
    }

    /// Handles keystroke `c` typed at character position `cursor` of `text`.
    pub fn on_key(&self, mode: Mode, c: char, text: &str, cursor: usize) -> Completion {
        self.completer.on_key(mode, c, text, cursor)
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Switches to the theme of `appearance`, taking effect at the next cycle.
    pub fn set_theme(&mut self, appearance: Appearance) {
        self.theme = self
            .themes
            .iter()
            .find(|(a, _)| *a == appearance)
            .map(|(_, theme)| theme.clone())
            .unwrap_or_else(|| Theme::new(appearance));
    }

    pub fn set_tag_completion(&mut self, enabled: bool) {
        self.completer.set_enabled(enabled);
    }

    pub fn set_safe_mode(&mut self, safe_mode: bool) {
        self.completer.set_read_only(safe_mode);
    }

    pub fn stats(&self) -> Stats {
        self.scheduler.stats()
    }

    /// Ends the session, withdrawing any pending wake-up from `timer`.
    pub fn close<T: Timer + ?Sized>(mut self, timer: &mut T) -> Stats {
        self.scheduler.cancel(timer);
        self.scheduler.stats()
    }
}
