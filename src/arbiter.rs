//! Termination arbiter
//!
//! Every way a dialog can end (buttons, keys, window close, focus loss,
//! control signals, the countdown) is funnelled through [`Arbiter::submit`].
//! The arbiter is a single-assignment latch: the first accepted result code
//! wins and every later event is a no-op. File mode may veto an affirmative
//! termination until the user confirms overwriting the selected file.

use tracing::debug;

use crate::response::ResultCode;

/// Control signal received from another process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// SIGUSR1: finish with the default response (print directly when plugged)
    Confirm,
    /// SIGUSR2: cancel (just stop the loop when plugged)
    Cancel,
}

/// Anything that may end the dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationEvent {
    ButtonPressed {
        response: ResultCode,
        command: Option<String>,
    },
    KeyEscape,
    /// Ctrl+Enter, or activation of the mode widget
    KeyConfirm,
    WindowClosed,
    FocusLost,
    SignalReceived(ControlSignal),
    TimeoutExpired,
}

/// What the event loop has to do after an event was submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing changed, keep running
    Continue,
    /// Stop the event loop; the latched code (or its default) is final
    Exit,
    /// Start a detached shell command and keep running
    Launch(String),
    /// Ask the user whether the selected file may be overwritten
    ConfirmOverwrite(ResultCode),
    /// Print the current result right now without ending (plug mode)
    PrintNow,
}

/// Behaviour flags the arbiter needs from the configuration
#[derive(Debug, Clone, Copy)]
pub struct ArbiterPolicy {
    pub default_response: ResultCode,
    pub escape_ok: bool,
    pub no_escape: bool,
    pub close_on_unfocus: bool,
    /// Running as an embedded plug: keys are ignored, signals act directly
    pub plugged: bool,
    /// File mode: affirmative codes need overwrite confirmation
    pub guard_overwrite: bool,
}

impl Default for ArbiterPolicy {
    fn default() -> Self {
        Self {
            default_response: ResultCode::OK,
            escape_ok: false,
            no_escape: false,
            close_on_unfocus: false,
            plugged: false,
            guard_overwrite: false,
        }
    }
}

/// Decides whether an affirmative termination may go ahead
pub trait OverwriteGuard {
    /// True when committing now would overwrite something the user has not confirmed
    fn needs_confirmation(&self) -> bool;
}

/// Guard that never objects
pub struct NoGuard;

impl OverwriteGuard for NoGuard {
    fn needs_confirmation(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct Arbiter {
    policy: ArbiterPolicy,
    latched: Option<ResultCode>,
    /// Affirmative code waiting for the overwrite answer
    pending: Option<ResultCode>,
    finished: bool,
}

impl Arbiter {
    pub fn new(policy: ArbiterPolicy) -> Self {
        Self {
            policy,
            latched: None,
            pending: None,
            finished: false,
        }
    }

    pub fn policy(&self) -> &ArbiterPolicy {
        &self.policy
    }

    /// The latched code, if any event has committed one
    pub fn latched(&self) -> Option<ResultCode> {
        self.latched
    }

    /// Whether the event loop has been told to stop
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn awaiting_confirmation(&self) -> Option<ResultCode> {
        self.pending
    }

    /// Final outcome once the loop is over: the latch, or `ESCAPE` when
    /// the loop ended without anything being latched.
    pub fn result(&self) -> ResultCode {
        self.latched.unwrap_or_default()
    }

    /// Single state transition for every termination trigger
    pub fn submit(&mut self, event: TerminationEvent, guard: &dyn OverwriteGuard) -> Step {
        if self.finished {
            debug!("Ignoring {:?}, dialog already finished", event);
            return Step::Continue;
        }
        if self.pending.is_some() && event == TerminationEvent::KeyEscape {
            debug!("Escape answers the overwrite prompt");
            return self.resolve_overwrite(false);
        }

        match event {
            TerminationEvent::ButtonPressed {
                command: Some(cmd), ..
            } => Step::Launch(cmd),
            TerminationEvent::ButtonPressed { response, .. } => self.request(response, guard),
            TerminationEvent::KeyEscape => {
                if self.policy.plugged {
                    Step::Continue
                } else if self.policy.escape_ok {
                    self.request(self.policy.default_response, guard)
                } else if !self.policy.no_escape {
                    self.request(ResultCode::ESCAPE, guard)
                } else {
                    debug!("Escape swallowed");
                    Step::Continue
                }
            }
            TerminationEvent::KeyConfirm => {
                if self.policy.plugged {
                    Step::Continue
                } else {
                    self.request(self.policy.default_response, guard)
                }
            }
            TerminationEvent::WindowClosed => self.stop("window closed"),
            TerminationEvent::FocusLost => {
                if self.policy.close_on_unfocus {
                    self.stop("focus lost")
                } else {
                    Step::Continue
                }
            }
            TerminationEvent::SignalReceived(ControlSignal::Confirm) => {
                if self.policy.plugged {
                    Step::PrintNow
                } else {
                    self.request(self.policy.default_response, guard)
                }
            }
            TerminationEvent::SignalReceived(ControlSignal::Cancel) => {
                if self.policy.plugged {
                    self.stop("cancel signal")
                } else {
                    self.request(ResultCode::CANCEL, guard)
                }
            }
            TerminationEvent::TimeoutExpired => self.request(ResultCode::TIMEOUT, guard),
        }
    }

    /// Answer to a [`Step::ConfirmOverwrite`] prompt
    pub fn resolve_overwrite(&mut self, accepted: bool) -> Step {
        let Some(code) = self.pending.take() else {
            return Step::Continue;
        };
        if self.finished {
            return Step::Continue;
        }
        if accepted {
            self.commit(code)
        } else {
            debug!("Overwrite declined, dialog stays open");
            Step::Continue
        }
    }

    fn request(&mut self, code: ResultCode, guard: &dyn OverwriteGuard) -> Step {
        if self.policy.guard_overwrite && code.is_affirmative() && guard.needs_confirmation() {
            debug!("Result {} held for overwrite confirmation", code);
            self.pending = Some(code);
            return Step::ConfirmOverwrite(code);
        }
        self.pending = None;
        self.commit(code)
    }

    fn commit(&mut self, code: ResultCode) -> Step {
        debug!("Result latched: {}", code);
        self.latched = Some(code);
        self.finished = true;
        Step::Exit
    }

    fn stop(&mut self, reason: &str) -> Step {
        debug!("Event loop ends ({}), result stays {}", reason, self.result());
        self.pending = None;
        self.finished = true;
        Step::Exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysAsk;

    impl OverwriteGuard for AlwaysAsk {
        fn needs_confirmation(&self) -> bool {
            true
        }
    }

    fn press(code: i32) -> TerminationEvent {
        TerminationEvent::ButtonPressed {
            response: ResultCode(code),
            command: None,
        }
    }

    #[test]
    fn test_first_event_wins() {
        let mut arbiter = Arbiter::new(ArbiterPolicy::default());
        assert_eq!(arbiter.submit(press(4), &NoGuard), Step::Exit);
        assert_eq!(arbiter.submit(TerminationEvent::WindowClosed, &NoGuard), Step::Continue);
        assert_eq!(arbiter.submit(TerminationEvent::TimeoutExpired, &NoGuard), Step::Continue);
        assert_eq!(arbiter.result(), ResultCode(4));
    }

    #[test]
    fn test_close_without_latch_defaults_to_escape() {
        let mut arbiter = Arbiter::new(ArbiterPolicy::default());
        assert_eq!(arbiter.submit(TerminationEvent::WindowClosed, &NoGuard), Step::Exit);
        assert!(arbiter.latched().is_none());
        assert_eq!(arbiter.result(), ResultCode::ESCAPE);
    }

    #[test]
    fn test_escape_variants() {
        let mut arbiter = Arbiter::new(ArbiterPolicy::default());
        arbiter.submit(TerminationEvent::KeyEscape, &NoGuard);
        assert_eq!(arbiter.result(), ResultCode::ESCAPE);

        let mut arbiter = Arbiter::new(ArbiterPolicy {
            escape_ok: true,
            default_response: ResultCode(6),
            ..Default::default()
        });
        arbiter.submit(TerminationEvent::KeyEscape, &NoGuard);
        assert_eq!(arbiter.result(), ResultCode(6));

        let mut arbiter = Arbiter::new(ArbiterPolicy {
            no_escape: true,
            ..Default::default()
        });
        assert_eq!(arbiter.submit(TerminationEvent::KeyEscape, &NoGuard), Step::Continue);
        assert!(!arbiter.is_finished());
    }

    #[test]
    fn test_ctrl_enter_uses_default_response() {
        let mut arbiter = Arbiter::new(ArbiterPolicy {
            default_response: ResultCode(2),
            ..Default::default()
        });
        assert_eq!(arbiter.submit(TerminationEvent::KeyConfirm, &NoGuard), Step::Exit);
        assert_eq!(arbiter.result(), ResultCode(2));
    }

    #[test]
    fn test_command_button_does_not_terminate() {
        let mut arbiter = Arbiter::new(ArbiterPolicy::default());
        let step = arbiter.submit(
            TerminationEvent::ButtonPressed {
                response: ResultCode(0),
                command: Some("notify-send hi".into()),
            },
            &NoGuard,
        );
        assert_eq!(step, Step::Launch("notify-send hi".into()));
        assert!(!arbiter.is_finished());
    }

    #[test]
    fn test_focus_loss_only_when_configured() {
        let mut arbiter = Arbiter::new(ArbiterPolicy::default());
        assert_eq!(arbiter.submit(TerminationEvent::FocusLost, &NoGuard), Step::Continue);

        let mut arbiter = Arbiter::new(ArbiterPolicy {
            close_on_unfocus: true,
            ..Default::default()
        });
        assert_eq!(arbiter.submit(TerminationEvent::FocusLost, &NoGuard), Step::Exit);
        assert_eq!(arbiter.result(), ResultCode::ESCAPE);
    }

    #[test]
    fn test_signals_standalone_and_plugged() {
        let mut arbiter = Arbiter::new(ArbiterPolicy::default());
        arbiter.submit(TerminationEvent::SignalReceived(ControlSignal::Cancel), &NoGuard);
        assert_eq!(arbiter.result(), ResultCode::CANCEL);

        let mut arbiter = Arbiter::new(ArbiterPolicy {
            plugged: true,
            ..Default::default()
        });
        assert_eq!(
            arbiter.submit(TerminationEvent::SignalReceived(ControlSignal::Confirm), &NoGuard),
            Step::PrintNow
        );
        assert!(!arbiter.is_finished());
        assert_eq!(arbiter.submit(TerminationEvent::KeyEscape, &NoGuard), Step::Continue);
        assert_eq!(
            arbiter.submit(TerminationEvent::SignalReceived(ControlSignal::Cancel), &NoGuard),
            Step::Exit
        );
        assert!(arbiter.latched().is_none());
    }

    #[test]
    fn test_overwrite_veto_declined() {
        let mut arbiter = Arbiter::new(ArbiterPolicy {
            guard_overwrite: true,
            ..Default::default()
        });
        assert_eq!(arbiter.submit(press(0), &AlwaysAsk), Step::ConfirmOverwrite(ResultCode::OK));
        assert_eq!(arbiter.resolve_overwrite(false), Step::Continue);
        assert!(!arbiter.is_finished());
        assert!(arbiter.latched().is_none());
    }

    #[test]
    fn test_escape_declines_overwrite() {
        let mut arbiter = Arbiter::new(ArbiterPolicy {
            guard_overwrite: true,
            ..Default::default()
        });
        arbiter.submit(press(0), &AlwaysAsk);
        assert_eq!(arbiter.submit(TerminationEvent::KeyEscape, &AlwaysAsk), Step::Continue);
        assert!(arbiter.awaiting_confirmation().is_none());
        assert!(arbiter.latched().is_none());
        assert!(!arbiter.is_finished());
    }

    #[test]
    fn test_overwrite_veto_accepted() {
        let mut arbiter = Arbiter::new(ArbiterPolicy {
            guard_overwrite: true,
            ..Default::default()
        });
        arbiter.submit(press(0), &AlwaysAsk);
        assert_eq!(arbiter.resolve_overwrite(true), Step::Exit);
        assert_eq!(arbiter.result(), ResultCode::OK);
    }

    #[test]
    fn test_veto_skips_dismissive_codes() {
        let mut arbiter = Arbiter::new(ArbiterPolicy {
            guard_overwrite: true,
            ..Default::default()
        });
        assert_eq!(arbiter.submit(press(1), &AlwaysAsk), Step::Exit);
        assert_eq!(arbiter.result(), ResultCode::CANCEL);

        let mut arbiter = Arbiter::new(ArbiterPolicy {
            guard_overwrite: true,
            ..Default::default()
        });
        assert_eq!(arbiter.submit(TerminationEvent::TimeoutExpired, &AlwaysAsk), Step::Exit);
        assert_eq!(arbiter.result(), ResultCode::TIMEOUT);
    }
}
