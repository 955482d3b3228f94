//! Dialog session
//!
//! One `DialogSession` exists per process. It owns the configuration, the
//! termination latch, the countdown and the mode widget, and is the single
//! place where loop events are turned into state transitions. The GUI feeds
//! it; the lifecycle tests drive it directly without a window.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::arbiter::{Arbiter, ArbiterPolicy, OverwriteGuard, Step, TerminationEvent};
use crate::config::{DialogConfig, Mode};
use crate::countdown::{Countdown, IndicatorUpdate, Tick};
use crate::emission::{self, Outcome, ProcessControl};
use crate::modes::{ModeWidget, WidgetSignal};

/// Everything the event loop can receive from outside the window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    Termination(TerminationEvent),
    /// One second elapsed
    Tick,
}

/// Confirmation is needed when the file about to be written already exists
struct ExistingFile(Option<PathBuf>);

impl OverwriteGuard for ExistingFile {
    fn needs_confirmation(&self) -> bool {
        self.0.as_deref().is_some_and(|p| p.exists())
    }
}

pub struct DialogSession {
    config: Arc<DialogConfig>,
    arbiter: Arbiter,
    countdown: Option<Countdown>,
    widget: Box<dyn ModeWidget>,
}

impl DialogSession {
    pub fn new(config: Arc<DialogConfig>, widget: Box<dyn ModeWidget>) -> Self {
        let term = &config.termination;
        let policy = ArbiterPolicy {
            default_response: term.default_response,
            escape_ok: term.escape_ok,
            no_escape: term.no_escape,
            close_on_unfocus: term.close_on_unfocus,
            plugged: config.is_plug(),
            guard_overwrite: config.mode == Mode::File && config.options.file.confirm_overwrite,
        };
        let countdown = (term.timeout > 0).then(|| Countdown::new(term.timeout, term.show_remaining));

        Self {
            arbiter: Arbiter::new(policy),
            countdown,
            widget,
            config,
        }
    }

    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<DialogConfig> {
        Arc::clone(&self.config)
    }

    pub fn widget_mut(&mut self) -> &mut dyn ModeWidget {
        self.widget.as_mut()
    }

    pub fn is_finished(&self) -> bool {
        self.arbiter.is_finished()
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.arbiter.awaiting_confirmation().is_some()
    }

    /// Indicator state, when a timeout is running
    pub fn indicator(&self) -> Option<&IndicatorUpdate> {
        self.countdown.as_ref().map(Countdown::indicator)
    }

    pub fn dispatch(&mut self, event: LoopEvent) -> Step {
        match event {
            LoopEvent::Tick => {
                let Some(countdown) = self.countdown.as_mut() else {
                    return Step::Continue;
                };
                match countdown.tick() {
                    Tick::Remaining(_) => Step::Continue,
                    Tick::Expired => self.submit(TerminationEvent::TimeoutExpired),
                }
            }
            LoopEvent::Termination(event) => self.submit(event),
        }
    }

    /// Translate a widget request into a loop step
    pub fn apply(&mut self, signal: WidgetSignal) -> Step {
        match signal {
            WidgetSignal::None | WidgetSignal::Emit(_) => Step::Continue,
            WidgetSignal::Activate => self.submit(TerminationEvent::ButtonPressed {
                response: self.config.termination.default_response,
                command: None,
            }),
            WidgetSignal::Respond(response) => self.submit(TerminationEvent::ButtonPressed { response, command: None }),
            WidgetSignal::Launch(cmd) => Step::Launch(cmd),
        }
    }

    pub fn resolve_overwrite(&mut self, accepted: bool) -> Step {
        self.arbiter.resolve_overwrite(accepted)
    }

    pub fn overwrite_target(&self) -> Option<PathBuf> {
        self.widget.overwrite_target()
    }

    /// Current widget result, for printing without ending (plug mode)
    pub fn current_output(&self) -> Option<String> {
        self.widget.result()
    }

    /// Final code and the text to print, once the loop is over
    pub fn finish(&self) -> Outcome {
        let code = self.arbiter.result();
        let print = emission::should_print(
            code,
            self.config.termination.always_print,
            self.config.has_custom_buttons(),
        );
        debug!("Dialog finished with {}, print: {}", code, print);
        Outcome {
            code,
            output: if print { self.widget.result() } else { None },
        }
    }

    /// Child teardown and parent signalling after the loop
    pub fn teardown(&mut self, procs: &dyn ProcessControl) {
        self.widget.teardown(procs);
        emission::signal_parent(&self.config, self.arbiter.result(), procs);
    }

    fn submit(&mut self, event: TerminationEvent) -> Step {
        debug!("Termination trigger: {:?}", event);
        let guard = ExistingFile(self.widget.overwrite_target());
        self.arbiter.submit(event, &guard)
    }
}
