//! Result emission gate and post-loop process housekeeping

use std::io;

use tracing::{debug, warn};

use crate::config::{DialogConfig, Mode};
use crate::response::ResultCode;

/// Highest signal number accepted for `--kill-parent`
pub const MAX_SIGNAL: i32 = 64;

/// Final outcome of one dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub code: ResultCode,
    /// Text for stdout, when the gate approved and the mode produced any
    pub output: Option<String>,
}

/// Whether the mode's result should be printed for `code`.
///
/// Escape and timeout never print. Otherwise `always_print` wins; without
/// custom buttons only the standard OK prints, with custom buttons every
/// affirmative (even) code does.
pub fn should_print(code: ResultCode, always_print: bool, custom_buttons: bool) -> bool {
    if code.is_sentinel() {
        return false;
    }
    if always_print {
        return true;
    }
    if custom_buttons {
        code.is_affirmative()
    } else {
        code == ResultCode::OK
    }
}

/// Process operations used after the loop ends
pub trait ProcessControl {
    fn own_pid(&self) -> i32;
    fn parent_pid(&self) -> i32;
    fn send_signal(&self, pid: i32, signal: i32) -> io::Result<()>;
}

/// The real process table
pub struct SystemProcesses;

impl ProcessControl for SystemProcesses {
    fn own_pid(&self) -> i32 {
        std::process::id() as i32
    }

    fn parent_pid(&self) -> i32 {
        // SAFETY: getppid has no preconditions and cannot fail
        unsafe { libc::getppid() }
    }

    fn send_signal(&self, pid: i32, signal: i32) -> io::Result<()> {
        // SAFETY: kill only reads its integer arguments
        let rc = unsafe { libc::kill(pid, signal) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

/// Progress auto-kill and `--kill-parent`, run once the loop has ended
pub fn signal_parent(config: &DialogConfig, code: ResultCode, procs: &dyn ProcessControl) {
    let parent = procs.parent_pid();

    match config.termination.kill_parent {
        None => {
            if config.mode == Mode::Progress && config.options.progress.auto_kill && code != ResultCode::OK {
                debug!("Progress ended with {}, sending SIGHUP to parent {}", code, parent);
                if let Err(e) = procs.send_signal(parent, libc::SIGHUP) {
                    warn!("Failed to signal parent {}: {}", parent, e);
                }
            }
        }
        Some(signal) if signal > 0 && signal < MAX_SIGNAL => {
            debug!("Sending signal {} to parent {}", signal, parent);
            if let Err(e) = procs.send_signal(parent, signal) {
                warn!("Failed to signal parent {}: {}", parent, e);
            }
        }
        Some(_) => {}
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records signals instead of sending them
    #[derive(Default)]
    pub struct RecordingProcesses {
        pub sent: RefCell<Vec<(i32, i32)>>,
    }

    impl ProcessControl for RecordingProcesses {
        fn own_pid(&self) -> i32 {
            100
        }

        fn parent_pid(&self) -> i32 {
            42
        }

        fn send_signal(&self, pid: i32, signal: i32) -> io::Result<()> {
            self.sent.borrow_mut().push((pid, signal));
            Ok(())
        }
    }

    #[test]
    fn test_sentinels_never_print() {
        for always in [false, true] {
            for custom in [false, true] {
                assert!(!should_print(ResultCode::ESCAPE, always, custom));
                assert!(!should_print(ResultCode::TIMEOUT, always, custom));
            }
        }
    }

    #[test]
    fn test_standard_buttons_print_only_ok() {
        assert!(should_print(ResultCode::OK, false, false));
        assert!(!should_print(ResultCode::CANCEL, false, false));
        assert!(!should_print(ResultCode(2), false, false));
    }

    #[test]
    fn test_custom_buttons_print_even_codes() {
        assert!(should_print(ResultCode(0), false, true));
        assert!(should_print(ResultCode(6), false, true));
        assert!(!should_print(ResultCode(3), false, true));
        assert!(should_print(ResultCode(3), true, true));
    }

    #[test]
    fn test_kill_parent_signal() {
        let mut config = DialogConfig::new(Mode::Entry);
        config.termination.kill_parent = Some(libc::SIGTERM);
        let procs = RecordingProcesses::default();
        signal_parent(&config, ResultCode::OK, &procs);
        assert_eq!(*procs.sent.borrow(), vec![(42, libc::SIGTERM)]);
    }

    #[test]
    fn test_kill_parent_out_of_range_is_ignored() {
        let mut config = DialogConfig::new(Mode::Entry);
        config.termination.kill_parent = Some(0);
        let procs = RecordingProcesses::default();
        signal_parent(&config, ResultCode::OK, &procs);
        assert!(procs.sent.borrow().is_empty());
    }

    #[test]
    fn test_progress_auto_kill() {
        let mut config = DialogConfig::new(Mode::Progress);
        config.options.progress.auto_kill = true;

        let procs = RecordingProcesses::default();
        signal_parent(&config, ResultCode::OK, &procs);
        assert!(procs.sent.borrow().is_empty());

        signal_parent(&config, ResultCode::CANCEL, &procs);
        assert_eq!(*procs.sent.borrow(), vec![(42, libc::SIGHUP)]);
    }
}
