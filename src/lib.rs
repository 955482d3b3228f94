//! dialogbox library
//!
//! Builds a single dialog window from command line options, runs it until a
//! termination trigger fires and reports the result on stdout and through
//! the exit status. Dialogs can also plug into a notebook/paned container
//! run by another dialogbox process.

pub mod arbiter;
pub mod cli;
pub mod config;
pub mod countdown;
pub mod embed;
pub mod emission;
pub mod error;
pub mod geometry;
pub mod gui;
pub mod layout;
pub mod modes;
pub mod plug;
pub mod response;
pub mod session;
pub mod signals;
pub mod text;
pub mod window;

pub use arbiter::{Arbiter, Step, TerminationEvent};
pub use config::{DialogConfig, Mode, Settings};
pub use error::{DialogError, Result};
pub use response::ResultCode;
pub use session::{DialogSession, LoopEvent};
