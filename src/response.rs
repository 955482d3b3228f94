//! Result codes
//!
//! A dialog ends with exactly one signed result code, which becomes the
//! process exit status. Even codes are affirmative (their result is printed),
//! odd codes are dismissive. `ESCAPE` and `TIMEOUT` are reserved sentinels
//! that sit outside the parity convention.

use std::fmt;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultCode(pub i32);

impl ResultCode {
    pub const OK: Self = Self(0);
    pub const CANCEL: Self = Self(1);
    pub const ESCAPE: Self = Self(252);
    pub const TIMEOUT: Self = Self(253);

    pub fn is_sentinel(self) -> bool {
        self == Self::ESCAPE || self == Self::TIMEOUT
    }

    /// Even, non-sentinel codes
    pub fn is_affirmative(self) -> bool {
        !self.is_sentinel() && self.0 & 1 == 0
    }

    /// Exit status as seen by the parent shell (truncated to 8 bits)
    pub fn exit_status(self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

impl Default for ResultCode {
    fn default() -> Self {
        Self::ESCAPE
    }
}

impl From<i32> for ResultCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl From<ResultCode> for ExitCode {
    fn from(code: ResultCode) -> Self {
        ExitCode::from(code.exit_status())
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ESCAPE => write!(f, "{} (escape)", self.0),
            Self::TIMEOUT => write!(f, "{} (timeout)", self.0),
            code => write!(f, "{}", code.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_not_affirmative() {
        // both sentinels are even numbers but must never count as affirmative
        assert!(!ResultCode::ESCAPE.is_affirmative());
        assert!(!ResultCode::TIMEOUT.is_affirmative());
        assert!(ResultCode::OK.is_affirmative());
        assert!(!ResultCode::CANCEL.is_affirmative());
    }

    #[test]
    fn test_parity_classification() {
        assert!(ResultCode(2).is_affirmative());
        assert!(ResultCode(-4).is_affirmative());
        assert!(!ResultCode(3).is_affirmative());
        assert!(!ResultCode(-1).is_affirmative());
    }

    #[test]
    fn test_exit_status_truncation() {
        assert_eq!(ResultCode::OK.exit_status(), 0);
        assert_eq!(ResultCode::ESCAPE.exit_status(), 252);
        assert_eq!(ResultCode::TIMEOUT.exit_status(), 253);
        assert_eq!(ResultCode(-1).exit_status(), 255);
        assert_eq!(ResultCode(258).exit_status(), 2);
    }

    #[test]
    fn test_default_is_escape() {
        assert_eq!(ResultCode::default(), ResultCode::ESCAPE);
    }
}
