//! Process-wide outcome bitmask

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask summarizing which failure classes occurred during a run.
///
/// The numeric value doubles as the process exit code. Bits are independent
/// and combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OutcomeCode(u8);

impl OutcomeCode {
    pub const SUCCESS: Self = Self(0b0000);
    pub const NO_VALID_FILE: Self = Self(0b0001);
    pub const FFPROBE_NOT_FOUND: Self = Self(0b0010);
    pub const FFPROBE_ERROR: Self = Self(0b0100);
    pub const TRANSFORM_ERROR: Self = Self(0b1000);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Whether every bit of `other` is set in `self`
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn exit_code(self) -> i32 {
        i32::from(self.0)
    }
}

impl BitOr for OutcomeCode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for OutcomeCode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<OutcomeCode> for OutcomeCode {
    fn from_iter<I: IntoIterator<Item = OutcomeCode>>(iter: I) -> Self {
        iter.into_iter().fold(Self::SUCCESS, |acc, code| acc | code)
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            return write!(f, "success");
        }

        let names = [
            (Self::NO_VALID_FILE, "no valid file"),
            (Self::FFPROBE_NOT_FOUND, "ffprobe not found"),
            (Self::FFPROBE_ERROR, "ffprobe error"),
            (Self::TRANSFORM_ERROR, "transform error"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{} ({:#06b})", set.join(" | "), self.0)
    }
}
