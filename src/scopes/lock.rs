//! Lock levels of a writable scope.

use std::fmt;

/// Read/write permission state of a [`WritableScope`](super::WritableScope).
///
/// ```text
/// WRITING ──► BOTH ──► READING
/// ```
///
/// Levels only move right. Writes are allowed in `WRITING` and `BOTH`,
/// reads in `BOTH` and `READING`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockLevel {
    #[default]
    Writing,
    Both,
    Reading,
}

impl LockLevel {
    pub fn may_read(self) -> bool {
        matches!(self, LockLevel::Both | LockLevel::Reading)
    }

    pub fn may_write(self) -> bool {
        matches!(self, LockLevel::Writing | LockLevel::Both)
    }
}

impl fmt::Display for LockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LockLevel::Writing => "WRITING",
            LockLevel::Both => "BOTH",
            LockLevel::Reading => "READING",
        })
    }
}
