//! Error types for the screen engine.

use std::io;
use thiserror::Error;

/// Failure to create or reshape a window buffer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid window size {rows}x{cols}")]
    InvalidSize { rows: i32, cols: i32 },

    #[error("unable to allocate {rows}x{cols} window")]
    Allocation { rows: i32, cols: i32 },
}

/// Failure reported by the platform terminal layer
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("terminal unavailable: {0}")]
    Unavailable(String),
}

/// Which of the session windows an allocation failure hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Physical,
    Shadow,
    Drawable,
}

impl std::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WindowKind::Physical => "physical screen",
            WindowKind::Shadow => "shadow screen",
            WindowKind::Drawable => "drawable window",
        };
        f.write_str(name)
    }
}

/// Conditions under which `open` cannot leave a usable process behind.
///
/// The library only reports these; the entry point is expected to turn
/// them into a process exit with [`FatalInit::exit_code`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FatalInit {
    #[error("LINES={lines} COLS={cols}: too small")]
    ScreenTooSmall { lines: u16, cols: u16 },

    #[error("unable to create {window}: {source}")]
    Allocation {
        window: WindowKind,
        #[source]
        source: WindowError,
    },
}

impl FatalInit {
    /// Historical exit status for this failure class
    pub fn exit_code(&self) -> i32 {
        match self {
            FatalInit::ScreenTooSmall { .. } => 4,
            FatalInit::Allocation {
                window: WindowKind::Physical | WindowKind::Shadow,
                ..
            } => 2,
            FatalInit::Allocation {
                window: WindowKind::Drawable,
                ..
            } => 1,
        }
    }
}

/// Errors returned by the lifecycle operations
#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("screen is already open")]
    AlreadyOpen,

    #[error("screen is not open")]
    NotOpen,

    #[error("too many ripped-off lines (or registry already consumed)")]
    CapacityExceeded,

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("window allocation failed: {0}")]
    Allocation(#[from] WindowError),

    #[error("fatal initialization error: {0}")]
    FatalInit(#[from] FatalInit),
}

pub type Result<T> = std::result::Result<T, ScreenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_class() {
        let small = FatalInit::ScreenTooSmall { lines: 1, cols: 80 };
        let shadow = FatalInit::Allocation {
            window: WindowKind::Shadow,
            source: WindowError::Allocation { rows: 24, cols: 80 },
        };
        let drawable = FatalInit::Allocation {
            window: WindowKind::Drawable,
            source: WindowError::Allocation { rows: 23, cols: 80 },
        };

        assert_eq!(small.exit_code(), 4);
        assert_eq!(shadow.exit_code(), 2);
        assert_eq!(drawable.exit_code(), 1);
    }

    #[test]
    fn test_messages() {
        let err = ScreenError::from(FatalInit::ScreenTooSmall { lines: 1, cols: 1 });
        assert_eq!(
            err.to_string(),
            "fatal initialization error: LINES=1 COLS=1: too small"
        );
    }
}
