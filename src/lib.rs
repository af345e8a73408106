//! termscreen - screen session lifecycle for a curses-style terminal library
//!
//! This crate brings a terminal under program control and maintains the
//! layered window buffers a curses library draws through:
//!
//! - **physical**: what the terminal currently shows
//! - **shadow**: what was rendered last frame
//! - **drawable**: the application's area, minus ripped-off strips and
//!   the soft label area
//!
//! # Quick Start
//!
//! ```no_run
//! use termscreen::core::{Context, CrosstermPlatform, RipoffEdge};
//!
//! let mut ctx = Context::new(CrosstermPlatform::new());
//! ctx.ripoff_line(RipoffEdge::Top, |win, _cols| {
//!     win.put_str(0, 0, "status");
//! })?;
//!
//! let win = ctx.open(&[])?;
//! win.put_str(0, 0, "hello");
//!
//! ctx.close()?;
//! if let Some(id) = ctx.screen().map(|s| s.id()) {
//!     ctx.teardown(id);
//! }
//! # Ok::<(), termscreen::core::ScreenError>(())
//! ```

pub mod config;
pub mod core;

/// Version string reported by [`curses_version`]
const NOTICE: &str = concat!("termscreen ", env!("CARGO_PKG_VERSION"));

/// Describe the library version
pub fn curses_version() -> &'static str {
    NOTICE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_notice() {
        assert!(curses_version().starts_with("termscreen "));
        assert!(curses_version().ends_with(env!("CARGO_PKG_VERSION")));
    }
}
