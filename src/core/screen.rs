//! Screen session state
//!
//! A [`Screen`] owns everything a session needs between `open` and
//! `teardown`: the physical, shadow and drawable windows, the ripped-off
//! strips, the label window, terminal mode flags and reserved-row
//! accounting.

use super::error::WindowError;
use super::platform::CursorVisibility;
use super::ripoff::{RipoffEdge, RipoffLayout, RippedLine};
use super::window::Window;

/// Identifies one screen within a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenId(pub(crate) u64);

/// Terminal mode flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalModes {
    /// Translate CR to LF on input
    pub autocr: bool,
    pub raw_out: bool,
    pub raw_inp: bool,
    pub cbreak: bool,
    pub echo: bool,
    pub visibility: CursorVisibility,
    pub save_key_modifiers: bool,
    pub return_key_modifiers: bool,
}

impl Default for TerminalModes {
    fn default() -> Self {
        Self {
            autocr: true,
            raw_out: false,
            raw_inp: false,
            cbreak: true,
            echo: true,
            visibility: CursorVisibility::Normal,
            save_key_modifiers: false,
            return_key_modifiers: false,
        }
    }
}

/// Mode state captured for later restoration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSnapshot {
    pub modes: TerminalModes,
    pub cursor: CursorVisibility,
}

/// A live (or suspended) screen session
#[derive(Debug)]
pub struct Screen {
    pub(crate) id: ScreenId,
    /// Physical terminal size
    pub(crate) lines: u16,
    pub(crate) cols: u16,
    pub modes: TerminalModes,
    pub(crate) resized: bool,
    pub(crate) alive: bool,
    pub(crate) poisoned: bool,
    pub(crate) preserve: bool,
    pub(crate) orig_cursor: CursorVisibility,
    pub(crate) shell_mode: Option<ModeSnapshot>,
    pub(crate) prog_mode: Option<ModeSnapshot>,
    pub(crate) ripoff: RipoffLayout,
    pub(crate) ripped: Vec<RippedLine>,
    pub(crate) slk_lines: u16,
    pub(crate) slk_window: Option<Window>,
    pub(crate) physical: Window,
    pub(crate) shadow: Window,
    pub(crate) drawable: Window,
}

impl Screen {
    pub fn id(&self) -> ScreenId {
        self.id
    }

    /// Physical size as (lines, cols)
    pub fn size(&self) -> (u16, u16) {
        (self.lines, self.cols)
    }

    /// Rows available to the drawable window after reserved strips
    pub fn drawable_lines(&self) -> i32 {
        self.lines as i32 - self.ripoff.count as i32 - self.slk_lines as i32
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// A resize failed part way; the windows no longer agree on geometry
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn preserve(&self) -> bool {
        self.preserve
    }

    /// Rows consumed by ripped-off strips
    pub fn ripped_count(&self) -> u16 {
        self.ripoff.count
    }

    /// Ripped-off strips pinned to the top
    pub fn ripped_on_top(&self) -> u16 {
        self.ripoff.on_top
    }

    pub fn ripped_lines(&self) -> &[RippedLine] {
        &self.ripped
    }

    pub fn ripped_lines_mut(&mut self) -> &mut [RippedLine] {
        &mut self.ripped
    }

    pub fn label_lines(&self) -> u16 {
        self.slk_lines
    }

    pub fn label_window(&self) -> Option<&Window> {
        self.slk_window.as_ref()
    }

    /// What the terminal currently shows
    pub fn physical(&self) -> &Window {
        &self.physical
    }

    pub fn physical_mut(&mut self) -> &mut Window {
        &mut self.physical
    }

    /// What was rendered last frame
    pub fn shadow(&self) -> &Window {
        &self.shadow
    }

    /// The application's window
    pub fn drawable(&self) -> &Window {
        &self.drawable
    }

    pub fn drawable_mut(&mut self) -> &mut Window {
        &mut self.drawable
    }

    pub fn original_cursor(&self) -> CursorVisibility {
        self.orig_cursor
    }

    /// Modes captured when the screen was opened
    pub fn shell_mode(&self) -> Option<&ModeSnapshot> {
        self.shell_mode.as_ref()
    }

    /// Modes captured by the last close
    pub fn prog_mode(&self) -> Option<&ModeSnapshot> {
        self.prog_mode.as_ref()
    }

    /// Re-anchor ripped strips after the physical size changed.
    ///
    /// Top strips keep their rows; bottom strips follow the bottom edge
    /// above the label area. Strip content is kept, not re-initialized.
    pub(crate) fn relayout_ripped(&mut self, limit: Option<usize>) -> Result<(), WindowError> {
        let mut bottom = self.lines.saturating_sub(self.slk_lines);
        for line in &mut self.ripped {
            line.window.resize_limited(1, self.cols as i32, limit)?;
            if line.edge == RipoffEdge::Bottom {
                bottom = bottom.saturating_sub(1);
                line.window.begy = bottom;
            }
        }
        Ok(())
    }

    /// Release the session's windows in a fixed order: label area first,
    /// then drawable, physical and shadow.
    pub(crate) fn release(self) {
        let Screen {
            id,
            slk_window,
            ripped,
            drawable,
            physical,
            shadow,
            ..
        } = self;

        drop(slk_window);
        drop(drawable);
        drop(physical);
        drop(shadow);
        drop(ripped);
        tracing::debug!("Released screen {:?}", id);
    }
}
