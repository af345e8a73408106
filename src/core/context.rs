//! Screen lifecycle
//!
//! A [`Context`] owns the platform layer, the label subsystem, the
//! pending ripoff registry and at most one [`Screen`]. Every lifecycle
//! operation goes through it:
//!
//! ```text
//! Unopened ──open──▶ Open ──close──▶ Closed ──resume──▶ Open
//!                      │                │
//!                      └────teardown────┴──▶ Torn down ──open──▶ Open
//! ```
//!
//! Several contexts may coexist in one process; each holds its own
//! screen and none share state.

use tracing::{debug, error, info, warn};

use super::error::{FatalInit, Result, ScreenError, WindowKind};
use super::labels::{LabelArea, NoLabels};
use super::platform::Platform;
use super::ripoff::{RipoffEdge, RipoffRegistry};
use super::screen::{ModeSnapshot, Screen, ScreenId, TerminalModes};
use super::window::{CellAttrs, Window};

/// Smallest usable terminal extent in either direction
pub const MIN_SIZE: u16 = 2;

/// Owner of one screen session and its collaborators
pub struct Context<P: Platform> {
    platform: P,
    labels: Box<dyn LabelArea>,
    /// `None` once the first open has consumed it
    ripoffs: Option<RipoffRegistry>,
    screen: Option<Screen>,
    next_id: u64,
    preserve: bool,
    cell_limit: Option<usize>,
    args: Vec<String>,
}

impl<P: Platform> Context<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            labels: Box::new(NoLabels),
            ripoffs: Some(RipoffRegistry::new()),
            screen: None,
            next_id: 1,
            preserve: false,
            cell_limit: None,
            args: Vec::new(),
        }
    }

    /// Install the label subsystem consulted by `open` and `resize`
    pub fn with_labels<L: LabelArea + 'static>(mut self, labels: L) -> Self {
        self.labels = Box::new(labels);
        self
    }

    /// Keep whatever the terminal already shows instead of clearing it
    pub fn set_preserve(&mut self, preserve: bool) {
        self.preserve = preserve;
    }

    /// Cap the number of cells any one window may hold
    pub fn set_cell_limit(&mut self, limit: Option<usize>) {
        self.cell_limit = limit;
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    pub fn screen_mut(&mut self) -> Option<&mut Screen> {
        self.screen.as_mut()
    }

    /// Ask for a one-row strip to be carved off `edge` by the next open.
    ///
    /// Fails once [`super::ripoff::MAX_RIPOFFS`] strips are pending, and
    /// for good once an open has consumed the registry.
    pub fn ripoff_line<F>(&mut self, edge: RipoffEdge, init: F) -> Result<()>
    where
        F: FnOnce(&mut Window, u16) + 'static,
    {
        match self.ripoffs.as_mut() {
            Some(registry) => registry.register(edge, init),
            None => Err(ScreenError::CapacityExceeded),
        }
    }

    /// Take control of the terminal and build the session windows.
    ///
    /// Returns the drawable window. [`ScreenError::FatalInit`] means the
    /// process cannot continue and should exit with the error's code.
    pub fn open(&mut self, args: &[String]) -> Result<&mut Window> {
        debug!("open() - called");

        if let Some(screen) = self.screen.take() {
            if screen.alive {
                self.screen = Some(screen);
                return Err(ScreenError::AlreadyOpen);
            }
            debug!("Discarding suspended screen {:?}", screen.id);
            screen.release();
        }

        let (lines, cols) = self.platform.open(args)?;
        // The session is built at the size just reported
        self.platform.clear_resized();
        self.args = args.to_vec();
        let orig_cursor = self.platform.cursor_mode();

        if lines < MIN_SIZE || cols < MIN_SIZE {
            return Err(self.abort(FatalInit::ScreenTooSmall { lines, cols }));
        }

        let limit = self.cell_limit;
        let mut physical = match Window::new_limited(lines as i32, cols as i32, 0, 0, limit) {
            Ok(w) => w,
            Err(source) => {
                return Err(self.abort(FatalInit::Allocation {
                    window: WindowKind::Physical,
                    source,
                }))
            }
        };
        let mut shadow = match Window::new_limited(lines as i32, cols as i32, 0, 0, limit) {
            Ok(w) => w,
            Err(source) => {
                return Err(self.abort(FatalInit::Allocation {
                    window: WindowKind::Shadow,
                    source,
                }))
            }
        };
        shadow.set_attrs(CellAttrs::unset());
        shadow.set_background(CellAttrs::unset());
        shadow.erase();

        // The label strip takes the physical bottom; bottom ripoffs stack above it
        let slk_window = self.create_label_window(lines, cols, self.labels.reserved_rows());
        // Without a window the label rows go back to the drawable area
        let slk_lines = slk_window.as_ref().map_or(0, Window::rows);

        let registry = self.ripoffs.take().unwrap_or_default();
        let bottom = lines.saturating_sub(slk_lines);
        let (ripped, ripoff) = registry.drain(cols, bottom, limit);

        let drawable_lines = lines as i32 - ripoff.count as i32 - slk_lines as i32;
        let mut drawable =
            match Window::new_limited(drawable_lines, cols as i32, ripoff.on_top, 0, limit) {
                Ok(w) => w,
                Err(source) => {
                    return Err(self.abort(FatalInit::Allocation {
                        window: WindowKind::Drawable,
                        source,
                    }))
                }
            };
        drawable.clear_to_bottom();

        if self.preserve {
            physical.mark_untouched();
            drawable.mark_untouched();
            drawable.full_redraw = false;
            physical.full_redraw = false;
        } else {
            physical.full_redraw = true;
        }

        let modes = TerminalModes::default();
        let id = ScreenId(self.next_id);
        self.next_id += 1;

        info!(
            "Screen {:?} opened: {}x{} physical, {}x{} drawable at row {} ({} ripped, {} label rows)",
            id, lines, cols, drawable_lines, cols, ripoff.on_top, ripoff.count, slk_lines
        );

        let screen = self.screen.insert(Screen {
            id,
            lines,
            cols,
            modes,
            resized: false,
            alive: true,
            poisoned: false,
            preserve: self.preserve,
            orig_cursor,
            shell_mode: Some(ModeSnapshot {
                modes,
                cursor: orig_cursor,
            }),
            prog_mode: None,
            ripoff,
            ripped,
            slk_lines,
            slk_window,
            physical,
            shadow,
            drawable,
        });

        Ok(&mut screen.drawable)
    }

    /// Open and hand back the screen's id rather than its drawable window
    pub fn new_term(&mut self) -> Result<ScreenId> {
        let args = self.args.clone();
        self.open(&args)?;
        self.screen
            .as_ref()
            .map(Screen::id)
            .ok_or(ScreenError::NotOpen)
    }

    fn create_label_window(&mut self, lines: u16, cols: u16, slk_lines: u16) -> Option<Window> {
        if slk_lines == 0 {
            return None;
        }

        let top = lines.saturating_sub(slk_lines);
        match Window::new_limited(slk_lines as i32, cols as i32, top, 0, self.cell_limit) {
            Ok(mut win) => {
                self.labels.reinitialize(&mut win);
                Some(win)
            }
            Err(e) => {
                warn!("Label window not created, {} rows released: {}", slk_lines, e);
                None
            }
        }
    }

    /// Give the terminal back before reporting a fatal error
    fn abort(&mut self, fatal: FatalInit) -> ScreenError {
        error!("open(): {}", fatal);
        if let Err(e) = self.platform.close() {
            warn!("Failed to release terminal: {}", e);
        }
        fatal.into()
    }

    /// Suspend the session and restore the terminal for the shell.
    ///
    /// Buffers are kept; [`Context::resume`] brings the session back.
    /// Without a live screen this does nothing.
    pub fn close(&mut self) -> Result<()> {
        debug!("close() - called");

        let Some(screen) = self.screen.as_mut().filter(|s| s.alive) else {
            warn!("close() without an open screen ignored");
            return Ok(());
        };

        screen.prog_mode = Some(ModeSnapshot {
            modes: screen.modes,
            cursor: self.platform.cursor_mode(),
        });

        if let Err(e) = self.platform.set_cursor_mode(screen.orig_cursor) {
            warn!("Failed to restore cursor: {}", e);
        }
        self.platform.close()?;
        screen.alive = false;
        Ok(())
    }

    /// Take the terminal back after a close and restore program modes
    pub fn resume(&mut self) -> Result<()> {
        debug!("resume() - called");

        let screen = self.screen.as_mut().ok_or(ScreenError::NotOpen)?;
        if screen.alive {
            return Ok(());
        }

        self.platform.open(&self.args)?;
        if let Some(snapshot) = screen.prog_mode {
            screen.modes = snapshot.modes;
            self.platform.set_cursor_mode(snapshot.cursor)?;
        }
        screen.physical.full_redraw = true;
        screen.alive = true;
        Ok(())
    }

    /// A closed screen that has not been resumed or torn down
    pub fn is_endwin(&self) -> bool {
        self.screen.as_ref().map_or(false, |s| !s.alive)
    }

    /// Only one screen exists per context; `id` is returned if it is that one
    pub fn set_term(&self, id: ScreenId) -> Option<ScreenId> {
        self.screen.as_ref().map(Screen::id).filter(|&live| live == id)
    }

    /// The user changed the terminal size and a `resize(0, 0)` is due
    pub fn is_resized(&mut self) -> bool {
        let platform_resized = self.platform.resized();
        match self.screen.as_mut() {
            Some(screen) => {
                screen.resized |= platform_resized;
                screen.resized
            }
            None => false,
        }
    }

    /// Adapt the session to a new terminal size.
    ///
    /// With (0, 0) the size the platform now reports is adopted;
    /// otherwise the platform is asked for `lines` x `cols` first.
    /// Reserved rows stay as fixed by `open`. If any window fails to
    /// resize the screen is left poisoned and must be abandoned.
    pub fn resize(&mut self, lines: u16, cols: u16) -> Result<()> {
        debug!("resize() - called: lines {} cols {}", lines, cols);

        let screen = self.screen.as_mut().ok_or(ScreenError::NotOpen)?;
        self.platform.resize_screen(lines, cols)?;

        let new_lines = self.platform.rows()?;
        let new_cols = self.platform.cols()?;
        screen.lines = new_lines;
        screen.cols = new_cols;

        let limit = self.cell_limit;
        let result = Self::resize_windows(screen, self.labels.as_mut(), limit);
        if let Err(e) = &result {
            error!("resize() left screen {:?} inconsistent: {}", screen.id, e);
            screen.poisoned = true;
            return result;
        }

        self.platform.clear_resized();
        screen.resized = false;
        info!(
            "Screen {:?} resized to {}x{} ({} drawable rows)",
            screen.id,
            new_lines,
            new_cols,
            screen.drawable_lines()
        );
        Ok(())
    }

    fn resize_windows(
        screen: &mut Screen,
        labels: &mut dyn LabelArea,
        limit: Option<usize>,
    ) -> Result<()> {
        let (lines, cols) = (screen.lines as i32, screen.cols as i32);

        screen.physical.resize_limited(lines, cols, limit)?;
        screen.drawable.resize_limited(screen.drawable_lines(), cols, limit)?;
        screen.shadow.resize_limited(lines, cols, limit)?;

        screen.shadow.erase();
        screen.physical.full_redraw = true;

        screen.relayout_ripped(limit)?;

        let slk_lines = screen.slk_lines;
        if let Some(win) = screen.slk_window.as_mut() {
            labels.resize_window(win, slk_lines, screen.cols, limit)?;
            win.begy = screen.lines.saturating_sub(slk_lines);
            labels.reinitialize(win);
        }

        screen.drawable.touch();
        screen.drawable.full_redraw = true;
        Ok(())
    }

    /// Free the screen named by `id`.
    ///
    /// Anything other than the live screen's id is ignored, so a stale id
    /// can be torn down twice without harm.
    pub fn teardown(&mut self, id: ScreenId) {
        debug!("teardown() - called: {:?}", id);

        match self.screen.take() {
            Some(mut screen) if screen.id == id => {
                screen.alive = false;
                screen.release();
            }
            other => {
                warn!("teardown() of {:?} does not match the live screen", id);
                self.screen = other;
            }
        }
    }
}

impl<P: Platform> Drop for Context<P> {
    fn drop(&mut self) {
        if self.screen.as_ref().is_some_and(|s| s.alive) {
            if let Err(e) = self.platform.close() {
                warn!("Failed to release terminal on drop: {}", e);
            }
        }
    }
}
