//! Platform terminal layer
//!
//! The screen lifecycle talks to the real terminal only through the
//! [`Platform`] trait: taking and releasing control of the tty, reporting
//! its size, and cursor visibility. [`CrosstermPlatform`] drives an actual
//! terminal; [`HeadlessPlatform`] reports a scripted size and is used for
//! tests and for running without a tty.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetSize},
};

use super::error::PlatformError;

/// Cursor visibility, as curses numbers it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorVisibility {
    Invisible,
    #[default]
    Normal,
    VeryVisible,
}

impl CursorVisibility {
    pub fn level(&self) -> u8 {
        match self {
            CursorVisibility::Invisible => 0,
            CursorVisibility::Normal => 1,
            CursorVisibility::VeryVisible => 2,
        }
    }
}

/// Terminal operations the screen lifecycle depends on
pub trait Platform {
    /// Take control of the terminal and report its size as (lines, cols)
    fn open(&mut self, args: &[String]) -> Result<(u16, u16), PlatformError>;

    /// Give the terminal back to the shell
    fn close(&mut self) -> Result<(), PlatformError>;

    /// Current number of rows
    fn rows(&self) -> Result<u16, PlatformError>;

    /// Current number of columns
    fn cols(&self) -> Result<u16, PlatformError>;

    fn cursor_mode(&self) -> CursorVisibility;

    fn set_cursor_mode(&mut self, mode: CursorVisibility) -> Result<(), PlatformError>;

    /// Ask the terminal to take a new size. (0, 0) leaves it as it is.
    fn resize_screen(&mut self, lines: u16, cols: u16) -> Result<(), PlatformError>;

    /// The user changed the terminal size since the last adjustment
    fn resized(&self) -> bool;

    /// Acknowledge a size change once the screen has adopted it
    fn clear_resized(&mut self);
}

/// Real terminal via crossterm
pub struct CrosstermPlatform {
    /// Size adopted at open or at the last acknowledged resize
    known_size: (u16, u16),
    cursor: CursorVisibility,
    active: bool,
}

impl Default for CrosstermPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermPlatform {
    pub fn new() -> Self {
        Self {
            known_size: (0, 0),
            cursor: CursorVisibility::Normal,
            active: false,
        }
    }

    /// crossterm reports (cols, rows)
    fn query_size() -> Result<(u16, u16), PlatformError> {
        let (cols, rows) = terminal::size()?;
        Ok((rows, cols))
    }
}

impl Platform for CrosstermPlatform {
    fn open(&mut self, args: &[String]) -> Result<(u16, u16), PlatformError> {
        tracing::debug!("Opening terminal (args: {:?})", args);

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = terminal::disable_raw_mode();
            return Err(e.into());
        }

        let size = match Self::query_size() {
            Ok(size) => size,
            Err(e) => {
                let _ = execute!(stdout, LeaveAlternateScreen);
                let _ = terminal::disable_raw_mode();
                return Err(e);
            }
        };
        self.known_size = size;
        self.active = true;
        Ok(size)
    }

    fn close(&mut self) -> Result<(), PlatformError> {
        if !self.active {
            return Ok(());
        }

        let mut stdout = io::stdout();
        execute!(stdout, Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        stdout.flush()?;
        self.active = false;
        Ok(())
    }

    fn rows(&self) -> Result<u16, PlatformError> {
        Ok(Self::query_size()?.0)
    }

    fn cols(&self) -> Result<u16, PlatformError> {
        Ok(Self::query_size()?.1)
    }

    fn cursor_mode(&self) -> CursorVisibility {
        self.cursor
    }

    fn set_cursor_mode(&mut self, mode: CursorVisibility) -> Result<(), PlatformError> {
        let mut stdout = io::stdout();
        match mode {
            CursorVisibility::Invisible => execute!(stdout, Hide)?,
            _ => execute!(stdout, Show)?,
        }
        self.cursor = mode;
        Ok(())
    }

    fn resize_screen(&mut self, lines: u16, cols: u16) -> Result<(), PlatformError> {
        if lines == 0 && cols == 0 {
            return Ok(());
        }
        let mut stdout = io::stdout();
        execute!(stdout, SetSize(cols, lines))?;
        Ok(())
    }

    fn resized(&self) -> bool {
        self.active && Self::query_size().map_or(false, |size| size != self.known_size)
    }

    fn clear_resized(&mut self) {
        if let Ok(size) = Self::query_size() {
            self.known_size = size;
        }
    }
}

/// Terminal stand-in with a scripted size
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    lines: u16,
    cols: u16,
    cursor: CursorVisibility,
    resized: bool,
    open: bool,
    fail_open: bool,
}

impl HeadlessPlatform {
    pub fn new(lines: u16, cols: u16) -> Self {
        Self {
            lines,
            cols,
            cursor: CursorVisibility::Normal,
            resized: false,
            open: false,
            fail_open: false,
        }
    }

    /// A platform whose `open` always fails
    pub fn unavailable() -> Self {
        Self {
            fail_open: true,
            ..Self::new(0, 0)
        }
    }

    /// Simulate the user resizing the terminal
    pub fn set_size(&mut self, lines: u16, cols: u16) {
        self.lines = lines;
        self.cols = cols;
        self.resized = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Platform for HeadlessPlatform {
    fn open(&mut self, _args: &[String]) -> Result<(u16, u16), PlatformError> {
        if self.fail_open {
            return Err(PlatformError::Unavailable("no terminal attached".to_string()));
        }
        self.open = true;
        Ok((self.lines, self.cols))
    }

    fn close(&mut self) -> Result<(), PlatformError> {
        self.open = false;
        Ok(())
    }

    fn rows(&self) -> Result<u16, PlatformError> {
        Ok(self.lines)
    }

    fn cols(&self) -> Result<u16, PlatformError> {
        Ok(self.cols)
    }

    fn cursor_mode(&self) -> CursorVisibility {
        self.cursor
    }

    fn set_cursor_mode(&mut self, mode: CursorVisibility) -> Result<(), PlatformError> {
        self.cursor = mode;
        Ok(())
    }

    fn resize_screen(&mut self, lines: u16, cols: u16) -> Result<(), PlatformError> {
        if lines != 0 || cols != 0 {
            self.lines = lines;
            self.cols = cols;
        }
        Ok(())
    }

    fn resized(&self) -> bool {
        self.resized
    }

    fn clear_resized(&mut self) {
        self.resized = false;
    }
}
