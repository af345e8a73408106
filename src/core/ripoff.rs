//! Ripped-off lines
//!
//! Before a screen is opened the application may ask for up to
//! [`MAX_RIPOFFS`] one-row strips to be carved off the top or bottom of
//! the terminal. The registry is consumed by the first `open`; the strips
//! it produces live on the screen for the rest of its life.

use std::fmt;

use super::error::{Result, ScreenError};
use super::window::Window;

/// Maximum number of pending ripoff requests
pub const MAX_RIPOFFS: usize = 5;

/// Callback that fills a freshly allocated strip, given its width
pub type RipoffInit = Box<dyn FnOnce(&mut Window, u16)>;

/// Which edge a strip is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RipoffEdge {
    Top,
    Bottom,
}

impl RipoffEdge {
    /// Curses convention: negative line numbers pin to the bottom
    pub fn from_line(line: i32) -> Option<Self> {
        match line {
            0 => None,
            l if l < 0 => Some(RipoffEdge::Bottom),
            _ => Some(RipoffEdge::Top),
        }
    }
}

struct Ripoff {
    edge: RipoffEdge,
    init: RipoffInit,
}

/// Pending ripoff requests, in registration order
#[derive(Default)]
pub struct RipoffRegistry {
    entries: Vec<Ripoff>,
}

impl fmt::Debug for RipoffRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.edge))
            .finish()
    }
}

/// A strip produced by draining the registry
#[derive(Debug)]
pub struct RippedLine {
    pub edge: RipoffEdge,
    pub window: Window,
}

/// Row bookkeeping after the registry has been drained
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RipoffLayout {
    /// Rows consumed by strips
    pub count: u16,
    /// How many of those are pinned to the top
    pub on_top: u16,
}

impl RipoffRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a strip request
    pub fn register<F>(&mut self, edge: RipoffEdge, init: F) -> Result<()>
    where
        F: FnOnce(&mut Window, u16) + 'static,
    {
        if self.entries.len() >= MAX_RIPOFFS {
            return Err(ScreenError::CapacityExceeded);
        }
        self.entries.push(Ripoff {
            edge,
            init: Box::new(init),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allocate one strip per request, in registration order.
    ///
    /// `bottom` is the first row below the region the strips may take
    /// from. Top strips stack downward from row 0; bottom strips stack
    /// upward from `bottom`, unaffected by how many top strips exist.
    /// Each placed strip costs one drawable row.
    /// A strip that cannot be allocated is skipped with its callback
    /// unrun, and costs nothing.
    pub fn drain(
        self,
        cols: u16,
        bottom: u16,
        limit: Option<usize>,
    ) -> (Vec<RippedLine>, RipoffLayout) {
        let mut layout = RipoffLayout::default();
        let mut lines = Vec::with_capacity(self.entries.len());
        let mut remaining = bottom;

        for entry in self.entries {
            let row = match entry.edge {
                RipoffEdge::Top => layout.on_top,
                RipoffEdge::Bottom => remaining.saturating_sub(1),
            };

            let mut window = match Window::new_limited(1, cols as i32, row, 0, limit) {
                Ok(w) => w,
                Err(e) => {
                    tracing::warn!("Ripoff strip at row {} not allocated: {}", row, e);
                    continue;
                }
            };
            (entry.init)(&mut window, cols);

            match entry.edge {
                RipoffEdge::Top => layout.on_top += 1,
                RipoffEdge::Bottom => remaining = remaining.saturating_sub(1),
            }
            layout.count += 1;
            lines.push(RippedLine {
                edge: entry.edge,
                window,
            });
        }

        (lines, layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_capacity() {
        let mut reg = RipoffRegistry::new();
        for _ in 0..MAX_RIPOFFS {
            reg.register(RipoffEdge::Top, |_, _| {}).unwrap();
        }
        assert!(matches!(
            reg.register(RipoffEdge::Bottom, |_, _| {}),
            Err(ScreenError::CapacityExceeded)
        ));
        assert_eq!(reg.len(), MAX_RIPOFFS);
    }

    #[test]
    fn test_edge_from_line() {
        assert_eq!(RipoffEdge::from_line(1), Some(RipoffEdge::Top));
        assert_eq!(RipoffEdge::from_line(-1), Some(RipoffEdge::Bottom));
        assert_eq!(RipoffEdge::from_line(0), None);
    }

    #[test]
    fn test_top_strips_stack_in_order() {
        let mut reg = RipoffRegistry::new();
        reg.register(RipoffEdge::Top, |w, _| {
            w.put_str(0, 0, "A");
        })
        .unwrap();
        reg.register(RipoffEdge::Top, |w, _| {
            w.put_str(0, 0, "B");
        })
        .unwrap();

        let (lines, layout) = reg.drain(80, 24, None);
        assert_eq!(layout, RipoffLayout { count: 2, on_top: 2 });
        assert_eq!(lines[0].window.begy, 0);
        assert_eq!(lines[1].window.begy, 1);
        assert_eq!(lines[0].window.cell(0, 0).unwrap().ch, 'A');
        assert_eq!(lines[1].window.cell(0, 0).unwrap().ch, 'B');
    }

    #[test]
    fn test_bottom_strips_stack_upward() {
        let mut reg = RipoffRegistry::new();
        reg.register(RipoffEdge::Bottom, |_, _| {}).unwrap();
        reg.register(RipoffEdge::Top, |_, _| {}).unwrap();
        reg.register(RipoffEdge::Bottom, |_, _| {}).unwrap();

        let (lines, layout) = reg.drain(80, 24, None);
        assert_eq!(layout, RipoffLayout { count: 3, on_top: 1 });
        assert_eq!(lines[0].window.begy, 23);
        assert_eq!(lines[1].window.begy, 0);
        assert_eq!(lines[2].window.begy, 22);
    }

    #[test]
    fn test_init_receives_width() {
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let mut reg = RipoffRegistry::new();
        reg.register(RipoffEdge::Top, move |w, cols| {
            *sink.borrow_mut() = Some((w.size(), cols));
        })
        .unwrap();

        reg.drain(132, 40, None);
        assert_eq!(*seen.borrow(), Some(((1, 132), 132)));
    }

    #[test]
    fn test_failed_strip_costs_nothing() {
        let mut reg = RipoffRegistry::new();
        reg.register(RipoffEdge::Top, |_, _| panic!("must not run")).unwrap();

        let (lines, layout) = reg.drain(80, 24, Some(10));
        assert!(lines.is_empty());
        assert_eq!(layout, RipoffLayout::default());
    }
}
