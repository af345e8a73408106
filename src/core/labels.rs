//! Soft label area
//!
//! A label subsystem may reserve rows at the bottom of the terminal for a
//! strip of function-key labels. The screen asks it how many rows it
//! needs when sizing the drawable window, and hands it the label window
//! to redraw after every resize.

use super::error::WindowError;
use super::window::{AttrFlags, CellAttrs, Window};

/// Label subsystem as seen by the screen lifecycle
pub trait LabelArea {
    /// Rows reserved at the bottom of the terminal
    fn reserved_rows(&self) -> u16;

    /// Reshape the label window
    fn resize_window(
        &mut self,
        win: &mut Window,
        rows: u16,
        cols: u16,
        limit: Option<usize>,
    ) -> Result<(), WindowError> {
        win.resize_limited(rows as i32, cols as i32, limit)
    }

    /// Redraw label content into a (possibly resized) window
    fn reinitialize(&mut self, win: &mut Window);
}

/// No label strip at all
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLabels;

impl LabelArea for NoLabels {
    fn reserved_rows(&self) -> u16 {
        0
    }

    fn reinitialize(&mut self, _win: &mut Window) {}
}

/// Label arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    /// 8 labels in groups of 3, 2, 3
    ThreeTwoThree,
    /// 8 labels in groups of 4, 4
    FourFour,
    /// 12 labels in groups of 4, 4, 4
    FourFourFour,
    /// 12 labels with a row of key numbers above
    FourFourFourIndex,
}

impl LabelFormat {
    /// Parse a format name ("3-2-3", "4-4", "4-4-4", "4-4-4-index")
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "3-2-3" => Some(LabelFormat::ThreeTwoThree),
            "4-4" => Some(LabelFormat::FourFour),
            "4-4-4" => Some(LabelFormat::FourFourFour),
            "4-4-4-index" => Some(LabelFormat::FourFourFourIndex),
            _ => None,
        }
    }

    fn groups(&self) -> &'static [usize] {
        match self {
            LabelFormat::ThreeTwoThree => &[3, 2, 3],
            LabelFormat::FourFour => &[4, 4],
            LabelFormat::FourFourFour | LabelFormat::FourFourFourIndex => &[4, 4, 4],
        }
    }

    pub fn label_count(&self) -> usize {
        self.groups().iter().sum()
    }

    pub fn rows(&self) -> u16 {
        match self {
            LabelFormat::FourFourFourIndex => 2,
            _ => 1,
        }
    }
}

/// Soft function-key labels
#[derive(Debug, Clone)]
pub struct SoftLabels {
    format: LabelFormat,
    labels: Vec<String>,
}

impl SoftLabels {
    pub fn new(format: LabelFormat) -> Self {
        Self {
            format,
            labels: vec![String::new(); format.label_count()],
        }
    }

    pub fn format(&self) -> LabelFormat {
        self.format
    }

    /// Set label `n` (1-based); out of range is ignored
    pub fn set(&mut self, n: usize, text: &str) -> bool {
        match n.checked_sub(1).and_then(|i| self.labels.get_mut(i)) {
            Some(slot) => {
                *slot = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn label(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    /// Starting column of each label for a strip `cols` wide.
    ///
    /// Labels within a group sit side by side; the leftover space is
    /// spread between groups.
    fn positions(&self, cols: u16) -> (Vec<u16>, u16) {
        let groups = self.format.groups();
        let count = self.format.label_count() as u16;
        let gaps = groups.len() as u16 - 1;

        let width = (cols.saturating_sub(gaps) / count).max(1);
        let spare = cols.saturating_sub(width * count);
        let gap = if gaps > 0 { spare / gaps } else { 0 };

        let mut positions = Vec::with_capacity(count as usize);
        let mut x = 0u16;
        for (g, &size) in groups.iter().enumerate() {
            if g > 0 {
                x += gap;
            }
            for _ in 0..size {
                positions.push(x);
                x += width;
            }
        }
        (positions, width)
    }
}

impl LabelArea for SoftLabels {
    fn reserved_rows(&self) -> u16 {
        self.format.rows()
    }

    fn reinitialize(&mut self, win: &mut Window) {
        win.move_to(0, 0);
        win.clear_to_bottom();

        let label_row = self.format.rows() - 1;
        let (positions, width) = self.positions(win.cols());

        for (i, &x) in positions.iter().enumerate() {
            if label_row > 0 {
                win.set_attrs(CellAttrs::default());
                win.put_str(0, x, &format!("F{}", i + 1));
            }

            let text: String = self.labels[i].chars().take(width as usize).collect();
            win.set_attrs(CellAttrs {
                flags: AttrFlags::REVERSE,
                ..CellAttrs::default()
            });
            win.put_str(label_row, x, &format!("{:<w$}", text, w = width as usize));
        }
        win.set_attrs(CellAttrs::default());
    }
}
