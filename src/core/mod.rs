//! Screen engine.
//!
//! - **window**: cell buffers with change tracking
//! - **ripoff**: one-row strips carved off the terminal before open
//! - **labels**: soft label area reserved at the bottom
//! - **platform**: terminal control (crossterm or headless)
//! - **screen**: per-session state
//! - **context**: the open / close / resize / teardown lifecycle
//!
//! # Architecture
//!
//! ```text
//! Context
//! ├── Platform (tty control, size queries)
//! ├── LabelArea (reserved bottom rows)
//! ├── RipoffRegistry (consumed by the first open)
//! └── Screen
//!     ├── physical  (what the terminal shows)
//!     ├── shadow    (last rendered frame)
//!     ├── drawable  (application area)
//!     ├── ripped strips
//!     └── label window
//! ```

pub mod context;
pub mod error;
pub mod labels;
pub mod platform;
pub mod ripoff;
pub mod screen;
pub mod window;

pub use context::{Context, MIN_SIZE};
pub use error::{FatalInit, PlatformError, ScreenError, WindowError, WindowKind};
pub use labels::{LabelArea, LabelFormat, NoLabels, SoftLabels};
pub use platform::{CrosstermPlatform, CursorVisibility, HeadlessPlatform, Platform};
pub use ripoff::{RipoffEdge, RipoffRegistry, RippedLine, MAX_RIPOFFS};
pub use screen::{ModeSnapshot, Screen, ScreenId, TerminalModes};
pub use window::{AttrFlags, Cell, CellAttrs, Color, Window};
