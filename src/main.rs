//! termscreen - open a curses-style screen session and report its layout
//!
//! # Quick Start
//!
//! ```text
//! termscreen                       # Use the real terminal
//! termscreen --headless 24x80      # Scripted size, no tty needed
//! termscreen --config my.toml      # Explicit configuration file
//! ```
//!
//! # Exit Status
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Drawable window could not be allocated |
//! | 2 | Physical or shadow screen could not be allocated |
//! | 3 | Terminal could not be opened or released |
//! | 4 | Terminal smaller than 2x2 |
//! | 64 | Bad command line |

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use crossterm::{
    cursor::MoveTo,
    event::{self, Event},
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use termscreen::config::Config;
use termscreen::core::{
    AttrFlags, Context, CrosstermPlatform, HeadlessPlatform, Platform, Screen, ScreenError,
    Window,
};

/// Exit status when the terminal cannot be opened or released
const EXIT_PLATFORM: i32 = 3;
/// Exit status for a bad command line
const EXIT_USAGE: i32 = 64;

/// Command line options
#[derive(Default)]
struct Options {
    /// Run without a tty at this (lines, cols)
    headless: Option<(u16, u16)>,
    /// Configuration file overriding the default location
    config: Option<PathBuf>,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    eprintln!("termscreen {} - curses-style screen session", VERSION);
    eprintln!();
    eprintln!("Usage: termscreen [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --headless LINESxCOLS  Use a scripted terminal size instead of the tty");
    eprintln!("  -c, --config <PATH>    Configuration file (default ~/.termscreen/config.toml)");
    eprintln!("  -v, --version          Show version");
    eprintln!("  -h, --help             Show this help");
}

fn parse_size(text: &str) -> Result<(u16, u16), String> {
    let (lines, cols) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("Invalid size '{}', expected LINESxCOLS", text))?;
    let lines = lines
        .trim()
        .parse()
        .map_err(|_| format!("Invalid line count '{}'", lines))?;
    let cols = cols
        .trim()
        .parse()
        .map_err(|_| format!("Invalid column count '{}'", cols))?;
    Ok((lines, cols))
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut options = Options::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--headless" => {
                i += 1;
                let size = args.get(i).ok_or("--headless requires LINESxCOLS")?;
                options.headless = Some(parse_size(size)?);
            }
            "-c" | "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a path")?;
                options.config = Some(PathBuf::from(path));
            }
            "-v" | "--version" => {
                eprintln!("{}", termscreen::curses_version());
                std::process::exit(0);
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(options)
}

fn init_logging(config: &Config) {
    let Some(dir) = Config::data_dir() else {
        return;
    };
    let _ = std::fs::create_dir_all(&dir);

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("termscreen.log"))
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

/// Layout of a session, printed once it is torn down
struct Summary {
    physical: (u16, u16),
    drawable: (u16, u16),
    origin: (u16, u16),
    ripped: u16,
    ripped_on_top: u16,
    label_lines: u16,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "physical {}x{}", self.physical.0, self.physical.1)?;
        writeln!(
            f,
            "drawable {}x{} at {},{}",
            self.drawable.0, self.drawable.1, self.origin.0, self.origin.1
        )?;
        writeln!(f, "ripped {} ({} on top)", self.ripped, self.ripped_on_top)?;
        write!(f, "labels {}", self.label_lines)
    }
}

/// Draw a window's cells onto the terminal at its origin
fn paint(out: &mut impl Write, win: &Window) -> io::Result<()> {
    for row in 0..win.rows() {
        queue!(out, MoveTo(win.begx, win.begy + row))?;
        for col in 0..win.cols() {
            let Some(cell) = win.cell(row, col) else {
                continue;
            };
            if cell.is_continuation() {
                continue;
            }
            if cell.attrs.flags.contains(AttrFlags::REVERSE) {
                queue!(
                    out,
                    SetAttribute(Attribute::Reverse),
                    Print(cell.ch),
                    SetAttribute(Attribute::Reset)
                )?;
            } else {
                queue!(out, Print(cell.ch))?;
            }
        }
    }
    Ok(())
}

/// Redraw every window of the session from scratch
fn paint_screen(out: &mut impl Write, screen: &Screen) -> io::Result<()> {
    queue!(out, Clear(ClearType::All))?;
    screen
        .ripped_lines()
        .iter()
        .map(|line| &line.window)
        .chain(screen.label_window())
        .chain(std::iter::once(screen.drawable()))
        .try_for_each(|w| paint(&mut *out, w))?;
    out.flush()
}

fn run<P: Platform>(mut ctx: Context<P>, interactive: bool) -> Result<Summary, ScreenError> {
    let args: Vec<String> = env::args().collect();
    let win = ctx.open(&args)?;
    win.put_str(0, 0, termscreen::curses_version());
    if interactive {
        win.put_str(1, 0, "Press any key to exit");
    }

    let screen = ctx.screen().ok_or(ScreenError::NotOpen)?;
    let summary = Summary {
        physical: screen.size(),
        drawable: screen.drawable().size(),
        origin: screen.drawable().origin(),
        ripped: screen.ripped_count(),
        ripped_on_top: screen.ripped_on_top(),
        label_lines: screen.label_lines(),
    };

    if interactive {
        let mut stdout = io::stdout();
        if let Err(e) = paint_screen(&mut stdout, screen) {
            error!("Failed to draw screen: {}", e);
        }

        loop {
            match event::read() {
                Ok(Event::Key(_)) | Err(_) => break,
                Ok(Event::Resize(_, _)) => {
                    if !ctx.is_resized() {
                        continue;
                    }
                    ctx.resize(0, 0)?;
                    let screen = ctx.screen().ok_or(ScreenError::NotOpen)?;
                    if let Err(e) = paint_screen(&mut stdout, screen) {
                        error!("Failed to redraw screen: {}", e);
                    }
                }
                Ok(_) => {}
            }
        }
    }

    let id = ctx.screen().map(|s| s.id());
    ctx.close()?;
    if let Some(id) = id {
        ctx.teardown(id);
    }
    Ok(summary)
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(EXIT_USAGE);
        }
    };

    let config = match &options.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    init_logging(&config);
    info!("termscreen starting...");

    let result = match options.headless {
        Some((lines, cols)) => {
            let ctx = config.build_context(HeadlessPlatform::new(lines, cols))?;
            run(ctx, false)
        }
        None => {
            let ctx = config.build_context(CrosstermPlatform::new())?;
            run(ctx, true)
        }
    };

    match result {
        Ok(summary) => {
            println!("{}", summary);
            Ok(())
        }
        Err(ScreenError::FatalInit(fatal)) => {
            eprintln!("termscreen: {}", fatal);
            std::process::exit(fatal.exit_code());
        }
        Err(ScreenError::Platform(e)) => {
            eprintln!("termscreen: terminal error: {}", e);
            std::process::exit(EXIT_PLATFORM);
        }
        Err(e) => Err(e.into()),
    }
}
