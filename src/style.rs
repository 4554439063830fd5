//! Terminal styling utilities for consistent CLI output.
//!
//! Respects `NO_COLOR` environment variable and terminal capabilities.

use std::{
   io::{self, Write},
   sync::OnceLock,
   thread,
   time::Duration,
};

use owo_colors::OwoColorize;

/// Whether color output is enabled (cached on first call).
static COLOR_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if colors should be used.
pub fn colors_enabled() -> bool {
   *COLOR_ENABLED.get_or_init(|| {
      // NO_COLOR takes precedence (https://no-color.org/)
      if std::env::var("NO_COLOR").is_ok() {
         return false;
      }
      // Check if stdout is a terminal and supports color
      supports_color::on(supports_color::Stream::Stdout).is_some_and(|level| level.has_basic)
   })
}

// === Color Palette ===

/// Success: checkmarks, completed actions (green + bold).
pub fn success(s: &str) -> String {
   if colors_enabled() {
      s.green().bold().to_string()
   } else {
      s.to_string()
   }
}

/// Warning: soft limit violations, non-fatal issues (yellow).
pub fn warning(s: &str) -> String {
   if colors_enabled() {
      s.yellow().to_string()
   } else {
      s.to_string()
   }
}

/// Error: failures, hard errors (red + bold).
pub fn error(s: &str) -> String {
   if colors_enabled() {
      s.red().bold().to_string()
   } else {
      s.to_string()
   }
}

/// Print warning message, clearing any active spinner line first.
///
/// This ensures warnings appear on their own line even when a spinner is
/// active, by writing a carriage return + clear-line escape sequence before the
/// message.
pub fn warn(msg: &str) {
   // Clear current line in case spinner is active (stdout, not stderr)
   print!("\r\x1b[K");
   io::stdout().flush().ok();
   eprintln!("{} {}", warning(icons::WARNING), warning(msg));
}

/// Dim: less important details, file paths (dimmed).
pub fn dim(s: &str) -> String {
   if colors_enabled() {
      s.dimmed().to_string()
   } else {
      s.to_string()
   }
}

/// Bold: headers, key values.
pub fn bold(s: &str) -> String {
   if colors_enabled() {
      s.bold().to_string()
   } else {
      s.to_string()
   }
}

/// Print an info message that clears any spinner line first.
pub fn print_info(msg: &str) {
   use std::io::IsTerminal;
   if std::io::stderr().is_terminal() && colors_enabled() {
      // Clear line, print message with newline
      eprintln!("\r\x1b[K{} {msg}", icons::INFO.cyan());
   } else {
      eprintln!("{} {msg}", icons::INFO);
   }
}

// === Status Icons ===

pub mod icons {
   pub const SUCCESS: &str = "\u{2713}";
   pub const WARNING: &str = "\u{26A0}";
   pub const ERROR: &str = "\u{2717}";
   pub const INFO: &str = "\u{2139}";
   pub const BULLET: &str = "\u{2022}";
   pub const ROBOT: &str = "\u{1F916}";
}

// === Spinner ===

const SPINNER_FRAMES: &[char] = &[
   '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
   '\u{2807}', '\u{280F}',
];

/// Run a function with a spinner, showing a check or a cross once it returns
/// depending on `succeeded`. Falls back to static text if not a TTY.
pub fn with_spinner<F, T>(message: &str, f: F, succeeded: impl FnOnce(&T) -> bool) -> T
where
   F: FnOnce() -> T,
{
   if !colors_enabled() {
      println!("{message}");
      return f();
   }

   let (tx, rx) = std::sync::mpsc::channel::<bool>();
   let msg = message.to_string();

   let spinner = thread::spawn(move || {
      let mut idx = 0;
      loop {
         match rx.try_recv() {
            Ok(success) => {
               let icon = if success {
                  icons::SUCCESS.green().to_string()
               } else {
                  icons::ERROR.red().to_string()
               };
               print!("\r\x1b[K{icon} {msg}\n");
               io::stdout().flush().ok();
               break;
            },
            Err(std::sync::mpsc::TryRecvError::Disconnected) => break,
            Err(std::sync::mpsc::TryRecvError::Empty) => {},
         }
         print!("\r{} {}", SPINNER_FRAMES[idx].cyan(), msg);
         io::stdout().flush().ok();
         idx = (idx + 1) % SPINNER_FRAMES.len();
         thread::sleep(Duration::from_millis(80));
      }
   });

   let result = f();
   tx.send(succeeded(&result)).ok();
   spinner.join().ok();
   result
}
