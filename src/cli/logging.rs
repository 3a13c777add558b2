// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Console logging macros.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::exercise::RepEvent;

/// Global verbosity flag.
static VERBOSE: AtomicBool = AtomicBool::new(true);

/// Set the global verbosity flag.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Check if verbose output is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Macro for standard info messages.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        println!("{}", format!($($arg)*));
    }};
}

/// Macro for warning messages.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "WARNING ⚠️".yellow().bold(), format!($($arg)*));
    }};
}

/// Macro for error messages.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "Error:".red().bold(), format!($($arg)*));
    }};
}

/// Macro for success messages.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        println!("{} {}", "✅".green(), format!($($arg)*));
    }};
}

/// Macro for verbose messages.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {{
        if $crate::cli::logging::is_verbose() {
            println!("{}", format!($($arg)*));
        }
    }};
}

/// Macro for section headers.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        if $crate::cli::logging::is_verbose() {
            println!();
            println!("{}", format!($($arg)*).cyan().bold());
        }
    }};
}

/// Progress line for a completed repetition, e.g. `squat #3 at frame 42`.
#[must_use]
pub fn rep_line(rep: &RepEvent, frame: usize) -> String {
    format!("{} #{} at frame {frame}", rep.exercise, rep.rep_count)
}

/// Macro for completed repetitions, printed when verbose.
#[macro_export]
macro_rules! rep {
    ($rep:expr, $frame:expr) => {{
        use colored::Colorize;
        if $crate::cli::logging::is_verbose() {
            println!(
                "{} {}",
                "Rep".magenta().bold(),
                $crate::cli::logging::rep_line(&$rep, $frame)
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::Exercise;

    #[test]
    fn test_verbosity_toggle() {
        // Default is true
        set_verbose(true);
        assert!(is_verbose());

        set_verbose(false);
        assert!(!is_verbose());

        set_verbose(true);
        assert!(is_verbose());
    }

    #[test]
    fn test_macros_in_expression_position() {
        let reps = 3;
        let outcome: Option<()> = match reps {
            0 => None,
            1 => Some(crate::verbose!("one rep")),
            _ => Some(crate::warn!("{reps} reps")),
        };
        assert!(outcome.is_some());
    }

    #[test]
    fn test_rep_line() {
        let rep = RepEvent {
            exercise: Exercise::PushUp,
            rep_count: 3,
        };
        assert_eq!(rep_line(&rep, 42), "push-up #3 at frame 42");

        // usable as a statement with the global flag either way
        crate::rep!(rep, 42);
    }
}
