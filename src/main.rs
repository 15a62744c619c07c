//! Main entry point and CLI dispatch.
//!
//! Parses command-line arguments and hands control to the `Glintd`
//! coordinator; everything else lives in the library so it stays testable.

use glintd::args::{CliAction, ParsedArgs};
use glintd::{Glintd, log_end, log_error_exit, log_pipe};

fn main() {
    let parsed = ParsedArgs::parse(std::env::args());

    match parsed.action {
        CliAction::Run {
            debug_enabled,
            config_dir,
        } => {
            if let Some(dir) = config_dir
                && let Err(e) = glintd::config::set_config_dir(&dir)
            {
                log_error_exit!("{e}");
                std::process::exit(1);
            }

            if let Err(e) = Glintd::new(debug_enabled).run() {
                log_pipe!();
                log_error_exit!("glintd failed");
                eprintln!("{e:?}");
                log_end!();
                std::process::exit(1);
            }
        }
        CliAction::ShowHelp => glintd::args::display_help(),
        CliAction::ShowVersion => glintd::args::display_version(),
        CliAction::ShowHelpDueToError => {
            glintd::args::display_help();
            std::process::exit(1);
        }
    }
}
