//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a
//! clean interface for the main entry point. It supports the standard help,
//! version, and debug flags while gracefully handling unknown options.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the service with these settings
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from
    ///   `std::env::args()`)
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut config_dir: Option<String> = None;
        let mut display_help = false;
        let mut display_version = false;
        let mut unknown_arg_found = false;

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut idx = 0;
        while idx < args_vec.len() {
            match args_vec[idx].as_str() {
                "--debug" | "-d" => debug_enabled = true,
                "--config" | "-c" => {
                    if idx + 1 < args_vec.len() {
                        config_dir = Some(args_vec[idx + 1].clone());
                        idx += 1;
                    } else {
                        // --config requires a directory argument
                        unknown_arg_found = true;
                    }
                }
                "--help" | "-h" => display_help = true,
                "--version" | "-V" => display_version = true,
                _ => unknown_arg_found = true,
            }
            idx += 1;
        }

        let action = if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else if display_help {
            CliAction::ShowHelp
        } else if display_version {
            CliAction::ShowVersion
        } else {
            CliAction::Run {
                debug_enabled,
                config_dir,
            }
        };

        ParsedArgs { action }
    }
}

/// Print usage information.
pub fn display_help() {
    log_version!();
    log_block_start!("Usage: glintd [OPTIONS]");
    log_indented!("-d, --debug          Enable detailed debug logging");
    log_indented!("-c, --config <DIR>   Use an alternate config directory");
    log_indented!("-h, --help           Print this help and exit");
    log_indented!("-V, --version        Print version and exit");
    log_block_start!("Signals:");
    log_indented!("SIGUSR2              Reload configuration");
    log_indented!("SIGTERM/SIGINT       Graceful shutdown");
    log_end!();
}

/// Print the version header.
pub fn display_version() {
    log_version!();
    log_end!();
}
