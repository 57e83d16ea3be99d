//! Command line parsing
//!
//! `roadctl deploy <target>` is the only command. Bare `roadctl` prints
//! usage and succeeds; anything else prints usage and fails.

use std::fmt::Write;

use crate::targets::registry::TargetRegistry;

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// `roadctl deploy <target>`
    Deploy { target: String },

    /// `roadctl --version`
    Version,

    /// No subcommand
    Usage,

    /// Unknown subcommand or missing target
    Invalid { reason: String },
}

impl CliCommand {
    /// Parse arguments, excluding the program name
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();

        match args.first().map(String::as_str) {
            None => CliCommand::Usage,
            Some("--version") | Some("-V") if args.len() == 1 => CliCommand::Version,
            Some("deploy") => match args.get(1) {
                Some(target) if args.len() == 2 && !target.is_empty() => CliCommand::Deploy {
                    target: target.clone(),
                },
                Some(_) if args.len() > 2 => CliCommand::Invalid {
                    reason: "deploy takes exactly one target".to_string(),
                },
                _ => CliCommand::Invalid {
                    reason: "missing target name".to_string(),
                },
            },
            Some(other) => CliCommand::Invalid {
                reason: format!("unknown command '{}'", other),
            },
        }
    }
}

/// Usage text including the available target names
pub fn usage(registry: &TargetRegistry) -> String {
    let mut text = String::from("Usage: roadctl deploy <target>\n\nAvailable targets:\n");
    if registry.is_empty() {
        text.push_str("  (none)\n");
    }
    for name in registry.names() {
        let _ = writeln!(text, "  {}", name);
    }
    text
}
