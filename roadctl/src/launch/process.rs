//! Entry process launcher

use std::collections::HashMap;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::RoadError;
use crate::utils::is_truthy;

/// Bypass flag: when truthy, the entry command is not spawned
pub const SKIP_ENTRY_ENV: &str = "ROADCTL_SKIP_ENTRY";

/// Characters that need a shell to mean what they say
const SHELL_SYNTAX: &[char] = &[
    '|', '&', ';', '<', '>', '(', ')', '$', '`', '\\', '"', '\'', '*', '?', '[', ']', '#', '~',
    '{', '}', '!', '\n',
];

/// Launcher options
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Skip spawning the entry command (dry run)
    pub skip_entry: bool,
}

impl LaunchOptions {
    /// Options from the process environment
    pub fn from_env() -> Self {
        Self {
            skip_entry: std::env::var(SKIP_ENTRY_ENV)
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
        }
    }
}

/// How an entry command string is executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryCommand {
    /// Plain words: run the program directly, no shell
    Direct { program: String, args: Vec<String> },

    /// Uses shell syntax: run through the platform shell
    Shell(String),
}

impl EntryCommand {
    pub fn parse(command: &str) -> Result<Self, RoadError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(RoadError::ProcessLaunchError(
                "entry command is empty".to_string(),
            ));
        }

        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_default();

        // `FOO=bar cmd` is a shell assignment prefix
        if command.contains(SHELL_SYNTAX) || program.contains('=') {
            return Ok(EntryCommand::Shell(command.to_string()));
        }

        Ok(EntryCommand::Direct {
            program,
            args: words.collect(),
        })
    }

    fn to_command(&self) -> Command {
        match self {
            EntryCommand::Direct { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            EntryCommand::Shell(script) => {
                let (shell, flag) = if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") };
                let mut cmd = Command::new(shell);
                cmd.args([flag, script.as_str()]);
                cmd
            }
        }
    }
}

/// Spawns the target's entry command and waits for it to exit
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher {
    options: LaunchOptions,
}

impl ProcessLauncher {
    pub fn new(options: LaunchOptions) -> Self {
        Self { options }
    }

    /// Run `command` with the orchestrator's environment overlaid by `env`,
    /// and `PORT` forced to `port`. Succeeds only on exit code 0.
    pub async fn run(
        &self,
        command: &str,
        port: u16,
        env: &HashMap<String, String>,
    ) -> Result<(), RoadError> {
        let skip = self.options.skip_entry
            || env.get(SKIP_ENTRY_ENV).is_some_and(|v| is_truthy(v));
        if skip {
            info!("{} is set, skipping entry command: {}", SKIP_ENTRY_ENV, command);
            return Ok(());
        }

        let entry = EntryCommand::parse(command)?;
        if let EntryCommand::Shell(_) = entry {
            debug!("Entry command uses shell syntax, running through the shell");
        }

        let mut cmd = entry.to_command();
        cmd.envs(env)
            .env("PORT", port.to_string())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        info!("Launching entry command on port {}: {}", port, command);
        let mut child = cmd.spawn().map_err(|e| {
            RoadError::ProcessLaunchError(format!("failed to spawn '{}': {}", command, e))
        })?;

        let status = child.wait().await.map_err(|e| {
            RoadError::ProcessLaunchError(format!("failed to wait for '{}': {}", command, e))
        })?;

        match status.code() {
            Some(0) => {
                info!("Entry command exited cleanly");
                Ok(())
            }
            Some(code) => Err(RoadError::ProcessExitError { code }),
            None => {
                warn!("Entry command terminated by a signal");
                Err(RoadError::ProcessExitError { code: -1 })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_command_is_direct() {
        let entry = EntryCommand::parse("  node server.js --port=3000 ").unwrap();
        assert_eq!(
            entry,
            EntryCommand::Direct {
                program: "node".to_string(),
                args: vec!["server.js".to_string(), "--port=3000".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_shell_syntax() {
        assert!(matches!(
            EntryCommand::parse("npm run build && npm start").unwrap(),
            EntryCommand::Shell(_)
        ));
        assert!(matches!(
            EntryCommand::parse("NODE_ENV=production node server.js").unwrap(),
            EntryCommand::Shell(_)
        ));
        assert!(matches!(
            EntryCommand::parse("echo $PORT").unwrap(),
            EntryCommand::Shell(_)
        ));
    }

    #[test]
    fn test_parse_empty_command() {
        let err = EntryCommand::parse("   ").unwrap_err();
        assert!(matches!(err, RoadError::ProcessLaunchError(_)));
    }

    #[tokio::test]
    async fn test_skip_entry_does_not_spawn() {
        let launcher = ProcessLauncher::new(LaunchOptions { skip_entry: true });
        // Would fail to spawn if attempted
        launcher
            .run("/definitely/not/a/binary", 3100, &HashMap::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_skip_entry_from_env_map() {
        let launcher = ProcessLauncher::default();
        let env = HashMap::from([(SKIP_ENTRY_ENV.to_string(), "1".to_string())]);
        launcher
            .run("/definitely/not/a/binary", 3100, &env)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_spawn_failure_is_launch_error() {
        let launcher = ProcessLauncher::default();
        let err = launcher
            .run("/definitely/not/a/binary", 3100, &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RoadError::ProcessLaunchError(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_carries_code() {
        let launcher = ProcessLauncher::default();
        let err = launcher
            .run("exit 7;", 3100, &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RoadError::ProcessExitError { code: 7 }));
        assert_eq!(err.exit_code(), 7);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_port_overrides_env_map() {
        let launcher = ProcessLauncher::default();
        let env = HashMap::from([
            ("PORT".to_string(), "9999".to_string()),
            ("API_KEY".to_string(), "xyz".to_string()),
        ]);
        launcher
            .run(r#"test "$PORT" = 3100 && test "$API_KEY" = xyz"#, 3100, &env)
            .await
            .unwrap();
    }
}
