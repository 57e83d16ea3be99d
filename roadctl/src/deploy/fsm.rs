//! Finite State Machine for one deploy invocation
//!
//! `Idle → ResolvingTarget → LoadingEnv → ReconcilingDns → RecordingAudit →
//! LaunchingProcess → Succeeded`, with `Failed` reachable from every working
//! stage. There are no retries: `Succeeded` and `Failed` are terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Working stages of a deploy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ResolvingTarget,
    LoadingEnv,
    ReconcilingDns,
    RecordingAudit,
    LaunchingProcess,
}

impl Stage {
    /// Stage that follows this one, `None` after the last stage
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::ResolvingTarget => Some(Stage::LoadingEnv),
            Stage::LoadingEnv => Some(Stage::ReconcilingDns),
            Stage::ReconcilingDns => Some(Stage::RecordingAudit),
            Stage::RecordingAudit => Some(Stage::LaunchingProcess),
            Stage::LaunchingProcess => None,
        }
    }

    /// Short label used in progress lines
    pub fn label(self) -> &'static str {
        match self {
            Stage::ResolvingTarget => "target",
            Stage::LoadingEnv => "env",
            Stage::ReconcilingDns => "dns",
            Stage::RecordingAudit => "audit",
            Stage::LaunchingProcess => "launch",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Deploy state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum DeployState {
    /// Nothing attempted yet
    Idle,

    /// A stage is running
    Running { stage: Stage },

    /// Every stage completed
    Succeeded,

    /// A stage failed; later stages were not attempted
    Failed { stage: Stage, cause: String },
}

/// Deploy event
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// Start the first stage
    Begin,

    /// Current stage completed
    StageDone,

    /// Current stage failed
    StageFailed(String),
}

/// Deploy FSM
#[derive(Debug, Clone)]
pub struct DeployFsm {
    state: DeployState,
    completed: Vec<Stage>,
}

impl DeployFsm {
    /// Create a new FSM in idle state
    pub fn new() -> Self {
        Self {
            state: DeployState::Idle,
            completed: Vec::new(),
        }
    }

    /// Get current state
    pub fn state(&self) -> &DeployState {
        &self.state
    }

    /// Stage currently running, if any
    pub fn current_stage(&self) -> Option<Stage> {
        match self.state {
            DeployState::Running { stage } => Some(stage),
            _ => None,
        }
    }

    /// Stages completed so far, in order
    pub fn completed(&self) -> &[Stage] {
        &self.completed
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: DeployEvent) -> Result<(), String> {
        let new_state = match (&self.state, &event) {
            (DeployState::Idle, DeployEvent::Begin) => DeployState::Running {
                stage: Stage::ResolvingTarget,
            },

            (DeployState::Running { stage }, DeployEvent::StageDone) => {
                self.completed.push(*stage);
                match stage.next() {
                    Some(next) => DeployState::Running { stage: next },
                    None => DeployState::Succeeded,
                }
            }

            (DeployState::Running { stage }, DeployEvent::StageFailed(cause)) => {
                DeployState::Failed {
                    stage: *stage,
                    cause: cause.clone(),
                }
            }

            // Invalid transitions
            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for DeployFsm {
    fn default() -> Self {
        Self::new()
    }
}
