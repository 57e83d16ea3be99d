//! Deployment orchestration

pub mod fsm;
pub mod orchestrator;
