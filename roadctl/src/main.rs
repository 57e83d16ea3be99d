//! roadctl - Entry Point
//!
//! Single-shot deployment orchestrator: reconciles a target's DNS record,
//! appends to the deployment journal and launches the target's entry
//! command.

use std::env;

use roadctl::app::run::run;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let code = run(args).await;
    std::process::exit(code);
}
