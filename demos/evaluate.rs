//! Submit one request through a worker pool.
//!
//! Demonstrates:
//! - Building a pool around an arbitrary worker command
//! - Submitting a request with its operation-class deadline
//! - Parsing the response line
//! - Reading pool status and shutting down
//!
//! Usage:
//!   cargo run --example evaluate -- python scripts/worker.py
//!   cargo run --example evaluate -- --debug python scripts/worker.py
//!
//! With no command, a `sh` stub that always answers `2` is used.

// ============================================================================
// Imports
// ============================================================================

use procpool::{Operation, Request, Response, Result, WorkerCommand, WorkerPool};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const STUB: &str = r#"while IFS= read -r line; do
    echo '{"pretty": {"expr": "1 + 1"}, "image": null, "answer": "2"}'
done"#;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let debug = args.first().is_some_and(|a| a == "--debug");
    if debug {
        args.remove(0);
    }

    let filter = if debug { "procpool=debug" } else { "procpool=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Vec<String>) -> Result<()> {
    let command = match args.split_first() {
        Some((program, rest)) => WorkerCommand::new(program).args(rest).inherit_stderr(true),
        None => WorkerCommand::new("sh").arg("-c").arg(STUB),
    };

    let pool = WorkerPool::builder().command(command).size(2).build()?;

    let request = Request::for_operation(Operation::EvaluateExpression).arg("expr", "1 + 1");
    println!("[Request]  {}", serde_json::to_string(&request)?);

    let line = pool.submit(&request).await?;
    println!("[Raw]      {}", String::from_utf8_lossy(&line).trim_end());

    match Response::parse(&line)? {
        Response::Success { answer, .. } => println!("[Answer]   {answer:?}"),
        Response::Failure { name, message } => println!("[Failure]  {name}: {message}"),
        Response::Fault { error } => println!("[Fault]    {error}"),
    }

    let status = pool.status();
    println!("[Pool]     {}/{} workers alive", status.alive, status.size);

    pool.shutdown().await;
    Ok(())
}
