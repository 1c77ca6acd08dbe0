//! Vector Clock Simulator CLI
//!
//! Runs a script file or the built-in scenarios and prints every executed
//! event with the node's vector clock.

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vclock_core::{BufferPolicy, TraceRecord};
use vclock_sim::scenarios::ScenarioId;
use vclock_sim::{ScenarioResult, ScenarioRunner, ScenarioScript, SimConfig, SimExport};

/// Vector clock causal ordering simulator
#[derive(Parser, Debug)]
#[command(name = "vclock-sim")]
#[command(about = "Simulate causal ordering between nodes with vector clocks", long_about = None)]
struct Args {
    /// Script file to run (overrides --scenario)
    #[arg(short = 'f', long)]
    script: Option<String>,

    /// Built-in scenario to run (handshake, out_of_order, ring, fan_in, buffered, deadlock, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Let one buffered message satisfy every receive naming it
    #[arg(long)]
    reusable_buffer: bool,

    /// Milliseconds without progress before unfinished nodes count as blocked
    #[arg(long, default_value = "500")]
    stall_ms: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export traces and results to a JSON file
    #[arg(long)]
    export: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging; trace lines go to stdout, diagnostics to stderr
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs everything requested; `Ok(false)` if any run failed its checks.
async fn run(args: Args) -> anyhow::Result<bool> {
    let policy = if args.reusable_buffer {
        BufferPolicy::Reusable
    } else {
        BufferPolicy::SingleUse
    };
    let config = SimConfig::default()
        .with_buffer_policy(policy)
        .with_stall_timeout(Duration::from_millis(args.stall_ms));
    let runner = ScenarioRunner::new(config);

    if !args.json {
        info!("Vector Clock Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!(
            "buffer policy: {}, stall timeout: {:?}",
            runner.config().buffer_policy,
            runner.config().stall_timeout
        );
    }

    let print = |record: &TraceRecord| {
        if !args.json {
            println!("{}", record);
        }
    };

    let mut export = SimExport::new(policy);

    if let Some(path) = &args.script {
        let script = ScenarioScript::from_file(path)?;
        info!("Loaded {} ({} nodes, {} events)", path, script.node_count(), script.event_count());
        let result = runner.run_script(path, script, &[], print).await?;
        report(&result, args.json);
        export.add_run(result);
    } else {
        let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
            ScenarioId::all()
        } else {
            vec![args.scenario.parse().map_err(anyhow::Error::msg)?]
        };

        for scenario in scenarios {
            if !args.json {
                info!("━━━ {} : {}", scenario.name(), scenario.description());
            }
            let script = scenario.script()?;
            let result = runner
                .run_script(scenario.name(), script, &scenario.expected_blocked(), print)
                .await?;
            report(&result, args.json);
            export.add_run(result);
        }
    }

    if let Some(path) = &args.export {
        export
            .write_to_file(path)
            .with_context(|| format!("writing export to {}", path))?;
        info!("Exported {} run(s) to {}", export.runs.len(), path);
    }

    if args.json {
        println!("{}", export.to_json()?);
    } else if export.all_passed() {
        info!("✅ All {} run(s) passed", export.passed);
    } else {
        error!("❌ {}/{} run(s) failed", export.failed, export.runs.len());
    }

    Ok(export.all_passed())
}

fn report(result: &ScenarioResult, json: bool) {
    if json {
        return;
    }

    for node in &result.blocked_nodes {
        info!("node {} is blocked waiting for a dependency", node);
    }
    if result.passed {
        info!(
            "✓ {} PASSED ({} events, {} messages merged)",
            result.name, result.metrics.events_logged, result.metrics.messages_merged
        );
    } else {
        error!(
            "✗ {} FAILED: {}",
            result.name,
            result.failure_reason.as_deref().unwrap_or("unknown")
        );
        for violation in &result.violations {
            error!("  - {}", violation);
        }
    }
}
