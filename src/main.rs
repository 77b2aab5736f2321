use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use edge_operator::extraction::{format_extraction_error, format_production_metrics};
use edge_operator::inference::{config, OperatorConfig};
use edge_operator::tools::{ToolCall, CONTROL_DEVICE, LIST_DEVICES, READ_SENSOR};
use edge_operator::{init_tracing, EdgeOperator, LogTarget};

#[derive(Parser)]
#[command(name = "edge-operator")]
#[command(about = "Edge operator assistant: model routing, IoT tools, SCADA extraction", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[arg(long, short, global = true, env = "EDGE_OPERATOR_CONFIG", help = "Path to edge-operator.yaml")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Write logs to a rotated file in the data directory instead of stderr")]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Extract production metrics from a SCADA report (stdin when FILE is omitted)")]
    Extract {
        file: Option<PathBuf>,

        #[arg(long, help = "Print the record as JSON")]
        json: bool,
    },

    #[command(about = "List registered IoT devices")]
    Devices,

    #[command(about = "Read a sensor")]
    ReadSensor { device_id: String },

    #[command(about = "Send a command to an actuator")]
    Control { device_id: String, action: String },

    #[command(about = "Switch the model mode (local or cloud), probing connectivity for cloud")]
    Mode { mode: String },

    #[command(about = "Show the active model and local backend health")]
    Status,

    #[command(about = "Print the tool definitions as JSON")]
    Tools,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let target = if cli.log_file {
        LogTarget::File(edge_operator::data_dir())
    } else {
        LogTarget::Stderr
    };
    init_tracing(&target).context("failed to initialize logging")?;

    let config = load_config(cli.config.as_deref())?;
    let mut operator = EdgeOperator::new(config);

    match cli.command {
        Commands::Extract { file, json } => {
            let text = read_report(file)?;
            match operator.tools().extractor().extract(&text) {
                Ok(metrics) if json => {
                    println!("{}", serde_json::to_string_pretty(&metrics)?);
                }
                Ok(metrics) => println!("{}", format_production_metrics(&metrics)),
                Err(e) => {
                    println!("{}", format_extraction_error(&e));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Devices => return run_tool(&mut operator, LIST_DEVICES, json!({})),
        Commands::ReadSensor { device_id } => {
            return run_tool(&mut operator, READ_SENSOR, json!({ "device_id": device_id }));
        }
        Commands::Control { device_id, action } => {
            return run_tool(
                &mut operator,
                CONTROL_DEVICE,
                json!({ "device_id": device_id, "action": action }),
            );
        }
        Commands::Mode { mode } => {
            let (ok, message) = operator.set_model_mode(&mode);
            println!("{message}");
            if !ok {
                return Ok(ExitCode::FAILURE);
            }
            println!("Active model: {}", operator.active_model().describe());
        }
        Commands::Status => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start tokio runtime")?;
            let local = operator.router().local_model();
            let healthy = runtime.block_on(local.check_health());

            println!("Mode: {}", operator.current_mode());
            println!("Active model: {}", operator.active_model().describe());
            println!(
                "Local backend: {} ({})",
                local.host(),
                if healthy { "reachable" } else { "unreachable" }
            );
            let (host, port) = operator.router().probe_target();
            println!("Cloud endpoint: {host}:{port}");
            println!("Session: {}", operator.config().session_id);
        }
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(operator.tool_definitions())?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(explicit: Option<&std::path::Path>) -> Result<OperatorConfig> {
    match explicit {
        Some(path) => config::load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("failed to resolve current directory")?;
            config::load_or_default(&cwd).context("failed to load config")
        }
    }
}

fn read_report(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read report {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read report from stdin")?;
            Ok(buf)
        }
    }
}

fn run_tool(operator: &mut EdgeOperator, name: &str, arguments: serde_json::Value) -> Result<ExitCode> {
    let result = operator.dispatch_tool(&ToolCall::new(name, arguments))?;
    println!("{}", result.content);
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
