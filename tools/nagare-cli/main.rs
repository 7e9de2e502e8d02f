use clap::{Parser, Subcommand};
use itertools::Itertools;
use nagare::prelude::*;
use serde_json::{Map, Value as JsonValue};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// File extension of compiled flow artifacts.
const ARTIFACT_EXTENSION: &str = "nflow";

/// Parse, compile and run flowchart processes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log engine internals (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the flow graph of a flowchart as JSON
    Parse {
        /// Path to the flowchart source
        file: PathBuf,
        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Compile a flowchart into a binary artifact
    Compile {
        /// Path to the flowchart source
        file: PathBuf,
        /// Output path (defaults to the source path with a .nflow extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Name stored in the artifact (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
    },
    /// Execute a flowchart or compiled artifact as a fresh process instance
    Run {
        /// Path to flowchart source or a .nflow artifact
        file: PathBuf,
        /// Initial variable as key=value; values are read as JSON when possible
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
        /// Step ceiling for the traversal
        #[arg(long)]
        max_steps: Option<usize>,
        /// JSON engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Parse { file, compact } => run_parse(&file, compact),
        Command::Compile { file, output, name } => run_compile(&file, output, name),
        Command::Run {
            file,
            vars,
            max_steps,
            config,
        } => run_process(&file, &vars, max_steps, config),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_parse(file: &Path, compact: bool) {
    let source = read_source(file);
    let parser = FlowParser::new();
    let json = if compact {
        parser.parse_to_compact_json(&source)
    } else {
        parser.parse_to_json(&source)
    }
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse '{}': {}", file.display(), e)));
    println!("{}", json);
}

fn run_compile(file: &Path, output: Option<PathBuf>, name: Option<String>) {
    let start = Instant::now();

    // --- 1. Parsing ---
    let source = read_source(file);
    let graph = FlowParser::new()
        .parse(&source)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse '{}': {}", file.display(), e)));

    let dangling = graph.dangling_endpoints();
    if !dangling.is_empty() {
        exit_with_error(&format!(
            "Graph references unknown nodes: {}",
            dangling.iter().join(", ")
        ));
    }

    // --- 2. Writing the artifact ---
    let name = name.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "flow".to_string())
    });
    let output = output.unwrap_or_else(|| file.with_extension(ARTIFACT_EXTENSION));
    let compiled = CompiledFlow::new(name, source, graph);
    compiled
        .save(&output)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to write artifact: {}", e)));

    println!(
        "Compiled '{}' ({}) to '{}' in {:?}",
        compiled.name,
        compiled.graph,
        output.display(),
        start.elapsed()
    );
}

fn run_process(file: &Path, vars: &[String], max_steps: Option<usize>, config: Option<PathBuf>) {
    // --- 1. Loading the graph ---
    let (name, graph) = if file.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION) {
        let compiled = CompiledFlow::from_file(file)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load artifact: {}", e)));
        (compiled.name, compiled.graph)
    } else {
        let source = read_source(file);
        let graph = FlowParser::new().parse(&source).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to parse '{}': {}", file.display(), e))
        });
        let name = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "flow".to_string());
        (name, graph)
    };

    // --- 2. Engine configuration ---
    let mut engine_config = match config {
        Some(path) => {
            let json = fs::read_to_string(&path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read config '{}': {}", path.display(), e))
            });
            EngineConfig::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Invalid engine config: {}", e)))
        }
        None => EngineConfig::default(),
    };
    if let Some(max_steps) = max_steps {
        engine_config.max_steps = max_steps;
    }

    let publisher = Arc::new(EventPublisher::new());
    let log = Arc::new(EventLog::new());
    publisher.subscribe_all(log.clone());

    let engine = ProcessEngine::builder()
        .with_publisher(publisher)
        .with_config(engine_config)
        .build();

    // --- 3. Execution ---
    let mut instance = ProcessInstance::new(name).with_variables(parse_vars(vars));
    let start = Instant::now();
    let outcome = engine.execute_graph(&mut instance, &graph);
    let duration = start.elapsed();

    // --- 4. Report ---
    println!("--- Event Trace ---");
    for event in log.events() {
        match event.node_id() {
            Some(node_id) => println!("{:<18} {}", event.event_type(), node_id),
            None => println!("{}", event.event_type()),
        }
    }

    println!("\n--- Result ---");
    println!("Instance:  {}", instance.id);
    println!("Status:    {}", instance.status);
    if let Some(node_id) = &instance.current_node_id {
        println!("Last node: {}", node_id);
    }
    if let Some(reason) = &instance.failure_reason {
        println!("Reason:    {}", reason);
    }
    for failure in &instance.condition_errors {
        println!(
            "Skipped:   {} -> {} ({}): {}",
            failure.from, failure.to, failure.condition, failure.error
        );
    }
    let variables = serde_json::to_string_pretty(&instance.context.variables())
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to render variables: {}", e)));
    println!("Variables: {}", variables);
    println!("Duration:  {:?}", duration);

    if let Err(e) = outcome {
        exit_with_error(&e.to_string());
    }
}

/// Turns `key=value` pairs into variables. Values that are not valid JSON
/// are taken as plain strings.
fn parse_vars(vars: &[String]) -> Map<String, JsonValue> {
    vars.iter()
        .map(|pair| {
            let (key, raw) = pair.split_once('=').unwrap_or_else(|| {
                exit_with_error(&format!("Variable '{}' must be written as key=value", pair))
            });
            let value = serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::from(raw));
            (key.trim().to_string(), value)
        })
        .collect()
}

fn read_source(file: &Path) -> String {
    fs::read_to_string(file).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read '{}': {}", file.display(), e))
    })
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
