use clap::{Parser, Subcommand};
use flowcanvas::error::CanvasConversionError;
use flowcanvas::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match the canvas JSON exported by the editor and are only used here for conversion.

#[derive(Deserialize)]
struct RawCanvas {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    version: Option<String>,
    root: String,
    #[serde(default)]
    config: CanvasConfig,
    nodes: Vec<RawNode>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(alias = "type", alias = "nodeType")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    properties: BTreeMap<String, String>,
    #[serde(default)]
    next: Option<String>,
    #[serde(default, alias = "conditions", alias = "conditionalBranches")]
    branches: Vec<RawBranch>,
    #[serde(default, alias = "elseTarget", alias = "else")]
    else_target: Option<String>,
}

#[derive(Deserialize)]
struct RawBranch {
    #[serde(alias = "expression")]
    condition: String,
    #[serde(alias = "to")]
    target: String,
}

struct RawGraph {
    root: String,
    nodes: Vec<RawNode>,
}

// --- Converter Implementation ---

impl IntoCanvas for RawGraph {
    fn into_canvas(self) -> std::result::Result<(FlowGraph, String), CanvasConversionError> {
        if self.nodes.is_empty() {
            return Err(CanvasConversionError::ValidationError(
                "canvas contains no nodes".to_string(),
            ));
        }

        let nodes = self.nodes.into_iter().map(|raw| {
            let mut node = FlowNode::new(raw.id, raw.kind);
            node.name = raw.name;
            node.properties = raw.properties;
            node.next = raw.next;
            node.conditions = raw
                .branches
                .into_iter()
                .map(|b| ConditionalContainer::new(b.condition, b.target))
                .collect();
            node.else_target = raw.else_target;
            node
        });

        Ok((FlowGraph::from_nodes(nodes)?, self.root))
    }
}

/// Compiles workflow canvases into BPMN process definitions and deploys them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a canvas and print (or write) the process document
    Compile {
        /// Path to the canvas JSON file
        canvas_path: PathBuf,
        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the process identifier from the canvas file
        #[arg(long)]
        id: Option<String>,
        /// Override the process version from the canvas file
        #[arg(long = "process-version")]
        process_version: Option<String>,
    },
    /// Compile a canvas and deploy it into a local definition store
    Deploy {
        /// Path to the canvas JSON file
        canvas_path: PathBuf,
        /// Directory of the file-backed definition store
        #[arg(short, long, default_value = "definitions")]
        store: PathBuf,
        /// Fail instead of overwriting a different stored document
        #[arg(long)]
        reject_overwrite: bool,
        #[arg(long)]
        id: Option<String>,
        #[arg(long = "process-version")]
        process_version: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile {
            canvas_path,
            output,
            id,
            process_version,
        } => run_compile(canvas_path, output, id, process_version),
        Command::Deploy {
            canvas_path,
            store,
            reject_overwrite,
            id,
            process_version,
        } => run_deploy(canvas_path, store, reject_overwrite, id, process_version),
    }
}

fn load_canvas(path: &PathBuf, id: Option<String>, version: Option<String>) -> FlowCanvas {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read canvas file '{}': {}",
            path.display(),
            e
        ))
    });
    let raw: RawCanvas = serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse canvas JSON: {}", e)));

    let raw_id = id.or(raw.id).unwrap_or_default();
    let raw_version = version.or(raw.version).unwrap_or_default();
    let config = raw.config;

    let (graph, root) = RawGraph {
        root: raw.root,
        nodes: raw.nodes,
    }
    .into_canvas()
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert canvas: {}", e)));

    FlowCanvas::new(Arc::new(graph), root)
        .with_id(raw_id)
        .with_version(raw_version)
        .with_config(config)
}

fn run_compile(
    canvas_path: PathBuf,
    output: Option<PathBuf>,
    id: Option<String>,
    version: Option<String>,
) {
    let canvas = load_canvas(&canvas_path, id, version);

    let compile_start = Instant::now();
    let compiled = canvas
        .compile(&Compiler::default())
        .unwrap_or_else(|e| exit_with_error(&format!("Compilation failed: {}", e)));
    let compile_duration = compile_start.elapsed();

    match output {
        Some(path) => {
            fs::write(&path, &compiled.document).unwrap_or_else(|e| {
                exit_with_error(&format!(
                    "Could not write document to '{}': {}",
                    path.display(),
                    e
                ))
            });
            eprintln!("Wrote process document to '{}'", path.display());
        }
        None => print!("{}", compiled.document),
    }

    eprintln!(
        "Compiled '{}' (version {}): {} nodes, {} flows in {:?}",
        compiled.id, compiled.version, compiled.node_count, compiled.flow_count, compile_duration
    );
}

fn run_deploy(
    canvas_path: PathBuf,
    store_dir: PathBuf,
    reject_overwrite: bool,
    id: Option<String>,
    version: Option<String>,
) {
    let canvas = load_canvas(&canvas_path, id, version);

    let store = FileDefinitionStore::open(&store_dir).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Could not open definition store '{}': {}",
            store_dir.display(),
            e
        ))
    });
    let policy = if reject_overwrite {
        OverwritePolicy::Reject
    } else {
        OverwritePolicy::Overwrite
    };
    let manager =
        DeploymentManager::new(store, InMemoryExecutionEngine::new()).with_overwrite_policy(policy);

    let definition = canvas
        .deploy(&Compiler::default(), &manager)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    println!(
        "Deployed '{}' (version {}) into '{}'",
        definition.id,
        definition.version,
        store_dir.display()
    );
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
