use clap::Parser;
use flowcanvas::prelude::*;
use rand::Rng;
use rand::rngs::ThreadRng;
use std::fs;

/// A CLI tool to generate random (and usually cyclic) canvases for the flowcanvas compiler
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated canvas JSON file to
    #[arg(short, long, default_value = "generated_canvas.json")]
    output: String,

    /// Number of nodes in the generated graph
    #[arg(short, long, default_value_t = 50)]
    nodes: usize,

    /// Probability that a node branches conditionally instead of having a single successor
    #[arg(long, default_value_t = 0.25)]
    branch_probability: f64,

    /// Probability that a non-branching node has no successor at all
    #[arg(long, default_value_t = 0.1)]
    terminal_probability: f64,

    /// Maximum number of conditional branches per branching node
    #[arg(long, default_value_t = 3)]
    max_branches: usize,
}

const NODE_KINDS: [&str; 5] = ["task", "serviceTask", "userTask", "manualTask", "receiveTask"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.nodes == 0 {
        eprintln!("Error: --nodes must be at least 1");
        std::process::exit(1);
    }
    for (flag, p) in [
        ("--branch-probability", cli.branch_probability),
        ("--terminal-probability", cli.terminal_probability),
    ] {
        if !(0.0..=1.0).contains(&p) {
            eprintln!("Error: {} ({}) must be between 0 and 1", flag, p);
            std::process::exit(1);
        }
    }

    println!(
        "Generating a canvas with {} nodes (branch p={}, terminal p={})...",
        cli.nodes, cli.branch_probability, cli.terminal_probability
    );

    let mut rng = rand::rng();
    let graph = generate_graph(&mut rng, &cli)?;

    let canvas = serde_json::json!({
        "id": format!("generated_{}", cli.nodes),
        "version": DEFAULT_VERSION,
        "root": node_id(0),
        "nodes": graph,
    });
    fs::write(&cli.output, serde_json::to_string_pretty(&canvas)?)?;

    println!(
        "Successfully generated and saved canvas to '{}'",
        cli.output
    );
    Ok(())
}

fn node_id(index: usize) -> String {
    format!("n{}", index + 1)
}

/// Links each node to random targets anywhere in the graph, so back-edges,
/// self-loops and merge points all occur naturally.
fn generate_graph(rng: &mut ThreadRng, cli: &Cli) -> Result<FlowGraph> {
    let mut graph = FlowGraph::new();
    let mut branching = 0;
    let mut terminals = 0;

    for index in 0..cli.nodes {
        let kind = NODE_KINDS[rng.random_range(0..NODE_KINDS.len())];
        let mut node = FlowNode::new(node_id(index), kind).with_name(format!("Step {}", index + 1));

        if cli.max_branches > 0 && rng.random_bool(cli.branch_probability) {
            let count = rng.random_range(1..=cli.max_branches);
            for branch in 0..count {
                let target = node_id(rng.random_range(0..cli.nodes));
                node = node.with_condition(format!("${{route == {}}}", branch), target);
            }
            if rng.random_bool(0.5) {
                node = node.with_else(node_id(rng.random_range(0..cli.nodes)));
            }
            branching += 1;
        } else if rng.random_bool(cli.terminal_probability) {
            terminals += 1;
        } else {
            node = node.with_next(node_id(rng.random_range(0..cli.nodes)));
        }

        graph.insert(node)?;
    }

    println!(
        "-> Generated {} branching and {} terminal node(s).",
        branching, terminals
    );
    Ok(graph)
}
