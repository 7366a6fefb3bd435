//! capnav command-line driver
//!
//! Loads a knowledge graph from a JSON document and prints navigation
//! reports for it.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use capnav::{InMemoryKnowledgeStore, Navigator, NavigatorConfig, NavResult, TaskSource};

enum Mode {
    AllTasks,
    Explore(String),
    Catalog,
}

/// Command-line options
struct Options {
    /// JSON graph document
    graph: PathBuf,
    /// Config file, overriding `CAPNAV_CONFIG`
    config: Option<PathBuf>,
    mode: Mode,
    json: bool,
}

fn print_help() {
    println!("capnav - map AI tasks to capabilities and intrinsics");
    println!();
    println!("USAGE:");
    println!("    capnav --graph <FILE> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -g, --graph <FILE>        JSON knowledge graph to load (required)");
    println!("    -c, --config <FILE>       Config file [default: $CAPNAV_CONFIG or config/capnav]");
    println!("    -t, --task <NAME>         Explore a single task instead of all tasks");
    println!("        --catalog             Print the capability catalog");
    println!("        --json                Print the report as JSON");
    println!("    -h, --help                Print help information");
}

fn value_of(args: &[String], i: usize, flag: &str) -> String {
    args.get(i + 1).cloned().unwrap_or_else(|| {
        eprintln!("error: {flag} requires a value");
        std::process::exit(1);
    })
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut graph = None;
    let mut config = None;
    let mut mode = Mode::AllTasks;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--graph" | "-g" => {
                graph = Some(PathBuf::from(value_of(&args, i, "--graph")));
                i += 2;
            }
            "--config" | "-c" => {
                config = Some(PathBuf::from(value_of(&args, i, "--config")));
                i += 2;
            }
            "--task" | "-t" => {
                mode = Mode::Explore(value_of(&args, i, "--task"));
                i += 2;
            }
            "--catalog" => {
                mode = Mode::Catalog;
                i += 1;
            }
            "--json" => {
                json = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    let Some(graph) = graph else {
        eprintln!("error: --graph is required (see --help)");
        std::process::exit(1);
    };

    Options {
        graph,
        config,
        mode,
        json,
    }
}

fn print_json(value: &impl serde::Serialize) -> NavResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| capnav::StoreError::SerializationError(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn run(options: &Options) -> NavResult<()> {
    let config = match &options.config {
        Some(path) => NavigatorConfig::load_from(path)?,
        None => NavigatorConfig::load()?,
    };
    let store = InMemoryKnowledgeStore::from_path(&options.graph)?;
    let navigator = Navigator::new(Arc::new(store)).with_config(config);

    let summary = navigator.catalog_summary()?;
    tracing::info!(graph = %options.graph.display(), "{summary}");

    match &options.mode {
        Mode::AllTasks => {
            let report = navigator.run("", TaskSource::AllTasks);
            if options.json {
                print_json(&report)?;
            } else {
                print!("{report}");
            }
        }
        Mode::Explore(task) => {
            let report = navigator.explore_task(task);
            if options.json {
                print_json(&report)?;
            } else {
                println!("## {task}\n");
                println!("### Capabilities\n\n{}", report.capabilities_report.trim_end());
                println!("\n### Intrinsics\n\n{}", report.intrinsics_report.trim_end());
            }
        }
        Mode::Catalog => {
            let rows = navigator.capability_catalog()?;
            if options.json {
                print_json(&rows)?;
            } else {
                println!("{summary}\n");
                for row in rows {
                    println!("[{}] {} ({})", row.group, row.name, row.id);
                    if !row.description.is_empty() {
                        println!("    {}", row.description);
                    }
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let options = parse_args();
    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
