//! Source Generation CLI
//!
//! Loads record definitions and regenerates pyschema source, either as a single
//! module on stdout or as a namespace-partitioned package.
//!
//! Usage:
//!   sourcegen render --schemas ./schemas Parent
//!   sourcegen package --schemas ./schemas --out ./generated
//!   sourcegen package --out ./generated --check
//!   sourcegen check
//!   sourcegen graph --output schemas.dot

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use schema_sourcegen::codegen::{self, PackagePlan};
use schema_sourcegen::{loader, DependencyGraph, DirectorySink, MemorySink, SchemaSet, SourcegenConfig};
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sourcegen")]
#[command(about = "Regenerate pyschema record source from schema definitions")]
#[command(version)]
struct Cli {
    /// Config file layered over sourcegen.toml
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Definition file or directory (overrides config)
    #[arg(short, long, global = true)]
    schemas: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a single module for the given schemas
    Render {
        /// Root schemas (default: config roots, then every schema)
        roots: Vec<String>,

        /// Omit the import header
        #[arg(long)]
        no_header: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write one module per namespace below a directory
    Package {
        /// Root schemas (default: config roots, then every schema)
        roots: Vec<String>,

        /// Package root directory
        #[arg(short, long)]
        out: PathBuf,

        /// Print the units instead of writing them
        #[arg(long)]
        dry_run: bool,

        /// Compare against the files on disk and fail on drift
        #[arg(long, conflicts_with = "dry_run")]
        check: bool,
    },
    /// Report cycles and dangling references
    Check,
    /// Export the dependency graph in DOT format
    Graph {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut config = SourcegenConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(schemas) = cli.schemas {
        config.input.schemas = schemas;
    }

    if let Commands::Config = cli.command {
        print!("{}", config.to_toml()?);
        return Ok(0);
    }

    let set = loader::load_path(&config.input.schemas)
        .with_context(|| format!("loading schemas from {}", config.input.schemas.display()))?;

    match cli.command {
        Commands::Render { roots, no_header, output } => {
            let roots = pick_roots(&set, roots, &config)?;
            let generated = codegen::generate(&set, &roots, &config.render, !no_header)?;
            match output {
                Some(path) => {
                    fs::write(&path, &generated.code)?;
                    eprintln!("✅ Wrote {} classes to {:?}", generated.schemas.len(), path);
                }
                None => print!("{}", generated.code),
            }
            Ok(0)
        }
        Commands::Package { roots, out, dry_run, check } => {
            let roots = pick_roots(&set, roots, &config)?;
            let plan = codegen::plan_package(&set, &roots, &config.render, &config.package)?;

            if check {
                return Ok(check_drift(&plan, &out));
            }

            if dry_run {
                let mut sink = MemorySink::new();
                plan.write_to(&mut sink)?;
                for (path, content) in &sink.units {
                    println!("==> {} <==", path.display());
                    print!("{}", content);
                }
            } else {
                let mut sink = DirectorySink::new(&out);
                let written = plan.write_to(&mut sink)?;
                eprintln!("✅ Wrote {} units to {:?}", written.len(), out);
            }
            Ok(0)
        }
        Commands::Check => Ok(check_graph(&set)),
        Commands::Graph { output } => {
            let graph = DependencyGraph::from_set(&set);
            eprintln!("Graph loaded: {} schemas, {} edges", graph.schema_count(), graph.edge_count());
            let dot = graph.to_dot();
            match output {
                Some(path) => {
                    fs::write(&path, &dot)?;
                    eprintln!("✅ Exported DOT to: {:?}", path);
                }
                None => print!("{}", dot),
            }
            Ok(0)
        }
        Commands::Config => Ok(0),
    }
}

/// Roots from the command line, then config, then every loaded schema
fn pick_roots(set: &SchemaSet, cli_roots: Vec<String>, config: &SourcegenConfig) -> anyhow::Result<Vec<String>> {
    let roots = if !cli_roots.is_empty() {
        cli_roots
    } else if !config.input.roots.is_empty() {
        config.input.roots.clone()
    } else {
        set.names().map(str::to_string).collect()
    };

    for root in &roots {
        if !set.contains(root) {
            let suggestions = set.search(root, 3);
            if suggestions.is_empty() {
                bail!("unknown schema {root:?}");
            }
            bail!("unknown schema {root:?} (did you mean {}?)", suggestions.join(", "));
        }
    }

    Ok(roots)
}

fn check_graph(set: &SchemaSet) -> i32 {
    let graph = DependencyGraph::from_set(set);
    let cycles = graph.cycles();
    let dangling = graph.dangling_refs();

    println!("🔍 {} schemas, {} references", graph.schema_count(), graph.edge_count());

    for cycle in &cycles {
        println!("❌ cycle: {}", cycle.join(" <-> "));
    }
    for dangling_ref in dangling {
        println!(
            "❌ {}.{} references unknown schema {}",
            dangling_ref.from, dangling_ref.field, dangling_ref.target
        );
    }

    if cycles.is_empty() && dangling.is_empty() {
        println!("✅ All schemas can be generated");
        0
    } else {
        1
    }
}

/// Diff every planned unit against the file on disk
fn check_drift(plan: &PackagePlan, out: &Path) -> i32 {
    let mut drifted = 0;

    for unit in &plan.units {
        let on_disk = out.join(&unit.path);
        let Ok(current) = fs::read_to_string(&on_disk) else {
            println!("❌ missing: {}", unit.path.display());
            drifted += 1;
            continue;
        };
        if current == unit.content {
            continue;
        }

        drifted += 1;
        let name = unit.path.display().to_string();
        let diff = TextDiff::from_lines(&current, &unit.content);
        print!(
            "{}",
            diff.unified_diff()
                .header(&format!("a/{name}"), &format!("b/{name}"))
        );
    }

    if drifted == 0 {
        println!("✅ {} units up to date", plan.units.len());
        0
    } else {
        eprintln!("⚠️  {} of {} units out of date", drifted, plan.units.len());
        1
    }
}
