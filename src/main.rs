use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use patch_aware::adapters::{
    AdapterFactory, DefaultAdapterFactory, Mutation, ReadOnlyAwareAdapterFactory,
};
use patch_aware::model::{convert, SlotType};
use patch_aware::patch::{apply_with_error_map, ErrorMap, PatchDocument};
use patch_aware::schema::{load_from_path, ConfigError, Schema};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "patch-aware")]
#[command(about = "Apply JSON patches to documents described by a type schema", long_about = None)]
#[command(version)]
struct Cli {
    /// Log every operation (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a patch document to a JSON document
    Apply {
        /// Schema TOML describing the document's types
        #[arg(short, long)]
        schema: PathBuf,

        /// JSON document to patch, loaded as the schema's root type
        #[arg(short, long)]
        document: PathBuf,

        /// JSON patch document
        #[arg(short, long)]
        patch: PathBuf,

        /// Prefix for error keys
        #[arg(long, default_value = "")]
        prefix: String,

        /// Show a diff of the document before and after
        #[arg(long)]
        diff: bool,

        /// Write the patched document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Apply edits to read-only types and slots as if they were unmarked
        #[arg(long)]
        ignore_read_only: bool,
    },

    /// Validate a schema and, optionally, a patch document
    Check {
        #[arg(short, long)]
        schema: PathBuf,

        #[arg(short, long)]
        patch: Option<PathBuf>,
    },

    /// List the types declared by a schema
    Types {
        #[arg(short, long)]
        schema: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Apply {
            schema,
            document,
            patch,
            prefix,
            diff,
            output,
            ignore_read_only,
        } => cmd_apply(ApplyArgs {
            schema,
            document,
            patch,
            prefix,
            diff,
            output,
            ignore_read_only,
        }),

        Commands::Check { schema, patch } => cmd_check(&schema, patch.as_deref()),

        Commands::Types { schema } => cmd_types(&schema),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct ApplyArgs {
    schema: PathBuf,
    document: PathBuf,
    patch: PathBuf,
    prefix: String,
    diff: bool,
    output: Option<PathBuf>,
    ignore_read_only: bool,
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn root_type(schema: &Schema) -> Result<SlotType> {
    let root = schema
        .root()
        .context("schema has no root type; set `root` in [meta]")?;
    Ok(SlotType::Object(root.clone()))
}

/// Helper: Show a line diff between the original and patched document
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_apply(args: ApplyArgs) -> Result<()> {
    let schema = load_from_path(&args.schema)?;
    let ty = root_type(&schema)?;

    let raw = read_json(&args.document)?;
    let mut target = convert(&raw, &ty)
        .with_context(|| format!("{} does not match type {}", args.document.display(), ty))?;

    let patch_text = fs::read_to_string(&args.patch)
        .with_context(|| format!("failed to read {}", args.patch.display()))?;
    let document = PatchDocument::from_json_str(&patch_text)
        .with_context(|| format!("failed to parse {}", args.patch.display()))?;

    println!("Schema: {} ({})", args.schema.display(), schema.name());
    println!("Document: {}", args.document.display());
    println!("Applying {} operation(s)...", document.len());

    let ignoring = DefaultAdapterFactory::new();
    let aware = ReadOnlyAwareAdapterFactory::new();
    let factory: &dyn AdapterFactory = if args.ignore_read_only {
        &ignoring
    } else {
        &aware
    };

    let before = target.to_json();
    let mut errors = ErrorMap::new();
    let report = apply_with_error_map(&document, &mut target, factory, &mut errors, &args.prefix)?;

    for (operation, outcome) in document.operations().iter().zip(report.outcomes()) {
        match outcome {
            Ok(Mutation::Applied) => {
                println!("{} {} {}", "✓".green(), operation.op, operation.path);
            }
            Ok(Mutation::Suppressed) => {
                println!(
                    "{} {} {}: Suppressed (read-only)",
                    "⊙".yellow(),
                    operation.op,
                    operation.path
                );
            }
            Err(err) => {
                eprintln!(
                    "{} {} {}: Failed - {}",
                    "✗".red(),
                    operation.op,
                    operation.path,
                    err.message()
                );
            }
        }
    }

    let after = target.to_json();
    let rendered = serde_json::to_string_pretty(&after)?;

    if args.diff {
        let original = serde_json::to_string_pretty(&before)?;
        if original != rendered {
            display_diff(&args.document, &original, &rendered);
        }
    }

    match &args.output {
        Some(path) => fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None if !args.diff => println!("\n{rendered}"),
        None => {}
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", report.applied()).green());
    println!("  {} suppressed", format!("{}", report.suppressed()).yellow());
    println!("  {} failed", format!("{}", report.failed()).red());

    if !errors.is_empty() {
        println!("{}", "Errors:".bold());
        for (key, messages) in errors.iter() {
            for message in messages {
                println!("  {key}: {message}");
            }
        }
    }

    if report.failed() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_check(schema_path: &Path, patch: Option<&Path>) -> Result<()> {
    let mut failed = false;

    match load_from_path(schema_path) {
        Ok(schema) => println!(
            "{} {}: {} type(s)",
            "✓".green(),
            schema_path.display(),
            schema.len()
        ),
        Err(ConfigError::Validation { source, .. }) => {
            eprintln!("{} {}: invalid schema", "✗".red(), schema_path.display());
            for issue in &source.issues {
                eprintln!("  - {issue}");
            }
            failed = true;
        }
        Err(err) => return Err(err.into()),
    }

    if let Some(path) = patch {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let document = PatchDocument::from_json_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let mut bad = 0;
        for (index, operation) in document.operations().iter().enumerate() {
            if let Err(reason) = operation.check() {
                eprintln!("{} operation {}: {}", "✗".red(), index, reason);
                bad += 1;
            }
        }
        if bad == 0 {
            println!(
                "{} {}: {} operation(s)",
                "✓".green(),
                path.display(),
                document.len()
            );
        } else {
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_types(schema_path: &Path) -> Result<()> {
    let schema = load_from_path(schema_path)?;
    let root = schema.root().map(|ty| ty.name().to_string());

    for ty in schema.types() {
        let mut header = ty.name().bold().to_string();
        if root.as_deref() == Some(ty.name()) {
            header.push_str(&format!(" {}", "(root)".dimmed()));
        }
        if ty.is_read_only() {
            header.push_str(&format!(" {}", "[read-only]".yellow()));
        }
        println!("{header}");

        for slot in ty.slots() {
            let mut flags = Vec::new();
            if slot.read_only {
                flags.push("read-only");
            }
            if !slot.writable {
                flags.push("no-write");
            }
            if !slot.readable {
                flags.push("no-read");
            }
            if flags.is_empty() {
                println!("  {}: {}", slot.name, slot.ty);
            } else {
                println!(
                    "  {}: {} {}",
                    slot.name,
                    slot.ty,
                    format!("[{}]", flags.join(", ")).dimmed()
                );
            }
        }
    }

    Ok(())
}
