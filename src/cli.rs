//! Command-line interface for mrbcheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::check::{compile, Runner};
use crate::config::{self, Config};
use crate::host::collect_fact_files;
use crate::report::{self, Summary};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

const OUTPUT_FORMATS: &[&str] = &["pretty", "json", "sarif", "clang"];

/// Static checker for variadic mruby C API calls.
///
/// mrbcheck validates calls to mrb_get_args, mrb_funcall, mrb_raisef and
/// friends against the argument contract encoded in their descriptor,
/// count, or message template, using call-site facts dumped by a compiler
/// frontend.
#[derive(Parser)]
#[command(name = "mrbcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check call-site fact files
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Show how an mrb_get_args descriptor is compiled
    Explain(ExplainArgs),
    /// Create a new mrbcheck config from a template
    Init(InitArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Fact file or directory of fact files
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, sarif, or clang
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Fail when any warning is reported
    #[arg(long)]
    pub deny_warnings: bool,
}

/// Arguments for the explain command.
#[derive(Parser)]
pub struct ExplainArgs {
    /// Descriptor string, e.g. "oz|i"
    pub descriptor: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "mrbcheck.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

/// All available templates.
static TEMPLATES: &[Template] = &[
    Template {
        name: "default",
        description: "All rules at default severity, vendor fact files excluded",
        content: include_str!("templates/default.yaml"),
    },
    Template {
        name: "strict",
        description: "Every finding is an error, including idiom suggestions",
        content: include_str!("templates/strict.yaml"),
    },
];

/// Load the explicit config, a discovered one, or the defaults.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => config::discover(Path::new(".")),
    };

    let Some(path) = path else {
        tracing::debug!("no config file found, using defaults");
        return Ok((Config::default(), None));
    };

    let config = Config::parse_file(&path)
        .map_err(|e| anyhow::anyhow!("parsing config {}: {}", path.display(), e))?;
    config::validate(&config)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok((config, Some(path)))
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    // Validate format
    if !OUTPUT_FORMATS.contains(&args.format.as_str()) {
        eprintln!(
            "Error: invalid format {:?}, must be one of {}",
            args.format,
            OUTPUT_FORMATS.join(", ")
        );
        return Ok(EXIT_ERROR);
    }

    let (config, config_path) = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Resolve path
    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let metadata = match std::fs::metadata(&abs_path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Collect fact files to check
    let files = if metadata.is_dir() {
        collect_fact_files(&abs_path, &config)?
    } else {
        vec![abs_path.clone()]
    };

    if files.is_empty() {
        eprintln!("Warning: no fact files to check");
        return Ok(EXIT_SUCCESS);
    }

    let runner = Runner::new(&config);
    let result = runner.run(&files)?;
    let summary = Summary::new(&result, args.deny_warnings);

    // Output results
    let config_str = config_path.map(|p| p.to_string_lossy().to_string());
    let path_str = args.path.to_string_lossy().to_string();

    match args.format.as_str() {
        "json" => report::write_json(&path_str, config_str.as_deref(), &result, &summary)?,
        "sarif" => {
            let base = if metadata.is_dir() {
                abs_path.as_path()
            } else {
                abs_path.parent().unwrap_or(Path::new(""))
            };
            report::write_sarif(base, &result)?
        }
        "clang" => report::write_clang(&result, &summary),
        _ => report::write_pretty(&path_str, config_str.as_deref(), &result, &summary),
    }

    if summary.passed {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the explain command.
pub fn run_explain(args: &ExplainArgs) -> anyhow::Result<i32> {
    let compiled = match compile(&args.descriptor) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return Ok(EXIT_FAILED);
        }
    };

    println!("Descriptor {:?}", args.descriptor);
    println!();
    println!(
        "  {:<4} {:<5} {:<32} {:<12} {:<9} {}",
        "#", "code", "expects pointer to", "position", "optional", "type check"
    );
    for (i, slot) in compiled.slots.iter().enumerate() {
        println!(
            "  {:<4} {:<5} {:<32} {:<12} {:<9} {}",
            i + 1,
            format!("'{}'", slot.code),
            slot.expected.label(),
            slot.position.as_str(),
            if slot.optional { "yes" } else { "no" },
            if slot.skip_type_check { "skipped (!)" } else { "yes" }
        );
    }
    println!();
    println!(
        "  Requires {} trailing argument{}",
        compiled.required_args(),
        if compiled.required_args() == 1 { "" } else { "s" }
    );

    if compiled.misplaced_skips.is_empty() {
        return Ok(EXIT_SUCCESS);
    }
    for offset in &compiled.misplaced_skips {
        eprintln!(
            "error: '!' at offset {} does not follow a specifier it can modify",
            offset
        );
    }
    Ok(EXIT_FAILED)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // List mode
    if args.list {
        return list_templates();
    }

    // Find template
    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'mrbcheck init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Dump call-site facts from your build (one .yaml or .json per translation unit)");
    println!("  2. Run: mrbcheck check <facts-dir> --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// List available templates.
fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "default" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  mrbcheck init --template <name>");

    Ok(EXIT_SUCCESS)
}
