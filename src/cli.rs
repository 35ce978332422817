//! Minimal CLI: modules → (records | go)
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::codegen::Codegen;
use crate::ir::RecordDefinition;
use crate::lower::{BuilderOptions, RecordBuilder};
use crate::manifest::{ModuleManifest, load_modules};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// flatten module variable types into record definitions and emit them as JSON or Go
#[derive(Parser, Debug)]
#[command(name = "tfvar-gen", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the record definitions as JSON
    Records(RecordsOut),
    /// emit Go structs for every module
    Go(GoOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more module directories, `.tf` files or JSON manifest files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// variable names to leave out of each module's top-level record (case-insensitive)
    #[arg(long, num_args = 1..)]
    ignore: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct RecordsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct GoOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// Go package name
    #[arg(long, default_value = "modules")]
    package: String,

    /// output .go file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn build(&self) -> Result<Vec<RecordDefinition>> {
        let modules = load_modules(&self.input).context("loading modules")?;
        eprintln!("{} {} module(s)", "Loaded".cyan(), modules.len().to_string().green());
        build(&modules, &self.ignore)
    }
}

fn build(modules: &[ModuleManifest], ignore: &[String]) -> Result<Vec<RecordDefinition>> {
    let mut builder = RecordBuilder::new(BuilderOptions {
        ignore: ignore.to_vec(),
        ..BuilderOptions::default()
    });
    for module in modules {
        let entity = module
            .entity()
            .with_context(|| format!("parsing variable types of module {}", module.name))?;
        builder
            .add_entity(&entity)
            .with_context(|| format!("building records for module {}", module.name))?;
    }
    let records = builder.finish();
    eprintln!("{} {} record(s)", "Built".cyan(), records.len().to_string().green());
    Ok(records)
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Records(target) => {
                let records = target.input_settings.build()?;
                let src = serde_json::to_string_pretty(&records)?;
                write_output(target.out.as_ref(), &src)
            }
            Command::Go(target) => {
                let records = target.input_settings.build()?;
                let mut cg = Codegen::new(&target.package);
                cg.emit(&records)?;
                write_output(target.out.as_ref(), &cg.into_string())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&PathBuf>, src: &str) -> Result<()> {
    let Some(out) = out else {
        println!("{src}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(out, src).with_context(|| format!("writing {}", out.display()))?;
    eprintln!("{} {}", "Wrote".cyan(), out.display());
    Ok(())
}
