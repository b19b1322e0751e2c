use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use ssajit_core::ir_persist::{self, PersistError};
use ssajit_core::{CodegenConfig, CompiledIR, ModuleBuilder};
use ssajit_emit::{emit_json, EmitterConfig, IrEmitter};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "ssajit")]
#[command(about = "Compile straight-line SSA IR to native code and run it")]
#[command(version)]
struct Cli {
    /// Codegen settings as JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// -v for debug logs, -vv for per-statement traces
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate without generating code
    Check { input: PathBuf },

    /// Print the IR as text or JSON
    Print {
        input: PathBuf,

        #[arg(long)]
        json: bool,

        #[arg(long)]
        no_color: bool,
    },

    /// Show the Cranelift IR generated for the input
    Clif { input: PathBuf },

    /// Compile and call the function with i64 arguments
    Run {
        input: PathBuf,

        #[arg(allow_negative_numbers = true)]
        args: Vec<i64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => ir_persist::load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CodegenConfig::default(),
    };

    match cli.command {
        Commands::Check { input } => cmd_check(&input),
        Commands::Print {
            input,
            json,
            no_color,
        } => cmd_print(&input, json, no_color),
        Commands::Clif { input } => cmd_clif(&input, config),
        Commands::Run { input, args } => cmd_run(&input, &args, &config),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 if std::env::var("RUST_LOG").is_ok() => EnvFilter::from_default_env(),
        0 => return,
        1 => EnvFilter::new("ssajit_core=debug"),
        _ => EnvFilter::new("ssajit_core=trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load(input: &Path) -> Result<CompiledIR> {
    debug!(input = %input.display(), "loading IR");
    let is_json = input.extension().is_some_and(|ext| ext == "json");
    if is_json {
        match ir_persist::load_ir(input) {
            Err(PersistError::Ir(e)) => Err(e.into()),
            other => other.with_context(|| format!("Failed to load {}", input.display())),
        }
    } else {
        Ok(ssajit_parser::parse_file(input)?)
    }
}

fn cmd_check(input: &Path) -> Result<()> {
    let outcome = load(input).and_then(|ir| {
        ir.validate()?;
        Ok(ir)
    });

    match outcome {
        Ok(ir) => {
            println!("{}", "VALID".bright_green().bold());
            println!(
                "   {}: {} parameter(s), {} statement(s)",
                ir.name,
                ir.params.len(),
                ir.statements.len()
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", "INVALID".bright_red().bold());
            println!("{}", e);
            bail!("Validation failed")
        }
    }
}

fn cmd_print(input: &Path, json: bool, no_color: bool) -> Result<()> {
    let ir = load(input)?;
    if json {
        println!("{}", emit_json(&ir)?);
        return Ok(());
    }

    let config = EmitterConfig {
        use_colors: !no_color,
        ..EmitterConfig::default()
    };
    print!("{}", IrEmitter::new(config).emit_to_string(&ir)?);
    Ok(())
}

fn cmd_clif(input: &Path, mut config: CodegenConfig) -> Result<()> {
    let ir = load(input)?;
    config.capture_clif = true;
    let func = ModuleBuilder::with_config(&config)?.compile(&ir)?;
    if let Some(clif) = func.clif() {
        print!("{}", clif);
    }
    Ok(())
}

fn cmd_run(input: &Path, args: &[i64], config: &CodegenConfig) -> Result<()> {
    let ir = load(input)?;
    if args.len() != ir.params.len() {
        bail!(
            "{} expects {} argument(s), got {}",
            ir.name,
            ir.params.len(),
            args.len()
        );
    }

    let func = ModuleBuilder::with_config(config)?.compile(&ir)?;
    let result = func.invoke_i64(args)?;
    println!("{}", result);
    Ok(())
}
