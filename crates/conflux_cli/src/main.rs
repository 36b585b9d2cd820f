//! conflux: compiles a dataflow task graph into one structural netlist per
//! task.
//!
//! Each stage persists its output in the work directory, so `analyze`,
//! `synth`, `floorplan`, `link` and `pack` can be rerun one at a time;
//! `build` chains them all.

#![warn(missing_docs)]

mod analyze;
mod build;
mod diagnose;
mod floorplan;
mod link;
mod pack;
mod pipeline;
mod synth;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use conflux_config::Overrides;
use conflux_diagnostics::{DiagnosticRenderer, TerminalRenderer};
use tracing::Level;

/// conflux: dataflow task graphs to structural netlists.
#[derive(Parser, Debug)]
#[command(name = "conflux", version, about = "Dataflow task-graph compiler")]
pub struct Cli {
    /// Print errors only.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log more: `-v` for stage milestones, `-vv` for every emitted component.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to `conflux.toml` or its directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Settings overriding `conflux.toml`.
    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// The stage to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Command-line overrides of file settings.
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Control latency of every upper task.
    #[arg(long, global = true)]
    pub register_level: Option<u32>,

    /// Parallel synthesis workers; 0 uses every CPU.
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Work directory for stage outputs.
    #[arg(long, global = true)]
    pub work_dir: Option<PathBuf>,

    /// Target clock, e.g. `3.33ns` or `300MHz`.
    #[arg(long, global = true)]
    pub clock_period: Option<String>,
}

/// Pipeline stages.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the task graph and persist it.
    Analyze,
    /// Synthesize every leaf task and write resource reports.
    Synth,
    /// Place the top task's instances into regions and plan FIFO stages.
    Floorplan,
    /// Assemble every upper task into a netlist.
    Link,
    /// Bundle netlists, reports and constraints into one archive.
    Pack(PackArgs),
    /// Run every stage in order.
    Build(PackArgs),
}

/// Arguments for `pack` and `build`.
#[derive(Args, Debug, Default)]
pub struct PackArgs {
    /// Archive path; defaults to `{work_dir}/{name}.cfx`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from the environment.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Suppress progress lines.
    pub quiet: bool,
    /// Use ANSI colors in diagnostics.
    pub color: bool,
    /// Explicit configuration path.
    pub config: Option<PathBuf>,
    /// Overrides merged into the resolved settings.
    pub overrides: Overrides,
}

impl OverrideArgs {
    fn into_overrides(self) -> Overrides {
        Overrides {
            register_level: self.register_level,
            jobs: self.jobs,
            work_dir: self.work_dir,
            clock_period: self.clock_period,
        }
    }
}

/// Log level for the `-q`/`-v` flags: errors, warnings, info, debug.
fn log_level(quiet: bool, verbose: u8) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    }
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::env::var_os("TERM").is_some(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.quiet, cli.verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(color)
        .init();

    let global = GlobalArgs {
        quiet: cli.quiet,
        color,
        config: cli.config,
        overrides: cli.overrides.into_overrides(),
    };

    let result = match cli.command {
        Command::Analyze => analyze::run(&global),
        Command::Synth => synth::run(&global),
        Command::Floorplan => floorplan::run(&global),
        Command::Link => link::run(&global),
        Command::Pack(ref args) => pack::run(args, &global),
        Command::Build(ref args) => build::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            let renderer = TerminalRenderer::new(global.color);
            eprint!("{}", renderer.render(&diagnose::diagnose(e.as_ref())));
            process::exit(1);
        }
    }
}
