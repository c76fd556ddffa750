//! relayout CLI
//!
//! Relocates Android Gradle build outputs into a shared build folder and
//! cleans it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use relayout_android::clean::{self, CleanReport};
use relayout_android::settings::load_registry;
use relayout_android::{BuildLayout, LayoutSettings};
use relayout_cli::output::{display_path, format_count, format_duration, format_size, Status};
use relayout_cli::progress;
use relayout_core::config::Config;
use relayout_core::error::{exit_codes, Error};
use relayout_telemetry::{level_for, TelemetryConfig, Timer};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "relayout")]
#[command(about = "Relocate Android Gradle build outputs into a shared build folder")]
#[command(version)]
struct Cli {
    /// Root project directory (the one holding settings.gradle.kts)
    #[arg(short, long, global = true, default_value = ".", env = "RELAYOUT_ROOT")]
    root: PathBuf,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete the shared build directory
    Clean {
        /// Report what would be deleted without deleting it
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show where every project builds
    Layout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the order subprojects are configured in
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List declared dependency repositories
    Repos {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Commands::Clean { json, .. }
            | Commands::Layout { json }
            | Commands::Plan { json }
            | Commands::Repos { json } => *json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }
    Status::set_quiet(cli.quiet);

    let config = match Config::load(cli.config.as_deref(), &cli.root) {
        Ok(config) => config,
        Err(e) => std::process::exit(report_error(&e, cli.command.json())),
    };

    relayout_telemetry::init_with_config(TelemetryConfig {
        log_level: level_for(cli.verbose, cli.quiet, &config.schema.logging.level),
        ansi: !cli.no_color,
        ..TelemetryConfig::default()
    })?;
    if let Some(path) = &config.path {
        tracing::debug!(config = %path.display(), "Loaded configuration");
    }

    let exit_code = match run(&cli, &config) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => report_error(&e, cli.command.json()),
    };

    std::process::exit(exit_code);
}

fn run(cli: &Cli, config: &Config) -> relayout_core::Result<()> {
    let timer = Timer::start("configure");
    let settings = LayoutSettings::from_schema(&config.schema)?;
    let mut registry = load_registry(&cli.root, &config.schema)?;
    let layout = BuildLayout::configure(&mut registry, &settings)?;
    timer.stop();

    match cli.command {
        Commands::Clean { dry_run, json } => run_clean(&layout, dry_run, json),
        Commands::Layout { json } => run_layout(&layout, json),
        Commands::Plan { json } => run_plan(&layout, json),
        Commands::Repos { json } => run_repos(&layout, json),
    }
}

/// Print `err` and return the exit code for it.
///
/// JSON commands also get the error report on stdout.
fn report_error(err: &Error, json: bool) -> i32 {
    Status::error(&err.to_string());
    if json {
        match serde_json::to_string_pretty(&err.to_report()) {
            Ok(report) => println!("{report}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialize error report"),
        }
    }
    err.code.exit_code()
}

fn run_clean(layout: &BuildLayout, dry_run: bool, json: bool) -> relayout_core::Result<()> {
    let timer = Timer::start("clean");
    let pb = progress::spinner(&format!("Cleaning {}...", layout.build_root.display()));

    let result = if dry_run {
        clean::plan_clean_layout(layout)
    } else {
        clean::clean_layout(layout)
    };
    let report = match result {
        Ok(report) => {
            pb.finish_and_clear();
            report
        }
        Err(e) => {
            progress::finish_error(&pb);
            return Err(e);
        }
    };
    let elapsed = timer.stop();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_clean_summary(&report, dry_run);
    Status::stat("Duration", &format_duration(elapsed));
    Ok(())
}

fn print_clean_summary(report: &CleanReport, dry_run: bool) {
    let path = report.path.display();
    if !report.existed {
        Status::info(&format!("Nothing to clean at {path}"));
        return;
    }

    let summary = format!(
        "{}, {}",
        format_count(report.files, "file", "files"),
        format_size(report.bytes)
    );
    if dry_run {
        Status::info(&format!("Would delete {path} ({summary})"));
    } else {
        Status::success(&format!("Deleted {path} ({summary})"));
    }
}

fn run_layout(layout: &BuildLayout, json: bool) -> relayout_core::Result<()> {
    if json {
        println!("{}", layout.to_json()?);
        return Ok(());
    }

    Status::header("Build layout");
    Status::stat("Root project", &layout.root.dir.display().to_string());
    Status::stat("Build root", &layout.build_root.display().to_string());
    println!();

    let base = layout.build_root.as_path();
    for (project, assignment) in layout.projects.iter().zip(&layout.assignments) {
        if assignment.is_relocated() {
            println!(
                "  {} {:<20} {}",
                "→".green(),
                project.path,
                display_path(&project.build_dir, base)
            );
        } else {
            println!(
                "  {} {:<20} {} {}",
                "·".dimmed(),
                project.path,
                project.build_dir.display(),
                "(outside root project)".dimmed()
            );
        }
    }

    let skipped = layout.skipped().count();
    if skipped > 0 {
        Status::warning(&format!(
            "{} outside {} kept their build directories",
            format_count(skipped, "project", "projects"),
            display_root(&layout.root.dir)
        ));
    }
    Ok(())
}

fn display_root(dir: &Path) -> String {
    dir.file_name()
        .map_or_else(|| dir.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn run_plan(layout: &BuildLayout, json: bool) -> relayout_core::Result<()> {
    let plan = &layout.plan;
    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    Status::header("Evaluation order");
    for (i, name) in plan.order().iter().enumerate() {
        let marker = if plan.anchors().iter().any(|a| a == name) {
            " (anchor)".yellow().to_string()
        } else {
            String::new()
        };
        println!("  {:>3}. :{}{}", i + 1, name, marker);
    }
    Status::stat(
        "Constraints",
        &format_count(plan.len(), "constraint", "constraints"),
    );
    Ok(())
}

fn run_repos(layout: &BuildLayout, json: bool) -> relayout_core::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&layout.repositories)?);
        return Ok(());
    }

    Status::header("Repositories");
    for (i, repo) in layout.repositories.iter().enumerate() {
        println!("  {}. {:<20} {}", i + 1, repo.name, repo.url.dimmed());
    }
    Ok(())
}
