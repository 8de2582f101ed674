use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod build;
mod commands;
mod config;

#[derive(Parser)]
#[command(version, about = "Build a course website from markdown lessons")]
struct Args {
    /// Log progress (equivalent to RUST_LOG=info)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// The command to execute
    #[command(subcommand)]
    command: CoursebookCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "coursebook.yaml")]
    config_file: Option<PathBuf>,

    /// Build in development mode (sets `site.dev` for templates)
    #[arg(long, default_value = "false")]
    dev: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Open the project in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,

    /// The path to the configuration file
    #[arg(short, long, default_value = "coursebook.yaml")]
    config_file: Option<PathBuf>,

    /// Whether to watch for changes and rebuild automatically
    #[arg(short, long, default_value = "true", action = clap::ArgAction::Set)]
    watch: bool,
}

#[derive(Parser)]
struct CleanArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "coursebook.yaml")]
    config_file: Option<PathBuf>,

    /// Print what would be deleted without deleting anything
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

#[derive(Subcommand)]
enum CoursebookCommand {
    /// Initialize a new course project
    Init(InitArgs),

    /// Build the course website
    Build(BuildArgs),

    /// Serve the course website on a local port
    Serve(ServeArgs),

    /// Delete the build output
    Clean(CleanArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    // --verbose enables INFO level, otherwise use RUST_LOG (default: errors only)
    let filter = if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match args.command {
        CoursebookCommand::Init(args) => {
            commands::init::run(&args).await?;
        }
        CoursebookCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
        CoursebookCommand::Serve(args) => {
            commands::serve::run(&args).await?;
        }
        CoursebookCommand::Clean(args) => {
            commands::clean::run(&args).await?;
        }
    }

    Ok(())
}
