// CLI application
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

mod commands;

use commands::{layout_pass, stats_pass};

#[derive(Parser)]
#[command(name = "iongraph")]
#[command(about = "Layout engine for JIT control-flow graph visualization")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Lay out a pass file and write the mir layout geometry as JSON
    Layout {
        /// Path to the pass JSON file (mir + lir block lists)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the laid-out geometry; defaults next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Lay out a pass file and print pipeline statistics
    Stats {
        /// Path to the pass JSON file (mir + lir block lists)
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Layout { input, output, pretty } => {
            let pb = create_progress_bar("Laying out pass...");
            layout_pass(&input, output.as_deref(), pretty)?;
            pb.finish_with_message("Layout complete");
        }
        Commands::Stats { input } => {
            let pb = create_progress_bar("Laying out pass...");
            stats_pass(&input)?;
            pb.finish_with_message("Stats complete");
        }
    }

    Ok(())
}

fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb
}
