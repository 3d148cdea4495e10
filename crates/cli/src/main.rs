mod config;
mod upload;

use clap::{Parser, Subcommand};
use rpm_upload_core::AddressingMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rpm-upload",
    version,
    about = "Upload RPMs to a content-sources repository in verified chunks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one or more RPM files and attach them to a repository
    Upload {
        /// Repository UUID to attach the uploads to
        repo_uuid: String,

        /// RPM files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Commit each upload and attach the resulting artifacts
        #[arg(long)]
        finalize: bool,

        /// Endpoint family: session-id or resource-locator
        #[arg(long)]
        mode: Option<AddressingMode>,

        /// Chunk size in bytes
        #[arg(long)]
        chunk_size: Option<u64>,

        /// API root URL
        #[arg(long)]
        server: Option<String>,

        /// Delay between task status checks
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval_ms: Option<u64>,

        /// Give up after this many task status checks
        #[arg(long)]
        max_polls: Option<u32>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Upload {
            repo_uuid,
            files,
            finalize,
            mode,
            chunk_size,
            server,
            poll_interval_ms,
            max_polls,
        } => {
            let overrides = config::Overrides {
                server,
                mode,
                chunk_size,
                finalize,
                poll_interval_ms,
                max_polls,
            };
            upload::run_upload(&repo_uuid, &files, overrides).await
        }
        Commands::Config => config::show_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
