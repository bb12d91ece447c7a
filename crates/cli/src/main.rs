use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use dcc_core::config::{apply_env_overrides, load_config};
use dcc_core::observability::init_tracing;
use std::path::PathBuf;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "dcc")]
#[command(about = "Drive agent runs and pipelines from the terminal")]
#[command(version)]
struct Cli {
    /// Directory holding .dcc/config.toml (defaults to current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Base URL of the API, overriding config and DCC_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a run and stream its output
    Run {
        /// Workspace the run belongs to
        #[arg(short, long)]
        workspace: String,

        #[arg(long)]
        skill: Option<String>,

        #[arg(long)]
        agent: Option<String>,

        #[arg(long)]
        model: Option<String>,

        prompt: String,
    },

    /// Inspect and execute pipelines
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },

    /// Rebuild a finished run from its stored events
    Replay { session_id: String },
}

#[derive(Subcommand)]
enum PipelineCommands {
    /// Show a pipeline's steps and progress
    Show { pipeline_id: String },

    /// Execute a pipeline and follow its progress
    Run {
        pipeline_id: String,

        /// Steps the server may run at once (1-10)
        #[arg(long)]
        max_parallel: Option<u32>,
    },

    /// List the agents steps can be routed to
    Agents,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = cli.root.unwrap_or_else(|| PathBuf::from("."));
    let mut config = load_config(&root)
        .await
        .wrap_err_with(|| format!("Failed to load config from {}", root.display()))?;
    apply_env_overrides(&mut config);
    if let Some(url) = cli.api_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }
    tracing::debug!(api = %config.api_base_url, "configuration loaded");

    match cli.command {
        Commands::Run {
            workspace,
            skill,
            agent,
            model,
            prompt,
        } => {
            let mut request = dcc_protocol::CreateSessionRequest::new(workspace, prompt);
            request.skill = skill;
            request.agent = agent;
            request.model = model;
            commands::run::run_command(&config, request).await?;
        }
        Commands::Pipeline { command } => match command {
            PipelineCommands::Show { pipeline_id } => {
                commands::pipeline::show_command(&config, &pipeline_id).await?;
            }
            PipelineCommands::Run {
                pipeline_id,
                max_parallel,
            } => {
                commands::pipeline::run_command(&config, &pipeline_id, max_parallel).await?;
            }
            PipelineCommands::Agents => {
                commands::pipeline::agents_command(&config).await?;
            }
        },
        Commands::Replay { session_id } => {
            commands::replay::replay_command(&config, &session_id).await?;
        }
    }

    Ok(())
}
