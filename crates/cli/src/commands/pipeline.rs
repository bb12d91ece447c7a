//! `dcc pipeline ...`

use crate::render;
use colored::Colorize;
use color_eyre::eyre::{bail, Result};
use dcc_core::config::ClientConfig;
use dcc_core::Workbench;
use dcc_protocol::{PipelineStatus, StepStatus};
use std::collections::HashMap;

pub async fn show_command(config: &ClientConfig, pipeline_id: &str) -> Result<()> {
    let mut workbench = Workbench::connect(config);
    workbench.pipelines.load_pipeline(pipeline_id).await?;
    render::print_pipeline(workbench.pipelines.state());
    Ok(())
}

pub async fn agents_command(config: &ClientConfig) -> Result<()> {
    let mut workbench = Workbench::connect(config);
    let agents = workbench.pipelines.load_agents().await;
    if agents.is_empty() {
        println!("{}", "(no agents available)".dimmed());
    }
    for agent in agents {
        println!("{} {}", agent.name.bold(), agent.keywords.join(", ").dimmed());
    }
    Ok(())
}

pub async fn run_command(
    config: &ClientConfig,
    pipeline_id: &str,
    max_parallel: Option<u32>,
) -> Result<()> {
    if let Some(n) = max_parallel {
        if !(1..=10).contains(&n) {
            bail!("--max-parallel must be between 1 and 10, got {n}");
        }
    }
    let mut workbench = Workbench::connect(config);
    workbench.pipelines.load_pipeline(pipeline_id).await?;
    workbench.pipelines.execute(pipeline_id, max_parallel);
    println!("{} {}", "Executing".bold(), pipeline_id.cyan());

    let mut seen: HashMap<String, StepStatus> = workbench
        .pipelines
        .state()
        .steps
        .iter()
        .map(|s| (s.id.clone(), s.status))
        .collect();

    loop {
        let interrupted = tokio::select! {
            dispatched = workbench.pump() => {
                if dispatched.is_none() {
                    break;
                }
                false
            }
            _ = tokio::signal::ctrl_c() => true,
        };
        if interrupted {
            workbench.pipelines.cancel();
            println!("{}", "Pipeline cancelled".yellow());
            break;
        }

        let state = workbench.pipelines.state();
        for step in &state.steps {
            if seen.get(&step.id) != Some(&step.status) {
                seen.insert(step.id.clone(), step.status);
                println!(
                    "  {} {}",
                    render::step_status(step.status),
                    step.name
                );
                if step.status.is_terminal() {
                    render::print_progress(state);
                }
            }
        }
        if !state.executing {
            break;
        }
    }

    let state = workbench.pipelines.state();
    if let Some(error) = &state.error {
        println!("{} {}", "Error:".bold(), error.red());
    }
    match state.current.as_ref().map(|p| p.status) {
        Some(PipelineStatus::Completed) => println!("{}", "Pipeline completed".green().bold()),
        Some(status) => println!("{} {}", "Pipeline".bold(), status),
        None => {}
    }
    render::print_progress(state);
    Ok(())
}
