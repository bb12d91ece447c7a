//! `dcc replay`

use crate::render;
use colored::Colorize;
use color_eyre::eyre::Result;
use dcc_core::config::ClientConfig;
use dcc_core::Workbench;

pub async fn replay_command(config: &ClientConfig, session_id: &str) -> Result<()> {
    let mut workbench = Workbench::connect(config);
    let session = &mut workbench.tabs.ensure_tab().session;

    let applied = session.replay(session_id).await?;
    if session.load_task_history().await {
        tracing::debug!(session_id, "task tree filled from recorded tasks");
    }
    eprintln!("{} {applied} events", "Replayed".dimmed());

    let output = session.full_output();
    if !output.is_empty() {
        println!("{output}");
    }
    println!();
    println!("{}", "Tasks".bold().underline());
    render::print_task_tree(&session.monitor().build_tree());
    render::print_run_summary(session.state());
    Ok(())
}
