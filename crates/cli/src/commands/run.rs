//! `dcc run`

use crate::render;
use colored::Colorize;
use color_eyre::eyre::{eyre, Result};
use dcc_core::config::ClientConfig;
use dcc_core::session::SessionRun;
use dcc_core::Workbench;
use dcc_protocol::CreateSessionRequest;
use std::io::Write;

enum Next {
    Message,
    Closed,
    Interrupted,
}

pub async fn run_command(config: &ClientConfig, request: CreateSessionRequest) -> Result<()> {
    let mut workbench = Workbench::connect(config);
    let session_id = workbench
        .tabs
        .ensure_tab()
        .session
        .start(request)
        .await?;
    eprintln!("{} {}", "Started run".dimmed(), session_id.cyan());

    let mut printed_chunks = 0;
    let mut printed_tools = 0;
    loop {
        let next = tokio::select! {
            dispatched = workbench.pump() => match dispatched {
                Some(_) => Next::Message,
                None => Next::Closed,
            },
            _ = tokio::signal::ctrl_c() => Next::Interrupted,
        };

        let session = active_session(&mut workbench)?;
        match next {
            Next::Message => {}
            Next::Closed => break,
            Next::Interrupted => {
                session.cancel();
                eprintln!();
                eprintln!("{}", "Run cancelled".yellow());
                break;
            }
        }

        let state = session.state();
        let mut stdout = std::io::stdout().lock();
        for chunk in &state.output_chunks[printed_chunks..] {
            write!(stdout, "{chunk}")?;
        }
        printed_chunks = state.output_chunks.len();
        for call in &state.tool_calls[printed_tools..] {
            writeln!(stdout)?;
            writeln!(stdout, "{} {}", "→".dimmed(), call.name.bold())?;
        }
        printed_tools = state.tool_calls.len();
        stdout.flush()?;

        if !state.is_running() {
            break;
        }
    }

    let session = active_session(&mut workbench)?;
    println!();
    println!("{}", "Tasks".bold().underline());
    render::print_task_tree(&session.monitor().build_tree());
    render::print_run_summary(session.state());
    Ok(())
}

fn active_session(workbench: &mut Workbench) -> Result<&mut SessionRun> {
    workbench
        .tabs
        .active_session_mut()
        .ok_or_else(|| eyre!("No active tab"))
}
