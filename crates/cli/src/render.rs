//! Terminal rendering of engine state.

use colored::{ColoredString, Colorize};
use dcc_core::monitor::TaskNode;
use dcc_core::pipeline::PipelineState;
use dcc_core::session::{RunState, RunStatus};
use dcc_protocol::{MonitorTaskStatus, StepStatus};

pub fn task_status(status: MonitorTaskStatus) -> ColoredString {
    match status {
        MonitorTaskStatus::Running => "running".yellow(),
        MonitorTaskStatus::Completed => "done".green(),
        MonitorTaskStatus::Failed => "failed".red(),
    }
}

pub fn step_status(status: StepStatus) -> ColoredString {
    match status {
        StepStatus::Pending => status.as_str().dimmed(),
        StepStatus::Running => status.as_str().yellow(),
        StepStatus::Completed => status.as_str().green(),
        StepStatus::Failed => status.as_str().red(),
        StepStatus::Skipped => status.as_str().cyan(),
    }
}

pub fn run_status(status: RunStatus) -> ColoredString {
    match status {
        RunStatus::Idle => status.as_str().dimmed(),
        RunStatus::Running => status.as_str().yellow(),
        RunStatus::Completed => status.as_str().green().bold(),
        RunStatus::Error => status.as_str().red().bold(),
    }
}

/// Print the call tree, two spaces per nesting level.
pub fn print_task_tree(roots: &[TaskNode]) {
    if roots.is_empty() {
        println!("{}", "(no tool calls)".dimmed());
        return;
    }
    for root in roots {
        print_node(root, 0);
    }
}

fn print_node(node: &TaskNode, level: usize) {
    let task = &node.task;
    let duration = task
        .duration_ms
        .map(|ms| format!(" {}", format!("{ms}ms").dimmed()))
        .unwrap_or_default();
    let agent = task
        .subagent_type
        .as_deref()
        .map(|t| format!(" [{}]", t.magenta()))
        .unwrap_or_default();
    println!(
        "{}{} {}{} {}{}",
        "  ".repeat(level),
        task.tool_name.bold(),
        task.description,
        agent,
        task_status(task.status),
        duration
    );
    for child in &node.children {
        print_node(child, level + 1);
    }
}

pub fn print_run_summary(state: &RunState) {
    println!();
    println!("{} {}", "Status:".bold(), run_status(state.status));
    if let Some(error) = &state.error {
        println!("{} {}", "Error:".bold(), error.red());
    }
    if let Some(model) = &state.model {
        println!("{} {}", "Model:".bold(), model);
    }
    if let Some(cost) = state.cost_usd {
        println!("{} ${cost:.4}", "Cost:".bold());
    }
    println!(
        "{} {} ({} in / {} out)",
        "Tokens:".bold(),
        state.total_tokens(),
        state.input_tokens.unwrap_or(0),
        state.output_tokens.unwrap_or(0)
    );
    if let Some(turns) = state.num_turns {
        println!("{} {}", "Turns:".bold(), turns);
    }
    if let Some(ms) = state.duration_ms {
        println!("{} {:.1}s", "Duration:".bold(), ms as f64 / 1000.0);
    }
    if state.dropped_events > 0 {
        println!(
            "{} {}",
            "Dropped events:".bold(),
            state.dropped_events.to_string().yellow()
        );
    }
}

pub fn print_pipeline(state: &PipelineState) {
    let Some(pipeline) = &state.current else {
        println!("{}", "(no pipeline loaded)".dimmed());
        return;
    };
    println!("{} {}", pipeline.name.bold(), format!("({})", pipeline.id).dimmed());
    println!("{} {}", "Status:".bold(), pipeline.status);
    if let Some(description) = &pipeline.description {
        println!("{description}");
    }
    println!();
    for step in &state.steps {
        let deps = if step.depends_on.is_empty() {
            String::new()
        } else {
            format!(" ← {}", step.depends_on.join(", ")).dimmed().to_string()
        };
        let agent = step
            .agent
            .as_deref()
            .map(|a| format!(" [{}]", a.magenta()))
            .unwrap_or_default();
        println!(
            "{:>3}. {} {}{}{}",
            step.position + 1,
            step_status(step.status),
            step.name,
            agent,
            deps
        );
    }
    println!();
    print_progress(state);
}

pub fn print_progress(state: &PipelineState) {
    println!(
        "{} {}/{} steps ({}%)",
        "Progress:".bold(),
        state.steps_completed,
        state.steps_total,
        state.progress()
    );
}
