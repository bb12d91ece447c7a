//! Custom assertion helpers for integration tests.

use dcc_core::monitor::TaskMonitor;
use dcc_protocol::{MonitorTask, MonitorTaskStatus};

/// Look up the task started by `tool_call_id`, failing the test if absent.
#[allow(dead_code)]
pub fn task_for<'a>(monitor: &'a TaskMonitor, tool_call_id: &str) -> &'a MonitorTask {
    monitor
        .task_for_call(tool_call_id)
        .unwrap_or_else(|| panic!("no task for tool call {tool_call_id}"))
}

/// Assert status and depth of the task started by `tool_call_id`.
#[allow(dead_code)]
pub fn assert_task(
    monitor: &TaskMonitor,
    tool_call_id: &str,
    status: MonitorTaskStatus,
    depth: usize,
) {
    let task = task_for(monitor, tool_call_id);
    assert_eq!(
        task.status, status,
        "unexpected status for {tool_call_id}: {task:?}"
    );
    assert_eq!(task.depth, depth, "unexpected depth for {tool_call_id}");
}

/// Assert that the task of `child_call` is nested directly under `parent_call`.
#[allow(dead_code)]
pub fn assert_parent(monitor: &TaskMonitor, child_call: &str, parent_call: &str) {
    let parent = task_for(monitor, parent_call);
    let child = task_for(monitor, child_call);
    assert_eq!(
        child.parent_id.as_deref(),
        Some(parent.id.as_str()),
        "{child_call} should be nested under {parent_call}"
    );
}
