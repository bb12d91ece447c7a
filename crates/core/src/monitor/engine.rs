//! Task monitor engine.
//!
//! Reconstructs a run's call tree from its flat event stream. Events only
//! correlate Start/Result/End by `tool_call_id`; nesting is inferred from
//! which delegation calls are open when a new call starts. Open delegations
//! are kept on a LIFO stack: the top is the parent of any call that starts
//! now, and the stack size is its depth.

use crate::api::DccApi;
use crate::config::MonitorConfig;
use crate::monitor::describe::{describe, truncate_chars};
use crate::monitor::tree::{build_tree, TaskNode};
use dcc_protocol::{MonitorTask, MonitorTaskStatus, RunEvent, RunEventKind};
use std::collections::HashMap;
use std::time::Instant;

/// Task counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskMonitor {
    config: MonitorConfig,
    /// Append-only registry in start order.
    tasks: Vec<MonitorTask>,
    /// Local task id -> position in `tasks`.
    positions: HashMap<String, usize>,
    /// `tool_call_id` -> local task id.
    by_call: HashMap<String, String>,
    /// Open delegation tasks, innermost last.
    stack: Vec<String>,
    /// Monotonic start marks of tasks still running.
    started: HashMap<String, Instant>,
    counter: u64,
    selected: Option<String>,
}

impl Default for TaskMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

impl TaskMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            tasks: Vec::new(),
            positions: HashMap::new(),
            by_call: HashMap::new(),
            stack: Vec::new(),
            started: HashMap::new(),
            counter: 0,
            selected: None,
        }
    }

    /// Apply one run event. Only tool call events change the monitor.
    pub fn process_event(&mut self, event: &RunEvent) {
        match &event.kind {
            RunEventKind::ToolCallStart {
                tool_call_id: Some(call_id),
                tool_name: Some(tool_name),
                tool_input,
            } => self.start(&event.session_id, call_id, tool_name, tool_input.as_deref()),
            RunEventKind::ToolCallResult {
                tool_call_id: Some(call_id),
                tool_result,
                tool_is_error,
            } => {
                let status = if tool_is_error.unwrap_or(false) {
                    MonitorTaskStatus::Failed
                } else {
                    MonitorTaskStatus::Completed
                };
                let output = tool_result
                    .as_deref()
                    .map(|r| truncate_chars(r, self.config.summary_max_chars));
                self.finish(call_id, status, output);
            }
            RunEventKind::ToolCallEnd {
                tool_call_id: Some(call_id),
            } => self.finish(call_id, MonitorTaskStatus::Completed, None),
            _ => {}
        }
    }

    fn start(&mut self, session_id: &str, call_id: &str, tool_name: &str, input: Option<&str>) {
        let parent_id = self.stack.last().cloned();
        let depth = self.stack.len();
        self.counter += 1;
        let id = format!("mt_{}", self.counter);
        let described = describe(tool_name, input, &self.config.delegation_tool);

        self.tasks.push(MonitorTask {
            id: id.clone(),
            session_id: Some(session_id.to_string()),
            tool_call_id: call_id.to_string(),
            tool_name: tool_name.to_string(),
            parent_id,
            depth,
            status: MonitorTaskStatus::Running,
            description: described.description,
            subagent_type: described.subagent_type,
            subagent_model: described.subagent_model,
            input_summary: input.map(|i| truncate_chars(i, self.config.summary_max_chars)),
            output_summary: None,
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: None,
            duration_ms: None,
        });
        self.positions.insert(id.clone(), self.tasks.len() - 1);
        self.by_call.insert(call_id.to_string(), id.clone());
        self.started.insert(id.clone(), Instant::now());

        if tool_name == self.config.delegation_tool {
            self.stack.push(id);
        }
    }

    /// Move the task correlated with `call_id` out of `running`.
    ///
    /// Orphan calls and tasks that are already terminal are left alone, so a
    /// trailing End after a Result changes nothing.
    fn finish(&mut self, call_id: &str, status: MonitorTaskStatus, output: Option<String>) {
        let Some(id) = self.by_call.get(call_id).cloned() else {
            tracing::debug!(tool_call_id = call_id, "no task for tool call");
            return;
        };
        let Some(&position) = self.positions.get(&id) else {
            return;
        };
        let task = &mut self.tasks[position];
        if task.status.is_terminal() {
            return;
        }

        task.status = status;
        if output.is_some() {
            task.output_summary = output;
        }
        task.finished_at = Some(chrono::Utc::now().to_rfc3339());
        task.duration_ms = self
            .started
            .remove(&id)
            .map(|mark| (mark.elapsed().as_secs_f64() * 1000.0).round() as u64);

        self.stack.retain(|open| open != &id);
    }

    /// Every task, in start order.
    pub fn tasks(&self) -> &[MonitorTask] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&MonitorTask> {
        self.positions.get(id).map(|&p| &self.tasks[p])
    }

    pub fn task_for_call(&self, tool_call_id: &str) -> Option<&MonitorTask> {
        self.by_call
            .get(tool_call_id)
            .and_then(|id| self.task(id))
    }

    /// Tasks started while no delegation was open.
    pub fn root_tasks(&self) -> Vec<&MonitorTask> {
        self.tasks.iter().filter(|t| t.parent_id.is_none()).collect()
    }

    pub fn counts(&self) -> TaskCounts {
        let mut counts = TaskCounts {
            total: self.tasks.len(),
            ..TaskCounts::default()
        };
        for task in &self.tasks {
            match task.status {
                MonitorTaskStatus::Running => counts.running += 1,
                MonitorTaskStatus::Completed => counts.completed += 1,
                MonitorTaskStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Current nesting depth, i.e. the number of open delegations.
    pub fn open_delegations(&self) -> &[String] {
        &self.stack
    }

    /// Derive the call tree from the registry as it is now.
    pub fn build_tree(&self) -> Vec<TaskNode> {
        build_tree(&self.tasks)
    }

    /// Select a task for detail display. Unknown ids clear the selection.
    pub fn select_task(&mut self, id: Option<&str>) {
        self.selected = id
            .filter(|id| self.positions.contains_key(*id))
            .map(str::to_string);
    }

    pub fn selected_task(&self) -> Option<&MonitorTask> {
        self.selected.as_deref().and_then(|id| self.task(id))
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Return to the freshly constructed state, keeping the configuration.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Fill the registry with the tasks recorded for a past run.
    ///
    /// Does nothing when live tasks are already present. A failed fetch
    /// leaves the monitor unchanged.
    ///
    /// # Returns
    ///
    /// `true` if historical tasks were adopted.
    pub async fn load_history(&mut self, api: &dyn DccApi, session_id: &str) -> bool {
        if !self.tasks.is_empty() {
            return false;
        }
        let tasks = match api.fetch_monitor_tasks(session_id).await {
            Ok(tasks) => tasks,
            Err(err) => {
                tracing::warn!(session_id, error = %err, "historical task load failed");
                return false;
            }
        };
        // Live events may have arrived while the fetch was in flight.
        if !self.tasks.is_empty() || tasks.is_empty() {
            return false;
        }
        self.adopt(tasks);
        true
    }

    fn adopt(&mut self, tasks: Vec<MonitorTask>) {
        self.counter = tasks
            .iter()
            .filter_map(|t| t.id.strip_prefix("mt_")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            .max(tasks.len() as u64);
        for (position, task) in tasks.iter().enumerate() {
            self.positions.insert(task.id.clone(), position);
            self.by_call.insert(task.tool_call_id.clone(), task.id.clone());
        }
        self.tasks = tasks;
    }
}
