//! Test fixtures for building events, pipelines and a wired workbench.

use dcc_core::api::MockApi;
use dcc_core::config::ClientConfig;
use dcc_core::stream::MockConnector;
use dcc_core::Workbench;
use dcc_protocol::{
    Pipeline, PipelineDetail, PipelineEvent, PipelineEventKind, PipelineStatus, PipelineStep,
    PipelineSummary, RunEvent, RunEventKind, RunUsage, StepRef,
};
use std::sync::Arc;

/// A workbench over a mock API and a mock connector.
pub struct TestBench {
    pub workbench: Workbench,
    pub api: Arc<MockApi>,
    pub connector: Arc<MockConnector>,
}

pub fn test_bench(api: MockApi) -> TestBench {
    let api = Arc::new(api);
    let connector = Arc::new(MockConnector::new());
    let workbench = Workbench::new(&ClientConfig::default(), api.clone(), connector.clone());
    TestBench {
        workbench,
        api,
        connector,
    }
}

/// Let spawned best-effort requests run to completion.
#[allow(dead_code)]
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[allow(dead_code)]
pub fn run_started(session_id: &str) -> RunEvent {
    RunEvent::new(
        session_id,
        RunEventKind::RunStarted {
            model: None,
            cli_session_id: None,
        },
    )
}

#[allow(dead_code)]
pub fn text(session_id: &str, text: &str) -> RunEvent {
    RunEvent::new(
        session_id,
        RunEventKind::TextMessageContent {
            message_id: None,
            text: Some(text.to_string()),
        },
    )
}

#[allow(dead_code)]
pub fn tool_start(session_id: &str, call_id: &str, tool: &str, input: &str) -> RunEvent {
    RunEvent::new(
        session_id,
        RunEventKind::ToolCallStart {
            tool_call_id: Some(call_id.to_string()),
            tool_name: Some(tool.to_string()),
            tool_input: Some(input.to_string()),
        },
    )
}

#[allow(dead_code)]
pub fn tool_result(session_id: &str, call_id: &str, result: &str, is_error: bool) -> RunEvent {
    RunEvent::new(
        session_id,
        RunEventKind::ToolCallResult {
            tool_call_id: Some(call_id.to_string()),
            tool_result: Some(result.to_string()),
            tool_is_error: Some(is_error),
        },
    )
}

#[allow(dead_code)]
pub fn tool_end(session_id: &str, call_id: &str) -> RunEvent {
    RunEvent::new(
        session_id,
        RunEventKind::ToolCallEnd {
            tool_call_id: Some(call_id.to_string()),
        },
    )
}

#[allow(dead_code)]
pub fn run_finished(session_id: &str, cost: f64, input: u64, output: u64) -> RunEvent {
    RunEvent::new(
        session_id,
        RunEventKind::RunFinished(RunUsage {
            cost_usd: Some(cost),
            input_tokens: Some(input),
            output_tokens: Some(output),
            ..RunUsage::default()
        }),
    )
}

#[allow(dead_code)]
pub fn run_error(session_id: &str, error: &str) -> RunEvent {
    RunEvent::new(
        session_id,
        RunEventKind::RunError {
            error: Some(error.to_string()),
            model: None,
            cost_usd: None,
        },
    )
}

/// A ready pipeline `p1` with `count` pending steps `s0..`.
#[allow(dead_code)]
pub fn pipeline_detail(count: u32) -> PipelineDetail {
    let mut pipeline = Pipeline::new("p1", "Release");
    pipeline.workspace_id = Some("w1".to_string());
    pipeline.status = PipelineStatus::Ready;
    let steps = (0..count)
        .map(|i| {
            let mut step = PipelineStep::new(format!("s{i}"), i, format!("Step {i}"));
            if i > 0 {
                step.depends_on = vec![format!("s{}", i - 1)];
            }
            step
        })
        .collect();
    PipelineDetail { pipeline, steps }
}

#[allow(dead_code)]
pub fn step_completed(pipeline_id: &str, step_id: &str) -> PipelineEvent {
    PipelineEvent::new(
        pipeline_id,
        PipelineEventKind::PipelineStepCompleted {
            step: StepRef::id(step_id),
            cost_usd: Some(0.01),
        },
    )
}

#[allow(dead_code)]
pub fn step_failed(pipeline_id: &str, step_id: &str) -> PipelineEvent {
    PipelineEvent::new(
        pipeline_id,
        PipelineEventKind::PipelineStepFailed {
            step: StepRef::id(step_id),
            error: Some("exit 1".to_string()),
        },
    )
}

#[allow(dead_code)]
pub fn pipeline_failed(pipeline_id: &str, summary: PipelineSummary) -> PipelineEvent {
    PipelineEvent::new(pipeline_id, PipelineEventKind::PipelineFailed(summary))
}
