use dcc_protocol::*;

#[test]
fn test_run_event_serialization_omits_absent_fields() {
    let event = RunEvent::new(
        "s-1",
        RunEventKind::ToolCallResult {
            tool_call_id: Some("t1".to_string()),
            tool_result: Some("ok".to_string()),
            tool_is_error: None,
        },
    );

    let json = serde_json::to_value(&event).expect("Failed to serialize RunEvent");

    assert_eq!(json["type"], "ToolCallResult");
    assert_eq!(json["session_id"], "s-1");
    assert_eq!(json["tool_call_id"], "t1");
    assert!(json.get("tool_is_error").is_none());
    assert!(json.get("timestamp").is_none());

    let back: RunEvent = serde_json::from_value(json).expect("Failed to deserialize RunEvent");
    assert_eq!(back, event);
}

#[test]
fn test_run_finished_keeps_usage_flat() {
    let event = RunEvent::new(
        "s-1",
        RunEventKind::RunFinished(RunUsage {
            cost_usd: Some(0.25),
            input_tokens: Some(100),
            output_tokens: Some(20),
            num_turns: Some(3),
            ..RunUsage::default()
        }),
    );

    let json = serde_json::to_value(&event).expect("Failed to serialize RunEvent");
    assert_eq!(json["type"], "RunFinished");
    assert_eq!(json["input_tokens"], 100);
    assert_eq!(json["num_turns"], 3);
}

#[test]
fn test_state_snapshot_and_custom_payloads() {
    let snapshot: RunEvent = serde_json::from_str(
        r#"{"type":"StateSnapshot","session_id":"s","state":{"model":"opus","cwd":"/tmp"}}"#,
    )
    .expect("Failed to deserialize StateSnapshot");
    match snapshot.kind {
        RunEventKind::StateSnapshot { state: Some(state) } => {
            assert_eq!(state.get("model").and_then(|v| v.as_str()), Some("opus"));
        }
        other => panic!("unexpected variant: {other:?}"),
    }

    let custom: RunEvent = serde_json::from_str(
        r#"{"type":"Custom","session_id":"s","custom_type":"progress","data":{"pct":40}}"#,
    )
    .expect("Failed to deserialize Custom");
    assert_eq!(custom.event_type(), RunEventType::Custom);
}

#[test]
fn test_pipeline_step_event_round_trip() {
    let event = PipelineEvent {
        session_id: Some("run-9".to_string()),
        pipeline_id: Some("p1".to_string()),
        timestamp: None,
        kind: PipelineEventKind::PipelineStepFailed {
            step: StepRef {
                step_id: Some("st1".to_string()),
                step_name: Some("Build".to_string()),
                step_position: Some(0),
                step_agent: None,
            },
            error: Some("exit 1".to_string()),
        },
    };

    let json = serde_json::to_value(&event).expect("Failed to serialize PipelineEvent");
    assert_eq!(json["type"], "PipelineStepFailed");
    assert_eq!(json["step_id"], "st1");
    assert_eq!(json["error"], "exit 1");

    let back: PipelineEvent =
        serde_json::from_value(json).expect("Failed to deserialize PipelineEvent");
    assert_eq!(back, event);
}

#[test]
fn test_pipeline_detail_deserialization() {
    let json = r#"{
        "pipeline": {
            "id": "p1",
            "workspace_id": "w1",
            "name": "Release",
            "status": "ready",
            "total_cost": null,
            "created_at": "2025-03-01 10:00:00"
        },
        "steps": [
            {"id": "a", "position": 0, "name": "Plan", "status": "completed", "depends_on": []},
            {"id": "b", "position": 1, "name": "Build", "status": "pending", "depends_on": ["a"], "agent": "builder"}
        ]
    }"#;

    let detail: PipelineDetail =
        serde_json::from_str(json).expect("Failed to deserialize PipelineDetail");

    assert_eq!(detail.pipeline.status, PipelineStatus::Ready);
    assert_eq!(detail.pipeline.total_cost, None);
    assert_eq!(detail.steps.len(), 2);
    assert_eq!(detail.steps[1].depends_on, vec!["a".to_string()]);
    assert_eq!(detail.steps[1].agent.as_deref(), Some("builder"));
}

#[test]
fn test_stored_events_and_monitor_tasks() {
    let events: SessionEventsResponse = serde_json::from_str(
        r#"{"session": {"id": "s"}, "events": [
            {"id": 1, "session_id": "s", "seq": 0, "event_type": "RunStarted",
             "data": "{\"type\":\"RunStarted\",\"session_id\":\"s\"}", "created_at": "2025-03-01 10:00:00"}
        ]}"#,
    )
    .expect("Failed to deserialize SessionEventsResponse");
    assert_eq!(events.events.len(), 1);
    let decoded = RunEvent::decode(&events.events[0].event_type, &events.events[0].data)
        .expect("stored event should decode");
    assert_eq!(decoded.event_type(), RunEventType::RunStarted);

    let tasks: MonitorTasksResponse = serde_json::from_str(
        r#"{"tasks": [{
            "id": "mt_1", "tool_call_id": "t1", "tool_name": "Task", "parent_id": null,
            "depth": 0, "status": "completed", "description": "explore",
            "started_at": "2025-03-01T10:00:00Z", "duration_ms": 1500
        }]}"#,
    )
    .expect("Failed to deserialize MonitorTasksResponse");
    assert_eq!(tasks.tasks[0].status, MonitorTaskStatus::Completed);
    assert_eq!(tasks.tasks[0].input_summary, None);
}

#[test]
fn test_create_session_request_skips_unset_options() {
    let mut req = CreateSessionRequest::new("w1", "hello");
    req.model = Some("sonnet".to_string());

    let json = serde_json::to_value(&req).expect("Failed to serialize request");
    assert_eq!(json["prompt"], "hello");
    assert_eq!(json["model"], "sonnet");
    assert!(json.get("skill").is_none());
}
