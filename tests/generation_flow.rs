//! End-to-end orchestrator properties, driven through the sim provider
//!
//! The sim provider echoes the final user turn back in small chunks, so
//! these tests observe both the event stream and the exact outbound
//! message content without any network.

#![cfg(feature = "sim-provider")]

use aicoder::config::ProviderConfig;
use aicoder::core::{ConversationHistory, GenerationRequest, Orchestrator, RequestId};
use aicoder::llm::Role;
use aicoder::panel::{PanelBridge, PanelEvent};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;

fn sim_config() -> ProviderConfig {
    ProviderConfig {
        provider: "sim".to_string(),
        api_key: None,
        model: "sim-echo".to_string(),
        max_tokens: 256,
    }
}

fn drain(rx: &mut UnboundedReceiver<PanelEvent>) -> Vec<PanelEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn events_for(events: &[PanelEvent], id: RequestId) -> Vec<&PanelEvent> {
    events
        .iter()
        .filter(|e| match e {
            PanelEvent::ResponseStarted { id: eid, .. }
            | PanelEvent::ResponseDelta { id: eid, .. }
            | PanelEvent::ResponseFinalized { id: eid, .. } => *eid == id,
            _ => false,
        })
        .collect()
}

fn temp_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    path
}

#[tokio::test]
async fn start_precedes_every_delta_and_deltas_concat_to_finalize() {
    let (bridge, mut rx) = PanelBridge::channel();
    let orchestrator = Orchestrator::new(bridge);

    let outcome = orchestrator
        .generate(
            GenerationRequest::new("stream this back to me please"),
            sim_config(),
        )
        .await
        .unwrap();

    let events = drain(&mut rx);
    let own = events_for(&events, outcome.request_id);
    assert!(own.len() >= 3, "expected start, deltas, finalize");

    assert!(matches!(own[0], PanelEvent::ResponseStarted { .. }));
    assert!(matches!(own.last().unwrap(), PanelEvent::ResponseFinalized { .. }));

    let mut concat = String::new();
    let mut starts = 0;
    for event in &own {
        match event {
            PanelEvent::ResponseStarted { prompt, .. } => {
                starts += 1;
                assert_eq!(prompt, "stream this back to me please");
                assert!(concat.is_empty(), "Start must precede every delta");
            }
            PanelEvent::ResponseDelta { text, .. } => {
                assert!(!text.is_empty(), "empty deltas are filtered");
                concat.push_str(text);
            }
            PanelEvent::ResponseFinalized { text, .. } => {
                assert_eq!(&concat, text, "deltas must concatenate to the final text");
            }
            _ => {}
        }
    }
    assert_eq!(starts, 1, "exactly one Start per request");
    assert_eq!(outcome.response, concat);
}

#[tokio::test]
async fn history_grows_two_per_exchange_and_alternates() {
    let (bridge, _rx) = PanelBridge::channel();
    let history = Arc::new(Mutex::new(ConversationHistory::new()));
    let orchestrator = Orchestrator::with_history(bridge, history.clone());

    for i in 0..3 {
        orchestrator
            .generate(
                GenerationRequest::new(format!("question {i}")).with_history(true),
                sim_config(),
            )
            .await
            .unwrap();
    }

    let history = history.lock().await;
    assert_eq!(history.len(), 6);
    for (i, entry) in history.entries().iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        assert_eq!(entry.message.role, expected);
    }
    // Recorded user turns carry the bare prompt
    assert_eq!(history.entries()[0].message.content, "question 0");
    assert_eq!(history.entries()[4].message.content, "question 2");
}

#[tokio::test]
async fn file_blocks_are_appended_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = temp_file(&dir, "a.txt", "X");
    let b = temp_file(&dir, "b.txt", "Y");

    let (bridge, _rx) = PanelBridge::channel();
    let orchestrator = Orchestrator::new(bridge);

    let outcome = orchestrator
        .generate(
            GenerationRequest::new("summarize these").with_files(vec![a.clone(), b.clone()]),
            sim_config(),
        )
        .await
        .unwrap();

    // The sim provider echoes the outbound user turn, so the response
    // exposes exactly what the provider was sent.
    let block_a = format!("File: {}\n\nX\n\n", a.display());
    let block_b = format!("File: {}\n\nY\n\n", b.display());
    assert!(outcome.response.contains("Here are the contents of the files:"));
    assert!(outcome.response.ends_with(&format!("{block_a}\n{block_b}")));

    let idx_a = outcome.response.find(&block_a).unwrap();
    let idx_b = outcome.response.find(&block_b).unwrap();
    assert!(idx_a < idx_b, "blocks must follow input-list order");

    // The recorded turn stays the bare prompt, without file contents
    let history = orchestrator.history();
    let history = history.lock().await;
    assert_eq!(history.entries()[0].message.content, "summarize these");
}

#[tokio::test]
async fn unreadable_file_aborts_whole_request() {
    let dir = tempfile::tempdir().unwrap();
    let good = temp_file(&dir, "ok.txt", "fine");
    let missing = dir.path().join("missing.txt");

    let (bridge, mut rx) = PanelBridge::channel();
    let orchestrator = Orchestrator::new(bridge);

    let result = orchestrator
        .generate(
            GenerationRequest::new("use files").with_files(vec![good, missing]),
            sim_config(),
        )
        .await;
    assert!(result.is_err());

    // Container announced, then nothing: no deltas, no finalize
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], PanelEvent::ResponseStarted { .. }));
    assert!(orchestrator.history().lock().await.is_empty());
}

#[tokio::test]
async fn overlapping_requests_do_not_cross_contaminate() {
    let (bridge, mut rx) = PanelBridge::channel();
    let history = Arc::new(Mutex::new(ConversationHistory::new()));
    let orchestrator = Orchestrator::with_history(bridge, history.clone());

    let (first, second) = tokio::join!(
        orchestrator.generate(GenerationRequest::new("alpha alpha alpha"), sim_config()),
        orchestrator.generate(GenerationRequest::new("omega omega omega"), sim_config()),
    );
    let first = first.unwrap();
    let second = second.unwrap();
    assert_ne!(first.request_id, second.request_id);

    assert_eq!(first.response, "echo: alpha alpha alpha");
    assert_eq!(second.response, "echo: omega omega omega");

    let events = drain(&mut rx);
    for outcome in [&first, &second] {
        let own = events_for(&events, outcome.request_id);
        assert!(matches!(own[0], PanelEvent::ResponseStarted { .. }));

        let mut concat = String::new();
        for event in &own {
            if let PanelEvent::ResponseDelta { text, .. } = event {
                concat.push_str(text);
            }
        }
        assert_eq!(concat, outcome.response);

        match own.last().unwrap() {
            PanelEvent::ResponseFinalized { text, .. } => assert_eq!(text, &outcome.response),
            other => panic!("expected Finalized last, got {other:?}"),
        }
    }

    // Both exchanges were recorded; append order is finalize order, so
    // only the pairing (user immediately followed by its assistant turn)
    // is guaranteed.
    let history = history.lock().await;
    assert_eq!(history.len(), 4);
    for pair in history.entries().chunks(2) {
        assert_eq!(pair[0].message.role, Role::User);
        assert_eq!(pair[1].message.role, Role::Assistant);
        assert_eq!(
            pair[1].message.content,
            format!("echo: {}", pair[0].message.content)
        );
    }
}

#[tokio::test]
async fn blank_prompt_and_missing_key_leave_no_trace() {
    let (bridge, mut rx) = PanelBridge::channel();
    let orchestrator = Orchestrator::new(bridge);

    let blank = orchestrator
        .generate(GenerationRequest::new("   "), sim_config())
        .await;
    assert!(blank.is_err());

    let keyless = orchestrator
        .generate(
            GenerationRequest::new("real prompt"),
            ProviderConfig {
                provider: "openai".to_string(),
                api_key: None,
                model: "gpt-4o".to_string(),
                max_tokens: 256,
            },
        )
        .await;
    assert!(keyless.is_err());

    assert!(drain(&mut rx).is_empty());
    assert!(orchestrator.history().lock().await.is_empty());
}

#[tokio::test]
async fn abandoned_listener_does_not_fail_the_exchange() {
    let (bridge, rx) = PanelBridge::channel();
    let orchestrator = Orchestrator::new(bridge);
    drop(rx);

    // Closing the panel mid-stream abandons delivery, not the request
    let outcome = orchestrator
        .generate(GenerationRequest::new("nobody watching"), sim_config())
        .await
        .unwrap();
    assert_eq!(outcome.response, "echo: nobody watching");
    assert_eq!(orchestrator.history().lock().await.len(), 2);
}

#[tokio::test]
async fn document_artifact_uses_the_exact_layout() {
    let (bridge, _rx) = PanelBridge::channel();
    let orchestrator = Orchestrator::new(bridge);

    let outcome = orchestrator
        .generate(GenerationRequest::new("hi"), sim_config())
        .await
        .unwrap();

    assert_eq!(
        outcome.document(),
        "PROMPT\n======\nhi\n\nMODEL\n=====\nsim-echo\n\n\nRESPONSE\n========\n\necho: hi"
    );
}
