//! Session against a mock tokenizer over real HTTP

use std::time::Duration;

use serde_json::json;

use lexlens_pipeline::{MarkerSink, PipelineOutcome};
use lexlens_types::{Revision, Severity};

use crate::common::{
    CHANNEL, error_record, mount_reply, mount_reply_for, mount_status, next_outcome,
    request_count, requested_code, session_for, start_tokenizer_mock,
};

#[tokio::test]
async fn test_error_record_becomes_one_based_marker() {
    let server = start_tokenizer_mock().await;
    mount_reply(&server, json!([error_record(0, 5, "expected ;")])).await;
    let mut session = session_for(&server.uri());

    session.on_edit("int x = 5");
    let outcome = next_outcome(&mut session).await;

    assert!(matches!(outcome, PipelineOutcome::Applied { count: 1, .. }));
    let markers = session.sink().markers(CHANNEL);
    assert_eq!(markers.len(), 1);
    let marker = &markers[0];
    assert_eq!((marker.start_line, marker.start_column), (1, 6));
    assert_eq!((marker.end_line, marker.end_column), (1, 6));
    assert_eq!(marker.severity, Severity::Error);
    assert_eq!(marker.message, "expected ;");
    assert_eq!(session.status_string(), "E:1 W:0");
}

#[tokio::test]
async fn test_burst_of_edits_sends_one_request() {
    let server = start_tokenizer_mock().await;
    mount_reply(&server, json!("No errors found.")).await;
    let mut session = session_for(&server.uri());

    session.on_edit("i");
    session.on_edit("in");
    session.on_edit("int");
    session.on_edit("int x;");
    let outcome = next_outcome(&mut session).await;

    assert_eq!(outcome.revision(), Revision::new(4));
    assert_eq!(requested_code(&server).await, vec!["int x;".to_string()]);

    // Nothing else is armed once the burst has been analyzed.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_sentinel_reply_clears_previous_markers() {
    let server = start_tokenizer_mock().await;
    mount_reply_for(
        &server,
        "int x = 5",
        json!([error_record(0, 5, "expected ;")]),
        Duration::ZERO,
    )
    .await;
    mount_reply_for(
        &server,
        "int x = 5;",
        json!([{ "message": "No errors found." }]),
        Duration::ZERO,
    )
    .await;
    let mut session = session_for(&server.uri());

    session.on_edit("int x = 5");
    session.analyze_now();
    next_outcome(&mut session).await;
    assert_eq!(session.sink().markers(CHANNEL).len(), 1);

    session.on_edit("int x = 5;");
    session.analyze_now();
    let outcome = next_outcome(&mut session).await;
    assert!(matches!(outcome, PipelineOutcome::Applied { count: 0, .. }));
    assert!(session.sink().markers(CHANNEL).is_empty());
    assert_eq!(session.status_string(), "");
}

#[tokio::test]
async fn test_out_of_order_reply_is_discarded() {
    let server = start_tokenizer_mock().await;
    mount_reply_for(
        &server,
        "slow",
        json!([error_record(0, 0, "from slow")]),
        Duration::from_millis(300),
    )
    .await;
    mount_reply_for(
        &server,
        "fast",
        json!([error_record(0, 0, "from fast")]),
        Duration::ZERO,
    )
    .await;
    let mut session = session_for(&server.uri());

    session.on_edit("slow");
    session.analyze_now();
    session.on_edit("fast");
    session.analyze_now();

    let first = next_outcome(&mut session).await;
    assert!(matches!(first, PipelineOutcome::Applied { .. }));
    let second = next_outcome(&mut session).await;
    assert!(matches!(
        second,
        PipelineOutcome::Stale { revision, current }
            if revision == Revision::new(1) && current == Revision::new(2)
    ));

    let markers = session.sink().markers(CHANNEL);
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].message, "from fast");
    assert_eq!(session.applied_revision(), Some(Revision::new(2)));
}

#[tokio::test]
async fn test_service_error_keeps_installed_markers() {
    let good = start_tokenizer_mock().await;
    mount_reply(&good, json!([error_record(2, 1, "unexpected token")])).await;
    let mut session = session_for(&good.uri());
    session.on_edit("a\nb\nc ?");
    session.analyze_now();
    next_outcome(&mut session).await;

    // The service starts failing; what is on screen stays.
    good.reset().await;
    mount_status(&good, 500).await;
    session.on_edit("a\nb\nc ?!");
    session.analyze_now();
    let outcome = next_outcome(&mut session).await;

    match outcome {
        PipelineOutcome::Failed { error, .. } => assert!(error.is_transport()),
        other => panic!("expected Failed, got {other:?}"),
    }
    let markers = session.sink().markers(CHANNEL);
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].start_line, 3);
    assert_eq!(markers[0].message, "unexpected token");
}

#[tokio::test]
async fn test_unreachable_service_keeps_markers_and_session_recovers() {
    // Port 9 (discard) is not expected to be listening.
    let mut session = session_for("http://127.0.0.1:9");
    session.on_edit("int x");
    session.analyze_now();

    let outcome = next_outcome(&mut session).await;
    assert!(matches!(outcome, PipelineOutcome::Failed { .. }));
    assert!(session.sink().markers(CHANNEL).is_empty());
    assert_eq!(session.sink().installs(), 0);

    // Later edits still debounce and analyze normally.
    session.on_edit("int x;");
    assert!(session.is_debouncing());
}

#[tokio::test]
async fn test_dispose_clears_channel_and_stops_timer() {
    let server = start_tokenizer_mock().await;
    mount_reply(&server, json!([error_record(0, 0, "bad")])).await;
    let mut session = session_for(&server.uri());

    session.on_edit("?");
    next_outcome(&mut session).await;
    assert_eq!(request_count(&server).await, 1);

    session.on_edit("??");
    let mut layer = session.dispose();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(request_count(&server).await, 1);
    assert!(layer.markers(CHANNEL).is_empty());

    // The layer is handed back usable for other channels.
    layer.set_markers("other", Vec::new());
    assert_eq!(layer.installs(), 3);
}
