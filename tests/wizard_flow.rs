//! End-to-end wizard flow tests.
//!
//! These drive the real protocol client against a scripted engine process
//! stand-in on an in-memory pipe: the full path from controller through the
//! subscription registry and progress model down to the wire and back.

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use shuttersort::engine::{Engine, EngineClient, EngineEvent};
use shuttersort::wizard::{ProcessingPhase, Step, StepController};

/// Connect a client to a scripted engine task. The script decides how each
/// operation is answered and which events follow it.
fn scripted_engine<F>(script: F) -> (EngineClient, tokio::sync::mpsc::UnboundedReceiver<EngineEvent>)
where
    F: Fn(&str) -> (Value, Vec<Value>) + Send + 'static,
{
    let (near, far) = tokio::io::duplex(64 * 1024);
    let (near_read, near_write) = tokio::io::split(near);
    let (client, connection) = EngineClient::connect(near_read, near_write);

    let (far_read, far_write) = tokio::io::split(far);
    tokio::spawn(async move {
        let mut lines_in = FramedRead::new(far_read, LinesCodec::new());
        let mut lines_out = FramedWrite::new(far_write, LinesCodec::new());
        while let Some(Ok(line)) = lines_in.next().await {
            let request: Value = serde_json::from_str(&line).unwrap();
            let op = request["op"].as_str().unwrap().to_string();
            let (result, events) = script(&op);
            let reply = json!({"id": request["id"], "result": result});
            if lines_out.send(reply.to_string()).await.is_err() {
                break;
            }
            for event in events {
                if lines_out.send(event.to_string()).await.is_err() {
                    break;
                }
            }
        }
    });

    (client, connection.events)
}

fn found_files(n: u64) -> Value {
    let files: serde_json::Map<String, Value> = (1..=n)
        .map(|i| {
            (
                i.to_string(),
                json!({"from": format!("/a/IMG_{i}.jpg"), "to": format!("/out/2023/04/IMG_{i}.jpg"), "relocated": false}),
            )
        })
        .collect();
    json!({"event": "finding-files", "files": files})
}

fn relocating_files(total: u64, done: u64) -> Value {
    let files: serde_json::Map<String, Value> = (1..=total)
        .map(|i| {
            (
                i.to_string(),
                json!({"from": format!("/a/IMG_{i}.jpg"), "to": format!("/out/2023/04/IMG_{i}.jpg"), "relocated": i <= done}),
            )
        })
        .collect();
    json!({"event": "relocating-files", "totalFiles": total, "totalRelocated": done, "files": files})
}

async fn pump<E: Engine>(
    events: &mut tokio::sync::mpsc::UnboundedReceiver<EngineEvent>,
    controller: &mut StepController<E>,
    count: usize,
) {
    for _ in 0..count {
        let event = events.recv().await.expect("engine event");
        controller.handle_event(&event);
    }
}

async fn configure_and_enter_processing<E: Engine>(controller: &mut StepController<E>) {
    controller.pick_start_directories().await;
    controller.pick_destination().await;
    assert!(controller.go_next().await, "directories gate should be open");

    controller.set_naming_convention("{year}/{month}/{parent}").await;
    for _ in 0..3 {
        assert!(controller.go_next().await);
    }
    assert_eq!(controller.step(), Step::Processing);
}

#[tokio::test]
async fn full_copy_run_with_verification() {
    let (client, mut events) = scripted_engine(|op| match op {
        "select-start-directories" => (json!(["/a"]), vec![]),
        "select-destination-directory" => (json!("/out"), vec![]),
        "process-run" => (
            json!({}),
            vec![found_files(3), json!({"event": "finding-complete"})],
        ),
        "verify-relocation" => (
            json!({}),
            vec![
                json!({"event": "relocating-start"}),
                relocating_files(1, 1),
                relocating_files(2, 2),
                relocating_files(3, 3),
                json!({"event": "relocating-complete"}),
            ],
        ),
        _ => (json!({}), vec![]),
    });

    let mut controller = StepController::new(client);
    configure_and_enter_processing(&mut controller).await;
    assert!(controller.run_started());
    assert!(!controller.can_proceed());

    // Scan: three records, then completion opens the gate.
    pump(&mut events, &mut controller, 2).await;
    assert_eq!(controller.progress().found_count(), 3);
    assert_eq!(controller.progress().phase(), ProcessingPhase::FindingComplete);
    assert!(controller.can_proceed());

    // Verification kicks off the relocation stream.
    assert!(controller.verify().await);
    pump(&mut events, &mut controller, 5).await;

    let progress = controller.progress();
    assert_eq!(progress.phase(), ProcessingPhase::RelocatingComplete);
    assert_eq!(progress.total_files(), 3);
    assert_eq!(progress.total_relocated(), 3);
    assert!(progress.files().iter().all(|f| f.relocated));
    assert!(controller.can_proceed());

    // Acknowledging completion resets the wizard to its initial state.
    controller.acknowledge_and_reset().await;
    assert_eq!(controller.step(), Step::Directories);
    assert!(controller.session().start_directories.is_empty());
    assert!(controller.session().destination_directory.is_empty());
    assert!(controller.session().naming_convention.is_empty());
    assert_eq!(controller.progress().phase(), ProcessingPhase::Idle);
    assert!(!controller.run_started());
}

#[tokio::test]
async fn relocated_totals_are_monotonic_across_deliveries() {
    let (client, mut events) = scripted_engine(|op| match op {
        "select-start-directories" => (json!(["/a"]), vec![]),
        "select-destination-directory" => (json!("/out"), vec![]),
        "process-run" => (
            json!({}),
            vec![
                found_files(3),
                json!({"event": "finding-complete"}),
                json!({"event": "relocating-start"}),
                relocating_files(3, 1),
                relocating_files(3, 2),
                relocating_files(3, 3),
                json!({"event": "relocating-complete"}),
            ],
        ),
        _ => (json!({}), vec![]),
    });

    let mut controller = StepController::new(client);
    controller.set_verify(false).await;
    configure_and_enter_processing(&mut controller).await;

    let mut last = 0;
    for _ in 0..7 {
        let event = events.recv().await.expect("engine event");
        controller.handle_event(&event);
        let current = controller.progress().total_relocated();
        assert!(current >= last, "totalRelocated regressed: {current} < {last}");
        last = current;
    }
    assert_eq!(last, 3);
    assert_eq!(controller.progress().phase(), ProcessingPhase::RelocatingComplete);
}

#[tokio::test]
async fn empty_scan_is_terminal_and_allows_backing_out() {
    let (client, mut events) = scripted_engine(|op| match op {
        "select-start-directories" => (json!(["/a"]), vec![]),
        "select-destination-directory" => (json!("/out"), vec![]),
        "process-run" => (json!({}), vec![json!({"event": "finding-complete"})]),
        _ => (json!({}), vec![]),
    });

    let mut controller = StepController::new(client);
    configure_and_enter_processing(&mut controller).await;

    pump(&mut events, &mut controller, 1).await;
    assert!(controller.progress().empty_result());
    assert!(!controller.can_proceed());

    // The empty result is terminal, so the user may go back and adjust
    // filters; the run latch resets for a fresh attempt.
    assert!(controller.go_previous());
    assert_eq!(controller.step(), Step::Organise);
    assert!(!controller.run_started());
}

#[tokio::test]
async fn navigation_away_is_refused_while_the_scan_runs() {
    let (client, mut events) = scripted_engine(|op| match op {
        "select-start-directories" => (json!(["/a"]), vec![]),
        "select-destination-directory" => (json!("/out"), vec![]),
        "process-run" => (json!({}), vec![found_files(2)]),
        _ => (json!({}), vec![]),
    });

    let mut controller = StepController::new(client);
    configure_and_enter_processing(&mut controller).await;

    pump(&mut events, &mut controller, 1).await;
    assert_eq!(controller.progress().found_count(), 2);
    assert!(!controller.progress().is_terminal());

    assert!(!controller.go_previous());
    assert_eq!(controller.step(), Step::Processing);
}

#[tokio::test]
async fn pipeline_error_reaches_the_progress_model() {
    let (client, mut events) = scripted_engine(|op| match op {
        "select-start-directories" => (json!(["/a"]), vec![]),
        "select-destination-directory" => (json!("/out"), vec![]),
        "process-run" => (
            json!({}),
            vec![
                found_files(1),
                json!({"event": "pipeline-error", "phase": "finding", "message": "permission denied"}),
            ],
        ),
        _ => (json!({}), vec![]),
    });

    let mut controller = StepController::new(client);
    configure_and_enter_processing(&mut controller).await;

    pump(&mut events, &mut controller, 2).await;
    let failure = controller.progress().failure().expect("failure surfaced");
    assert_eq!(failure.message, "permission denied");
    assert!(!controller.can_proceed());
    assert!(controller.progress().is_terminal());
}
