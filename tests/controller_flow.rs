//! End-to-end flow against a fake camera on localhost

use elecam_control::camera_controller::{
    messages, CameraController, CommandAction, CommandOutcome, ControllerEvent,
};
use elecam_control::command_client::{CommandDispatcher, CommandResult, HttpCommandTransport};
use elecam_control::settings_store::{CameraSettings, FileSettingsStore, SettingsStore};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_stream::StreamExt;

/// Answers every request; `cmd=2001` gets a 500, everything else a 200
async fn spawn_fake_camera() -> (u16, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let log = seen.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let log = log.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let line = request.lines().next().unwrap_or_default().to_string();
                let status = if line.contains("cmd=2001") {
                    "500 Internal Server Error"
                } else {
                    "200 OK"
                };
                log.lock().unwrap().push(line);
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    status
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (port, seen)
}

#[tokio::test]
async fn test_full_camera_session() {
    let (port, seen) = spawn_fake_camera().await;
    let dir = tempdir().unwrap();
    let store = Arc::new(FileSettingsStore::open(dir.path().join("camera_settings.json")).await);
    let transport =
        Arc::new(HttpCommandTransport::with_timeout(Duration::from_secs(2)).unwrap());
    let controller = CameraController::new(store.clone(), CommandDispatcher::new(transport));
    let mut events = controller.event_stream();
    controller.start();

    // unconfigured: prompt once, commands need settings
    assert_eq!(
        events.next().await.unwrap().unwrap(),
        ControllerEvent::RequestSettings(None)
    );
    assert_eq!(controller.take_photo().await, CommandOutcome::SettingsRequired);
    assert_eq!(
        events.next().await.unwrap().unwrap(),
        ControllerEvent::RequestSettings(Some(messages::SETTINGS_MISSING.to_string()))
    );

    // configure through the controller; state follows the store
    let settings = CameraSettings::new("http://127.0.0.1:8192", "127.0.0.1", port).unwrap();
    controller
        .update_camera_settings(settings.clone())
        .await
        .unwrap();
    let mut state_rx = controller.subscribe_state();
    state_rx
        .wait_for(|s| s.settings.as_ref() == Some(&settings))
        .await
        .unwrap();

    assert!(controller.take_photo().await.is_success());
    assert_eq!(
        events.next().await.unwrap().unwrap(),
        ControllerEvent::CommandCompleted {
            action: CommandAction::TakePhoto,
            result: CommandResult::success_with_message(messages::PHOTO_SUCCESS),
        }
    );

    assert!(controller.set_record_mode(true).await.is_success());
    assert_eq!(controller.state().is_record_mode, Some(true));

    let outcome = controller.start_recording().await;
    assert_eq!(
        outcome,
        CommandOutcome::Completed(CommandResult::failure("HTTP 500: Internal Server Error"))
    );
    assert_eq!(controller.state().is_record_mode, Some(true));

    let result = controller.test_camera_connection(settings.clone()).await;
    assert_eq!(
        result,
        CommandResult::success_with_message(messages::TEST_CONNECTION_SUCCESS)
    );

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "GET /?custom=1&cmd=1001&par=0 HTTP/1.1".to_string(),
            "GET /?custom=1&cmd=3001&par=1 HTTP/1.1".to_string(),
            "GET /?custom=1&cmd=2001&par=1 HTTP/1.1".to_string(),
            "GET /?custom=1&cmd=3010&par=0 HTTP/1.1".to_string(),
        ]
    );
    assert_eq!(store.current(), Some(settings));
}

#[tokio::test]
async fn test_unreachable_camera_reports_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let store = Arc::new(elecam_control::settings_store::MemorySettingsStore::default());
    store
        .write(CameraSettings::new("http://127.0.0.1:8192", "127.0.0.1", port).unwrap())
        .await
        .unwrap();
    let transport =
        Arc::new(HttpCommandTransport::with_timeout(Duration::from_secs(1)).unwrap());
    let controller = CameraController::new(store, CommandDispatcher::new(transport));
    controller.start();

    match controller.stop_recording().await {
        CommandOutcome::Completed(result) => {
            assert!(!result.success);
            assert!(result.message.is_some_and(|m| !m.is_empty()));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!controller.state().is_executing_command);
}
