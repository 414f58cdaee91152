//! Integration tests for the control-port session
//!
//! Run against an in-process mock daemon speaking the control wire contract;
//! no running Tor is required.

mod common;

use common::{spawn_daemon, test_config, DaemonScript};
use std::time::Duration;
use torcycle::config::TorConfig;
use torcycle::control::ControlSession;
use torcycle::error::ControlError;

#[tokio::test]
async fn test_connect_is_idempotent() {
    let daemon = spawn_daemon(DaemonScript::default()).await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    session.connect().await.unwrap();
    session.connect().await.unwrap();
    assert!(session.is_connected());

    session.disconnect();
    session.disconnect();
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_connect_failure_leaves_session_disconnected() {
    let mut config = torcycle::config::Config::default();
    config.tor.control_port = 1; // nothing listens here

    let mut session = ControlSession::new(&config.tor);
    let err = session.connect().await.unwrap_err();
    assert!(matches!(err, ControlError::Connect { .. }));
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_send_command_before_connect_attempts_no_io() {
    let daemon = spawn_daemon(DaemonScript::default()).await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    let err = session.send_command("GETINFO version").await.unwrap_err();
    assert!(matches!(err, ControlError::NotConnected));
    assert!(daemon.received().is_empty());
}

#[tokio::test]
async fn test_authenticate_promotes_state() {
    let daemon = spawn_daemon(DaemonScript::default()).await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    session.connect().await.unwrap();
    assert!(!session.is_authenticated());

    session.authenticate().await.unwrap();
    assert!(session.is_authenticated());

    let received = daemon.received();
    assert_eq!(received, vec!["AUTHENTICATE \"hunter2\"".to_string()]);
}

#[tokio::test]
async fn test_authenticate_rejected_carries_reply_text() {
    let daemon = spawn_daemon(DaemonScript {
        auth_reply: "515 Bad authentication",
        ..DaemonScript::default()
    })
    .await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    session.connect().await.unwrap();

    let err = session.authenticate().await.unwrap_err();
    match &err {
        ControlError::AuthenticationFailed(text) => {
            assert_eq!(text, "515 Bad authentication");
        },
        other => panic!("expected AuthenticationFailed, got {:?}", other),
    }
    assert!(err.to_string().contains("Authentication failed"));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_privileged_command_requires_authentication() {
    let daemon = spawn_daemon(DaemonScript::default()).await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    session.connect().await.unwrap();

    let err = session.signal_newnym().await.unwrap_err();
    assert!(matches!(err, ControlError::NotAuthenticated));
    assert!(daemon.received().is_empty());
}

#[tokio::test]
async fn test_newnym_acknowledged() {
    let daemon = spawn_daemon(DaemonScript::default()).await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    session.connect().await.unwrap();
    session.authenticate().await.unwrap();
    session.signal_newnym().await.unwrap();

    let received = daemon.received();
    assert_eq!(received.last().map(String::as_str), Some("SIGNAL NEWNYM"));
}

#[tokio::test]
async fn test_newnym_rejection_carries_raw_reply() {
    let daemon = spawn_daemon(DaemonScript {
        newnym_reply: "552 Unrecognized command",
        ..DaemonScript::default()
    })
    .await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    session.connect().await.unwrap();
    session.authenticate().await.unwrap();

    let err = session.signal_newnym().await.unwrap_err();
    assert!(err.to_string().contains("552 Unrecognized command"));
}

#[tokio::test]
async fn test_multiline_reply_reassembled() {
    let daemon = spawn_daemon(DaemonScript::default()).await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    session.connect().await.unwrap();

    let reply = session.send_command("GETINFO version").await.unwrap();
    assert_eq!(reply.status, 250);
    assert_eq!(reply.lines, vec!["version=0.4.8.9".to_string(), "OK".to_string()]);
}

#[tokio::test]
async fn test_data_block_reply_reassembled() {
    let daemon = spawn_daemon(DaemonScript::default()).await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    session.connect().await.unwrap();

    let reply = session.send_command("GETINFO config-text").await.unwrap();
    assert_eq!(reply.status, 250);
    assert!(reply.lines.contains(&"SocksPort 9050".to_string()));
    assert!(reply.lines.contains(&"ControlPort 9051".to_string()));
    // The "." terminator is consumed, not part of the payload
    assert!(!reply.lines.contains(&".".to_string()));
}

#[tokio::test]
async fn test_wait_for_circuit_built() {
    let daemon = spawn_daemon(DaemonScript::default()).await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    session.connect().await.unwrap();
    session.authenticate().await.unwrap();

    let event = session
        .wait_for_circuit_built(Duration::from_secs(5), 3)
        .await
        .unwrap();
    assert_eq!(event.circuit_id, "7");
    assert!(event.is_built());

    // Subscribe and unsubscribe both went over the wire
    let received = daemon.received();
    assert!(received.contains(&"SETEVENTS CIRC".to_string()));
    assert_eq!(received.last().map(String::as_str), Some("SETEVENTS"));
}

#[tokio::test]
async fn test_wait_for_circuit_built_requires_authentication() {
    let daemon = spawn_daemon(DaemonScript::default()).await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    session.connect().await.unwrap();

    let err = session
        .wait_for_circuit_built(Duration::from_secs(1), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ControlError::NotAuthenticated));
}

#[tokio::test]
async fn test_wait_for_circuit_built_times_out() {
    let daemon = spawn_daemon(DaemonScript {
        emit_built: false,
        ..DaemonScript::default()
    })
    .await;
    let config = test_config(daemon.addr);

    let mut session = ControlSession::new(&config.tor);
    session.connect().await.unwrap();
    session.authenticate().await.unwrap();

    let err = session
        .wait_for_circuit_built(Duration::from_secs(1), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ControlError::CircuitBuildTimeout(1)));
}

#[tokio::test]
async fn test_session_default_config_shape() {
    // Defaults match the daemon's stock ports
    let config = TorConfig::default();
    assert_eq!(config.control_addr(), "127.0.0.1:9051");
    assert_eq!(config.socks_url(), "socks5h://127.0.0.1:9050");
}
