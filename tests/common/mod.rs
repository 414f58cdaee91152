//! In-process mock Tor control daemon
//!
//! Speaks just enough of the control-port wire contract for the session and
//! rotation tests: CRLF lines, AUTHENTICATE / SIGNAL NEWNYM / SETEVENTS
//! replies, and asynchronous 650 CIRC notifications.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Scripted daemon behavior for one test
#[derive(Clone)]
pub struct DaemonScript {
    pub auth_reply: &'static str,
    pub newnym_reply: &'static str,
    /// Emit `650 CIRC ... BUILT` notifications after the SETEVENTS CIRC ack
    pub emit_built: bool,
}

impl Default for DaemonScript {
    fn default() -> Self {
        Self {
            auth_reply: "250 OK",
            newnym_reply: "250 OK",
            emit_built: true,
        }
    }
}

/// Handle on a spawned mock daemon
pub struct MockDaemon {
    pub addr: SocketAddr,
    commands: Arc<Mutex<Vec<String>>>,
}

impl MockDaemon {
    /// Commands received so far, CRLF stripped
    pub fn received(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

/// Bind a listener on an ephemeral port and serve control connections,
/// one at a time, until the test's runtime shuts down
pub async fn spawn_daemon(script: DaemonScript) -> MockDaemon {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let commands = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&commands);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => serve(stream, script.clone(), Arc::clone(&log)).await,
                Err(_) => return,
            }
        }
    });

    MockDaemon { addr, commands }
}

async fn serve(stream: TcpStream, script: DaemonScript, log: Arc<Mutex<Vec<String>>>) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {},
        }
        let command = line.trim_end_matches(['\r', '\n']).to_string();
        log.lock().unwrap().push(command.clone());

        let reply: String = if command.starts_with("AUTHENTICATE") {
            format!("{}\r\n", script.auth_reply)
        } else if command == "SIGNAL NEWNYM" {
            format!("{}\r\n", script.newnym_reply)
        } else if command == "SETEVENTS CIRC" {
            if script.emit_built {
                // Ack, then a not-yet-built notification, then the BUILT one
                "250 OK\r\n650 CIRC 7 EXTENDED $ABCD\r\n650 CIRC 7 BUILT $ABCD,$EF01\r\n"
                    .to_string()
            } else {
                "250 OK\r\n".to_string()
            }
        } else if command == "SETEVENTS" {
            "250 OK\r\n".to_string()
        } else if command == "GETINFO version" {
            "250-version=0.4.8.9\r\n250 OK\r\n".to_string()
        } else if command == "GETINFO config-text" {
            "250+config-text=\r\nSocksPort 9050\r\nControlPort 9051\r\n.\r\n250 OK\r\n".to_string()
        } else if command == "QUIT" {
            let _ = write_half.write_all(b"250 closing connection\r\n").await;
            return;
        } else {
            "510 Unrecognized command\r\n".to_string()
        };

        if write_half.write_all(reply.as_bytes()).await.is_err() {
            return;
        }
    }
}

/// Config pointing the crate at the mock daemon. The SOCKS and probe
/// endpoints are dead ports so proxied probes fail fast.
pub fn test_config(addr: SocketAddr) -> torcycle::config::Config {
    let mut config = torcycle::config::Config::default();
    config.tor.host = addr.ip().to_string();
    config.tor.control_port = addr.port();
    config.tor.control_password = Some("hunter2".to_string());
    config.tor.socks_port = 1;
    config.probe.url = "http://127.0.0.1:9/ip".to_string();
    config.probe.timeout_secs = 2;
    config.rotation.circuit_build_timeout_secs = 5;
    config
}
