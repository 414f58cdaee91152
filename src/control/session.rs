//! Tor control-port session
//!
//! Owns one persistent line-oriented connection to the Tor daemon and
//! provides authenticate, send-command/await-reply, and event-wait
//! operations. Session state is an explicit tagged enum: out-of-order calls
//! are rejected with a typed fault rather than relying on caller discipline.
//!
//! Not designed for concurrent invocation; one rotation cycle at a time.

use crate::config::TorConfig;
use crate::control::reply::{parse_status_line, CircuitEvent, ControlReply, EVENT_CODE};
use crate::error::ControlError;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// An open control connection, split for buffered line reads
struct Conn {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// Session lifecycle: Disconnected -> Connected -> Authenticated.
/// Disconnected is terminal and reachable from any state via `disconnect`.
enum SessionState {
    Disconnected,
    Connected(Conn),
    Authenticated(Conn),
}

/// Client session for the Tor control port
pub struct ControlSession {
    addr: String,
    password: Option<String>,
    state: SessionState,
}

impl ControlSession {
    /// Create a session for the configured daemon. No I/O happens here;
    /// the connection is established by `connect`.
    pub fn new(config: &TorConfig) -> Self {
        Self {
            addr: config.control_addr(),
            password: config.control_password.clone(),
            state: SessionState::Disconnected,
        }
    }

    /// Open the control connection if none exists. Idempotent.
    ///
    /// After a failure no protocol state may be assumed.
    pub async fn connect(&mut self) -> Result<(), ControlError> {
        if !matches!(self.state, SessionState::Disconnected) {
            return Ok(());
        }

        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|source| ControlError::Connect {
                addr: self.addr.clone(),
                source,
            })?;

        let (read_half, write_half) = stream.into_split();
        self.state = SessionState::Connected(Conn {
            reader: BufReader::new(read_half),
            writer: write_half,
        });

        debug!("connected to Tor control port at {}", self.addr);
        Ok(())
    }

    /// Close and discard the connection if present. Idempotent; never fails.
    pub fn disconnect(&mut self) {
        if !matches!(self.state, SessionState::Disconnected) {
            debug!("closing control connection to {}", self.addr);
        }
        self.state = SessionState::Disconnected;
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        !matches!(self.state, SessionState::Disconnected)
    }

    /// Whether the session has authenticated on the current connection
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    fn conn_mut(&mut self) -> Result<&mut Conn, ControlError> {
        match &mut self.state {
            SessionState::Disconnected => Err(ControlError::NotConnected),
            SessionState::Connected(conn) | SessionState::Authenticated(conn) => Ok(conn),
        }
    }

    fn authenticated_conn_mut(&mut self) -> Result<&mut Conn, ControlError> {
        match &mut self.state {
            SessionState::Disconnected => Err(ControlError::NotConnected),
            SessionState::Connected(_) => Err(ControlError::NotAuthenticated),
            SessionState::Authenticated(conn) => Ok(conn),
        }
    }

    /// Send one command and read one complete reply.
    ///
    /// Requires an open connection; fails with `NotConnected` (attempting no
    /// I/O) otherwise.
    pub async fn send_command(&mut self, command: &str) -> Result<ControlReply, ControlError> {
        let conn = self.conn_mut()?;
        Self::write_line(conn, command).await?;
        Self::read_reply(conn).await
    }

    /// Authenticate with the configured password (quoted and escaped), or
    /// null-authenticate when no password is configured.
    ///
    /// Succeeds only on a 250 reply; anything else fails with
    /// `AuthenticationFailed` carrying the trimmed reply text.
    pub async fn authenticate(&mut self) -> Result<(), ControlError> {
        if self.is_authenticated() {
            return Ok(());
        }

        let command = match &self.password {
            Some(password) => format!("AUTHENTICATE \"{}\"", escape_quoted(password)),
            None => "AUTHENTICATE".to_string(),
        };

        let reply = self.send_command(&command).await?;
        if !reply.is_ok() {
            return Err(ControlError::AuthenticationFailed(
                reply.text().trim().to_string(),
            ));
        }

        self.state = match std::mem::replace(&mut self.state, SessionState::Disconnected) {
            SessionState::Connected(conn) => SessionState::Authenticated(conn),
            other => other,
        };

        debug!("authenticated with Tor control port");
        Ok(())
    }

    /// Request a new circuit. The 250 ack means the request was accepted,
    /// not that a circuit is built; callers follow up with
    /// `wait_for_circuit_built`.
    pub async fn signal_newnym(&mut self) -> Result<(), ControlError> {
        let conn = self.authenticated_conn_mut()?;
        Self::write_line(conn, "SIGNAL NEWNYM").await?;

        let reply = Self::read_reply(conn).await?;
        if !reply.is_ok() {
            return Err(ControlError::CommandFailed {
                command: "SIGNAL NEWNYM".to_string(),
                reply: reply.text().trim().to_string(),
            });
        }

        debug!("Tor acknowledged NEWNYM");
        Ok(())
    }

    /// Subscribe to circuit events and block until the daemon reports a
    /// circuit as BUILT, then unsubscribe.
    ///
    /// The subscribe-ack is consumed before the wait loop starts, so the
    /// first BUILT notification observed is the first one the session
    /// produces. The wait is bounded: `CircuitBuildTimeout` is surfaced if no
    /// qualifying event arrives within `timeout`, and transient read resets
    /// are retried at most `read_retries` times.
    pub async fn wait_for_circuit_built(
        &mut self,
        timeout: Duration,
        read_retries: u32,
    ) -> Result<CircuitEvent, ControlError> {
        let conn = self.authenticated_conn_mut()?;

        Self::write_line(conn, "SETEVENTS CIRC").await?;
        let ack = Self::read_reply(conn).await?;
        if !ack.is_ok() {
            return Err(ControlError::CommandFailed {
                command: "SETEVENTS CIRC".to_string(),
                reply: ack.text().trim().to_string(),
            });
        }

        let event = tokio::time::timeout(timeout, Self::next_built_event(conn, read_retries))
            .await
            .map_err(|_| ControlError::CircuitBuildTimeout(timeout.as_secs()))??;

        // Stray notifications arriving before this ack are skipped by
        // read_reply, so the unsubscribe handshake stays in sync.
        Self::write_line(conn, "SETEVENTS").await?;
        let ack = Self::read_reply(conn).await?;
        if !ack.is_ok() {
            warn!("failed to unsubscribe from circuit events: {}", ack.text());
        }

        Ok(event)
    }

    /// Read event lines until one reports a BUILT circuit
    async fn next_built_event(
        conn: &mut Conn,
        read_retries: u32,
    ) -> Result<CircuitEvent, ControlError> {
        let mut retries_left = read_retries;
        loop {
            let line = match Self::read_line(conn).await {
                Ok(line) => line,
                Err(ControlError::Io(e))
                    if e.kind() == ErrorKind::ConnectionReset && retries_left > 0 =>
                {
                    retries_left -= 1;
                    warn!(
                        "connection reset while waiting for circuit event, retrying ({} left)",
                        retries_left
                    );
                    continue;
                },
                Err(e) => return Err(e),
            };

            match CircuitEvent::parse(&line) {
                Some(event) if event.is_built() => {
                    debug!("circuit {} built", event.circuit_id);
                    return Ok(event);
                },
                Some(event) => {
                    debug!("circuit {} is {}, still waiting", event.circuit_id, event.status);
                },
                None => {
                    debug!("ignoring non-circuit line while waiting: {}", line);
                },
            }
        }
    }

    async fn write_line(conn: &mut Conn, command: &str) -> Result<(), ControlError> {
        // Log the verb only; AUTHENTICATE lines carry the password
        let verb = command.split_whitespace().next().unwrap_or("");
        debug!("sending control command: {}", verb);

        conn.writer.write_all(command.as_bytes()).await?;
        conn.writer.write_all(b"\r\n").await?;
        conn.writer.flush().await?;
        Ok(())
    }

    /// Read one complete reply, reassembling continuation lines and data
    /// blocks. A single fixed-size read is not enough for multi-line
    /// responses, so this accumulates until the final `<code><SP>` line.
    async fn read_reply(conn: &mut Conn) -> Result<ControlReply, ControlError> {
        let mut lines = Vec::new();
        let mut raw = String::new();

        loop {
            let line = Self::read_line(conn).await?;
            let (code, sep, payload) = parse_status_line(&line)?;

            // Asynchronous notifications can interleave with a pending reply
            if code == EVENT_CODE {
                debug!("skipping event line while reading reply: {}", line);
                continue;
            }

            if !raw.is_empty() {
                raw.push('\n');
            }
            raw.push_str(&line);

            match sep {
                '-' => {
                    lines.push(payload.to_string());
                },
                '+' => {
                    // Data block runs until a lone "." terminator
                    lines.push(payload.to_string());
                    loop {
                        let data_line = Self::read_line(conn).await?;
                        if data_line == "." {
                            break;
                        }
                        raw.push('\n');
                        raw.push_str(&data_line);
                        lines.push(data_line);
                    }
                },
                _ => {
                    lines.push(payload.to_string());
                    return Ok(ControlReply {
                        status: code,
                        lines,
                        raw,
                    });
                },
            }
        }
    }

    async fn read_line(conn: &mut Conn) -> Result<String, ControlError> {
        let mut line = String::new();
        let n = conn.reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(ControlError::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "control connection closed by Tor",
            )));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Escape a value for a quoted control-protocol string
fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
