/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! FIX session client.
//!
//! Same two-worker shape as the ESP client: a sender draining a bounded
//! queue (emitting heartbeats when idle) and a receiver splitting the byte
//! stream into frames. Incoming frames update `in_seq`, run through the
//! built-in session handlers and then the registered handler registry keyed
//! by MsgType; unconsumed frames land on the receive queue.

use crate::codec::FrameBuffer;
use crate::message::FixMessage;
use crate::tags::{msg_type, tag};
use bytes::BytesMut;
use chrono::Utc;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use torii_core::error::{Result, SessionError, ToriiError};
use tracing::{debug, error, info, warn};

/// Default timeout for caller-side receives.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long shutdown waits for each worker thread.
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// FIX session client configuration. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixConfig {
    /// Counterparty host.
    pub host: String,
    /// Counterparty port.
    pub port: u16,
    /// SenderCompID (tag 49).
    pub sender_comp_id: String,
    /// TargetCompID (tag 56).
    pub target_comp_id: String,
    /// HeartBtInt (tag 108) and idle-send interval.
    pub heartbeat_interval: Duration,
    /// Optional Username (tag 553) sent on logon.
    pub username: Option<String>,
    /// Optional Password (tag 554) sent on logon.
    pub password: Option<String>,
}

impl FixConfig {
    /// Creates a configuration with a 30-second heartbeat.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            heartbeat_interval: Duration::from_secs(30),
            username: None,
            password: None,
        }
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets logon credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Message handler: returns true to consume the frame.
pub type FixHandler = Box<dyn FnMut(&FixMessage) -> bool + Send>;

enum SendCmd {
    Frame(BytesMut),
    Shutdown,
}

struct Shared {
    config: FixConfig,
    out_seq: Mutex<u64>,
    in_seq: AtomicU64,
    logged_on: AtomicBool,
    logout_requested: AtomicBool,
    stop: AtomicBool,
    handlers: Mutex<HashMap<String, Vec<FixHandler>>>,
}

impl Shared {
    /// Fills the standard header into an outgoing message and serializes
    /// it. `34` is allocated under the sequence lock.
    fn prepare(&self, mut msg: FixMessage) -> (FixMessage, BytesMut) {
        if !msg.contains(tag::SENDER_COMP_ID) {
            msg.set(tag::SENDER_COMP_ID, self.config.sender_comp_id.clone());
        }
        if !msg.contains(tag::TARGET_COMP_ID) {
            msg.set(tag::TARGET_COMP_ID, self.config.target_comp_id.clone());
        }
        if !msg.contains(tag::SENDING_TIME) {
            msg.set(
                tag::SENDING_TIME,
                Utc::now().format("%Y%m%d-%H:%M:%S%.3f").to_string(),
            );
        }
        {
            let mut seq = self.out_seq.lock();
            if !msg.contains(tag::MSG_SEQ_NUM) {
                msg.set(tag::MSG_SEQ_NUM, seq.to_string());
                *seq += 1;
            }
        }
        let frame = msg.seal();
        (msg, frame)
    }
}

/// Blocking duplex FIX session client.
pub struct FixClient {
    shared: Arc<Shared>,
    stream: Option<TcpStream>,
    send_tx: Option<Sender<SendCmd>>,
    receive_rx: Option<Receiver<FixMessage>>,
    sender_done: Option<Receiver<()>>,
    receiver_done: Option<Receiver<()>>,
}

impl FixClient {
    /// Creates an unconnected client.
    #[must_use]
    pub fn new(config: FixConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                out_seq: Mutex::new(1),
                in_seq: AtomicU64::new(1),
                logged_on: AtomicBool::new(false),
                logout_requested: AtomicBool::new(false),
                stop: AtomicBool::new(false),
                handlers: Mutex::new(HashMap::new()),
            }),
            stream: None,
            send_tx: None,
            receive_rx: None,
            sender_done: None,
            receiver_done: None,
        }
    }

    /// Connects the socket and starts both workers. Does not log on;
    /// call [`FixClient::logon`] next.
    ///
    /// # Errors
    /// Returns an I/O error if the connection cannot be established.
    pub fn connect(&mut self) -> Result<()> {
        let config = &self.shared.config;
        let stream = TcpStream::connect((config.host.as_str(), config.port))?;
        stream.set_nodelay(true)?;
        info!(host = %config.host, port = config.port, "connected to FIX server");

        let writer = stream.try_clone()?;
        let reader = stream.try_clone()?;
        reader.set_read_timeout(Some(Duration::from_secs(1)))?;

        self.shared.stop.store(false, Ordering::Release);
        self.shared.logout_requested.store(false, Ordering::Release);

        let (send_tx, send_rx) = bounded::<SendCmd>(1024);
        let (receive_tx, receive_rx) = unbounded::<FixMessage>();
        let (sender_done_tx, sender_done_rx) = bounded::<()>(1);
        let (receiver_done_tx, receiver_done_rx) = bounded::<()>(1);

        let sender_shared = Arc::clone(&self.shared);
        thread::Builder::new()
            .name("fix-sender".to_string())
            .spawn(move || {
                sender_loop(&sender_shared, &send_rx, writer);
                let _ = sender_done_tx.send(());
            })?;

        let receiver_shared = Arc::clone(&self.shared);
        let receiver_send_tx = send_tx.clone();
        thread::Builder::new()
            .name("fix-receiver".to_string())
            .spawn(move || {
                receiver_loop(&receiver_shared, reader, &receive_tx, &receiver_send_tx);
                let _ = receiver_done_tx.send(());
            })?;

        self.stream = Some(stream);
        self.send_tx = Some(send_tx);
        self.receive_rx = Some(receive_rx);
        self.sender_done = Some(sender_done_rx);
        self.receiver_done = Some(receiver_done_rx);
        Ok(())
    }

    /// Sends a logout (best effort), signals both workers, closes the
    /// socket, and waits up to two seconds per worker. Idempotent.
    pub fn disconnect(&mut self) {
        if self.shared.stop.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("disconnecting from FIX server");
        self.shared.logout_requested.store(true, Ordering::Release);

        if self.shared.logged_on.swap(false, Ordering::AcqRel) {
            // Direct write: the sender may already be draining its queue.
            if let Some(mut stream) = self.stream.as_ref().and_then(|s| s.try_clone().ok()) {
                let (_, frame) = self.shared.prepare(FixMessage::with_type(msg_type::LOGOUT));
                let _ = stream.write_all(&frame);
            }
        }

        if let Some(tx) = &self.send_tx {
            let _ = tx.try_send(SendCmd::Shutdown);
        }
        if let Some(stream) = &self.stream {
            let _ = stream.shutdown(Shutdown::Both);
        }

        for (name, done) in [
            ("sender", self.sender_done.take()),
            ("receiver", self.receiver_done.take()),
        ] {
            if let Some(done) = done {
                if done.recv_timeout(JOIN_TIMEOUT).is_err() {
                    error!("{name} thread didn't terminate properly");
                }
            }
        }

        self.send_tx = None;
        self.receive_rx = None;
        self.stream = None;
    }

    /// Fills the standard header, serializes, and enqueues a message.
    /// Returns the message as sealed for the wire (with `9`, `10`, `34`,
    /// `52` populated).
    ///
    /// # Errors
    /// Returns [`SessionError::NotConnected`] before `connect`.
    pub fn send_message(&self, msg: FixMessage) -> Result<FixMessage> {
        let tx = self.send_tx.as_ref().ok_or(SessionError::NotConnected)?;
        let (prepared, frame) = self.shared.prepare(msg);
        debug!(msg_type = prepared.msg_type().unwrap_or("?"), "enqueue");
        tx.send(SendCmd::Frame(frame))
            .map_err(|_| SessionError::Connection("send queue closed".to_string()))?;
        Ok(prepared)
    }

    /// Pops the next unconsumed frame from the receive queue.
    ///
    /// # Errors
    /// Returns [`ToriiError::Timeout`] when the deadline elapses; the
    /// session stays alive.
    pub fn receive_message(&self, timeout: Duration) -> Result<FixMessage> {
        let rx = self.receive_rx.as_ref().ok_or(SessionError::NotConnected)?;
        match rx.recv_timeout(timeout) {
            Ok(msg) => Ok(msg),
            Err(RecvTimeoutError::Timeout) => Err(ToriiError::Timeout {
                waited_ms: timeout.as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => {
                Err(SessionError::Connection("receiver terminated".to_string()).into())
            }
        }
    }

    /// Registers a handler for a MsgType. The first handler returning true
    /// consumes the frame. Call from the caller thread only.
    pub fn register_handler(
        &self,
        msg_type: impl Into<String>,
        handler: impl FnMut(&FixMessage) -> bool + Send + 'static,
    ) {
        self.shared
            .handlers
            .lock()
            .entry(msg_type.into())
            .or_default()
            .push(Box::new(handler));
    }

    /// Sends a Logon and waits for the counterparty's Logon.
    ///
    /// # Errors
    /// A ResendRequest or any other non-Logon reply fails the handshake.
    pub fn logon(&mut self) -> Result<()> {
        let config = &self.shared.config;
        let mut logon = FixMessage::with_type(msg_type::LOGON);
        logon.set(tag::ENCRYPT_METHOD, "0").set(
            tag::HEART_BT_INT,
            config.heartbeat_interval.as_secs().to_string(),
        );
        if let Some(username) = &config.username {
            logon.set(tag::USERNAME, username.clone());
        }
        if let Some(password) = &config.password {
            logon.set(tag::PASSWORD, password.clone());
        }
        self.send_message(logon)?;

        let response = self.receive_message(DEFAULT_RECEIVE_TIMEOUT)?;
        match response.msg_type() {
            Some(msg_type::LOGON) => {
                self.shared.logged_on.store(true, Ordering::Release);
                info!("logged on");
                Ok(())
            }
            Some(msg_type::RESEND_REQUEST) => Err(SessionError::SequenceMismatch {
                expected: self.shared.in_seq.load(Ordering::Acquire),
                received: response.get_u64(tag::MSG_SEQ_NUM).unwrap_or(0),
            }
            .into()),
            other => Err(SessionError::UnexpectedMessage {
                expected: "Logon".to_string(),
                received: other.unwrap_or("?").to_string(),
            }
            .into()),
        }
    }

    /// Sends a Logout and waits for the confirming Logout.
    ///
    /// # Errors
    /// Returns a timeout if the confirmation never arrives.
    pub fn logout(&mut self) -> Result<()> {
        self.shared.logout_requested.store(true, Ordering::Release);
        self.send_message(FixMessage::with_type(msg_type::LOGOUT))?;
        loop {
            let msg = self.receive_message(DEFAULT_RECEIVE_TIMEOUT)?;
            if msg.msg_type() == Some(msg_type::LOGOUT) {
                self.shared.logged_on.store(false, Ordering::Release);
                info!("logged out");
                return Ok(());
            }
            debug!(
                msg_type = msg.msg_type().unwrap_or("?"),
                "awaiting logout confirmation, skipping"
            );
        }
    }

    /// True after a successful logon handshake.
    #[must_use]
    pub fn is_logged_on(&self) -> bool {
        self.shared.logged_on.load(Ordering::Acquire)
    }

    /// Next expected inbound sequence number.
    #[must_use]
    pub fn in_seq(&self) -> u64 {
        self.shared.in_seq.load(Ordering::Acquire)
    }

    /// Next outbound sequence number to be allocated.
    #[must_use]
    pub fn out_seq(&self) -> u64 {
        *self.shared.out_seq.lock()
    }
}

impl Drop for FixClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn sender_loop(shared: &Shared, rx: &Receiver<SendCmd>, mut stream: TcpStream) {
    let mut last_send = Instant::now();
    loop {
        if shared.stop.load(Ordering::Acquire) {
            break;
        }
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(SendCmd::Shutdown) => break,
            Ok(SendCmd::Frame(frame)) => {
                if let Err(e) = stream.write_all(&frame) {
                    error!("error in send loop: {e}");
                    break;
                }
                last_send = Instant::now();
            }
            Err(RecvTimeoutError::Timeout) => {
                if shared.logged_on.load(Ordering::Acquire)
                    && last_send.elapsed() > shared.config.heartbeat_interval
                {
                    let (_, frame) = shared.prepare(FixMessage::with_type(msg_type::HEARTBEAT));
                    if let Err(e) = stream.write_all(&frame) {
                        error!("error sending heartbeat: {e}");
                        break;
                    }
                    last_send = Instant::now();
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("sender loop terminated");
}

fn receiver_loop(
    shared: &Shared,
    mut stream: TcpStream,
    queue: &Sender<FixMessage>,
    send_tx: &Sender<SendCmd>,
) {
    let mut frames = FrameBuffer::new();
    let mut chunk = [0u8; 4096];

    while !shared.stop.load(Ordering::Acquire) {
        match stream.read(&mut chunk) {
            Ok(0) => {
                if !shared.stop.load(Ordering::Acquire) {
                    warn!("connection closed by server");
                }
                break;
            }
            Ok(n) => frames.extend(&chunk[..n]),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                continue;
            }
            Err(e) => {
                if !shared.stop.load(Ordering::Acquire) {
                    error!("error in receive loop: {e}");
                }
                break;
            }
        }

        while let Some(frame) = frames.next_frame() {
            let msg = match FixMessage::decode(&frame) {
                Ok(msg) => msg,
                Err(e) => {
                    // Recoverable for tag-value framing: drop this frame
                    // and resynchronize on the next one.
                    warn!("discarding malformed frame: {e}");
                    continue;
                }
            };

            if let Some(seq) = msg.get_u64(tag::MSG_SEQ_NUM) {
                shared.in_seq.store(seq + 1, Ordering::Release);
            }

            if handle_session_message(shared, &msg, send_tx) {
                continue;
            }

            let mut handled = false;
            if let Some(kind) = msg.msg_type() {
                let mut handlers = shared.handlers.lock();
                if let Some(chain) = handlers.get_mut(kind) {
                    for handler in chain.iter_mut() {
                        if handler(&msg) {
                            handled = true;
                            break;
                        }
                    }
                }
            }

            if !handled && queue.send(msg).is_err() {
                return;
            }
        }
    }
    debug!("receiver loop terminated");
}

/// Built-in session handling. Returns true when the frame is consumed.
fn handle_session_message(shared: &Shared, msg: &FixMessage, send_tx: &Sender<SendCmd>) -> bool {
    match msg.msg_type() {
        Some(msg_type::HEARTBEAT) => {
            debug!("received heartbeat");
            true
        }
        Some(msg_type::TEST_REQUEST) => {
            if let Some(id) = msg.get(tag::TEST_REQ_ID) {
                let mut reply = FixMessage::with_type(msg_type::HEARTBEAT);
                reply.set(tag::TEST_REQ_ID, id);
                let (_, frame) = shared.prepare(reply);
                let _ = send_tx.send(SendCmd::Frame(frame));
            }
            true
        }
        Some(msg_type::LOGON) => {
            // Session up; the frame still reaches the caller so the logon
            // handshake can observe it.
            shared.logged_on.store(true, Ordering::Release);
            false
        }
        Some(msg_type::LOGOUT) => {
            shared.logged_on.store(false, Ordering::Release);
            if !shared.logout_requested.load(Ordering::Acquire) {
                info!("received logout request, initiating disconnect");
                shared.stop.store(true, Ordering::Release);
            }
            false
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    /// Minimal scripted FIX acceptor: logon echo, optional canned frames,
    /// logout echo. Execution reports echo the incoming ClOrdID.
    fn scripted_acceptor(listener: TcpListener, inject_test_request: bool) -> thread::JoinHandle<Vec<FixMessage>> {
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut frames = FrameBuffer::new();
            let mut chunk = [0u8; 4096];
            let mut out_seq = 1u64;
            let mut received = Vec::new();

            let mut send = |stream: &mut TcpStream, mut msg: FixMessage, seq: &mut u64| {
                msg.set(tag::SENDER_COMP_ID, "OMS")
                    .set(tag::TARGET_COMP_ID, "CLIENT")
                    .set(tag::MSG_SEQ_NUM, seq.to_string())
                    .set(tag::SENDING_TIME, "20260729-09:00:00.000");
                *seq += 1;
                stream.write_all(&msg.seal()).unwrap();
            };

            loop {
                let n = match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                frames.extend(&chunk[..n]);
                while let Some(frame) = frames.next_frame() {
                    let msg = FixMessage::decode(&frame).unwrap();
                    received.push(msg.clone());
                    match msg.msg_type() {
                        Some(msg_type::LOGON) => {
                            send(&mut stream, FixMessage::with_type(msg_type::LOGON), &mut out_seq);
                            if inject_test_request {
                                let mut tr = FixMessage::with_type(msg_type::TEST_REQUEST);
                                tr.set(tag::TEST_REQ_ID, "PING1");
                                send(&mut stream, tr, &mut out_seq);
                            }
                        }
                        Some(msg_type::NEW_ORDER_SINGLE) => {
                            let mut er = FixMessage::with_type(msg_type::EXECUTION_REPORT);
                            er.set(tag::CL_ORD_ID, msg.get(tag::CL_ORD_ID).unwrap())
                                .set(tag::ORDER_ID, format!("OID{out_seq}"))
                                .set(tag::EXEC_TYPE, "0")
                                .set(tag::ORD_STATUS, "0");
                            send(&mut stream, er, &mut out_seq);
                        }
                        Some(msg_type::LOGOUT) => {
                            send(&mut stream, FixMessage::with_type(msg_type::LOGOUT), &mut out_seq);
                            return received;
                        }
                        _ => {}
                    }
                }
            }
            received
        })
    }

    fn client_for(addr: std::net::SocketAddr) -> FixClient {
        let config = FixConfig::new("127.0.0.1", addr.port(), "CLIENT", "OMS")
            .with_heartbeat_interval(Duration::from_secs(60));
        FixClient::new(config)
    }

    #[test]
    fn test_logon_order_logout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = scripted_acceptor(listener, false);

        let mut client = client_for(addr);
        client.connect().unwrap();
        client.logon().unwrap();
        assert!(client.is_logged_on());

        let mut order = FixMessage::with_type(msg_type::NEW_ORDER_SINGLE);
        order
            .set(tag::CL_ORD_ID, "ORD1")
            .set(tag::SYMBOL, "AAPL")
            .set(tag::SIDE, "1")
            .set(tag::ORDER_QTY, "100");
        let sent = client.send_message(order).unwrap();
        assert_eq!(sent.get_u64(tag::MSG_SEQ_NUM), Some(2));

        let report = client.receive_message(DEFAULT_RECEIVE_TIMEOUT).unwrap();
        assert_eq!(report.msg_type(), Some(msg_type::EXECUTION_REPORT));
        assert_eq!(report.get(tag::CL_ORD_ID), Some("ORD1"));

        client.logout().unwrap();
        client.disconnect();

        let received = server.join().unwrap();
        // Logon, order, logout; every outbound 34 strictly increasing.
        let seqs: Vec<u64> = received
            .iter()
            .map(|m| m.get_u64(tag::MSG_SEQ_NUM).unwrap())
            .collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(received[0].msg_type(), Some(msg_type::LOGON));
        assert_eq!(received[0].get(tag::HEART_BT_INT), Some("60"));
    }

    #[test]
    fn test_test_request_answered_with_matching_id() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = scripted_acceptor(listener, true);

        let mut client = client_for(addr);
        client.connect().unwrap();
        client.logon().unwrap();
        client.logout().unwrap();
        client.disconnect();

        let received = server.join().unwrap();
        let heartbeat = received
            .iter()
            .find(|m| m.msg_type() == Some(msg_type::HEARTBEAT))
            .expect("heartbeat reply to test request");
        assert_eq!(heartbeat.get(tag::TEST_REQ_ID), Some("PING1"));
    }

    #[test]
    fn test_in_seq_tracks_received_frames() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = scripted_acceptor(listener, false);

        let mut client = client_for(addr);
        client.connect().unwrap();
        client.logon().unwrap();
        assert_eq!(client.in_seq(), 2);
        client.logout().unwrap();
        client.disconnect();
        server.join().unwrap();
    }

    #[test]
    fn test_registered_handler_consumes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = scripted_acceptor(listener, false);

        let mut client = client_for(addr);
        client.connect().unwrap();

        let (seen_tx, seen_rx) = unbounded::<String>();
        client.register_handler(msg_type::EXECUTION_REPORT, move |msg| {
            let _ = seen_tx.send(msg.get(tag::CL_ORD_ID).unwrap_or("").to_string());
            true
        });

        client.logon().unwrap();
        let mut order = FixMessage::with_type(msg_type::NEW_ORDER_SINGLE);
        order
            .set(tag::CL_ORD_ID, "ORD9")
            .set(tag::SYMBOL, "AAPL")
            .set(tag::SIDE, "1")
            .set(tag::ORDER_QTY, "1");
        client.send_message(order).unwrap();

        // Consumed by the handler: visible there, absent from the queue.
        assert_eq!(
            seen_rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            "ORD9"
        );
        assert!(client.receive_message(Duration::from_millis(200)).is_err());

        client.logout().unwrap();
        client.disconnect();
        server.join().unwrap();
    }
}
