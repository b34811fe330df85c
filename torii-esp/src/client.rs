/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! ESP session client.
//!
//! A connected client runs two worker threads: a sender draining a bounded
//! queue (emitting heartbeats when idle) and a receiver reading
//! length-prefixed frames. Received frames update the session counters,
//! then run through the handler chain; unconsumed frames land on the
//! receive queue for the caller.

use crate::layers::ESP_COMMON_LEN;
use crate::message::{AdminPayload, EspBody, EspMessage, OrderKind, OrderPayload};
use crate::payloads::OpStart;
use arrayvec::ArrayString;
use bytes::BytesMut;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use socket2::{Domain, Socket, Type};
use std::fmt::Write as _;
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use torii_codec::reader::FieldReader;
use torii_core::error::{Result, SessionError, ToriiError};
use torii_core::types::INTERNAL_PROCESSING_LEN;
use tracing::{debug, error, info, warn};

/// Default timeout for caller-side receives.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect retry attempts when the local address is still in use.
const CONNECT_ATTEMPTS: u32 = 13;

/// Back-off between connect retries.
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// How long shutdown waits for each worker thread.
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// ESP session client configuration. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EspConfig {
    /// Local endpoint to bind before connecting.
    pub local_addr: SocketAddr,
    /// Remote gateway endpoint.
    pub remote_addr: SocketAddr,
    /// Participant code stamped into outgoing headers.
    pub participant_code: String,
    /// Virtual server number stamped into outgoing headers.
    pub virtual_server_no: String,
    /// Alphabetic prefix for generated internal-processing ids.
    pub internal_prefix: String,
    /// Exchange code for order/admin middle layers.
    pub exchange_code: String,
    /// Market code for order/admin middle layers.
    pub market_code: String,
    /// Idle interval after which the sender emits a heartbeat.
    pub heartbeat_interval: Duration,
    /// Whether the default handler consumes incoming heartbeats.
    pub handle_heartbeats: bool,
}

impl EspConfig {
    /// Creates a configuration with the conventional defaults.
    #[must_use]
    pub fn new(
        local_addr: SocketAddr,
        remote_addr: SocketAddr,
        participant_code: impl Into<String>,
        virtual_server_no: impl Into<String>,
    ) -> Self {
        Self {
            local_addr,
            remote_addr,
            participant_code: participant_code.into(),
            virtual_server_no: virtual_server_no.into(),
            internal_prefix: "VIRTUA".to_string(),
            exchange_code: "1".to_string(),
            market_code: "11".to_string(),
            heartbeat_interval: Duration::from_secs(1),
            handle_heartbeats: true,
        }
    }

    /// Sets the internal-processing id prefix.
    #[must_use]
    pub fn with_internal_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.internal_prefix = prefix.into();
        self
    }

    /// Sets the exchange code.
    #[must_use]
    pub fn with_exchange_code(mut self, code: impl Into<String>) -> Self {
        self.exchange_code = code.into();
        self
    }

    /// Sets the market code.
    #[must_use]
    pub fn with_market_code(mut self, code: impl Into<String>) -> Self {
        self.market_code = code.into();
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }
}

/// Message handler: returns true to consume the frame.
pub type EspHandler = Box<dyn FnMut(&EspMessage) -> bool + Send>;

enum SendCmd {
    Frame(BytesMut),
    Shutdown,
}

/// Counters owned by the sending side, advanced under one lock by
/// `prepare` before a frame is enqueued.
#[derive(Debug)]
struct TxCounters {
    last_sent_seq_no: i64,
    last_sent_arm_sn: i64,
    last_sent_sam_sn: i64,
    last_sent_order_entry_seq_no: i64,
    last_sent_internal: ArrayString<INTERNAL_PROCESSING_LEN>,
}

struct Shared {
    config: EspConfig,
    tx: Mutex<TxCounters>,
    last_rcvd_seq_no: AtomicI64,
    last_rcvd_arm_sn: AtomicI64,
    last_rcvd_sam_sn: AtomicI64,
    last_rcvd_notice_seq_no: AtomicI64,
    last_rcvd_execution_seq_no: AtomicI64,
    heartbeats_allowed: AtomicBool,
    handle_heartbeats: AtomicBool,
    stop: AtomicBool,
    handlers: Mutex<Vec<EspHandler>>,
}

impl Shared {
    /// Fills session defaults into an outgoing message and advances the
    /// sender-side counters. Runs entirely under the sender counter lock.
    fn prepare(&self, mut msg: EspMessage) -> EspMessage {
        let mut tx = self.tx.lock();
        let config = &self.config;

        let common = &mut msg.common;
        let seq_no = *common.seq_no.get_or_insert(tx.last_sent_seq_no + 1);
        common.resend_flag.get_or_insert('0');
        common
            .participant_code
            .get_or_insert_with(|| config.participant_code.clone());
        common
            .virtual_server_no
            .get_or_insert_with(|| config.virtual_server_no.clone());
        let armsn = *common
            .armsn
            .get_or_insert_with(|| self.last_rcvd_seq_no.load(Ordering::Acquire));
        let samsn = *common.samsn.get_or_insert(0);

        let now = chrono::Local::now();
        common.transmission_date.get_or_insert_with(|| now.date_naive());
        common.transmission_time.get_or_insert_with(|| now.time());

        tx.last_sent_seq_no = seq_no;
        tx.last_sent_arm_sn = armsn;
        tx.last_sent_sam_sn = samsn;

        match &mut msg.body {
            EspBody::Order {
                kind,
                common: layer,
                payload,
            } => {
                layer
                    .exchange_code
                    .get_or_insert_with(|| config.exchange_code.clone());
                layer
                    .market_code
                    .get_or_insert_with(|| config.market_code.clone());
                layer
                    .participant_code
                    .get_or_insert_with(|| config.participant_code.clone());
                layer
                    .virtual_server_no
                    .get_or_insert_with(|| config.virtual_server_no.clone());
                let entry_seq = *layer
                    .order_entry_seq_no
                    .get_or_insert(tx.last_sent_order_entry_seq_no + 1);
                if matches!(kind, OrderKind::Order) {
                    tx.last_sent_order_entry_seq_no = entry_seq;
                }
                if let OrderPayload::New(order) = payload {
                    if order.internal_processing.is_none() {
                        tx.last_sent_internal = next_internal(&tx.last_sent_internal);
                        order.internal_processing = Some(tx.last_sent_internal.to_string());
                    }
                }
            }
            EspBody::Admin {
                kind,
                common: layer,
                ..
            } => {
                if matches!(
                    kind,
                    crate::message::AdminKind::OrderUp | crate::message::AdminKind::QueryUp
                ) {
                    layer
                        .exchange_code
                        .get_or_insert_with(|| config.exchange_code.clone());
                    layer
                        .market_code
                        .get_or_insert_with(|| config.market_code.clone());
                    layer
                        .participant_code
                        .get_or_insert_with(|| config.participant_code.clone());
                    layer
                        .virtual_server_no
                        .get_or_insert_with(|| config.virtual_server_no.clone());
                }
            }
            _ => {}
        }

        msg
    }
}

/// Generates the next internal-processing id: keep the alphabetic prefix,
/// increment the numeric tail, zero-pad back to 20 bytes.
fn next_internal(
    previous: &ArrayString<INTERNAL_PROCESSING_LEN>,
) -> ArrayString<INTERNAL_PROCESSING_LEN> {
    let prefix_len = previous.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (prefix, digits) = previous.split_at(prefix_len);
    let next = digits.parse::<u64>().unwrap_or(0) + 1;
    let mut out = ArrayString::<INTERNAL_PROCESSING_LEN>::new();
    let _ = write!(out, "{prefix}{next:0width$}", width = INTERNAL_PROCESSING_LEN - prefix_len);
    out
}

/// Blocking duplex ESP session client.
pub struct EspClient {
    shared: Arc<Shared>,
    stream: Option<TcpStream>,
    send_tx: Option<Sender<SendCmd>>,
    receive_rx: Option<Receiver<EspMessage>>,
    sender_done: Option<Receiver<()>>,
    receiver_done: Option<Receiver<()>>,
}

impl EspClient {
    /// Creates an unconnected client.
    #[must_use]
    pub fn new(config: EspConfig) -> Self {
        let mut internal = ArrayString::<INTERNAL_PROCESSING_LEN>::new();
        let prefix: String = config
            .internal_prefix
            .chars()
            .take(INTERNAL_PROCESSING_LEN)
            .collect();
        let _ = write!(internal, "{prefix}{:0>width$}", "", width = INTERNAL_PROCESSING_LEN - prefix.len());
        let handle_heartbeats = config.handle_heartbeats;
        Self {
            shared: Arc::new(Shared {
                config,
                tx: Mutex::new(TxCounters {
                    last_sent_seq_no: 0,
                    last_sent_arm_sn: 0,
                    last_sent_sam_sn: 0,
                    last_sent_order_entry_seq_no: 0,
                    last_sent_internal: internal,
                }),
                last_rcvd_seq_no: AtomicI64::new(0),
                last_rcvd_arm_sn: AtomicI64::new(0),
                last_rcvd_sam_sn: AtomicI64::new(0),
                last_rcvd_notice_seq_no: AtomicI64::new(0),
                last_rcvd_execution_seq_no: AtomicI64::new(0),
                heartbeats_allowed: AtomicBool::new(false),
                handle_heartbeats: AtomicBool::new(handle_heartbeats),
                stop: AtomicBool::new(false),
                handlers: Mutex::new(Vec::new()),
            }),
            stream: None,
            send_tx: None,
            receive_rx: None,
            sender_done: None,
            receiver_done: None,
        }
    }

    /// Binds the local endpoint, connects, and starts both workers.
    ///
    /// The bind uses `SO_REUSEADDR` and `LINGER(on, 0)`. Connecting retries
    /// up to thirteen times with a ten-second back-off while the address is
    /// still in use; any other error aborts immediately.
    ///
    /// # Errors
    /// Returns an I/O error if the socket cannot be established.
    pub fn start(&mut self) -> Result<()> {
        let config = &self.shared.config;
        info!(
            local = %config.local_addr,
            remote = %config.remote_addr,
            "starting ESP client"
        );

        let socket = Socket::new(Domain::for_address(config.local_addr), Type::STREAM, None)?;
        socket.set_reuse_address(true)?;
        socket.set_linger(Some(Duration::from_secs(0)))?;
        socket.bind(&config.local_addr.into())?;

        let mut attempt = 1;
        loop {
            match socket.connect(&config.remote_addr.into()) {
                Ok(()) => break,
                Err(e)
                    if attempt < CONNECT_ATTEMPTS
                        && matches!(
                            e.kind(),
                            ErrorKind::AddrInUse | ErrorKind::AddrNotAvailable
                        ) =>
                {
                    warn!(attempt, "cannot connect: address taken, retrying");
                    thread::sleep(CONNECT_RETRY_DELAY);
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let stream: TcpStream = socket.into();
        stream.set_nodelay(true)?;

        let writer = stream.try_clone()?;
        let reader = stream.try_clone()?;
        reader.set_read_timeout(Some(Duration::from_secs(1)))?;

        self.shared.stop.store(false, Ordering::Release);

        let (send_tx, send_rx) = bounded::<SendCmd>(1024);
        let (receive_tx, receive_rx) = unbounded::<EspMessage>();
        let (sender_done_tx, sender_done_rx) = bounded::<()>(1);
        let (receiver_done_tx, receiver_done_rx) = bounded::<()>(1);

        let sender_shared = Arc::clone(&self.shared);
        thread::Builder::new()
            .name("esp-sender".to_string())
            .spawn(move || {
                sender_loop(&sender_shared, &send_rx, writer);
                let _ = sender_done_tx.send(());
            })?;

        let receiver_shared = Arc::clone(&self.shared);
        thread::Builder::new()
            .name("esp-receiver".to_string())
            .spawn(move || {
                receiver_loop(&receiver_shared, reader, &receive_tx);
                let _ = receiver_done_tx.send(());
            })?;

        self.stream = Some(stream);
        self.send_tx = Some(send_tx);
        self.receive_rx = Some(receive_rx);
        self.sender_done = Some(sender_done_rx);
        self.receiver_done = Some(receiver_done_rx);
        Ok(())
    }

    /// Signals both workers, closes the socket, and waits up to two
    /// seconds per worker. Idempotent; a slow worker is logged but never
    /// blocks shutdown.
    pub fn stop(&mut self) {
        if self.shared.stop.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("stopping ESP client");
        self.shared.heartbeats_allowed.store(false, Ordering::Release);

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

    /// Fills defaults, serializes, and enqueues a message.
    ///
    /// Returns the prepared message with every generated field
    /// (sequence numbers, internal-processing id) populated.
    ///
    /// # Errors
    /// Returns [`SessionError::NotConnected`] before `start`.
    pub fn send_msg(&self, msg: EspMessage) -> Result<EspMessage> {
        let tx = self
            .send_tx
            .as_ref()
            .ok_or(SessionError::NotConnected)?;
        let prepared = self.shared.prepare(msg);
        let frame = prepared.build();
        debug!(label = %prepared.label(), len = frame.len(), "enqueue");
        tx.send(SendCmd::Frame(frame))
            .map_err(|_| SessionError::Connection("send queue closed".to_string()))?;
        Ok(prepared)
    }

    /// Pops the next unconsumed frame from the receive queue.
    ///
    /// # Errors
    /// Returns [`ToriiError::Timeout`] when the deadline elapses; the
    /// session stays alive.
    pub fn receive_msg(&self, timeout: Duration) -> Result<EspMessage> {
        let rx = self
            .receive_rx
            .as_ref()
            .ok_or(SessionError::NotConnected)?;
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

    /// Appends a handler to the chain. The first handler returning true
    /// consumes the frame. Call from the caller thread only.
    pub fn register_handler(&self, handler: impl FnMut(&EspMessage) -> bool + Send + 'static) {
        self.shared.handlers.lock().push(Box::new(handler));
    }

    /// Toggles the default heartbeat-consuming handler.
    pub fn set_handle_heartbeats(&self, enabled: bool) {
        self.shared.handle_heartbeats.store(enabled, Ordering::Release);
    }

    /// Sends a login request and waits for the login response, aligning
    /// the outgoing sequence with the server's acknowledged number and
    /// enabling heartbeats.
    ///
    /// # Errors
    /// Returns an error if the first frame is not a login response.
    pub fn login(&mut self) -> Result<()> {
        self.send_msg(EspMessage::login_request())?;
        let response = self.receive_msg(DEFAULT_RECEIVE_TIMEOUT)?;
        if !response.is_login_response() {
            return Err(SessionError::UnexpectedMessage {
                expected: "LoginResponse".to_string(),
                received: response.label(),
            }
            .into());
        }
        let armsn = response.common.armsn.unwrap_or(0);
        self.shared.tx.lock().last_sent_seq_no = armsn;
        self.shared.heartbeats_allowed.store(true, Ordering::Release);
        info!(armsn, "logged in");
        Ok(())
    }

    /// Blocks until a market-admin frame arrives.
    ///
    /// # Errors
    /// Returns a timeout if no frame arrives in time.
    pub fn admin_start(&mut self) -> Result<()> {
        loop {
            let msg = self.receive_msg(DEFAULT_RECEIVE_TIMEOUT)?;
            if msg.is_market_admin() {
                return Ok(());
            }
            debug!(label = %msg.label(), "awaiting market admin, skipping");
        }
    }

    /// Sends an operation start request and waits for the response.
    ///
    /// # Errors
    /// Treats an operation start error response as fatal.
    pub fn op_start(&mut self) -> Result<()> {
        let op = OpStart {
            acceptance_seq_no: Some(self.last_rcvd_notice_seq_no()),
            execution_seq_no: Some(self.last_rcvd_execution_seq_no()),
            ..OpStart::default()
        };
        self.send_msg(EspMessage::admin_up(AdminPayload::OpStart(op)))?;
        loop {
            let msg = self.receive_msg(DEFAULT_RECEIVE_TIMEOUT)?;
            if msg.is_op_start_error() {
                return Err(SessionError::Rejected {
                    message: msg.label(),
                }
                .into());
            }
            if msg.is_op_start_response() {
                return Ok(());
            }
        }
    }

    /// Runs the two-step logout: pre-logout exchange then logout exchange.
    ///
    /// # Errors
    /// Returns an error if the logout response does not arrive.
    pub fn logout(&mut self) -> Result<()> {
        self.send_msg(EspMessage::pre_logout_request())?;
        loop {
            let msg = self.receive_msg(DEFAULT_RECEIVE_TIMEOUT)?;
            if msg.is_pre_logout_response() {
                break;
            }
        }
        self.send_msg(EspMessage::logout_request())?;
        let response = self.receive_msg(DEFAULT_RECEIVE_TIMEOUT)?;
        if !response.is_logout_response() {
            return Err(SessionError::UnexpectedMessage {
                expected: "LogoutResponse".to_string(),
                received: response.label(),
            }
            .into());
        }
        Ok(())
    }

    /// Virtual server number from the configuration.
    #[must_use]
    pub fn virtual_server_no(&self) -> &str {
        &self.shared.config.virtual_server_no
    }

    /// Last sequence number received from the gateway.
    #[must_use]
    pub fn last_rcvd_seq_no(&self) -> i64 {
        self.shared.last_rcvd_seq_no.load(Ordering::Acquire)
    }

    /// Last ARMSN received from the gateway.
    #[must_use]
    pub fn last_rcvd_arm_sn(&self) -> i64 {
        self.shared.last_rcvd_arm_sn.load(Ordering::Acquire)
    }

    /// Last SAMSN received from the gateway.
    #[must_use]
    pub fn last_rcvd_sam_sn(&self) -> i64 {
        self.shared.last_rcvd_sam_sn.load(Ordering::Acquire)
    }

    /// Last sequence number stamped into a sent frame.
    #[must_use]
    pub fn last_sent_seq_no(&self) -> i64 {
        self.shared.tx.lock().last_sent_seq_no
    }

    /// Last ARMSN stamped into a sent frame.
    #[must_use]
    pub fn last_sent_arm_sn(&self) -> i64 {
        self.shared.tx.lock().last_sent_arm_sn
    }

    /// Last SAMSN stamped into a sent frame.
    #[must_use]
    pub fn last_sent_sam_sn(&self) -> i64 {
        self.shared.tx.lock().last_sent_sam_sn
    }

    /// Last acceptance-notice sequence number received.
    #[must_use]
    pub fn last_rcvd_notice_seq_no(&self) -> i64 {
        self.shared.last_rcvd_notice_seq_no.load(Ordering::Acquire)
    }

    /// Last execution-notice sequence number received.
    #[must_use]
    pub fn last_rcvd_execution_seq_no(&self) -> i64 {
        self.shared.last_rcvd_execution_seq_no.load(Ordering::Acquire)
    }

    /// Last order-entry sequence number allocated to a sent order.
    #[must_use]
    pub fn last_sent_order_entry_seq_no(&self) -> i64 {
        self.shared.tx.lock().last_sent_order_entry_seq_no
    }
}

impl Drop for EspClient {
    fn drop(&mut self) {
        self.stop();
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
                if let Err(e) = write_full(&mut stream, &frame, &shared.stop) {
                    error!("error in send loop: {e}");
                    break;
                }
                last_send = Instant::now();
            }
            Err(RecvTimeoutError::Timeout) => {
                if shared.heartbeats_allowed.load(Ordering::Acquire)
                    && last_send.elapsed() > shared.config.heartbeat_interval
                {
                    let frame = shared.prepare(EspMessage::heartbeat()).build();
                    if let Err(e) = write_full(&mut stream, &frame, &shared.stop) {
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

fn receiver_loop(shared: &Shared, mut stream: TcpStream, queue: &Sender<EspMessage>) {
    let mut header = [0u8; ESP_COMMON_LEN];
    while !shared.stop.load(Ordering::Acquire) {
        match read_exact_stoppable(&mut stream, &mut header, &shared.stop) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                if !shared.stop.load(Ordering::Acquire) {
                    info!("receive loop ending: {e}");
                }
                break;
            }
        }

        let mut r = FieldReader::new(&header);
        let common = match crate::layers::EspCommon::decode(&mut r) {
            Ok(common) => common,
            Err(e) => {
                // Length-prefixed framing cannot resync after a bad header.
                error!("error in receive loop: {e}");
                break;
            }
        };

        let body_len = (common.message_length.unwrap_or(0) + 5)
            .max(0) as usize;
        let body_len = body_len.saturating_sub(ESP_COMMON_LEN);
        let mut frame = vec![0u8; ESP_COMMON_LEN + body_len];
        frame[..ESP_COMMON_LEN].copy_from_slice(&header);
        match read_exact_stoppable(&mut stream, &mut frame[ESP_COMMON_LEN..], &shared.stop) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                error!("error in receive loop: {e}");
                break;
            }
        }

        let msg = match EspMessage::parse(&frame) {
            Ok(msg) => msg,
            Err(e) => {
                error!("error in receive loop: {e}");
                break;
            }
        };

        shared
            .last_rcvd_seq_no
            .store(msg.common.seq_no.unwrap_or(0), Ordering::Release);
        shared
            .last_rcvd_arm_sn
            .store(msg.common.armsn.unwrap_or(0), Ordering::Release);
        shared
            .last_rcvd_sam_sn
            .store(msg.common.samsn.unwrap_or(0), Ordering::Release);

        if let Some((layer, payload)) = msg.notice_o() {
            let seq = layer.notice_seq_no.unwrap_or(0);
            if payload.is_acceptance() {
                shared.last_rcvd_notice_seq_no.store(seq, Ordering::Release);
            } else {
                shared
                    .last_rcvd_execution_seq_no
                    .store(seq, Ordering::Release);
            }
        }

        let mut handled =
            shared.handle_heartbeats.load(Ordering::Acquire) && msg.is_heartbeat();
        if !handled {
            let mut handlers = shared.handlers.lock();
            for handler in handlers.iter_mut() {
                if handler(&msg) {
                    handled = true;
                    break;
                }
            }
        }

        if !handled && queue.send(msg).is_err() {
            break;
        }
    }
    debug!("receiver loop terminated");
}

fn write_full(stream: &mut TcpStream, bytes: &[u8], stop: &AtomicBool) -> std::io::Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        if stop.load(Ordering::Acquire) {
            return Ok(());
        }
        match stream.write(&bytes[written..]) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    ErrorKind::WriteZero,
                    "socket connection broken",
                ))
            }
            Ok(n) => written += n,
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn read_exact_stoppable(
    stream: &mut TcpStream,
    buf: &mut [u8],
    stop: &AtomicBool,
) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        if stop.load(Ordering::Acquire) {
            return Ok(false);
        }
        match stream.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "connection closed by peer",
                ))
            }
            Ok(n) => filled += n,
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::NoticeCommon;
    use crate::message::{NoticeKind, NoticePayload};
    use crate::payloads::{
        MarketAdmin, NewOrder, NewOrderAcceptanceNotice, OpStartResponse,
    };
    use std::net::TcpListener;

    fn localhost(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    /// Reads one full ESP frame from the server side of a test socket.
    fn read_frame(stream: &mut TcpStream) -> EspMessage {
        let mut header = [0u8; ESP_COMMON_LEN];
        stream.read_exact(&mut header).unwrap();
        let mut r = FieldReader::new(&header);
        let common = crate::layers::EspCommon::decode(&mut r).unwrap();
        let body_len = (common.message_length.unwrap() + 5) as usize - ESP_COMMON_LEN;
        let mut frame = vec![0u8; ESP_COMMON_LEN + body_len];
        frame[..ESP_COMMON_LEN].copy_from_slice(&header);
        stream.read_exact(&mut frame[ESP_COMMON_LEN..]).unwrap();
        EspMessage::parse(&frame).unwrap()
    }

    fn respond(stream: &mut TcpStream, mut msg: EspMessage, seq: i64) {
        msg.common.seq_no = Some(seq);
        msg.common.armsn.get_or_insert(0);
        msg.common.samsn.get_or_insert(0);
        msg.common.resend_flag.get_or_insert('0');
        stream.write_all(&msg.build()).unwrap();
    }

    #[test]
    fn test_next_internal() {
        let start = ArrayString::<20>::from("VIRTUA00000000000000").unwrap();
        let next = next_internal(&start);
        assert_eq!(next.as_str(), "VIRTUA00000000000001");
        let after = next_internal(&next);
        assert_eq!(after.as_str(), "VIRTUA00000000000002");
    }

    #[test]
    fn test_next_internal_preserves_prefix_width() {
        let start = ArrayString::<20>::from("AB000000000000000099").unwrap();
        let next = next_internal(&start);
        assert_eq!(next.len(), 20);
        assert_eq!(next.as_str(), "AB000000000000000100");
    }

    #[test]
    fn test_login_and_order_entry_sequencing() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let server_addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            // Login exchange.
            let login = read_frame(&mut stream);
            assert!(matches!(login.body, EspBody::LoginRequest));
            assert_eq!(login.common.seq_no, Some(1));
            let mut resp = EspMessage::new(EspBody::LoginResponse);
            resp.common.armsn = Some(0);
            respond(&mut stream, resp, 1);

            // Two order entries with a query in between: SeqNo keeps
            // counting for every frame, OrderEntrySeqNo advances only for
            // the order-entry sends.
            let first = read_frame(&mut stream);
            assert_eq!(first.common.seq_no, Some(1));
            let (layer, _) = first.order().unwrap();
            assert_eq!(layer.order_entry_seq_no, Some(1));
            let internal_1 = first.new_order().unwrap().internal_processing.clone();

            let query = read_frame(&mut stream);
            assert_eq!(query.common.seq_no, Some(2));
            let (layer, _) = query.order().unwrap();
            assert_eq!(layer.order_entry_seq_no, Some(2));

            let second = read_frame(&mut stream);
            assert_eq!(second.common.seq_no, Some(3));
            let (layer, _) = second.order().unwrap();
            // The query did not commit the counter.
            assert_eq!(layer.order_entry_seq_no, Some(2));
            let internal_2 = second.new_order().unwrap().internal_processing.clone();
            (internal_1, internal_2)
        });

        let config = EspConfig::new(localhost(0), server_addr, "12345", "VS0001")
            .with_heartbeat_interval(Duration::from_secs(60));
        let mut client = EspClient::new(config);
        client.start().unwrap();
        client.login().unwrap();

        let order = NewOrder {
            issue_code: Some("6758".to_string()),
            order_quantity: Some(100),
            ..NewOrder::default()
        };
        let sent = client
            .send_msg(EspMessage::order_entry(OrderPayload::New(order.clone())))
            .unwrap();
        assert_eq!(
            sent.new_order().unwrap().internal_processing.as_deref(),
            Some("VIRTUA00000000000001")
        );

        let query = EspMessage::new(EspBody::Order {
            kind: OrderKind::Query,
            common: crate::layers::OrderCommon::default(),
            payload: OrderPayload::Raw(bytes::Bytes::new()),
        });
        client.send_msg(query).unwrap();

        client
            .send_msg(EspMessage::order_entry(OrderPayload::New(order)))
            .unwrap();

        let (internal_1, internal_2) = server.join().unwrap();
        assert_eq!(internal_1.as_deref(), Some("VIRTUA00000000000001"));
        assert_eq!(internal_2.as_deref(), Some("VIRTUA00000000000002"));
        client.stop();
    }

    #[test]
    fn test_heartbeat_emitted_when_idle() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let server_addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let login = read_frame(&mut stream);
            assert!(matches!(login.body, EspBody::LoginRequest));
            let mut resp = EspMessage::new(EspBody::LoginResponse);
            resp.common.armsn = Some(1);
            respond(&mut stream, resp, 1);
            // With a short interval the idle sender must emit a heartbeat.
            let next = read_frame(&mut stream);
            assert!(next.is_heartbeat());
        });

        let config = EspConfig::new(localhost(0), server_addr, "12345", "VS0001")
            .with_heartbeat_interval(Duration::from_millis(100));
        let mut client = EspClient::new(config);
        client.start().unwrap();
        client.login().unwrap();

        server.join().unwrap();
        client.stop();
    }

    #[test]
    fn test_handshake_sequence_and_notice_counters() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let server_addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let _login = read_frame(&mut stream);
            let mut resp = EspMessage::new(EspBody::LoginResponse);
            resp.common.armsn = Some(0);
            respond(&mut stream, resp, 1);

            // Market admin notification.
            let admin = EspMessage::admin_down(AdminPayload::MarketAdmin(MarketAdmin::default()));
            respond(&mut stream, admin, 2);

            // Acceptance notice advances the notice counter.
            let mut layer = NoticeCommon::default();
            layer.notice_seq_no = Some(9);
            let notice = EspMessage::notice(
                NoticeKind::Order,
                layer,
                NoticePayload::NewOrderAcceptance(NewOrderAcceptanceNotice::default()),
            );
            respond(&mut stream, notice, 3);

            // OpStart exchange.
            let op_start = read_frame(&mut stream);
            let (_, payload) = op_start.admin().unwrap();
            let AdminPayload::OpStart(op) = payload else {
                panic!("expected OpStart, got {:?}", payload);
            };
            assert_eq!(op.acceptance_seq_no, Some(9));
            assert_eq!(op.execution_seq_no, Some(0));
            let resp = EspMessage::admin_down(AdminPayload::OpStartResponse(
                OpStartResponse::default(),
            ));
            respond(&mut stream, resp, 4);

            // Logout exchange.
            let pre = read_frame(&mut stream);
            assert!(matches!(pre.body, EspBody::PreLogoutRequest));
            respond(&mut stream, EspMessage::new(EspBody::PreLogoutResponse), 5);
            let logout = read_frame(&mut stream);
            assert!(matches!(logout.body, EspBody::LogoutRequest(_)));
            respond(&mut stream, EspMessage::new(EspBody::LogoutResponse), 6);
        });

        let config = EspConfig::new(localhost(0), server_addr, "12345", "VS0001")
            .with_heartbeat_interval(Duration::from_secs(60));
        let mut client = EspClient::new(config);
        client.start().unwrap();
        client.login().unwrap();
        client.admin_start().unwrap();
        // The acceptance notice arrives before op_start reads the counters;
        // consume it from the queue first.
        let notice = client.receive_msg(DEFAULT_RECEIVE_TIMEOUT).unwrap();
        assert!(notice.notice_o().is_some());
        client.op_start().unwrap();
        client.logout().unwrap();
        assert_eq!(client.last_rcvd_notice_seq_no(), 9);
        client.stop();

        server.join().unwrap();
    }
}
