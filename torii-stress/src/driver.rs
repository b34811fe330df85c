/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! Multi-connection load generator.
//!
//! One worker per FIX session: connect, logon, send the configured number
//! of NewOrderSingle messages at the target rate with unique ClOrdIDs,
//! optionally sampling ack latency against the matching ExecutionReport,
//! then disconnect. Per-worker rates are aggregated into run percentiles.

use crate::config::StressConfig;
use crate::report::{percentile, LatencyStats, StressReport, WorkerStats};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use torii_core::error::Result;
use torii_fix::client::{FixClient, FixConfig};
use torii_fix::message::FixMessage;
use torii_fix::tags::{msg_type, tag};
use tracing::{error, info};

/// Poll granularity while waiting for a sampled ExecutionReport.
const ACK_POLL: Duration = Duration::from_millis(200);

/// Runs a full load-generation pass and aggregates the outcome.
///
/// # Errors
/// Returns a configuration error before any session is opened; worker
/// failures after that are logged and reflected in the per-worker stats.
pub fn run(config: &StressConfig) -> Result<StressReport> {
    config.validate()?;
    let start = Instant::now();

    let mut handles = Vec::with_capacity(config.connections);
    for worker_id in 0..config.connections {
        let worker_config = config.clone();
        handles.push(
            thread::Builder::new()
                .name(format!("stress-worker-{worker_id}"))
                .spawn(move || worker(worker_id, &worker_config))?,
        );
    }

    let mut workers = Vec::with_capacity(handles.len());
    let mut all_latencies = Vec::new();
    for handle in handles {
        match handle.join() {
            Ok((stats, latencies)) => {
                workers.push(stats);
                all_latencies.extend(latencies);
            }
            Err(_) => error!("stress worker panicked"),
        }
    }
    workers.sort_by_key(|w| w.worker_id);

    let elapsed_s = start.elapsed().as_secs_f64().max(f64::MIN_POSITIVE);
    let total_sent: usize = workers.iter().map(|w| w.sent).sum();
    let mut rates: Vec<f64> = workers.iter().map(|w| w.rate_msg_per_s).collect();
    rates.sort_by(|a, b| a.total_cmp(b));

    let report = StressReport {
        total_sent,
        elapsed_s,
        overall_rate_msg_per_s: total_sent as f64 / elapsed_s,
        rate_p50: percentile(&rates, 0.5),
        rate_p90: percentile(&rates, 0.9),
        rate_p99: percentile(&rates, 0.99),
        latency: LatencyStats::from_samples(&all_latencies),
        tag: config.tag.clone(),
        workers,
    };
    info!(
        connections = config.connections,
        total = report.total_sent,
        rate = report.overall_rate_msg_per_s,
        "stress run completed"
    );
    Ok(report)
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// One session worth of load. Returns stats plus raw latency samples in
/// seconds for the run-level roll-up.
fn worker(worker_id: usize, config: &StressConfig) -> (WorkerStats, Vec<f64>) {
    let start = Instant::now();
    let mut sent = 0usize;
    let mut first_send = None;
    let mut last_send = None;
    let mut latencies: Vec<f64> = Vec::new();

    let fix_config = FixConfig::new(
        config.host.clone(),
        config.port,
        config.sender_comp_id.clone(),
        config.target_comp_id.clone(),
    )
    .with_heartbeat_interval(Duration::from_secs(config.heartbeat));
    let mut client = FixClient::new(fix_config);

    let session = (|| -> Result<()> {
        client.connect()?;
        client.logon()?;
        info!(worker_id, "connected");

        let sleep_between = if config.rate > 0.0 {
            Some(Duration::from_secs_f64(1.0 / config.rate))
        } else {
            None
        };
        let sample_every = config.sample_every();
        let ack_timeout = Duration::from_secs_f64(config.ack_timeout);
        let run_tag = unix_ms();

        for i in 0..config.messages_per_conn {
            let cl_ord_id = format!(
                "{}-{}-{}-{:x}",
                config.sender_comp_id, worker_id, i, run_tag
            );
            let mut order = FixMessage::with_type(msg_type::NEW_ORDER_SINGLE);
            order
                .set(tag::CL_ORD_ID, cl_ord_id.clone())
                .set(tag::SYMBOL, config.symbol.clone())
                .set(tag::SIDE, config.side.clone())
                .set(tag::ORDER_QTY, config.qty.to_string());
            if let Some(price) = config.price {
                order.set(tag::PRICE, price.to_string());
            }

            let send_at = Instant::now();
            client.send_message(order)?;
            let now = unix_ms();
            first_send.get_or_insert(now);
            last_send = Some(now);
            sent += 1;

            if config.measure_latency && i % sample_every == 0 {
                // Read until the matching report shows up or the deadline
                // passes; a miss just skips this sample.
                let deadline = Instant::now() + ack_timeout;
                while Instant::now() < deadline {
                    let Ok(msg) = client.receive_message(ACK_POLL) else {
                        continue;
                    };
                    if msg.msg_type() == Some(msg_type::EXECUTION_REPORT)
                        && msg.get(tag::CL_ORD_ID) == Some(cl_ord_id.as_str())
                    {
                        latencies.push(send_at.elapsed().as_secs_f64());
                        break;
                    }
                }
            }

            if let Some(pause) = sleep_between {
                thread::sleep(pause);
            }
        }
        info!(worker_id, sent, "completed sends");
        Ok(())
    })();

    if let Err(e) = session {
        error!(worker_id, "worker error: {e}");
    }
    client.disconnect();

    let elapsed_s = start.elapsed().as_secs_f64().max(f64::MIN_POSITIVE);
    let stats = WorkerStats {
        worker_id,
        sent,
        elapsed_s,
        rate_msg_per_s: sent as f64 / elapsed_s,
        first_send_unix_ms: first_send,
        last_send_unix_ms: last_send,
        latency: LatencyStats::from_samples(&latencies),
    };
    (stats, latencies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use torii_fix::codec::FrameBuffer;

    /// Scripted acceptor: logon echo plus one ExecutionReport per
    /// NewOrderSingle, echoing the ClOrdID.
    fn acceptor(listener: TcpListener, sessions: usize) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let mut handles = Vec::new();
            for _ in 0..sessions {
                let (stream, _) = listener.accept().unwrap();
                handles.push(thread::spawn(move || serve(stream)));
            }
            for handle in handles {
                let _ = handle.join();
            }
        })
    }

    fn serve(mut stream: TcpStream) {
        let mut frames = FrameBuffer::new();
        let mut chunk = [0u8; 4096];
        let mut out_seq = 1u64;
        loop {
            let n = match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            frames.extend(&chunk[..n]);
            while let Some(frame) = frames.next_frame() {
                let msg = match FixMessage::decode(&frame) {
                    Ok(msg) => msg,
                    Err(_) => continue,
                };
                let reply = match msg.msg_type() {
                    Some(msg_type::LOGON) => Some(FixMessage::with_type(msg_type::LOGON)),
                    Some(msg_type::LOGOUT) => Some(FixMessage::with_type(msg_type::LOGOUT)),
                    Some(msg_type::NEW_ORDER_SINGLE) => {
                        let mut er = FixMessage::with_type(msg_type::EXECUTION_REPORT);
                        er.set(tag::CL_ORD_ID, msg.get(tag::CL_ORD_ID).unwrap_or(""))
                            .set(tag::ORDER_ID, format!("OID{out_seq}"))
                            .set(tag::EXEC_TYPE, "0")
                            .set(tag::ORD_STATUS, "0");
                        Some(er)
                    }
                    _ => None,
                };
                if let Some(mut reply) = reply {
                    let is_logout = reply.msg_type() == Some(msg_type::LOGOUT);
                    reply
                        .set(tag::SENDER_COMP_ID, "OMS")
                        .set(tag::TARGET_COMP_ID, "STRESS")
                        .set(tag::MSG_SEQ_NUM, out_seq.to_string())
                        .set(tag::SENDING_TIME, "20260729-09:00:00.000");
                    out_seq += 1;
                    if stream.write_all(&reply.seal()).is_err() {
                        return;
                    }
                    if is_logout {
                        return;
                    }
                }
            }
        }
    }

    fn base_config(port: u16) -> StressConfig {
        let mut config = StressConfig::new("127.0.0.1", port, "STRESS", "OMS");
        config.connections = 2;
        config.messages_per_conn = 5;
        config.rate = 0.0;
        config.heartbeat = 60;
        config
    }

    #[test]
    fn test_run_counts_and_rates() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = acceptor(listener, 2);

        let report = run(&base_config(port)).unwrap();
        assert_eq!(report.workers.len(), 2);
        assert_eq!(report.total_sent, 10);
        for worker in &report.workers {
            assert_eq!(worker.sent, 5);
            assert!(worker.rate_msg_per_s > 0.0);
            assert!(worker.first_send_unix_ms.is_some());
        }
        assert!(report.rate_p50 > 0.0);
        assert!(report.rate_p99 >= report.rate_p50);
        assert!(report.latency.is_none());

        server.join().unwrap();
    }

    #[test]
    fn test_latency_sampling_one_in_n() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = acceptor(listener, 2);

        let mut config = base_config(port);
        config.measure_latency = true;
        config.latency_sample_every = 2;
        config.tag = Some("smoke".to_string());

        let report = run(&config).unwrap();
        // Messages 0, 2, 4 are sampled in each of the two sessions.
        let latency = report.latency.expect("sampled latency");
        assert_eq!(latency.count, 6);
        assert!(latency.p99_ms >= latency.p50_ms);
        assert_eq!(report.tag.as_deref(), Some("smoke"));

        server.join().unwrap();
    }

    #[test]
    fn test_fatal_config_error_before_connect() {
        let mut config = base_config(1);
        config.side = "9".to_string();
        assert!(run(&config).is_err());
    }
}
