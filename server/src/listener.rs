//! Blocking TCP listener for the RESP protocol.
//!
//! One thread per connection; every command takes the database lock and
//! runs to completion, so command effects are atomic with respect to each
//! other regardless of how many connections are open.

use bytes::BytesMut;
use parking_lot::Mutex;
use protocol_resp::{parse_frame, Command, ParseError};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use store_core::{Db, EventClass, EventSink};

use crate::config::Config;
use crate::execute::execute;
use crate::metrics::{CONNECTIONS_ACCEPTED, CONNECTIONS_ACTIVE, PROTOCOL_ERRORS};
use crate::propagate::Propagation;

const READ_CHUNK: usize = 16 * 1024;

/// Event sink that surfaces keyspace events through tracing.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&mut self, class: EventClass, name: &str, key: &[u8]) {
        tracing::debug!(
            class = ?class,
            event = name,
            key = %String::from_utf8_lossy(key),
            "keyspace event"
        );
    }
}

/// Accept connections until `shutdown` is set.
pub fn run(config: &Config, db: Arc<Mutex<Db>>, shutdown: Arc<AtomicBool>) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.listener.address)?;
    listener.set_nonblocking(true)?;
    tracing::info!(address = %config.listener.address, "listening");

    while !shutdown.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((stream, peer)) => {
                CONNECTIONS_ACCEPTED.increment();
                CONNECTIONS_ACTIVE.increment();
                tracing::debug!(peer = %peer, "connection accepted");
                let db = db.clone();
                std::thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, db) {
                        tracing::debug!(peer = %peer, error = %e, "connection closed");
                    }
                    CONNECTIONS_ACTIVE.decrement();
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn handle_connection(mut stream: TcpStream, db: Arc<Mutex<Db>>) -> std::io::Result<()> {
    stream.set_nodelay(true)?;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(rand::random());
    let mut read_buf = BytesMut::with_capacity(READ_CHUNK);
    let mut write_buf = BytesMut::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Ok(());
        }
        read_buf.extend_from_slice(&chunk[..n]);

        loop {
            let consumed = match parse_frame(&read_buf) {
                Ok(frame) => {
                    serve_frame(&frame.argv, &db, &mut rng, &mut write_buf);
                    frame.consumed
                }
                Err(ParseError::Incomplete) => break,
                Err(ParseError::Protocol(msg)) => {
                    PROTOCOL_ERRORS.increment();
                    tracing::debug!(error = %msg, "protocol error");
                    write_buf.extend_from_slice(b"-ERR Protocol error\r\n");
                    stream.write_all(&write_buf)?;
                    return Ok(());
                }
            };
            let _ = read_buf.split_to(consumed);
        }

        if !write_buf.is_empty() {
            stream.write_all(&write_buf)?;
            write_buf.clear();
        }
    }
}

fn serve_frame(
    argv: &[&[u8]],
    db: &Arc<Mutex<Db>>,
    rng: &mut Xoshiro256PlusPlus,
    write_buf: &mut BytesMut,
) {
    let cmd = match Command::from_argv(argv) {
        Ok(cmd) => cmd,
        Err(e) => {
            write_buf.extend_from_slice(b"-ERR ");
            write_buf.extend_from_slice(e.to_string().as_bytes());
            write_buf.extend_from_slice(b"\r\n");
            return;
        }
    };

    let mut prop = Propagation::new();
    let mut db = db.lock();
    let dirty_before = db.dirty();
    execute(&cmd, &mut db, rng, write_buf, &mut prop);

    // Only commands that actually mutated state reach the log
    if db.dirty() > dirty_before {
        for argv in prop.effective(argv) {
            let line: Vec<String> = argv
                .iter()
                .map(|a| String::from_utf8_lossy(a).into_owned())
                .collect();
            tracing::trace!(command = %line.join(" "), "propagate");
        }
    }
}
