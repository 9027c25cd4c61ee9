//! Shared test harness: an in-process database, seeded RNG, and a small
//! RESP reply parser so tests can assert on structured replies.

#![allow(dead_code)]

use bytes::BytesMut;
use protocol_resp::Command;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use server::execute::execute;
use server::propagate::Propagation;
use store_core::{Db, Encoding, RecordingSink, StoreConfig};

/// A parsed RESP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resp {
    Simple(String),
    Error(String),
    Int(i64),
    Bulk(Vec<u8>),
    Null,
    Array(Vec<Resp>),
}

impl Resp {
    pub fn as_int(&self) -> i64 {
        match self {
            Resp::Int(v) => *v,
            other => panic!("expected integer reply, got {other:?}"),
        }
    }

    pub fn as_bulk(&self) -> &[u8] {
        match self {
            Resp::Bulk(data) => data,
            other => panic!("expected bulk reply, got {other:?}"),
        }
    }

    pub fn as_error(&self) -> &str {
        match self {
            Resp::Error(msg) => msg,
            other => panic!("expected error reply, got {other:?}"),
        }
    }

    /// Bulk elements of an array reply, sorted for set comparison.
    pub fn members(&self) -> Vec<Vec<u8>> {
        match self {
            Resp::Array(items) => {
                let mut out: Vec<Vec<u8>> = items
                    .iter()
                    .map(|item| item.as_bulk().to_vec())
                    .collect();
                out.sort();
                out
            }
            other => panic!("expected array reply, got {other:?}"),
        }
    }

    /// Bulk elements of an array reply in reply order.
    pub fn elements(&self) -> Vec<Vec<u8>> {
        match self {
            Resp::Array(items) => items.iter().map(|item| item.as_bulk().to_vec()).collect(),
            other => panic!("expected array reply, got {other:?}"),
        }
    }
}

/// Parse one RESP value, returning it and the bytes consumed.
pub fn parse_resp(buf: &[u8]) -> (Resp, usize) {
    fn line(buf: &[u8], at: usize) -> (&str, usize) {
        let end = buf[at..]
            .windows(2)
            .position(|w| w == b"\r\n")
            .expect("unterminated line")
            + at;
        (std::str::from_utf8(&buf[at..end]).unwrap(), end + 2)
    }

    match buf[0] {
        b'+' => {
            let (text, next) = line(buf, 1);
            (Resp::Simple(text.to_string()), next)
        }
        b'-' => {
            let (text, next) = line(buf, 1);
            (Resp::Error(text.to_string()), next)
        }
        b':' => {
            let (text, next) = line(buf, 1);
            (Resp::Int(text.parse().unwrap()), next)
        }
        b'$' => {
            let (text, next) = line(buf, 1);
            let len: i64 = text.parse().unwrap();
            if len < 0 {
                return (Resp::Null, next);
            }
            let len = len as usize;
            let data = buf[next..next + len].to_vec();
            assert_eq!(&buf[next + len..next + len + 2], b"\r\n");
            (Resp::Bulk(data), next + len + 2)
        }
        b'*' => {
            let (text, next) = line(buf, 1);
            let count: usize = text.parse().unwrap();
            let mut items = Vec::with_capacity(count);
            let mut at = next;
            for _ in 0..count {
                let (item, used) = parse_resp(&buf[at..]);
                items.push(item);
                at += used;
            }
            (Resp::Array(items), at)
        }
        other => panic!("unexpected reply byte {other:?}"),
    }
}

/// In-process command harness around one database.
pub struct Harness {
    pub db: Db,
    pub rng: Xoshiro256PlusPlus,
    pub sink: RecordingSink,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_max_intset(512)
    }

    pub fn with_max_intset(max: usize) -> Self {
        Self::with_seed_and_max(42, max)
    }

    pub fn with_seed_and_max(seed: u64, max: usize) -> Self {
        let sink = RecordingSink::new();
        let config = StoreConfig {
            set_max_intset_entries: max,
        };
        let db = Db::with_sink(&config, Box::new(sink.clone()));
        Self {
            db,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            sink,
        }
    }

    /// Run a space-separated command line.
    pub fn run(&mut self, command_line: &str) -> Resp {
        self.run_traced(command_line).0
    }

    /// Run a command line, also returning its propagation record.
    pub fn run_traced(&mut self, command_line: &str) -> (Resp, Propagation) {
        let argv: Vec<&[u8]> = command_line
            .split_whitespace()
            .map(|part| part.as_bytes())
            .collect();
        self.exec(&argv)
    }

    /// Run an argument vector.
    pub fn exec(&mut self, argv: &[&[u8]]) -> (Resp, Propagation) {
        let cmd = Command::from_argv(argv).expect("command should parse");
        let mut out = BytesMut::new();
        let mut prop = Propagation::new();
        execute(&cmd, &mut self.db, &mut self.rng, &mut out, &mut prop);
        let (resp, used) = parse_resp(&out);
        assert_eq!(used, out.len(), "reply had trailing bytes");
        (resp, prop)
    }

    /// Drain recorded keyspace events as (name, key) pairs.
    pub fn events(&self) -> Vec<(String, String)> {
        self.sink
            .take()
            .into_iter()
            .map(|e| (e.name, String::from_utf8_lossy(&e.key).into_owned()))
            .collect()
    }

    pub fn dirty(&self) -> u64 {
        self.db.dirty()
    }

    pub fn encoding_of(&self, key: &str) -> Encoding {
        self.db
            .get_set(key.as_bytes())
            .unwrap()
            .expect("key should hold a set")
            .encoding()
    }

    /// Sorted members of a set key, straight from the store.
    pub fn members_of(&self, key: &str) -> Vec<Vec<u8>> {
        let set = self
            .db
            .get_set(key.as_bytes())
            .unwrap()
            .expect("key should hold a set");
        let mut out: Vec<Vec<u8>> = set.iter().map(|e| e.to_bytes()).collect();
        out.sort();
        out
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.db.contains_key(key.as_bytes())
    }
}
