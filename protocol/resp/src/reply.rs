//! Reply stream writing.
//!
//! A [`Reply`] wraps the connection's write buffer and appends RESP-encoded
//! replies. Multi-bulk replies whose length is only known after traversal
//! use [`Reply::begin_array`]/[`Reply::end_array`], which reserve a
//! placeholder position and backfill the element count once it is known.

use bytes::BytesMut;

/// Shared error strings, spelled the way clients expect them.
pub const WRONGTYPE_ERR: &str =
    "WRONGTYPE Operation against a key holding the wrong kind of value";
pub const SYNTAX_ERR: &str = "ERR syntax error";
pub const OUT_OF_RANGE_ERR: &str = "ERR index out of range";
pub const INVALID_CURSOR_ERR: &str = "ERR invalid cursor";

/// Marker for a multi-bulk header whose length is backfilled later.
#[derive(Debug)]
#[must_use = "a deferred array header must be finished with end_array"]
pub struct DeferredLen {
    pos: usize,
}

/// Writer appending RESP replies to a buffer.
pub struct Reply<'a> {
    buf: &'a mut BytesMut,
}

impl<'a> Reply<'a> {
    pub fn new(buf: &'a mut BytesMut) -> Self {
        Self { buf }
    }

    /// `+OK\r\n` style simple string.
    pub fn simple(&mut self, msg: &str) {
        self.buf.extend_from_slice(b"+");
        self.buf.extend_from_slice(msg.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
    }

    /// `-ERR ...\r\n` error reply.
    pub fn error(&mut self, msg: &str) {
        self.buf.extend_from_slice(b"-");
        self.buf.extend_from_slice(msg.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
    }

    /// `:N\r\n` integer reply.
    pub fn integer(&mut self, value: i64) {
        let mut len_buf = itoa::Buffer::new();
        self.buf.extend_from_slice(b":");
        self.buf.extend_from_slice(len_buf.format(value).as_bytes());
        self.buf.extend_from_slice(b"\r\n");
    }

    /// Bulk string reply.
    pub fn bulk(&mut self, data: &[u8]) {
        let mut len_buf = itoa::Buffer::new();
        self.buf.extend_from_slice(b"$");
        self.buf
            .extend_from_slice(len_buf.format(data.len()).as_bytes());
        self.buf.extend_from_slice(b"\r\n");
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
    }

    /// Bulk string reply holding an integer's decimal form.
    pub fn bulk_int(&mut self, value: i64) {
        let mut val_buf = itoa::Buffer::new();
        self.bulk(val_buf.format(value).as_bytes());
    }

    /// Null bulk reply (`$-1\r\n`).
    pub fn null_bulk(&mut self) {
        self.buf.extend_from_slice(b"$-1\r\n");
    }

    /// Multi-bulk header for a known element count.
    pub fn array(&mut self, len: usize) {
        let mut len_buf = itoa::Buffer::new();
        self.buf.extend_from_slice(b"*");
        self.buf.extend_from_slice(len_buf.format(len).as_bytes());
        self.buf.extend_from_slice(b"\r\n");
    }

    /// Empty multi-bulk reply.
    pub fn empty_array(&mut self) {
        self.buf.extend_from_slice(b"*0\r\n");
    }

    /// Start a multi-bulk reply whose length is not yet known. Elements are
    /// written normally afterwards; [`Reply::end_array`] splices the header
    /// in at the remembered position.
    pub fn begin_array(&mut self) -> DeferredLen {
        DeferredLen {
            pos: self.buf.len(),
        }
    }

    /// Backfill the element count recorded by [`Reply::begin_array`].
    pub fn end_array(&mut self, deferred: DeferredLen, len: usize) {
        let tail = self.buf.split_off(deferred.pos);
        self.array(len);
        self.buf.unsplit(tail);
    }
}
