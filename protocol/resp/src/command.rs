//! Server-side command parsing.
//!
//! Parsing is split in two phases. [`parse_frame`] consumes one RESP array
//! of bulk strings with zero-copy argument slices; framing errors are
//! connection-fatal. [`Command::from_argv`] then maps the argument vector to
//! a typed command; its errors are ordinary error replies and the connection
//! continues. Count and cursor arguments are carried as raw bytes because
//! their validation errors belong to command execution, not the wire.

use crate::error::{CommandError, ParseError};

/// Default cap on a single bulk string, matching the largest value the
/// server will accept.
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Cap on elements in one command frame.
const MAX_ARGV: usize = 1024 * 1024;

/// One parsed RESP frame: the argument vector and how many input bytes it
/// consumed. Argument slices reference the input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    pub argv: Vec<&'a [u8]>,
    pub consumed: usize,
}

/// Parse one command frame (`*N\r\n` followed by N bulk strings).
///
/// Returns `ParseError::Incomplete` when more data is needed.
pub fn parse_frame(buffer: &[u8]) -> Result<Frame<'_>, ParseError> {
    let mut cursor = Cursor::new(buffer);

    if cursor.remaining() < 1 {
        return Err(ParseError::Incomplete);
    }
    if cursor.get_u8() != b'*' {
        return Err(ParseError::Protocol("expected array".to_string()));
    }

    let count = cursor.read_length()?;
    if count < 1 {
        return Err(ParseError::Protocol(
            "array must have at least 1 element".to_string(),
        ));
    }
    if count > MAX_ARGV {
        return Err(ParseError::Protocol("array too large".to_string()));
    }

    let mut argv = Vec::with_capacity(count);
    for _ in 0..count {
        argv.push(cursor.read_bulk_string()?);
    }

    Ok(Frame {
        argv,
        consumed: cursor.position(),
    })
}

/// A parsed command with references to the original buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Ping,
    Get { key: &'a [u8] },
    Set { key: &'a [u8], value: &'a [u8] },
    Del { key: &'a [u8] },

    SAdd { key: &'a [u8], members: Vec<&'a [u8]> },
    SRem { key: &'a [u8], members: Vec<&'a [u8]> },
    SIsMember { key: &'a [u8], member: &'a [u8] },
    SCard { key: &'a [u8] },
    SMembers { key: &'a [u8] },
    SMove { src: &'a [u8], dst: &'a [u8], member: &'a [u8] },
    SPop { key: &'a [u8], count: Option<&'a [u8]> },
    SRandMember { key: &'a [u8], count: Option<&'a [u8]> },
    SRandMemberStore { dst: &'a [u8], key: &'a [u8], count: &'a [u8] },
    SInter { keys: Vec<&'a [u8]> },
    SInterStore { dst: &'a [u8], keys: Vec<&'a [u8]> },
    SUnion { keys: Vec<&'a [u8]> },
    SUnionStore { dst: &'a [u8], keys: Vec<&'a [u8]> },
    SDiff { keys: Vec<&'a [u8]> },
    SDiffStore { dst: &'a [u8], keys: Vec<&'a [u8]> },
    SScan { key: &'a [u8], cursor: &'a [u8], args: Vec<&'a [u8]> },
}

impl<'a> Command<'a> {
    /// Build a command from a well-framed argument vector.
    pub fn from_argv(argv: &[&'a [u8]]) -> Result<Self, CommandError> {
        let name = argv[0];

        let command = match () {
            _ if name.eq_ignore_ascii_case(b"ping") => {
                arity_exact(argv, 1, "ping")?;
                Command::Ping
            }
            _ if name.eq_ignore_ascii_case(b"get") => {
                arity_exact(argv, 2, "get")?;
                Command::Get { key: argv[1] }
            }
            _ if name.eq_ignore_ascii_case(b"set") => {
                arity_exact(argv, 3, "set")?;
                Command::Set {
                    key: argv[1],
                    value: argv[2],
                }
            }
            _ if name.eq_ignore_ascii_case(b"del") => {
                arity_exact(argv, 2, "del")?;
                Command::Del { key: argv[1] }
            }
            _ if name.eq_ignore_ascii_case(b"sadd") => {
                arity_min(argv, 3, "sadd")?;
                Command::SAdd {
                    key: argv[1],
                    members: argv[2..].to_vec(),
                }
            }
            _ if name.eq_ignore_ascii_case(b"srem") => {
                arity_min(argv, 3, "srem")?;
                Command::SRem {
                    key: argv[1],
                    members: argv[2..].to_vec(),
                }
            }
            _ if name.eq_ignore_ascii_case(b"sismember") => {
                arity_exact(argv, 3, "sismember")?;
                Command::SIsMember {
                    key: argv[1],
                    member: argv[2],
                }
            }
            _ if name.eq_ignore_ascii_case(b"scard") => {
                arity_exact(argv, 2, "scard")?;
                Command::SCard { key: argv[1] }
            }
            _ if name.eq_ignore_ascii_case(b"smembers") => {
                arity_exact(argv, 2, "smembers")?;
                Command::SMembers { key: argv[1] }
            }
            _ if name.eq_ignore_ascii_case(b"smove") => {
                arity_exact(argv, 4, "smove")?;
                Command::SMove {
                    src: argv[1],
                    dst: argv[2],
                    member: argv[3],
                }
            }
            _ if name.eq_ignore_ascii_case(b"spop") => {
                arity_min(argv, 2, "spop")?;
                if argv.len() > 3 {
                    return Err(CommandError::Syntax);
                }
                Command::SPop {
                    key: argv[1],
                    count: argv.get(2).copied(),
                }
            }
            _ if name.eq_ignore_ascii_case(b"srandmember") => {
                arity_min(argv, 2, "srandmember")?;
                if argv.len() > 3 {
                    return Err(CommandError::Syntax);
                }
                Command::SRandMember {
                    key: argv[1],
                    count: argv.get(2).copied(),
                }
            }
            _ if name.eq_ignore_ascii_case(b"srandmemberstore") => {
                if argv.len() != 4 {
                    return Err(CommandError::Syntax);
                }
                Command::SRandMemberStore {
                    dst: argv[1],
                    key: argv[2],
                    count: argv[3],
                }
            }
            _ if name.eq_ignore_ascii_case(b"sinter") => {
                arity_min(argv, 2, "sinter")?;
                Command::SInter {
                    keys: argv[1..].to_vec(),
                }
            }
            _ if name.eq_ignore_ascii_case(b"sinterstore") => {
                arity_min(argv, 3, "sinterstore")?;
                Command::SInterStore {
                    dst: argv[1],
                    keys: argv[2..].to_vec(),
                }
            }
            _ if name.eq_ignore_ascii_case(b"sunion") => {
                arity_min(argv, 2, "sunion")?;
                Command::SUnion {
                    keys: argv[1..].to_vec(),
                }
            }
            _ if name.eq_ignore_ascii_case(b"sunionstore") => {
                arity_min(argv, 3, "sunionstore")?;
                Command::SUnionStore {
                    dst: argv[1],
                    keys: argv[2..].to_vec(),
                }
            }
            _ if name.eq_ignore_ascii_case(b"sdiff") => {
                arity_min(argv, 2, "sdiff")?;
                Command::SDiff {
                    keys: argv[1..].to_vec(),
                }
            }
            _ if name.eq_ignore_ascii_case(b"sdiffstore") => {
                arity_min(argv, 3, "sdiffstore")?;
                Command::SDiffStore {
                    dst: argv[1],
                    keys: argv[2..].to_vec(),
                }
            }
            _ if name.eq_ignore_ascii_case(b"sscan") => {
                arity_min(argv, 3, "sscan")?;
                Command::SScan {
                    key: argv[1],
                    cursor: argv[2],
                    args: argv[3..].to_vec(),
                }
            }
            _ => {
                return Err(CommandError::Unknown(
                    String::from_utf8_lossy(name).into_owned(),
                ));
            }
        };

        Ok(command)
    }

    /// The command name as sent on the wire, uppercase.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::Del { .. } => "DEL",
            Command::SAdd { .. } => "SADD",
            Command::SRem { .. } => "SREM",
            Command::SIsMember { .. } => "SISMEMBER",
            Command::SCard { .. } => "SCARD",
            Command::SMembers { .. } => "SMEMBERS",
            Command::SMove { .. } => "SMOVE",
            Command::SPop { .. } => "SPOP",
            Command::SRandMember { .. } => "SRANDMEMBER",
            Command::SRandMemberStore { .. } => "SRANDMEMBERSTORE",
            Command::SInter { .. } => "SINTER",
            Command::SInterStore { .. } => "SINTERSTORE",
            Command::SUnion { .. } => "SUNION",
            Command::SUnionStore { .. } => "SUNIONSTORE",
            Command::SDiff { .. } => "SDIFF",
            Command::SDiffStore { .. } => "SDIFFSTORE",
            Command::SScan { .. } => "SSCAN",
        }
    }
}

fn arity_exact(argv: &[&[u8]], want: usize, name: &'static str) -> Result<(), CommandError> {
    if argv.len() != want {
        return Err(CommandError::WrongArity(name));
    }
    Ok(())
}

fn arity_min(argv: &[&[u8]], want: usize, name: &'static str) -> Result<(), CommandError> {
    if argv.len() < want {
        return Err(CommandError::WrongArity(name));
    }
    Ok(())
}

/// A cursor for reading RESP data from a buffer.
struct Cursor<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }

    #[inline]
    fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn get_u8(&mut self) -> u8 {
        let b = self.buffer[self.pos];
        self.pos += 1;
        b
    }

    /// Read bytes up to the next CRLF, consuming the terminator.
    fn read_line(&mut self) -> Result<&'a [u8], ParseError> {
        let start = self.pos;
        let Some(offset) = memchr::memchr(b'\r', &self.buffer[start..]) else {
            return Err(ParseError::Incomplete);
        };
        let end = start + offset;
        if end + 1 >= self.buffer.len() {
            return Err(ParseError::Incomplete);
        }
        if self.buffer[end + 1] != b'\n' {
            return Err(ParseError::Protocol("expected CRLF".to_string()));
        }
        self.pos = end + 2;
        Ok(&self.buffer[start..end])
    }

    /// Read a non-negative decimal length terminated by CRLF.
    fn read_length(&mut self) -> Result<usize, ParseError> {
        let line = self.read_line()?;
        if line.is_empty() {
            return Err(ParseError::Protocol("empty length".to_string()));
        }
        // usize::MAX is 20 digits; 19 digits cannot overflow during parse
        if line.len() > 19 {
            return Err(ParseError::Protocol("length too large".to_string()));
        }
        let mut result = 0usize;
        for &byte in line {
            if !byte.is_ascii_digit() {
                return Err(ParseError::Protocol("invalid length".to_string()));
            }
            result = result * 10 + (byte - b'0') as usize;
        }
        Ok(result)
    }

    fn read_bulk_string(&mut self) -> Result<&'a [u8], ParseError> {
        if self.remaining() < 1 {
            return Err(ParseError::Incomplete);
        }
        if self.get_u8() != b'$' {
            return Err(ParseError::Protocol("expected bulk string".to_string()));
        }
        let len = self.read_length()?;
        if len > MAX_BULK_LEN {
            return Err(ParseError::Protocol("bulk string too long".to_string()));
        }
        if self.remaining() < len + 2 {
            return Err(ParseError::Incomplete);
        }
        let start = self.pos;
        let data = &self.buffer[start..start + len];
        self.pos += len;
        if &self.buffer[self.pos..self.pos + 2] != b"\r\n" {
            return Err(ParseError::Protocol(
                "bulk string missing terminator".to_string(),
            ));
        }
        self.pos += 2;
        Ok(data)
    }
}
