//! Command execution - bridges protocol commands to the keyspace.
//!
//! Every handler validates before it mutates: type and argument errors are
//! discovered while the reply buffer is still untouched, so an error reply
//! never follows partial output. Mutating handlers report keyspace events,
//! bump the dirty counter, and hand derived commands to the replication
//! shim; non-deterministic destructive commands (the SPOP family and
//! SRANDMEMBERSTORE) never propagate verbatim.

use bytes::BytesMut;
use protocol_resp::reply::{
    Reply, INVALID_CURSOR_ERR, OUT_OF_RANGE_ERR, SYNTAX_ERR, WRONGTYPE_ERR,
};
use protocol_resp::Command;
use rand::Rng;
use store_core::glob::glob_match;
use store_core::set::{Element, Set};
use store_core::value::parse_int64;
use store_core::{Db, EventClass, HtSet, Object, StoreError};

use crate::metrics::{
    DELETES, GETS, SETS, SET_MULTI_KEY_OPS, SET_SINGLE_KEY_OPS, WRONGTYPE_ERRORS,
};
use crate::propagate::Propagation;

/// How many times larger the remaining side must be, relative to the popped
/// side, for SPOP to keep sampling instead of rebuilding the remainder.
const SPOP_MOVE_STRATEGY_MUL: usize = 5;

/// Requested-count multiplier above which SRANDMEMBER builds the whole set
/// and subtracts instead of sampling until unique.
const SRANDMEMBER_SUB_STRATEGY_MUL: usize = 3;

/// Page size for SSCAN when COUNT is not given.
const SCAN_DEFAULT_COUNT: usize = 10;

/// Command-local errors, reported on the reply stream and never propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmdError {
    WrongType,
    Syntax,
    OutOfRange,
    InvalidCursor,
}

impl From<StoreError> for CmdError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::WrongType => CmdError::WrongType,
        }
    }
}

impl CmdError {
    fn write(&self, reply: &mut Reply) {
        match self {
            CmdError::WrongType => {
                WRONGTYPE_ERRORS.increment();
                reply.error(WRONGTYPE_ERR);
            }
            CmdError::Syntax => reply.error(SYNTAX_ERR),
            CmdError::OutOfRange => reply.error(OUT_OF_RANGE_ERR),
            CmdError::InvalidCursor => reply.error(INVALID_CURSOR_ERR),
        }
    }
}

type CmdResult = Result<(), CmdError>;

/// Execute one command against the database, appending the reply to `out`
/// and recording replication intent in `prop`.
pub fn execute<R: Rng>(
    cmd: &Command<'_>,
    db: &mut Db,
    rng: &mut R,
    out: &mut BytesMut,
    prop: &mut Propagation,
) {
    let mut reply = Reply::new(out);

    let result = match cmd {
        Command::Ping => {
            reply.simple("PONG");
            Ok(())
        }
        Command::Get { key } => {
            GETS.increment();
            get(db, key, &mut reply)
        }
        Command::Set { key, value } => {
            SETS.increment();
            set(db, key, value, &mut reply)
        }
        Command::Del { key } => {
            DELETES.increment();
            del(db, key, &mut reply)
        }
        Command::SAdd { key, members } => {
            SET_SINGLE_KEY_OPS.increment();
            sadd(db, key, members, &mut reply)
        }
        Command::SRem { key, members } => {
            SET_SINGLE_KEY_OPS.increment();
            srem(db, key, members, &mut reply)
        }
        Command::SIsMember { key, member } => {
            SET_SINGLE_KEY_OPS.increment();
            sismember(db, key, member, &mut reply)
        }
        Command::SCard { key } => {
            SET_SINGLE_KEY_OPS.increment();
            scard(db, key, &mut reply)
        }
        Command::SMove { src, dst, member } => {
            SET_SINGLE_KEY_OPS.increment();
            smove(db, src, dst, member, &mut reply)
        }
        Command::SPop { key, count } => {
            SET_SINGLE_KEY_OPS.increment();
            match count {
                None => spop_single(db, key, rng, &mut reply, prop),
                Some(raw) => spop_with_count(db, key, raw, rng, &mut reply, prop),
            }
        }
        Command::SRandMember { key, count } => {
            SET_SINGLE_KEY_OPS.increment();
            match count {
                None => srandmember_single(db, key, rng, &mut reply),
                Some(raw) => srandmember_with_count(db, key, raw, rng, &mut reply),
            }
        }
        Command::SRandMemberStore { dst, key, count } => {
            SET_SINGLE_KEY_OPS.increment();
            srandmember_store(db, dst, key, count, rng, &mut reply, prop)
        }
        Command::SMembers { key } => {
            SET_MULTI_KEY_OPS.increment();
            sinter_generic(db, &[*key], None, &mut reply)
        }
        Command::SInter { keys } => {
            SET_MULTI_KEY_OPS.increment();
            sinter_generic(db, keys, None, &mut reply)
        }
        Command::SInterStore { dst, keys } => {
            SET_MULTI_KEY_OPS.increment();
            sinter_generic(db, keys, Some(*dst), &mut reply)
        }
        Command::SUnion { keys } => {
            SET_MULTI_KEY_OPS.increment();
            sunion_diff_generic(db, keys, None, SetOp::Union, &mut reply)
        }
        Command::SUnionStore { dst, keys } => {
            SET_MULTI_KEY_OPS.increment();
            sunion_diff_generic(db, keys, Some(*dst), SetOp::Union, &mut reply)
        }
        Command::SDiff { keys } => {
            SET_MULTI_KEY_OPS.increment();
            sunion_diff_generic(db, keys, None, SetOp::Diff, &mut reply)
        }
        Command::SDiffStore { dst, keys } => {
            SET_MULTI_KEY_OPS.increment();
            sunion_diff_generic(db, keys, Some(*dst), SetOp::Diff, &mut reply)
        }
        Command::SScan { key, cursor, args } => {
            SET_SINGLE_KEY_OPS.increment();
            sscan(db, key, cursor, args, &mut reply)
        }
    };

    if let Err(e) = result {
        e.write(&mut reply);
    }
}

fn write_element(reply: &mut Reply, element: &Element<'_>) {
    match element {
        Element::Int(v) => reply.bulk_int(*v),
        Element::Str(s) => reply.bulk(s),
    }
}

/// Parse a command count argument: canonical signed 64-bit decimal.
fn parse_count(raw: &[u8]) -> Result<i64, CmdError> {
    parse_int64(raw).ok_or(CmdError::Syntax)
}

fn get(db: &Db, key: &[u8], reply: &mut Reply) -> CmdResult {
    match db.lookup(key) {
        None => reply.null_bulk(),
        Some(Object::String(value)) => reply.bulk(value),
        Some(_) => return Err(CmdError::WrongType),
    }
    Ok(())
}

fn set(db: &mut Db, key: &[u8], value: &[u8], reply: &mut Reply) -> CmdResult {
    db.insert(key, Object::String(value.into()));
    db.signal_modified(key);
    db.add_dirty(1);
    reply.simple("OK");
    Ok(())
}

fn del(db: &mut Db, key: &[u8], reply: &mut Reply) -> CmdResult {
    if db.remove(key) {
        db.signal_modified(key);
        db.notify(EventClass::Generic, "del", key);
        db.add_dirty(1);
        reply.integer(1);
    } else {
        reply.integer(0);
    }
    Ok(())
}

fn sadd(db: &mut Db, key: &[u8], members: &[&[u8]], reply: &mut Reply) -> CmdResult {
    let max = db.max_intset_entries();
    let set = db.get_or_create_set(key, members[0])?;

    let mut added: u64 = 0;
    for member in members {
        if set.add(member, max) {
            added += 1;
        }
    }
    if added > 0 {
        db.signal_modified(key);
        db.notify(EventClass::Set, "sadd", key);
    }
    db.add_dirty(added);
    reply.integer(added as i64);
    Ok(())
}

fn srem(db: &mut Db, key: &[u8], members: &[&[u8]], reply: &mut Reply) -> CmdResult {
    let Some(set) = db.get_set_mut(key)? else {
        reply.integer(0);
        return Ok(());
    };

    let mut removed: u64 = 0;
    let mut key_removed = false;
    for member in members {
        if set.remove(member) {
            removed += 1;
            if set.is_empty() {
                key_removed = true;
                break;
            }
        }
    }
    if key_removed {
        db.remove(key);
    }
    if removed > 0 {
        db.signal_modified(key);
        db.notify(EventClass::Set, "srem", key);
        if key_removed {
            db.notify(EventClass::Generic, "del", key);
        }
        db.add_dirty(removed);
    }
    reply.integer(removed as i64);
    Ok(())
}

fn sismember(db: &Db, key: &[u8], member: &[u8], reply: &mut Reply) -> CmdResult {
    let present = match db.get_set(key)? {
        Some(set) => set.contains(member),
        None => false,
    };
    reply.integer(present as i64);
    Ok(())
}

fn scard(db: &Db, key: &[u8], reply: &mut Reply) -> CmdResult {
    let len = match db.get_set(key)? {
        Some(set) => set.len(),
        None => 0,
    };
    reply.integer(len as i64);
    Ok(())
}

fn smove(db: &mut Db, src: &[u8], dst: &[u8], member: &[u8], reply: &mut Reply) -> CmdResult {
    // A missing source replies 0 before any type checking
    if db.lookup(src).is_none() {
        reply.integer(0);
        return Ok(());
    }
    db.get_set(src)?;
    db.get_set(dst)?;

    // Same key: report membership without mutating
    if src == dst {
        let present = match db.get_set(src)? {
            Some(set) => set.contains(member),
            None => false,
        };
        reply.integer(present as i64);
        return Ok(());
    }

    let removed = match db.get_set_mut(src)? {
        Some(set) => set.remove(member),
        None => false,
    };
    if !removed {
        reply.integer(0);
        return Ok(());
    }
    db.notify(EventClass::Set, "srem", src);

    let src_empty = match db.get_set(src)? {
        Some(set) => set.is_empty(),
        None => false,
    };
    if src_empty {
        db.remove(src);
        db.notify(EventClass::Generic, "del", src);
    }
    db.signal_modified(src);
    db.signal_modified(dst);
    db.add_dirty(1);

    let max = db.max_intset_entries();
    let dst_set = db.get_or_create_set(dst, member)?;
    if dst_set.add(member, max) {
        db.add_dirty(1);
        db.notify(EventClass::Set, "sadd", dst);
    }
    reply.integer(1);
    Ok(())
}

fn spop_single<R: Rng>(
    db: &mut Db,
    key: &[u8],
    rng: &mut R,
    reply: &mut Reply,
    prop: &mut Propagation,
) -> CmdResult {
    let Some(set) = db.get_set_mut(key)? else {
        reply.null_bulk();
        return Ok(());
    };

    let element = match set.random(rng) {
        Some(e) => e.to_bytes(),
        None => {
            reply.null_bulk();
            return Ok(());
        }
    };
    set.remove(&element);

    db.notify(EventClass::Set, "spop", key);
    prop.rewrite_current(vec![b"SREM".to_vec(), key.to_vec(), element.clone()]);
    reply.bulk(&element);

    let now_empty = match db.get_set(key)? {
        Some(set) => set.is_empty(),
        None => false,
    };
    if now_empty {
        db.remove(key);
        db.notify(EventClass::Generic, "del", key);
    }
    db.signal_modified(key);
    db.add_dirty(1);
    Ok(())
}

fn spop_with_count<R: Rng>(
    db: &mut Db,
    key: &[u8],
    raw_count: &[u8],
    rng: &mut R,
    reply: &mut Reply,
    prop: &mut Propagation,
) -> CmdResult {
    let l = parse_count(raw_count)?;
    if l < 0 {
        return Err(CmdError::OutOfRange);
    }
    let count = l as usize;

    let size = match db.get_set(key)? {
        Some(set) => set.len(),
        None => {
            reply.empty_array();
            return Ok(());
        }
    };
    if count == 0 {
        reply.empty_array();
        return Ok(());
    }

    db.notify(EventClass::Set, "spop", key);
    db.add_dirty(count as u64);

    // Requested at least the whole set: return everything and drop the key.
    if count >= size {
        if let Some(set) = db.get_set(key)? {
            reply.array(size);
            for element in set.iter() {
                write_element(reply, &element);
            }
        }
        db.remove(key);
        db.notify(EventClass::Generic, "del", key);
        prop.rewrite_current(vec![b"DEL".to_vec(), key.to_vec()]);
        db.signal_modified(key);
        db.add_dirty(1);
        return Ok(());
    }

    let remaining = size - count;
    reply.array(count);

    if remaining * SPOP_MOVE_STRATEGY_MUL > count {
        // The popped side is small: draw, reply, remove, one SREM each.
        if let Some(set) = db.get_set_mut(key)? {
            for _ in 0..count {
                let element = match set.random(rng) {
                    Some(e) => e.to_bytes(),
                    None => break,
                };
                reply.bulk(&element);
                set.remove(&element);
                prop.propagate(vec![b"SREM".to_vec(), key.to_vec(), element]);
            }
        }
    } else {
        // The popped side dominates: draw the survivors into a fresh set,
        // swap it in, then return and propagate the complement.
        let max = db.max_intset_entries();
        let Some(Object::Set(mut old)) = db.take(key) else {
            return Ok(());
        };
        let mut survivors: Option<Set> = None;
        for _ in 0..remaining {
            let element = match old.random(rng) {
                Some(e) => e.to_bytes(),
                None => break,
            };
            survivors
                .get_or_insert_with(|| Set::for_value(&element))
                .add(&element, max);
            old.remove(&element);
        }
        if let Some(survivors) = survivors {
            db.insert(key, Object::Set(survivors));
        }
        for element in old.iter() {
            let bytes = element.to_bytes();
            reply.bulk(&bytes);
            prop.propagate(vec![b"SREM".to_vec(), key.to_vec(), bytes]);
        }
    }

    // The SREMs above carry the whole effect; the SPOP itself must not
    // reach the log or replicas.
    prop.suppress_current();
    Ok(())
}

fn srandmember_single<R: Rng>(db: &Db, key: &[u8], rng: &mut R, reply: &mut Reply) -> CmdResult {
    let Some(set) = db.get_set(key)? else {
        reply.null_bulk();
        return Ok(());
    };
    match set.random(rng) {
        Some(element) => write_element(reply, &element),
        None => reply.null_bulk(),
    }
    Ok(())
}

fn srandmember_with_count<R: Rng>(
    db: &Db,
    key: &[u8],
    raw_count: &[u8],
    rng: &mut R,
    reply: &mut Reply,
) -> CmdResult {
    let l = parse_count(raw_count)?;
    let (count, unique) = if l >= 0 {
        (l as usize, true)
    } else {
        // Negative count: independent draws, repetition allowed
        (l.unsigned_abs() as usize, false)
    };

    let Some(set) = db.get_set(key)? else {
        reply.empty_array();
        return Ok(());
    };
    let size = set.len();
    if count == 0 {
        reply.empty_array();
        return Ok(());
    }

    if !unique {
        reply.array(count);
        for _ in 0..count {
            if let Some(element) = set.random(rng) {
                write_element(reply, &element);
            }
        }
        return Ok(());
    }

    if count >= size {
        reply.array(size);
        for element in set.iter() {
            write_element(reply, &element);
        }
        return Ok(());
    }

    let chosen = choose_distinct(set, count, size, rng);
    reply.array(count);
    for member in chosen.iter() {
        reply.bulk(member);
    }
    Ok(())
}

/// Pick `count` distinct members of `set` (0 < count < size), choosing the
/// strategy by how close the request is to the whole set.
fn choose_distinct<R: Rng>(set: &Set, count: usize, size: usize, rng: &mut R) -> HtSet {
    if count * SRANDMEMBER_SUB_STRATEGY_MUL > size {
        // Near-total request: start from everything and evict random
        // members until the requested count remains.
        let mut temp = HtSet::with_capacity(size);
        for element in set.iter() {
            temp.insert(&element.to_bytes());
        }
        while temp.len() > count {
            let victim = temp.random(rng).map(|m| m.to_vec());
            if let Some(victim) = victim {
                temp.remove(&victim);
            }
        }
        temp
    } else {
        // Small request: sample until enough distinct members accumulate.
        let mut temp = HtSet::with_capacity(count);
        while temp.len() < count {
            if let Some(element) = set.random(rng) {
                temp.insert(&element.to_bytes());
            }
        }
        temp
    }
}

fn srandmember_store<R: Rng>(
    db: &mut Db,
    dst: &[u8],
    key: &[u8],
    raw_count: &[u8],
    rng: &mut R,
    reply: &mut Reply,
    prop: &mut Propagation,
) -> CmdResult {
    let l = parse_count(raw_count)?;
    let (count, unique) = if l >= 0 {
        (l as usize, true)
    } else {
        (l.unsigned_abs() as usize, false)
    };

    let max = db.max_intset_entries();
    let mut chosen = Set::new_intset();
    if let Some(set) = db.get_set(key)? {
        let size = set.len();
        if count > 0 {
            if !unique {
                for _ in 0..count {
                    if let Some(element) = set.random(rng) {
                        chosen.add_element(&element, max);
                    }
                }
            } else if count >= size {
                for element in set.iter() {
                    chosen.add_element(&element, max);
                }
            } else {
                let distinct = choose_distinct(set, count, size, rng);
                for member in distinct.iter() {
                    chosen.add(member, max);
                }
            }
        }
    }

    // Deterministic replacement for the log: clear the destination, then
    // re-add exactly what was chosen.
    prop.propagate(vec![b"DEL".to_vec(), dst.to_vec()]);
    if !chosen.is_empty() {
        let mut argv = Vec::with_capacity(chosen.len() + 2);
        argv.push(b"SADD".to_vec());
        argv.push(dst.to_vec());
        argv.extend(chosen.iter().map(|e| e.to_bytes()));
        prop.propagate(argv);
    }
    prop.suppress_current();

    let deleted = db.remove(dst);
    let cardinality = chosen.len();
    if cardinality > 0 {
        db.insert(dst, Object::Set(chosen));
        reply.integer(cardinality as i64);
        db.notify(EventClass::Set, "srandmemberstore", dst);
    } else {
        reply.integer(0);
        if deleted {
            db.notify(EventClass::Generic, "del", dst);
        }
    }
    db.signal_modified(dst);
    db.add_dirty(1);
    Ok(())
}

fn sinter_generic(
    db: &mut Db,
    keys: &[&[u8]],
    dst: Option<&[u8]>,
    reply: &mut Reply,
) -> CmdResult {
    // Keys are examined in order: a missing key short-circuits to an empty
    // result before later keys are type-checked.
    for key in keys {
        if db.get_set(key)?.is_none() {
            match dst {
                Some(dst) => {
                    if db.remove(dst) {
                        db.signal_modified(dst);
                        db.add_dirty(1);
                    }
                    reply.integer(0);
                }
                None => reply.empty_array(),
            }
            return Ok(());
        }
    }

    let mut sets: Vec<&Set> = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(set) = db.get_set(key)? {
            sets.push(set);
        }
    }

    // Smallest set first bounds the probe count
    sets.sort_by_key(|s| s.len());
    let Some((&first, rest)) = sets.split_first() else {
        return Ok(());
    };

    let included = |element: &Element<'_>| {
        rest.iter()
            .all(|other| std::ptr::eq(*other, first) || other.contains_element(element))
    };

    match dst {
        None => {
            let deferred = reply.begin_array();
            let mut cardinality = 0;
            for element in first.iter() {
                if included(&element) {
                    write_element(reply, &element);
                    cardinality += 1;
                }
            }
            reply.end_array(deferred, cardinality);
            Ok(())
        }
        Some(dst) => {
            let max = db.max_intset_entries();
            let mut result = Set::new_intset();
            for element in first.iter() {
                if included(&element) {
                    result.add_element(&element, max);
                }
            }
            install_store_result(db, dst, result, "sinterstore", reply);
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetOp {
    Union,
    Diff,
}

fn sunion_diff_generic(
    db: &mut Db,
    keys: &[&[u8]],
    dst: Option<&[u8]>,
    op: SetOp,
    reply: &mut Reply,
) -> CmdResult {
    // Missing keys participate as empty sets
    let mut sets: Vec<Option<&Set>> = Vec::with_capacity(keys.len());
    for key in keys {
        sets.push(db.get_set(key)?);
    }

    // For DIFF, pick between probing every element of the first set against
    // the others (good when overlap is high) and building the first set then
    // subtracting (linear in the total input).
    let mut probe = true;
    if op == SetOp::Diff {
        if let Some(first) = sets[0] {
            let n0 = first.len();
            let mut work_probe = 0usize;
            let mut work_subtract = 0usize;
            for set in sets.iter().flatten() {
                work_probe += n0;
                work_subtract += set.len();
            }
            // Probing has the better constant factor; give it an edge
            work_probe /= 2;
            probe = work_probe <= work_subtract;

            if probe && sets.len() > 1 {
                // Largest subtrahends first so probes short-circuit early
                sets[1..].sort_by_key(|s| std::cmp::Reverse(s.map_or(0, |set| set.len())));
            }
        }
    }

    let max = db.max_intset_entries();
    let mut result = Set::new_intset();
    let mut cardinality: usize = 0;

    match op {
        SetOp::Union => {
            for set in sets.iter().flatten() {
                for element in set.iter() {
                    if result.add_element(&element, max) {
                        cardinality += 1;
                    }
                }
            }
        }
        SetOp::Diff if probe => {
            if let Some(first) = sets[0] {
                for element in first.iter() {
                    let mut duplicated = false;
                    for other in &sets[1..] {
                        let Some(other) = other else { continue };
                        if std::ptr::eq(*other, first) || other.contains_element(&element) {
                            duplicated = true;
                            break;
                        }
                    }
                    if !duplicated {
                        result.add_element(&element, max);
                        cardinality += 1;
                    }
                }
            }
        }
        SetOp::Diff => {
            for (position, set) in sets.iter().enumerate() {
                let Some(set) = set else { continue };
                if position == 0 {
                    for element in set.iter() {
                        if result.add_element(&element, max) {
                            cardinality += 1;
                        }
                    }
                } else {
                    for element in set.iter() {
                        if result.remove_element(&element) {
                            cardinality -= 1;
                        }
                    }
                }
                // Nothing left to subtract from
                if cardinality == 0 {
                    break;
                }
            }
        }
    }

    match dst {
        None => {
            reply.array(cardinality);
            for element in result.iter() {
                write_element(reply, &element);
            }
        }
        Some(dst) => {
            let event = match op {
                SetOp::Union => "sunionstore",
                SetOp::Diff => "sdiffstore",
            };
            install_store_result(db, dst, result, event, reply);
        }
    }
    Ok(())
}

/// Replace the destination key with a freshly computed set, or delete it
/// when the result is empty.
fn install_store_result(db: &mut Db, dst: &[u8], result: Set, event: &str, reply: &mut Reply) {
    let deleted = db.remove(dst);
    let cardinality = result.len();
    if cardinality > 0 {
        db.insert(dst, Object::Set(result));
        reply.integer(cardinality as i64);
        db.notify(EventClass::Set, event, dst);
    } else {
        reply.integer(0);
        if deleted {
            db.notify(EventClass::Generic, "del", dst);
        }
    }
    db.signal_modified(dst);
    db.add_dirty(1);
}

fn sscan(
    db: &Db,
    key: &[u8],
    raw_cursor: &[u8],
    args: &[&[u8]],
    reply: &mut Reply,
) -> CmdResult {
    let cursor = std::str::from_utf8(raw_cursor)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or(CmdError::InvalidCursor)?;

    let mut count = SCAN_DEFAULT_COUNT;
    let mut pattern: Option<&[u8]> = None;
    let mut i = 0;
    while i < args.len() {
        if args[i].eq_ignore_ascii_case(b"match") && i + 1 < args.len() {
            pattern = Some(args[i + 1]);
            i += 2;
        } else if args[i].eq_ignore_ascii_case(b"count") && i + 1 < args.len() {
            let n = parse_count(args[i + 1])?;
            if n < 1 {
                return Err(CmdError::Syntax);
            }
            count = n as usize;
            i += 2;
        } else {
            return Err(CmdError::Syntax);
        }
    }

    let Some(set) = db.get_set(key)? else {
        reply.array(2);
        reply.bulk(b"0");
        reply.empty_array();
        return Ok(());
    };

    let matches = |element: &Element<'_>| -> bool {
        let Some(pattern) = pattern else { return true };
        match element {
            Element::Str(s) => glob_match(pattern, s),
            Element::Int(v) => {
                let mut buf = itoa::Buffer::new();
                glob_match(pattern, buf.format(*v).as_bytes())
            }
        }
    };

    let (next, page) = set.scan(cursor, count);
    reply.array(2);
    let mut cursor_buf = itoa::Buffer::new();
    reply.bulk(cursor_buf.format(next).as_bytes());
    let deferred = reply.begin_array();
    let mut emitted = 0;
    for element in &page {
        if matches(element) {
            write_element(reply, element);
            emitted += 1;
        }
    }
    reply.end_array(deferred, emitted);
    Ok(())
}
