//! Command-level behavior: replies, events, replication rewrites, and the
//! end-to-end scenarios with a small intset bound.

mod common;

use common::{Harness, Resp};
use store_core::Encoding;

fn bulks(values: &[&str]) -> Vec<Vec<u8>> {
    let mut out: Vec<Vec<u8>> = values.iter().map(|v| v.as_bytes().to_vec()).collect();
    out.sort();
    out
}

// --- end-to-end scenarios (set_max_intset_entries = 4) ---

#[test]
fn scenario_promotion_by_size() {
    let mut h = Harness::with_max_intset(4);
    assert_eq!(h.run("SADD s 1 2 3").as_int(), 3);
    assert_eq!(h.encoding_of("s"), Encoding::IntSet);

    assert_eq!(h.run("SADD s 2 4 5").as_int(), 2);
    assert_eq!(h.encoding_of("s"), Encoding::Hash);

    assert_eq!(h.run("SCARD s").as_int(), 5);
}

#[test]
fn scenario_hash_from_the_start() {
    let mut h = Harness::with_max_intset(4);
    assert_eq!(h.run("SADD x foo bar").as_int(), 2);
    assert_eq!(h.encoding_of("x"), Encoding::Hash);

    assert_eq!(h.run("SISMEMBER x foo").as_int(), 1);
    assert_eq!(h.run("SISMEMBER x baz").as_int(), 0);
    assert_eq!(h.run("SREM x foo bar").as_int(), 2);
    assert!(!h.has_key("x"));
}

#[test]
fn scenario_intersection() {
    let mut h = Harness::with_max_intset(4);
    h.run("SADD a 1 2 3 4");
    h.run("SADD b 3 4 5 6");

    assert_eq!(h.run("SINTER a b").members(), bulks(&["3", "4"]));
    assert_eq!(h.run("SINTERSTORE dst a b").as_int(), 2);
    assert_eq!(h.run("SMEMBERS dst").members(), bulks(&["3", "4"]));
}

#[test]
fn scenario_bulk_pop_rebuilds_remainder() {
    let mut h = Harness::new();
    let mut argv: Vec<Vec<u8>> = vec![b"SADD".to_vec(), b"big".to_vec()];
    for i in 1..=100 {
        argv.push(i.to_string().into_bytes());
    }
    let argv_refs: Vec<&[u8]> = argv.iter().map(|a| a.as_slice()).collect();
    assert_eq!(h.exec(&argv_refs).0.as_int(), 100);

    let (reply, prop) = h.run_traced("SPOP big 95");
    let popped = reply.members();
    assert_eq!(popped.len(), 95);

    assert_eq!(h.run("SCARD big").as_int(), 5);

    // Only derived SREMs reach the log, no SPOP
    let original: Vec<&[u8]> = vec![b"SPOP", b"big", b"95"];
    let effective = prop.effective(&original);
    assert_eq!(effective.len(), 95);
    for argv in &effective {
        assert_eq!(argv[0], b"SREM");
        assert_eq!(argv[1], b"big");
        assert!(popped.contains(&argv[2]));
    }

    // Reply and remainder partition the original set
    let mut all = popped;
    all.extend(h.members_of("big"));
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 100);
}

#[test]
fn scenario_difference_of_three() {
    let mut h = Harness::new();
    h.run("SADD a 1 2 3");
    h.run("SADD b 2");
    h.run("SADD c 3");
    assert_eq!(h.run("SDIFF a b c").members(), bulks(&["1"]));
}

#[test]
fn scenario_move_between_sets() {
    let mut h = Harness::new();
    h.run("SADD src x y");
    h.events();

    assert_eq!(h.run("SMOVE src dst x").as_int(), 1);
    assert_eq!(h.members_of("src"), bulks(&["y"]));
    assert_eq!(h.members_of("dst"), bulks(&["x"]));
    assert_eq!(
        h.events(),
        vec![
            ("srem".to_string(), "src".to_string()),
            ("sadd".to_string(), "dst".to_string()),
        ]
    );

    let dirty = h.dirty();
    assert_eq!(h.run("SMOVE src dst x").as_int(), 0);
    assert!(h.events().is_empty());
    assert_eq!(h.dirty(), dirty);
}

// --- SADD / SREM ---

#[test]
fn sadd_counts_new_members_only() {
    let mut h = Harness::new();
    assert_eq!(h.run("SADD k a b c").as_int(), 3);
    assert_eq!(h.run("SADD k a b d").as_int(), 1);
    assert_eq!(h.dirty(), 4);
    assert_eq!(
        h.events(),
        vec![
            ("sadd".to_string(), "k".to_string()),
            ("sadd".to_string(), "k".to_string()),
        ]
    );

    // Nothing new: no event
    assert_eq!(h.run("SADD k a").as_int(), 0);
    assert!(h.events().is_empty());
}

#[test]
fn sadd_rejects_wrong_type() {
    let mut h = Harness::new();
    h.run("SET k v");
    assert!(h.run("SADD k a").as_error().starts_with("WRONGTYPE"));
    assert_eq!(h.run("GET k").as_bulk(), b"v");
}

#[test]
fn srem_missing_key_is_zero() {
    let mut h = Harness::new();
    assert_eq!(h.run("SREM nope a").as_int(), 0);
    assert!(h.events().is_empty());
    assert_eq!(h.dirty(), 0);
}

#[test]
fn srem_stops_when_set_drains() {
    let mut h = Harness::new();
    h.run("SADD k a b");
    h.events();

    // c is never reached: the set empties first
    assert_eq!(h.run("SREM k a b c").as_int(), 2);
    assert!(!h.has_key("k"));
    assert_eq!(
        h.events(),
        vec![
            ("srem".to_string(), "k".to_string()),
            ("del".to_string(), "k".to_string()),
        ]
    );
}

// --- SISMEMBER / SCARD ---

#[test]
fn membership_and_cardinality_on_missing_key() {
    let mut h = Harness::new();
    assert_eq!(h.run("SISMEMBER nope x").as_int(), 0);
    assert_eq!(h.run("SCARD nope").as_int(), 0);
}

#[test]
fn integer_membership_survives_promotion() {
    let mut h = Harness::with_max_intset(2);
    h.run("SADD k 7 8 9");
    assert_eq!(h.encoding_of("k"), Encoding::Hash);
    assert_eq!(h.run("SISMEMBER k 7").as_int(), 1);
    assert_eq!(h.run("SISMEMBER k 07").as_int(), 0);
}

// --- SMOVE ---

#[test]
fn smove_missing_source_is_zero() {
    let mut h = Harness::new();
    assert_eq!(h.run("SMOVE nope dst x").as_int(), 0);
}

#[test]
fn smove_same_key_reports_membership_without_mutation() {
    let mut h = Harness::new();
    h.run("SADD k x");
    h.events();
    let dirty = h.dirty();

    assert_eq!(h.run("SMOVE k k x").as_int(), 1);
    assert_eq!(h.run("SMOVE k k y").as_int(), 0);
    assert_eq!(h.dirty(), dirty);
    assert!(h.events().is_empty());
}

#[test]
fn smove_deletes_drained_source() {
    let mut h = Harness::new();
    h.run("SADD src x");
    h.run("SADD dst x");
    h.events();

    // Move succeeds even though dst already held x; no sadd event fires
    assert_eq!(h.run("SMOVE src dst x").as_int(), 1);
    assert!(!h.has_key("src"));
    assert_eq!(
        h.events(),
        vec![
            ("srem".to_string(), "src".to_string()),
            ("del".to_string(), "src".to_string()),
        ]
    );
}

#[test]
fn smove_wrong_type_on_either_side() {
    let mut h = Harness::new();
    h.run("SADD src x");
    h.run("SET str v");
    assert!(h.run("SMOVE src str x").as_error().starts_with("WRONGTYPE"));
    assert!(h.run("SMOVE str src x").as_error().starts_with("WRONGTYPE"));
    assert_eq!(h.members_of("src"), bulks(&["x"]));
}

// --- SPOP ---

#[test]
fn spop_single_rewrites_to_srem() {
    let mut h = Harness::new();
    h.run("SADD k a b c");
    h.events();

    let (reply, prop) = h.run_traced("SPOP k");
    let popped = reply.as_bulk().to_vec();
    assert!(bulks(&["a", "b", "c"]).contains(&popped));
    assert_eq!(h.run("SCARD k").as_int(), 2);

    let original: Vec<&[u8]> = vec![b"SPOP", b"k"];
    let effective = prop.effective(&original);
    assert_eq!(effective.len(), 1);
    assert_eq!(effective[0][0], b"SREM");
    assert_eq!(effective[0][2], popped);
    assert_eq!(h.events(), vec![("spop".to_string(), "k".to_string())]);
}

#[test]
fn spop_single_deletes_last_member() {
    let mut h = Harness::new();
    h.run("SADD k only");
    h.events();

    assert_eq!(h.run("SPOP k").as_bulk(), b"only");
    assert!(!h.has_key("k"));
    assert_eq!(
        h.events(),
        vec![
            ("spop".to_string(), "k".to_string()),
            ("del".to_string(), "k".to_string()),
        ]
    );
}

#[test]
fn spop_missing_key_is_nil() {
    let mut h = Harness::new();
    assert_eq!(h.run("SPOP nope"), Resp::Null);
    assert_eq!(h.run("SPOP nope 3"), Resp::Array(vec![]));
}

#[test]
fn spop_count_zero_is_empty_without_events() {
    let mut h = Harness::new();
    h.run("SADD k a");
    h.events();
    assert_eq!(h.run("SPOP k 0"), Resp::Array(vec![]));
    assert!(h.events().is_empty());
}

#[test]
fn spop_count_errors() {
    let mut h = Harness::new();
    h.run("SADD k a");
    assert_eq!(h.run("SPOP k -1").as_error(), "ERR index out of range");
    assert_eq!(h.run("SPOP k x").as_error(), "ERR syntax error");
}

#[test]
fn spop_whole_set_replicates_as_del() {
    let mut h = Harness::new();
    h.run("SADD k a b c");
    h.events();
    let dirty = h.dirty();

    let (reply, prop) = h.run_traced("SPOP k 10");
    assert_eq!(reply.members(), bulks(&["a", "b", "c"]));
    assert!(!h.has_key("k"));

    let original: Vec<&[u8]> = vec![b"SPOP", b"k", b"10"];
    assert_eq!(
        prop.effective(&original),
        vec![vec![b"DEL".to_vec(), b"k".to_vec()]]
    );
    assert_eq!(
        h.events(),
        vec![
            ("spop".to_string(), "k".to_string()),
            ("del".to_string(), "k".to_string()),
        ]
    );
    // count requested plus the key deletion
    assert_eq!(h.dirty(), dirty + 11);
}

#[test]
fn spop_small_count_propagates_srems() {
    let mut h = Harness::new();
    let mut argv: Vec<Vec<u8>> = vec![b"SADD".to_vec(), b"k".to_vec()];
    for i in 0..50 {
        argv.push(format!("m{i}").into_bytes());
    }
    let argv_refs: Vec<&[u8]> = argv.iter().map(|a| a.as_slice()).collect();
    h.exec(&argv_refs);
    h.events();

    // remaining = 48, 48*5 > 2: sample-and-remove path
    let (reply, prop) = h.run_traced("SPOP k 2");
    let popped = reply.members();
    assert_eq!(popped.len(), 2);
    assert_eq!(h.run("SCARD k").as_int(), 48);

    let original: Vec<&[u8]> = vec![b"SPOP", b"k", b"2"];
    let effective = prop.effective(&original);
    assert_eq!(effective.len(), 2);
    for argv in &effective {
        assert_eq!(argv[0], b"SREM");
        assert!(popped.contains(&argv[2]));
    }
    assert_eq!(h.events(), vec![("spop".to_string(), "k".to_string())]);
}

// --- SRANDMEMBER ---

#[test]
fn srandmember_single() {
    let mut h = Harness::new();
    assert_eq!(h.run("SRANDMEMBER nope"), Resp::Null);

    h.run("SADD k a b c");
    let member = h.run("SRANDMEMBER k").as_bulk().to_vec();
    assert!(bulks(&["a", "b", "c"]).contains(&member));
    assert_eq!(h.run("SCARD k").as_int(), 3);
}

#[test]
fn srandmember_positive_count_is_distinct() {
    let mut h = Harness::new();
    h.run("SADD k a b c d e f g h i j");
    h.events();
    let dirty = h.dirty();

    for count in [1, 3, 7, 9] {
        let reply = h.run(&format!("SRANDMEMBER k {count}"));
        let members = reply.members();
        assert_eq!(members.len(), count);
        let mut deduped = members.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), count);
        for m in &members {
            assert!(h.members_of("k").contains(m));
        }
    }

    // Source never mutates
    assert_eq!(h.run("SCARD k").as_int(), 10);
    assert_eq!(h.dirty(), dirty);
    assert!(h.events().is_empty());
}

#[test]
fn srandmember_count_covers_whole_set() {
    let mut h = Harness::new();
    h.run("SADD k a b c");
    assert_eq!(h.run("SRANDMEMBER k 3").members(), bulks(&["a", "b", "c"]));
    assert_eq!(h.run("SRANDMEMBER k 50").members(), bulks(&["a", "b", "c"]));
}

#[test]
fn srandmember_negative_count_repeats() {
    let mut h = Harness::new();
    h.run("SADD k a b");
    let elements = h.run("SRANDMEMBER k -9").elements();
    assert_eq!(elements.len(), 9);
    for e in &elements {
        assert!(bulks(&["a", "b"]).contains(e));
    }
}

#[test]
fn srandmember_zero_and_missing() {
    let mut h = Harness::new();
    h.run("SADD k a");
    assert_eq!(h.run("SRANDMEMBER k 0"), Resp::Array(vec![]));
    assert_eq!(h.run("SRANDMEMBER nope 5"), Resp::Array(vec![]));
    assert_eq!(h.run("SRANDMEMBER nope -5"), Resp::Array(vec![]));
}

// --- SRANDMEMBERSTORE ---

#[test]
fn srandmemberstore_stores_distinct_subset() {
    let mut h = Harness::new();
    h.run("SADD src a b c d e");
    h.events();

    let (reply, prop) = h.run_traced("SRANDMEMBERSTORE dst src 3");
    assert_eq!(reply.as_int(), 3);
    let stored = h.members_of("dst");
    assert_eq!(stored.len(), 3);
    for m in &stored {
        assert!(h.members_of("src").contains(m));
    }
    assert_eq!(
        h.events(),
        vec![("srandmemberstore".to_string(), "dst".to_string())]
    );

    // Propagates as DEL + SADD, suppressing itself
    let original: Vec<&[u8]> = vec![b"SRANDMEMBERSTORE", b"dst", b"src", b"3"];
    let effective = prop.effective(&original);
    assert_eq!(effective.len(), 2);
    assert_eq!(effective[0], vec![b"DEL".to_vec(), b"dst".to_vec()]);
    assert_eq!(effective[1][0], b"SADD");
    let mut propagated: Vec<Vec<u8>> = effective[1][2..].to_vec();
    propagated.sort();
    assert_eq!(propagated, stored);
}

#[test]
fn srandmemberstore_whole_set_and_replacement() {
    let mut h = Harness::new();
    h.run("SADD src 1 2 3");
    h.run("SADD dst old");
    assert_eq!(h.run("SRANDMEMBERSTORE dst src 10").as_int(), 3);
    assert_eq!(h.members_of("dst"), bulks(&["1", "2", "3"]));
    assert_eq!(h.encoding_of("dst"), Encoding::IntSet);
}

#[test]
fn srandmemberstore_empty_choice_deletes_destination() {
    let mut h = Harness::new();
    h.run("SADD dst old");
    h.events();

    assert_eq!(h.run("SRANDMEMBERSTORE dst missing 5").as_int(), 0);
    assert!(!h.has_key("dst"));
    assert_eq!(h.events(), vec![("del".to_string(), "dst".to_string())]);
}

#[test]
fn srandmemberstore_negative_count_collapses_duplicates() {
    let mut h = Harness::new();
    h.run("SADD src a");
    assert_eq!(h.run("SRANDMEMBERSTORE dst src -7").as_int(), 1);
    assert_eq!(h.members_of("dst"), bulks(&["a"]));
}

// --- SINTER / SUNION / SDIFF ---

#[test]
fn sinter_missing_source_short_circuits() {
    let mut h = Harness::new();
    h.run("SADD a 1 2");
    assert_eq!(h.run("SINTER a missing"), Resp::Array(vec![]));

    h.run("SADD dst stale");
    h.events();
    assert_eq!(h.run("SINTERSTORE dst a missing").as_int(), 0);
    assert!(!h.has_key("dst"));
    // The short-circuit path deletes silently: no del notification
    assert!(h.events().is_empty());
}

#[test]
fn sinter_mixed_encodings() {
    let mut h = Harness::with_max_intset(4);
    h.run("SADD nums 1 2 3 4");
    h.run("SADD mixed 2 4 foo bar");
    assert_eq!(h.encoding_of("nums"), Encoding::IntSet);
    assert_eq!(h.encoding_of("mixed"), Encoding::Hash);

    assert_eq!(h.run("SINTER nums mixed").members(), bulks(&["2", "4"]));
    assert_eq!(h.run("SINTER mixed nums").members(), bulks(&["2", "4"]));
}

#[test]
fn sinter_wrong_type_aborts() {
    let mut h = Harness::new();
    h.run("SADD a 1");
    h.run("SET s v");
    assert!(h.run("SINTER a s").as_error().starts_with("WRONGTYPE"));
    assert!(h
        .run("SINTERSTORE dst a s")
        .as_error()
        .starts_with("WRONGTYPE"));
    assert!(!h.has_key("dst"));
}

#[test]
fn sunion_merges_and_stores() {
    let mut h = Harness::new();
    h.run("SADD a 1 2");
    h.run("SADD b 2 3 foo");
    h.events();

    assert_eq!(
        h.run("SUNION a b missing").members(),
        bulks(&["1", "2", "3", "foo"])
    );
    assert_eq!(h.run("SUNIONSTORE dst a b").as_int(), 4);
    assert_eq!(h.members_of("dst"), bulks(&["1", "2", "3", "foo"]));
    assert_eq!(h.encoding_of("dst"), Encoding::Hash);

    let events = h.events();
    assert_eq!(
        events.last(),
        Some(&("sunionstore".to_string(), "dst".to_string()))
    );
}

#[test]
fn union_store_of_integers_keeps_intset() {
    let mut h = Harness::new();
    h.run("SADD a 1 2");
    h.run("SADD b 3");
    assert_eq!(h.run("SUNIONSTORE dst a b").as_int(), 3);
    assert_eq!(h.encoding_of("dst"), Encoding::IntSet);
}

#[test]
fn empty_store_result_deletes_destination() {
    let mut h = Harness::new();
    h.run("SADD a 1");
    h.run("SADD b 1");
    h.run("SADD dst stale");
    h.events();

    assert_eq!(h.run("SDIFFSTORE dst a b").as_int(), 0);
    assert!(!h.has_key("dst"));
    assert_eq!(h.events(), vec![("del".to_string(), "dst".to_string())]);
}

#[test]
fn sdiff_subtracts_all_later_sets() {
    let mut h = Harness::new();
    h.run("SADD a 1 2 3 4 5");
    h.run("SADD b 2 4");
    h.run("SADD c 5 6 7 8 9 10 11 12");

    assert_eq!(h.run("SDIFF a b c").members(), bulks(&["1", "3"]));
    assert_eq!(h.run("SDIFF a missing").members(), bulks(&["1", "2", "3", "4", "5"]));
    assert_eq!(h.run("SDIFF missing a"), Resp::Array(vec![]));
}

#[test]
fn sdiff_repeated_first_key_is_empty() {
    let mut h = Harness::new();
    h.run("SADD a 1 2 3");
    assert_eq!(h.run("SDIFF a a"), Resp::Array(vec![]));
    assert_eq!(h.run("SINTER a a").members(), bulks(&["1", "2", "3"]));
}

// --- SMEMBERS ---

#[test]
fn smembers_lists_or_errors() {
    let mut h = Harness::new();
    assert_eq!(h.run("SMEMBERS nope"), Resp::Array(vec![]));
    h.run("SADD k a b");
    assert_eq!(h.run("SMEMBERS k").members(), bulks(&["a", "b"]));
    h.run("SET s v");
    assert!(h.run("SMEMBERS s").as_error().starts_with("WRONGTYPE"));
}

// --- SSCAN ---

#[test]
fn sscan_intset_returns_single_page() {
    let mut h = Harness::new();
    h.run("SADD k 1 2 3 4 5");
    let reply = h.run("SSCAN k 0");
    match reply {
        Resp::Array(items) => {
            assert_eq!(items[0].as_bulk(), b"0");
            assert_eq!(items[1].members(), bulks(&["1", "2", "3", "4", "5"]));
        }
        other => panic!("unexpected reply {other:?}"),
    }
}

#[test]
fn sscan_pages_through_hash_sets() {
    let mut h = Harness::with_max_intset(4);
    let mut argv: Vec<Vec<u8>> = vec![b"SADD".to_vec(), b"k".to_vec()];
    for i in 0..40 {
        argv.push(format!("m{i}").into_bytes());
    }
    let argv_refs: Vec<&[u8]> = argv.iter().map(|a| a.as_slice()).collect();
    h.exec(&argv_refs);
    assert_eq!(h.encoding_of("k"), Encoding::Hash);

    let mut cursor = "0".to_string();
    let mut seen: Vec<Vec<u8>> = Vec::new();
    let mut pages = 0;
    loop {
        let reply = h.run(&format!("SSCAN k {cursor} COUNT 7"));
        let Resp::Array(items) = reply else {
            panic!("expected array");
        };
        cursor = String::from_utf8(items[0].as_bulk().to_vec()).unwrap();
        seen.extend(items[1].members());
        pages += 1;
        if cursor == "0" {
            break;
        }
    }
    assert!(pages > 1);
    seen.sort();
    assert_eq!(seen, h.members_of("k"));
}

#[test]
fn sscan_match_filters() {
    let mut h = Harness::with_max_intset(2);
    h.run("SADD k apple apricot banana");
    let reply = h.run("SSCAN k 0 MATCH ap* COUNT 100");
    let Resp::Array(items) = reply else {
        panic!("expected array");
    };
    assert_eq!(items[1].members(), bulks(&["apple", "apricot"]));
}

#[test]
fn sscan_argument_errors() {
    let mut h = Harness::new();
    h.run("SADD k a");
    assert_eq!(h.run("SSCAN k notacursor").as_error(), "ERR invalid cursor");
    assert_eq!(h.run("SSCAN k 0 COUNT 0").as_error(), "ERR syntax error");
    assert_eq!(h.run("SSCAN k 0 BOGUS x").as_error(), "ERR syntax error");
    assert_eq!(h.run("SSCAN k 0 COUNT").as_error(), "ERR syntax error");
}

#[test]
fn sscan_missing_key_is_empty() {
    let mut h = Harness::new();
    let reply = h.run("SSCAN nope 0");
    let Resp::Array(items) = reply else {
        panic!("expected array");
    };
    assert_eq!(items[0].as_bulk(), b"0");
    assert_eq!(items[1], Resp::Array(vec![]));
}

// --- strings and type interplay ---

#[test]
fn string_commands_round_trip() {
    let mut h = Harness::new();
    assert_eq!(h.run("GET nope"), Resp::Null);
    assert_eq!(h.run("SET k v"), Resp::Simple("OK".to_string()));
    assert_eq!(h.run("GET k").as_bulk(), b"v");
    assert_eq!(h.run("DEL k").as_int(), 1);
    assert_eq!(h.run("DEL k").as_int(), 0);
}

#[test]
fn get_on_set_key_is_wrong_type() {
    let mut h = Harness::new();
    h.run("SADD k a");
    assert!(h.run("GET k").as_error().starts_with("WRONGTYPE"));
}

#[test]
fn del_removes_sets_with_event() {
    let mut h = Harness::new();
    h.run("SADD k a");
    h.events();
    assert_eq!(h.run("DEL k").as_int(), 1);
    assert_eq!(h.events(), vec![("del".to_string(), "k".to_string())]);
}
