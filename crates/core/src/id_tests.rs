// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_hash_map_lookup() {
    let id = TestId::new();
    let mut map = HashMap::new();
    map.insert(id, 42);
    assert_eq!(map.get(id.as_str()), Some(&42));
}

#[test]
fn define_id_new_has_prefix_and_max_len() {
    let id = TestId::new();
    assert!(id.as_str().starts_with(TestId::PREFIX));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn define_id_from_string_round_trips() {
    let id = TestId::from_string("tst-custom");
    assert_eq!(id.as_str(), "tst-custom");
    assert_eq!(id.to_string(), "tst-custom");
}

#[test]
fn define_id_suffix_strips_prefix() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.suffix(), "abcdefghijklmnop");
}

#[test]
fn define_id_short_truncates_the_suffix() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn define_id_is_empty() {
    let id = TestId::from_string("");
    assert!(id.is_empty());
    assert!(!TestId::new().is_empty());
}

#[test]
fn define_id_equality_with_str() {
    let id = TestId::from_string("tst-x");
    assert_eq!(id, "tst-x");
    let owned = String::from("tst-x");
    assert_eq!(id.as_str(), owned);
}

// --- short() free function tests ---

#[test]
fn short_fn_truncates() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}

// --- IdBuf tests ---

#[test]
fn id_buf_round_trips_through_serde() {
    let buf = IdBuf::new("hello-world");
    let json = serde_json::to_string(&buf).unwrap();
    assert_eq!(json, "\"hello-world\"");
    let back: IdBuf = serde_json::from_str(&json).unwrap();
    assert_eq!(back.as_str(), "hello-world");
}

#[test]
fn id_buf_rejects_oversized_strings_on_deserialize() {
    let oversized = "x".repeat(ID_MAX_LEN + 1);
    let json = format!("\"{oversized}\"");
    let result: Result<IdBuf, _> = serde_json::from_str(&json);
    assert!(result.is_err());
}

#[test]
fn id_buf_empty_is_empty() {
    assert!(IdBuf::empty().is_empty());
}
