// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! gw-redact: mask secret values in outbound text given an env snapshot and
//! a pattern set.
//!
//! Every harness runtime redacts the text it emits through a [`Redactor`]
//! built from the run's own environment before it ever reaches the event
//! sink -- the pattern set is the data structure this crate owns; the
//! *authoring* of new patterns is a control-plane concern out of scope
//! here.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::collections::HashMap;

const REPLACEMENT: &str = "***REDACTED***";

/// The shortest env value worth treating as a secret. Values shorter than
/// this (e.g. `"1"`, `"true"`, port numbers) are never masked -- they would
/// produce false positives against ordinary log text.
const MIN_SECRET_LEN: usize = 6;

/// Env var name suffixes that mark a value as secret-shaped regardless of
/// its content, matched case-insensitively.
const SECRET_NAME_SUFFIXES: &[&str] = &["TOKEN", "KEY", "SECRET", "PASSWORD", "CREDENTIAL"];

/// Literal token prefixes recognised as secrets even when the value did not
/// come from a known-secret env var name (e.g. a key pasted into a prompt).
const KNOWN_TOKEN_PREFIXES: &[&str] =
    &["sk-ant-", "sk-", "ghp_", "gho_", "github_pat_", "xox", "AKIA"];

/// A set of patterns a [`Redactor`] checks outbound text against.
#[derive(Debug, Clone)]
pub struct PatternSet {
    /// Extra env var names (beyond [`SECRET_NAME_SUFFIXES`]) whose values
    /// should always be masked.
    pub secret_env_names: Vec<String>,
    /// Extra literal token prefixes (beyond [`KNOWN_TOKEN_PREFIXES`]).
    pub token_prefixes: Vec<String>,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self { secret_env_names: Vec::new(), token_prefixes: Vec::new() }
    }
}

impl PatternSet {
    pub fn with_env_name(mut self, name: impl Into<String>) -> Self {
        self.secret_env_names.push(name.into());
        self
    }

    pub fn with_token_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.token_prefixes.push(prefix.into());
        self
    }

    fn is_secret_name(&self, name: &str) -> bool {
        let upper = name.to_ascii_uppercase();
        SECRET_NAME_SUFFIXES.iter().any(|suffix| upper.ends_with(suffix))
            || self.secret_env_names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    fn token_prefixes(&self) -> impl Iterator<Item = &str> {
        KNOWN_TOKEN_PREFIXES.iter().copied().chain(self.token_prefixes.iter().map(String::as_str))
    }
}

/// Masks secret values in any outbound text given an env snapshot and a
/// [`PatternSet`]. Every harness runtime builds one of these from the
/// request's own env before it starts streaming output.
pub struct Redactor {
    patterns: PatternSet,
}

impl Redactor {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    /// Redact `text`, masking:
    /// - the verbatim value of any env var whose name looks secret-shaped
    ///   (`TOKEN`, `KEY`, `SECRET`, `PASSWORD`, `CREDENTIAL` suffix, or
    ///   explicitly listed), provided the value is at least
    ///   [`MIN_SECRET_LEN`] characters;
    /// - any whitespace-delimited token that starts with a known secret
    ///   prefix (`sk-ant-`, `ghp_`, `AKIA`, ...), independent of the env
    ///   snapshot.
    pub fn redact(&self, text: &str, env: &HashMap<String, String>) -> String {
        let mut redacted = text.to_string();

        let mut secret_values: Vec<&str> = env
            .iter()
            .filter(|(name, value)| {
                self.patterns.is_secret_name(name) && value.len() >= MIN_SECRET_LEN
            })
            .map(|(_, value)| value.as_str())
            .collect();
        // Longest-first so a shorter secret that happens to be a substring
        // of a longer one never leaves a partial value exposed.
        secret_values.sort_by_key(|v| std::cmp::Reverse(v.len()));
        for value in secret_values {
            redacted = redacted.replace(value, REPLACEMENT);
        }

        redacted = self.redact_known_token_prefixes(&redacted);
        redacted
    }

    fn redact_known_token_prefixes(&self, text: &str) -> String {
        text.split_inclusive(char::is_whitespace)
            .map(|word| {
                let (token, trailing_ws) = split_trailing_whitespace(word);
                if self.patterns.token_prefixes().any(|prefix| token.starts_with(prefix))
                    && token.len() >= MIN_SECRET_LEN
                {
                    format!("{REPLACEMENT}{trailing_ws}")
                } else {
                    word.to_string()
                }
            })
            .collect()
    }
}

fn split_trailing_whitespace(word: &str) -> (&str, &str) {
    let trim_end = word.trim_end_matches(char::is_whitespace);
    (trim_end, &word[trim_end.len()..])
}

#[cfg(test)]
#[path = "redact_tests.rs"]
mod tests;
