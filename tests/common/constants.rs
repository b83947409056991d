//! Shared constants for end-to-end tests

#![allow(dead_code)]

pub const ALICE_USERNAME: &str = "alice";
pub const ALICE_EMAIL: &str = "a@x.com";
pub const ALICE_PASS: &str = "secret1";

pub const BOB_USERNAME: &str = "bob";
pub const BOB_EMAIL: &str = "b@x.com";
pub const BOB_PASS: &str = "secret2";

/// Works known to the fake metadata source.
pub const WORK_42_ID: i64 = 42;
pub const WORK_42_TITLE: &str = "Shirobako";
pub const WORK_43_ID: i64 = 43;
pub const WORK_43_TITLE: &str = "Sound! Euphonium";
pub const WORK_44_ID: i64 = 44;
pub const WORK_44_TITLE: &str = "Sound! Euphonium 2";

/// An id the fake metadata source does not know.
pub const UNKNOWN_WORK_ID: i64 = 9999;

pub const JWT_SECRET: &[u8] = b"e2e-test-secret";
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
