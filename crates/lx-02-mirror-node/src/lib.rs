//! # LX-02: Mirror Node Reader
//!
//! `TopicReader` adapter over the Hedera mirror-node REST API.
//!
//! ## Behaviour
//!
//! - Walks `GET /api/v1/topics/{id}/messages?order=asc` following `links.next`
//! - Decodes base64 payloads and `"<seconds>.<nanos>"` consensus timestamps
//! - Reassembles chunked messages by initial transaction id
//! - Maps HTTP failures onto `TopicError`

pub mod chunks;
pub mod client;
pub mod config;
pub mod wire;

pub use client::MirrorNodeClient;
pub use config::{default_base_url, MirrorConfigError, MirrorNodeConfig, MAX_PAGE_LIMIT};
