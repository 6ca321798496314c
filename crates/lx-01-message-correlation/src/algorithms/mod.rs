//! Algorithms module for message correlation
//!
//! Contains:
//! - Payload decoding
//! - Grouping by correlation key
//! - Ledger and history ordering
//! - The correlation pipeline

pub mod correlator;
pub mod decode;
pub mod grouping;
pub mod ordering;

pub use correlator::{correlate, MessageCorrelator};
pub use decode::{decode_message, DecodeFailure};
pub use grouping::group_by_request_id;
pub use ordering::{canonical_order, parse_business_time, sort_newest_first};
