//! # LYNX Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs       # Synthetic topic feeds
//! │   └── integration/      # Mirror node → service → HTTP flows
//! └── benches/              # Correlation throughput
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lynx-tests
//! cargo bench -p lynx-tests
//! ```

pub mod fixtures;
pub mod integration;
