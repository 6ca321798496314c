//! Cross-crate flows.
//!
//! - `mirror_flow`: fake mirror node → `MirrorNodeClient` → service → router
//! - `local_flow`: in-process topic wired by `lynx-node` → router

mod local_flow;
mod mirror_flow;
