//! `herald-directory` — identity lookup for Herald's argument parsers.
//!
//! Provides:
//! - Member resolution with the full precedence chain (exact id, unique
//!   exact name, unique case-insensitive name, ranked fuzzy search)
//! - Group resolution by id or unique name
//! - Prefix-similarity scoring and ranked ambiguity reports
//! - Context inference (`infer_bot`, `infer_group`, `infer_friend`)
//! - An in-memory `ContactDirectory` for tests and embedders

pub mod fuzzy;
pub mod lookup;
pub mod memory;

pub use fuzzy::{rank_by, similarity, RankedMatch, MAX_RANKED};
pub use lookup::{find_group, find_member, infer_bot, infer_friend, infer_group};
pub use memory::InMemoryDirectory;
