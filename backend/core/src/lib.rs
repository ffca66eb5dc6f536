//! `herald-core` — shared types and traits for the Herald command runtime.
//!
//! Provides:
//! - Rich message segments (text, mentions, images)
//! - Contact data model (bots, groups, friends, members)
//! - The command-sender model and receiver capabilities
//! - The `ContactDirectory` identity-service trait
//! - The user-facing argument-parse failure type

pub mod contact;
pub mod directory;
pub mod error;
pub mod message;
pub mod sender;

pub use contact::{Bot, Friend, Group, Member};
pub use directory::ContactDirectory;
pub use error::ParseFailure;
pub use message::MessageSegment;
pub use sender::{CommandSender, ReceiverKind};
