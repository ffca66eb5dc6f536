/// Contact data model: bots, groups, friends, and group members.
///
/// These are plain value snapshots of what the identity directory knows.
/// Live state (online status, membership) is always queried through the
/// `ContactDirectory` trait, never cached here.
use serde::{Deserialize, Serialize};

/// A bot account the runtime is logged in as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bot {
    pub id: u64,
    pub nick: String,
}

/// A chat group a bot participates in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Id of the bot this group is seen through.
    pub bot: u64,
    pub id: u64,
    pub name: String,
}

/// A friend (direct-message contact) of a bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub bot: u64,
    pub id: u64,
    pub nick: String,
}

/// A member of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub bot: u64,
    pub group: u64,
    pub id: u64,
    /// Account-level name.
    pub name: String,
    /// Per-group display card; empty when unset.
    pub card: String,
}

impl Member {
    /// The name shown in the group: the card when set, else the account name.
    pub fn display_name(&self) -> &str {
        if self.card.is_empty() { &self.name } else { &self.card }
    }
}
