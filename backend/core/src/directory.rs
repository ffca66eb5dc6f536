/// The identity directory interface.
///
/// Argument parsers resolve bots, groups, friends and members through this
/// trait. Implementations may query a live chat platform and are free to
/// suspend; the dispatch core never holds a lock while awaiting them.
use async_trait::async_trait;

use crate::contact::{Bot, Friend, Group, Member};

#[async_trait]
pub trait ContactDirectory: Send + Sync {
    /// All bots currently online.
    async fn bots(&self) -> Vec<Bot>;

    /// Look up an online bot by id.
    async fn find_bot(&self, id: u64) -> Option<Bot>;

    /// Look up a group visible to the given bot.
    async fn find_group(&self, bot: u64, id: u64) -> Option<Group>;

    /// All groups visible to the given bot.
    async fn groups_of(&self, bot: u64) -> Vec<Group>;

    /// Look up a friend of the given bot.
    async fn find_friend(&self, bot: u64, id: u64) -> Option<Friend>;

    /// All members of a group, as currently known.
    async fn members_of(&self, bot: u64, group: u64) -> Vec<Member>;
}
