/// In-memory `ContactDirectory`.
///
/// Backs tests and small embedders that manage their contact state in
/// process. A real deployment implements `ContactDirectory` against the
/// chat platform instead.
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use async_trait::async_trait;
use herald_core::{Bot, ContactDirectory, Friend, Group, Member};

#[derive(Default)]
struct State {
    bots: Vec<Bot>,
    groups: HashMap<(u64, u64), Group>,
    friends: HashMap<(u64, u64), Friend>,
    members: HashMap<(u64, u64), Vec<Member>>,
}

/// Hash-map backed directory, safe to share across dispatches.
#[derive(Default, Clone)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<State>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_bot(&self, bot: Bot) {
        self.state.write().await.bots.push(bot);
    }

    pub async fn add_group(&self, group: Group) {
        self.state.write().await.groups.insert((group.bot, group.id), group);
    }

    pub async fn add_friend(&self, friend: Friend) {
        self.state.write().await.friends.insert((friend.bot, friend.id), friend);
    }

    pub async fn add_member(&self, member: Member) {
        self.state
            .write()
            .await
            .members
            .entry((member.bot, member.group))
            .or_default()
            .push(member);
    }
}

#[async_trait]
impl ContactDirectory for InMemoryDirectory {
    async fn bots(&self) -> Vec<Bot> {
        self.state.read().await.bots.clone()
    }

    async fn find_bot(&self, id: u64) -> Option<Bot> {
        self.state.read().await.bots.iter().find(|b| b.id == id).cloned()
    }

    async fn find_group(&self, bot: u64, id: u64) -> Option<Group> {
        self.state.read().await.groups.get(&(bot, id)).cloned()
    }

    async fn groups_of(&self, bot: u64) -> Vec<Group> {
        let mut groups: Vec<Group> = self
            .state
            .read()
            .await
            .groups
            .values()
            .filter(|g| g.bot == bot)
            .cloned()
            .collect();
        groups.sort_by_key(|g| g.id);
        groups
    }

    async fn find_friend(&self, bot: u64, id: u64) -> Option<Friend> {
        self.state.read().await.friends.get(&(bot, id)).cloned()
    }

    async fn members_of(&self, bot: u64, group: u64) -> Vec<Member> {
        self.state.read().await.members.get(&(bot, group)).cloned().unwrap_or_default()
    }
}
