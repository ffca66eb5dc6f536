/// Command sender model: who issued a call, and from where.
///
/// A signature may require a capability of its caller (e.g. "must be sent
/// inside a group"); `ReceiverKind` names those capabilities and
/// `CommandSender::satisfies` checks them.
use serde::{Deserialize, Serialize};

use crate::contact::{Friend, Member};

/// The origin of a command call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandSender {
    /// The operator console; not tied to any bot.
    Console,
    /// A friend messaging a bot directly.
    FriendSender { bot: u64, friend: Friend },
    /// A group member, in that group's channel.
    MemberSender { bot: u64, member: Member },
}

/// The capability a signature can require of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverKind {
    /// Any sender.
    Any,
    /// Only the operator console.
    Console,
    /// Only a friend in a direct-message context.
    Friend,
    /// Only a member inside a group.
    Group,
}

impl CommandSender {
    /// Whether this sender satisfies the given receiver capability.
    pub fn satisfies(&self, receiver: ReceiverKind) -> bool {
        match receiver {
            ReceiverKind::Any => true,
            ReceiverKind::Console => matches!(self, Self::Console),
            ReceiverKind::Friend => matches!(self, Self::FriendSender { .. }),
            ReceiverKind::Group => matches!(self, Self::MemberSender { .. }),
        }
    }

    /// The bot this sender reached, if any.
    pub fn bot_id(&self) -> Option<u64> {
        match self {
            Self::Console => None,
            Self::FriendSender { bot, .. } | Self::MemberSender { bot, .. } => Some(*bot),
        }
    }

    /// The group the call arrived in, if any.
    pub fn group_id(&self) -> Option<u64> {
        match self {
            Self::MemberSender { member, .. } => Some(member.group),
            _ => None,
        }
    }

    /// A short description for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Console => "console".to_string(),
            Self::FriendSender { friend, .. } => format!("friend {}", friend.id),
            Self::MemberSender { member, .. } => {
                format!("member {} of group {}", member.id, member.group)
            }
        }
    }
}
