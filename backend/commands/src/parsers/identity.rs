/// Identity parsers: bots, groups, friends, and members.
///
/// These encode a compact grammar over dot-separated segments. Fewer
/// segments mean more inference from the caller's context:
///
/// - member: `m` | `groupId.m` | `botId.groupId.m`, where `m` is an id,
///   an exact or fuzzy name, `~` (the sender), or `$` (a random member of
///   the current group)
/// - group:  `~` | `g` | `botId.g`, where `g` is an id or a unique
///   group name
/// - friend: `~` | `friendId` | `botId.friendId`
/// - bot:    `~` | `botId`
use async_trait::async_trait;
use rand::seq::SliceRandom;

use herald_core::{CommandSender, MessageSegment, ParseFailure};
use herald_directory::{find_group, find_member, infer_bot, infer_friend, infer_group};

use super::{ArgumentParser, ParseContext};
use crate::values::ArgValue;

/// The bot the call is flowing through, or the only one online.
async fn current_bot(ctx: &ParseContext) -> Result<u64, ParseFailure> {
    match ctx.sender.bot_id() {
        Some(id) => Ok(id),
        None => infer_bot(ctx.directory.as_ref()).await.map(|b| b.id),
    }
}

/// The group the call arrived in.
fn current_group(ctx: &ParseContext) -> Result<(u64, u64), ParseFailure> {
    match (ctx.sender.bot_id(), ctx.sender.group_id()) {
        (Some(bot), Some(group)) => Ok((bot, group)),
        _ => Err(ParseFailure::new("not in a group context")),
    }
}

fn parse_id(segment: &str, what: &str) -> Result<u64, ParseFailure> {
    segment.parse::<u64>().map_err(|_| ParseFailure::bad_token(segment, what))
}

// ---------------------------------------------------------------------------
// Bot
// ---------------------------------------------------------------------------

pub struct BotParser;

#[async_trait]
impl ArgumentParser for BotParser {
    fn name(&self) -> &str {
        "bot"
    }

    async fn parse_text(&self, token: &str, ctx: &ParseContext) -> Result<ArgValue, ParseFailure> {
        let id = if token == "~" {
            current_bot(ctx).await?
        } else {
            parse_id(token, "bot id")?
        };
        ctx.directory
            .find_bot(id)
            .await
            .map(ArgValue::Bot)
            .ok_or_else(|| ParseFailure::new(format!("bot {id} is not online")))
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

pub struct GroupParser;

#[async_trait]
impl ArgumentParser for GroupParser {
    fn name(&self) -> &str {
        "group"
    }

    async fn parse_text(&self, token: &str, ctx: &ParseContext) -> Result<ArgValue, ParseFailure> {
        if token == "~" {
            return infer_group(ctx.directory.as_ref(), &ctx.sender).await.map(ArgValue::Group);
        }
        let segments: Vec<&str> = token.split('.').collect();
        let (bot, group) = match segments.as_slice() {
            [group] => (current_bot(ctx).await?, *group),
            [bot, group] => (parse_id(bot, "bot id")?, *group),
            _ => {
                return Err(ParseFailure::new(format!(
                    "cannot parse \"{token}\" as group: expected group or botId.group"
                )))
            }
        };
        find_group(ctx.directory.as_ref(), bot, group).await.map(ArgValue::Group)
    }
}

// ---------------------------------------------------------------------------
// Friend
// ---------------------------------------------------------------------------

pub struct FriendParser;

#[async_trait]
impl ArgumentParser for FriendParser {
    fn name(&self) -> &str {
        "friend"
    }

    async fn parse_text(&self, token: &str, ctx: &ParseContext) -> Result<ArgValue, ParseFailure> {
        if token == "~" {
            return infer_friend(&ctx.sender).map(ArgValue::Friend);
        }
        let segments: Vec<&str> = token.split('.').collect();
        let (bot, friend) = match segments.as_slice() {
            [friend] => (current_bot(ctx).await?, parse_id(friend, "friend id")?),
            [bot, friend] => (parse_id(bot, "bot id")?, parse_id(friend, "friend id")?),
            _ => {
                return Err(ParseFailure::new(format!(
                    "cannot parse \"{token}\" as friend: expected friendId or botId.friendId"
                )))
            }
        };
        ctx.directory
            .find_friend(bot, friend)
            .await
            .map(ArgValue::Friend)
            .ok_or_else(|| ParseFailure::new(format!("friend {friend} not found")))
    }
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

pub struct MemberParser;

impl MemberParser {
    async fn by_id_in_current_group(
        ctx: &ParseContext,
        id: u64,
    ) -> Result<ArgValue, ParseFailure> {
        let (bot, group) = current_group(ctx)?;
        find_member(ctx.directory.as_ref(), bot, group, &id.to_string())
            .await
            .map(ArgValue::Member)
    }
}

#[async_trait]
impl ArgumentParser for MemberParser {
    fn name(&self) -> &str {
        "member"
    }

    async fn parse_text(&self, token: &str, ctx: &ParseContext) -> Result<ArgValue, ParseFailure> {
        match token {
            "~" => match &ctx.sender {
                CommandSender::MemberSender { member, .. } => {
                    Ok(ArgValue::Member(member.clone()))
                }
                _ => Err(ParseFailure::new("\"~\" requires a group context")),
            },
            "$" => {
                let (bot, group) = current_group(ctx)
                    .map_err(|_| ParseFailure::new("\"$\" requires a group context"))?;
                let members = ctx.directory.members_of(bot, group).await;
                members
                    .choose(&mut rand::thread_rng())
                    .cloned()
                    .map(ArgValue::Member)
                    .ok_or_else(|| ParseFailure::new(format!("group {group} has no members")))
            }
            _ => {
                let segments: Vec<&str> = token.split('.').collect();
                let (bot, group, member) = match segments.as_slice() {
                    [member] => {
                        let (bot, group) = current_group(ctx)?;
                        (bot, group, *member)
                    }
                    [group, member] => {
                        (current_bot(ctx).await?, parse_id(group, "group id")?, *member)
                    }
                    [bot, group, member] => (
                        parse_id(bot, "bot id")?,
                        parse_id(group, "group id")?,
                        *member,
                    ),
                    _ => {
                        return Err(ParseFailure::new(format!(
                            "cannot parse \"{token}\" as member: expected member, \
                             groupId.member or botId.groupId.member"
                        )))
                    }
                };
                if segments.len() > 1 && ctx.directory.find_group(bot, group).await.is_none() {
                    return Err(ParseFailure::new(format!("group {group} not found")));
                }
                find_member(ctx.directory.as_ref(), bot, group, member)
                    .await
                    .map(ArgValue::Member)
            }
        }
    }

    /// An @-mention resolves to the mentioned member of the current group.
    async fn parse_rich(
        &self,
        segment: &MessageSegment,
        ctx: &ParseContext,
    ) -> Result<ArgValue, ParseFailure> {
        match segment {
            MessageSegment::At { target } => Self::by_id_in_current_group(ctx, *target).await,
            other => self.parse_text(&other.render_text(), ctx).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Contact: member or friend, whichever resolves
// ---------------------------------------------------------------------------

pub struct ContactParser;

#[async_trait]
impl ArgumentParser for ContactParser {
    fn name(&self) -> &str {
        "contact"
    }

    async fn parse_text(&self, token: &str, ctx: &ParseContext) -> Result<ArgValue, ParseFailure> {
        // Member first (the richer grammar), then friend; the last
        // failure surfaces when neither resolves.
        match MemberParser.parse_text(token, ctx).await {
            Ok(value) => Ok(value),
            Err(_) => FriendParser.parse_text(token, ctx).await,
        }
    }

    async fn parse_rich(
        &self,
        segment: &MessageSegment,
        ctx: &ParseContext,
    ) -> Result<ArgValue, ParseFailure> {
        match MemberParser.parse_rich(segment, ctx).await {
            Ok(value) => Ok(value),
            Err(_) => FriendParser.parse_rich(segment, ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::{Bot, Friend, Group, Member};
    use herald_directory::InMemoryDirectory;
    use std::sync::Arc;

    fn member(bot: u64, group: u64, id: u64, name: &str) -> Member {
        Member { bot, group, id, name: name.into(), card: String::new() }
    }

    async fn fixture() -> (InMemoryDirectory, ParseContext) {
        let dir = InMemoryDirectory::new();
        dir.add_bot(Bot { id: 1, nick: "bot".into() }).await;
        dir.add_group(Group { bot: 1, id: 10, name: "g".into() }).await;
        dir.add_friend(Friend { bot: 1, id: 5, nick: "pal".into() }).await;
        dir.add_member(member(1, 10, 42, "Alice")).await;
        dir.add_member(member(1, 10, 43, "Bob")).await;
        let sender = CommandSender::MemberSender { bot: 1, member: member(1, 10, 42, "Alice") };
        let ctx = ParseContext { sender, directory: Arc::new(dir.clone()) };
        (dir, ctx)
    }

    #[tokio::test]
    async fn one_segment_infers_bot_and_group() {
        let (_dir, ctx) = fixture().await;
        let v = MemberParser.parse_text("Bob", &ctx).await.unwrap();
        assert_eq!(v, ArgValue::Member(member(1, 10, 43, "Bob")));
    }

    #[tokio::test]
    async fn two_segments_infer_bot_only() {
        let (_dir, ctx) = fixture().await;
        let v = MemberParser.parse_text("10.43", &ctx).await.unwrap();
        assert_eq!(v, ArgValue::Member(member(1, 10, 43, "Bob")));
    }

    #[tokio::test]
    async fn three_segments_are_fully_explicit() {
        let (_dir, ctx) = fixture().await;
        let v = MemberParser.parse_text("1.10.Alice", &ctx).await.unwrap();
        assert_eq!(v, ArgValue::Member(member(1, 10, 42, "Alice")));
    }

    #[tokio::test]
    async fn four_segments_are_a_syntax_error() {
        let (_dir, ctx) = fixture().await;
        let err = MemberParser.parse_text("1.10.42.extra", &ctx).await.unwrap_err();
        assert!(err.message.contains("expected member"), "got: {}", err.message);
    }

    #[tokio::test]
    async fn tilde_is_the_sender() {
        let (_dir, ctx) = fixture().await;
        let v = MemberParser.parse_text("~", &ctx).await.unwrap();
        assert_eq!(v, ArgValue::Member(member(1, 10, 42, "Alice")));

        let console = ParseContext { sender: CommandSender::Console, ..ctx };
        assert!(MemberParser.parse_text("~", &console).await.is_err());
    }

    #[tokio::test]
    async fn dollar_picks_some_current_group_member() {
        let (_dir, ctx) = fixture().await;
        let v = MemberParser.parse_text("$", &ctx).await.unwrap();
        match v {
            ArgValue::Member(m) => assert!(m.id == 42 || m.id == 43),
            other => panic!("expected member, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mention_resolves_to_member() {
        let (_dir, ctx) = fixture().await;
        let at = MessageSegment::At { target: 43 };
        let v = MemberParser.parse_rich(&at, &ctx).await.unwrap();
        assert_eq!(v, ArgValue::Member(member(1, 10, 43, "Bob")));
    }

    #[tokio::test]
    async fn unknown_group_is_reported_before_member_search() {
        let (_dir, ctx) = fixture().await;
        let err = MemberParser.parse_text("99.Alice", &ctx).await.unwrap_err();
        assert!(err.message.contains("group 99 not found"), "got: {}", err.message);
    }

    #[tokio::test]
    async fn bot_parser_handles_tilde_and_ids() {
        let (_dir, ctx) = fixture().await;
        assert_eq!(
            BotParser.parse_text("~", &ctx).await.unwrap(),
            ArgValue::Bot(Bot { id: 1, nick: "bot".into() })
        );
        assert_eq!(
            BotParser.parse_text("1", &ctx).await.unwrap(),
            ArgValue::Bot(Bot { id: 1, nick: "bot".into() })
        );
        assert!(BotParser.parse_text("2", &ctx).await.is_err());
        assert!(BotParser.parse_text("notanid", &ctx).await.is_err());
    }

    #[tokio::test]
    async fn group_and_friend_grammars() {
        let (_dir, ctx) = fixture().await;
        let g = Group { bot: 1, id: 10, name: "g".into() };
        assert_eq!(GroupParser.parse_text("~", &ctx).await.unwrap(), ArgValue::Group(g.clone()));
        assert_eq!(GroupParser.parse_text("10", &ctx).await.unwrap(), ArgValue::Group(g.clone()));
        assert_eq!(GroupParser.parse_text("1.10", &ctx).await.unwrap(), ArgValue::Group(g));
        assert!(GroupParser.parse_text("1.10.5", &ctx).await.is_err());

        let f = Friend { bot: 1, id: 5, nick: "pal".into() };
        assert_eq!(FriendParser.parse_text("5", &ctx).await.unwrap(), ArgValue::Friend(f.clone()));
        assert_eq!(FriendParser.parse_text("1.5", &ctx).await.unwrap(), ArgValue::Friend(f));
        assert!(FriendParser.parse_text("6", &ctx).await.is_err());
    }

    #[tokio::test]
    async fn group_resolves_by_name_too() {
        let (_dir, ctx) = fixture().await;
        let g = Group { bot: 1, id: 10, name: "g".into() };
        assert_eq!(GroupParser.parse_text("g", &ctx).await.unwrap(), ArgValue::Group(g.clone()));
        assert_eq!(GroupParser.parse_text("1.g", &ctx).await.unwrap(), ArgValue::Group(g));
        let err = GroupParser.parse_text("nosuch", &ctx).await.unwrap_err();
        assert!(err.message.contains("not found"), "got: {}", err.message);
    }

    #[tokio::test]
    async fn contact_tries_member_then_friend() {
        let (_dir, ctx) = fixture().await;
        // "Bob" resolves as a member.
        assert!(matches!(
            ContactParser.parse_text("Bob", &ctx).await.unwrap(),
            ArgValue::Member(_)
        ));
        // "5" is no member of group 10, but is a friend id.
        assert!(matches!(
            ContactParser.parse_text("5", &ctx).await.unwrap(),
            ArgValue::Friend(_)
        ));
        // Neither: the friend failure (the last resolver) surfaces.
        let err = ContactParser.parse_text("nobody", &ctx).await.unwrap_err();
        assert!(err.message.contains("nobody"), "got: {}", err.message);
    }
}
