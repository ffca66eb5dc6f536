/// Member lookup and context inference.
///
/// `find_member` implements the resolution precedence the identity
/// interface promises: exact id, unique exact name, unique
/// case-insensitive name, then ranked fuzzy search. `find_group` resolves
/// an id-or-name token, id first. The `infer_*` helpers
/// derive an implicit subject (bot, group, friend) from the caller's
/// context and fail with a user-facing message when the context is not
/// enough to decide.
use tracing::debug;

use herald_core::{Bot, CommandSender, ContactDirectory, Friend, Group, Member, ParseFailure};

use crate::fuzzy::{rank_by, report_line, similarity, RankedMatch, MAX_RANKED};

/// Resolve a member of `group` from an id, exact name/card, or fuzzy name.
pub async fn find_member(
    directory: &dyn ContactDirectory,
    bot: u64,
    group: u64,
    token: &str,
) -> Result<Member, ParseFailure> {
    let members = directory.members_of(bot, group).await;
    if members.is_empty() {
        return Err(ParseFailure::new(format!("group {group} has no members")));
    }

    // (a) exact numeric id
    if let Ok(id) = token.parse::<u64>() {
        if let Some(m) = members.iter().find(|m| m.id == id) {
            return Ok(m.clone());
        }
        // A numeric token may still be someone's name; fall through.
    }

    // (b) unique exact case-sensitive match on name or card
    let exact: Vec<&Member> =
        members.iter().filter(|m| m.name == token || m.card == token).collect();
    if exact.len() == 1 {
        return Ok(exact[0].clone());
    }

    // (c) unique exact case-insensitive match
    if exact.is_empty() {
        let folded = token.to_lowercase();
        let ci: Vec<&Member> = members
            .iter()
            .filter(|m| {
                m.name.to_lowercase() == folded || m.card.to_lowercase() == folded
            })
            .collect();
        if ci.len() == 1 {
            return Ok(ci[0].clone());
        }
    }

    // (d) ranked fuzzy search
    let ranked = rank_by(members, |m| {
        similarity(token, &m.name).max(similarity(token, &m.card))
    });
    debug!("[Directory] fuzzy \"{token}\" in group {group}: {} candidates", ranked.len());

    let perfect: Vec<&RankedMatch<Member>> =
        ranked.iter().filter(|m| m.score >= 1.0).collect();
    if perfect.len() == 1 {
        return Ok(perfect[0].item.clone());
    }
    if ranked.is_empty() {
        return Err(ParseFailure::new(format!("no member of group {group} matches \"{token}\"")));
    }

    let mut lines = vec![format!("ambiguous member \"{token}\", candidates:")];
    for (i, m) in ranked.iter().take(MAX_RANKED).enumerate() {
        lines.push(report_line(i + 1, m.score, m.item.display_name(), m.item.id));
    }
    Err(ParseFailure::new(lines.join("\n")))
}

/// Resolve a group visible to `bot` from an id or a name.
///
/// A numeric token is tried as an id first; any token then matches a
/// uniquely named group, exact match before case-insensitive. A name
/// shared by several groups asks for the id instead.
pub async fn find_group(
    directory: &dyn ContactDirectory,
    bot: u64,
    token: &str,
) -> Result<Group, ParseFailure> {
    if let Ok(id) = token.parse::<u64>() {
        if let Some(g) = directory.find_group(bot, id).await {
            return Ok(g);
        }
        // A numeric token may still be a group's name; fall through.
    }

    let groups = directory.groups_of(bot).await;
    let exact: Vec<&Group> = groups.iter().filter(|g| g.name == token).collect();
    if exact.len() == 1 {
        return Ok(exact[0].clone());
    }
    if exact.is_empty() {
        let folded = token.to_lowercase();
        let ci: Vec<&Group> =
            groups.iter().filter(|g| g.name.to_lowercase() == folded).collect();
        match ci.len() {
            0 => return Err(ParseFailure::new(format!("group \"{token}\" not found"))),
            1 => return Ok(ci[0].clone()),
            _ => {}
        }
    }
    Err(ParseFailure::new(format!(
        "several groups are named \"{token}\", specify the group id"
    )))
}

/// The implicit bot: succeeds only when exactly one bot is online.
pub async fn infer_bot(directory: &dyn ContactDirectory) -> Result<Bot, ParseFailure> {
    let bots = directory.bots().await;
    match bots.len() {
        0 => Err(ParseFailure::new("no bot is online")),
        1 => Ok(bots.into_iter().next().expect("len checked")),
        n => Err(ParseFailure::new(format!(
            "{n} bots are online, specify the bot id explicitly"
        ))),
    }
}

/// The implicit group: the one the call arrived in.
pub async fn infer_group(
    directory: &dyn ContactDirectory,
    sender: &CommandSender,
) -> Result<Group, ParseFailure> {
    let (bot, group) = match (sender.bot_id(), sender.group_id()) {
        (Some(bot), Some(group)) => (bot, group),
        _ => {
            return Err(ParseFailure::new(
                "not in a group context, specify the group id explicitly",
            ))
        }
    };
    directory
        .find_group(bot, group)
        .await
        .ok_or_else(|| ParseFailure::new(format!("group {group} not found")))
}

/// The implicit friend: the sender themselves, in a direct-message context.
pub fn infer_friend(sender: &CommandSender) -> Result<Friend, ParseFailure> {
    match sender {
        CommandSender::FriendSender { friend, .. } => Ok(friend.clone()),
        _ => Err(ParseFailure::new(
            "not in a friend context, specify the friend id explicitly",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDirectory;

    fn member(id: u64, name: &str, card: &str) -> Member {
        Member { bot: 1, group: 10, id, name: name.into(), card: card.into() }
    }

    async fn directory_with(members: Vec<Member>) -> InMemoryDirectory {
        let dir = InMemoryDirectory::new();
        dir.add_bot(Bot { id: 1, nick: "bot".into() }).await;
        dir.add_group(Group { bot: 1, id: 10, name: "g".into() }).await;
        for m in members {
            dir.add_member(m).await;
        }
        dir
    }

    #[tokio::test]
    async fn exact_id_wins_first() {
        let dir = directory_with(vec![member(100, "Alice", ""), member(200, "100", "")]).await;
        let m = find_member(&dir, 1, 10, "100").await.unwrap();
        assert_eq!(m.id, 100, "numeric id beats a member named \"100\"");
    }

    #[tokio::test]
    async fn exact_name_unique_wins() {
        let dir = directory_with(vec![member(1, "Alice", ""), member(2, "alice", "")]).await;
        let m = find_member(&dir, 1, 10, "Alice").await.unwrap();
        assert_eq!(m.id, 1);
    }

    #[tokio::test]
    async fn case_insensitive_unique_wins_when_no_exact() {
        let dir = directory_with(vec![member(1, "ALICE", ""), member(2, "Bob", "")]).await;
        let m = find_member(&dir, 1, 10, "alice").await.unwrap();
        assert_eq!(m.id, 1);
    }

    #[tokio::test]
    async fn card_matches_too() {
        let dir = directory_with(vec![member(1, "acct", "Nickname")]).await;
        let m = find_member(&dir, 1, 10, "Nickname").await.unwrap();
        assert_eq!(m.id, 1);
    }

    #[tokio::test]
    async fn exact_name_beats_prefix_cousins() {
        // Exactly one member named exactly "Alice"; others only share a prefix.
        let dir = directory_with(vec![
            member(1, "Alice", ""),
            member(2, "Alice2", ""),
            member(3, "AliceB", ""),
        ])
        .await;
        let m = find_member(&dir, 1, 10, "Alice").await.unwrap();
        assert_eq!(m.id, 1);
    }

    #[tokio::test]
    async fn two_perfect_scores_report_ambiguity() {
        // Same card on two members: both score 1.0.
        let dir = directory_with(vec![
            member(1, "a1", "Alice"),
            member(2, "a2", "Alice"),
        ])
        .await;
        let err = find_member(&dir, 1, 10, "Alice").await.unwrap_err();
        assert!(err.message.contains("ambiguous"), "got: {}", err.message);
        assert!(err.message.contains("#1(100%)"));
        assert!(err.message.contains("#2(100%)"));
        assert!(err.message.contains("(1)") && err.message.contains("(2)"));
    }

    #[tokio::test]
    async fn ambiguity_report_caps_at_six() {
        let members = (1..=9).map(|i| member(i, &format!("Al{i}"), "")).collect();
        let dir = directory_with(members).await;
        let err = find_member(&dir, 1, 10, "Al").await.unwrap_err();
        assert!(err.message.contains("#6("));
        assert!(!err.message.contains("#7("));
    }

    #[tokio::test]
    async fn no_match_is_a_plain_failure() {
        let dir = directory_with(vec![member(1, "Bob", "")]).await;
        let err = find_member(&dir, 1, 10, "Zed").await.unwrap_err();
        assert!(err.message.contains("no member"), "got: {}", err.message);
    }

    #[tokio::test]
    async fn group_resolves_by_id_or_unique_name() {
        let dir = directory_with(vec![]).await;
        assert_eq!(find_group(&dir, 1, "10").await.unwrap().id, 10);
        assert_eq!(find_group(&dir, 1, "g").await.unwrap().id, 10);
        assert_eq!(find_group(&dir, 1, "G").await.unwrap().id, 10, "case-insensitive fallback");
        let err = find_group(&dir, 1, "nowhere").await.unwrap_err();
        assert!(err.message.contains("not found"), "got: {}", err.message);
    }

    #[tokio::test]
    async fn group_id_wins_over_a_numeric_name() {
        let dir = directory_with(vec![]).await;
        dir.add_group(Group { bot: 1, id: 20, name: "10".into() }).await;
        assert_eq!(find_group(&dir, 1, "10").await.unwrap().id, 10);
        // A numeric name still resolves when no group owns it as an id.
        dir.add_group(Group { bot: 1, id: 30, name: "99".into() }).await;
        assert_eq!(find_group(&dir, 1, "99").await.unwrap().id, 30);
    }

    #[tokio::test]
    async fn shared_group_name_asks_for_the_id() {
        let dir = directory_with(vec![]).await;
        dir.add_group(Group { bot: 1, id: 11, name: "dup".into() }).await;
        dir.add_group(Group { bot: 1, id: 12, name: "dup".into() }).await;
        let err = find_group(&dir, 1, "dup").await.unwrap_err();
        assert!(err.message.contains("specify the group id"), "got: {}", err.message);
        assert_eq!(find_group(&dir, 1, "11").await.unwrap().id, 11);
    }

    #[tokio::test]
    async fn infer_bot_requires_exactly_one() {
        let dir = InMemoryDirectory::new();
        assert!(infer_bot(&dir).await.is_err());
        dir.add_bot(Bot { id: 1, nick: "a".into() }).await;
        assert_eq!(infer_bot(&dir).await.unwrap().id, 1);
        dir.add_bot(Bot { id: 2, nick: "b".into() }).await;
        let err = infer_bot(&dir).await.unwrap_err();
        assert!(err.message.contains("2 bots"), "got: {}", err.message);
    }

    #[tokio::test]
    async fn infer_group_needs_group_context() {
        let dir = directory_with(vec![member(1, "Alice", "")]).await;
        let sender = CommandSender::MemberSender {
            bot: 1,
            member: member(1, "Alice", ""),
        };
        assert_eq!(infer_group(&dir, &sender).await.unwrap().id, 10);
        assert!(infer_group(&dir, &CommandSender::Console).await.is_err());
    }

    #[tokio::test]
    async fn infer_friend_is_the_sender() {
        let friend = Friend { bot: 1, id: 7, nick: "f".into() };
        let sender = CommandSender::FriendSender { bot: 1, friend: friend.clone() };
        assert_eq!(infer_friend(&sender).unwrap(), friend);
        assert!(infer_friend(&CommandSender::Console).is_err());
    }
}
