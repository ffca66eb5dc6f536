/// Raw and resolved command calls.
///
/// A `RawCommandCall` is what the (external) call parser produces from an
/// inbound message: a callee name and ordered raw arguments. A
/// `ResolvedCommandCall` is the resolver's output: the chosen overload
/// with every argument converted; immutable, its values computed once.
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use herald_core::{CommandSender, MessageSegment};

use crate::command::CommandSpec;
use crate::signature::{ArgKind, Signature, ValueParameter};
use crate::values::ArgValue;

// ---------------------------------------------------------------------------
// Raw calls
// ---------------------------------------------------------------------------

/// One raw argument: a plain token or an opaque rich segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawArgument {
    Text { token: String },
    Rich { segment: MessageSegment },
}

impl RawArgument {
    pub fn text(token: impl Into<String>) -> Self {
        Self::Text { token: token.into() }
    }

    /// The kind this argument satisfies without any conversion.
    pub fn natural_kind(&self) -> ArgKind {
        match self {
            Self::Text { .. } => ArgKind::Str,
            Self::Rich { .. } => ArgKind::Segment,
        }
    }

    /// Plain-text rendering, used in diagnostics and text-parse fallbacks.
    pub fn render_text(&self) -> String {
        match self {
            Self::Text { token } => token.clone(),
            Self::Rich { segment } => segment.render_text(),
        }
    }
}

/// A parsed-but-unresolved call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommandCall {
    /// The callee name as typed, possibly carrying the command prefix.
    pub callee: String,
    pub arguments: Vec<RawArgument>,
}

// ---------------------------------------------------------------------------
// Call parser seam
// ---------------------------------------------------------------------------

/// Tokenizes an inbound message into a raw call.
///
/// This is an external collaborator of the dispatch core; the bundled
/// `SpaceSeparatedParser` covers the common case and embedders may swap in
/// their own (quoting, code blocks, etc.).
pub trait CallParser: Send + Sync {
    /// `None` when the message is not a command call at all.
    fn parse(&self, message: &[MessageSegment]) -> Option<RawCommandCall>;
}

/// Whitespace tokenizer: the first token of the leading text segment is
/// the callee; remaining tokens become text arguments and rich segments
/// pass through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpaceSeparatedParser;

impl CallParser for SpaceSeparatedParser {
    fn parse(&self, message: &[MessageSegment]) -> Option<RawCommandCall> {
        let mut segments = message.iter();
        let first = loop {
            match segments.next() {
                Some(MessageSegment::Text { text }) if text.trim().is_empty() => continue,
                Some(MessageSegment::Text { text }) => break text,
                _ => return None,
            }
        };

        let mut tokens = first.split_whitespace();
        let callee = tokens.next()?.to_string();
        let mut arguments: Vec<RawArgument> =
            tokens.map(RawArgument::text).collect();

        for segment in segments {
            match segment {
                MessageSegment::Text { text } => {
                    arguments.extend(text.split_whitespace().map(RawArgument::text));
                }
                rich => arguments.push(RawArgument::Rich { segment: rich.clone() }),
            }
        }
        Some(RawCommandCall { callee, arguments })
    }
}

// ---------------------------------------------------------------------------
// Resolved calls
// ---------------------------------------------------------------------------

/// How one raw argument matched its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentAcceptance {
    /// Exact declared type; no conversion ran.
    Direct,
    /// A parser mapped it.
    Converted,
    /// No parser accepted it. Never stored in a binding: an impossible
    /// match rejects the whole signature as inapplicable before any
    /// binding is kept.
    Impossible,
}

/// One bound (parameter, value) pair of a resolved call.
#[derive(Debug, Clone)]
pub struct Binding {
    pub parameter: ValueParameter,
    pub value: ArgValue,
    pub acceptance: ArgumentAcceptance,
}

/// A fully resolved call, ready for invocation. Immutable.
#[derive(Debug, Clone)]
pub struct ResolvedCommandCall {
    pub sender: CommandSender,
    pub command: Arc<CommandSpec>,
    pub signature: Arc<Signature>,
    bindings: Vec<Binding>,
}

impl ResolvedCommandCall {
    pub(crate) fn new(
        sender: CommandSender,
        command: Arc<CommandSpec>,
        signature: Arc<Signature>,
        bindings: Vec<Binding>,
    ) -> Self {
        Self { sender, command, signature, bindings }
    }

    /// All bindings, in parameter order (constants included).
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The values handed to the implementation: bound typed parameters
    /// only. Constants exist to drive matching and are skipped; optional
    /// parameters left unfilled contribute nothing.
    pub fn invocation_args(&self) -> Vec<ArgValue> {
        self.bindings
            .iter()
            .filter(|b| !b.parameter.is_constant())
            .map(|b| b.value.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_callee_and_text_arguments() {
        let call = SpaceSeparatedParser
            .parse(&[MessageSegment::text("/mute  Alice 10")])
            .unwrap();
        assert_eq!(call.callee, "/mute");
        assert_eq!(
            call.arguments,
            vec![RawArgument::text("Alice"), RawArgument::text("10")]
        );
    }

    #[test]
    fn rich_segments_pass_through() {
        let at = MessageSegment::At { target: 42 };
        let call = SpaceSeparatedParser
            .parse(&[MessageSegment::text("/mute "), at.clone(), MessageSegment::text(" 10")])
            .unwrap();
        assert_eq!(call.arguments.len(), 2);
        assert_eq!(call.arguments[0], RawArgument::Rich { segment: at });
        assert_eq!(call.arguments[1], RawArgument::text("10"));
    }

    #[test]
    fn empty_or_rich_leading_message_is_no_call() {
        assert!(SpaceSeparatedParser.parse(&[]).is_none());
        assert!(SpaceSeparatedParser.parse(&[MessageSegment::text("   ")]).is_none());
        assert!(SpaceSeparatedParser
            .parse(&[MessageSegment::Image { image_id: "x".into() }])
            .is_none());
    }

    #[test]
    fn natural_kinds() {
        assert_eq!(RawArgument::text("x").natural_kind(), ArgKind::Str);
        let rich = RawArgument::Rich { segment: MessageSegment::At { target: 1 } };
        assert_eq!(rich.natural_kind(), ArgKind::Segment);
    }
}
