/// Type-directed argument value parsers.
///
/// Each parser converts one raw token (or rich segment) into a typed
/// `ArgValue`. Parsers are indexed by declared `ArgKind` in a
/// `ParserRegistry`; embedders override or extend per dispatch context.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use herald_core::{CommandSender, ContactDirectory, MessageSegment, ParseFailure};

use crate::signature::ArgKind;
use crate::values::ArgValue;

pub mod enumeration;
pub mod identity;
pub mod primitive;

pub use enumeration::{EnumConfigError, EnumParser};
pub use identity::{BotParser, ContactParser, FriendParser, GroupParser, MemberParser};
pub use primitive::{
    BoolParser, ByteParser, DoubleParser, FloatParser, IntParser, LongParser, SegmentParser,
    ShortParser, StrParser,
};

/// Context available to every parser invocation: who is calling, and the
/// directory to resolve identities against.
#[derive(Clone)]
pub struct ParseContext {
    pub sender: CommandSender,
    pub directory: Arc<dyn ContactDirectory>,
}

/// A converter from raw input to one typed value.
#[async_trait]
pub trait ArgumentParser: Send + Sync {
    /// Short name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Parse a plain text token.
    async fn parse_text(&self, token: &str, ctx: &ParseContext) -> Result<ArgValue, ParseFailure>;

    /// Parse a rich segment. Defaults to render-to-text then `parse_text`;
    /// parsers that understand a segment natively override this.
    async fn parse_rich(
        &self,
        segment: &MessageSegment,
        ctx: &ParseContext,
    ) -> Result<ArgValue, ParseFailure> {
        self.parse_text(&segment.render_text(), ctx).await
    }
}

/// Kind-indexed parser table.
#[derive(Default, Clone)]
pub struct ParserRegistry {
    parsers: HashMap<ArgKind, Arc<dyn ArgumentParser>>,
}

impl ParserRegistry {
    /// An empty registry; useful for fully custom parser stacks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The full built-in set: numerics, bool, string, segment, and the
    /// identity parsers. Enum parsers are registered per application type
    /// via `insert`.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.insert(ArgKind::Int, Arc::new(IntParser));
        registry.insert(ArgKind::Long, Arc::new(LongParser));
        registry.insert(ArgKind::Short, Arc::new(ShortParser));
        registry.insert(ArgKind::Byte, Arc::new(ByteParser));
        registry.insert(ArgKind::Float, Arc::new(FloatParser));
        registry.insert(ArgKind::Double, Arc::new(DoubleParser));
        registry.insert(ArgKind::Bool, Arc::new(BoolParser));
        registry.insert(ArgKind::Str, Arc::new(StrParser));
        registry.insert(ArgKind::Segment, Arc::new(SegmentParser));
        registry.insert(ArgKind::Bot, Arc::new(BotParser));
        registry.insert(ArgKind::Friend, Arc::new(FriendParser));
        registry.insert(ArgKind::Group, Arc::new(GroupParser));
        registry.insert(ArgKind::Member, Arc::new(MemberParser));
        registry.insert(ArgKind::Contact, Arc::new(ContactParser));
        registry
    }

    /// Install or override the parser for a kind.
    pub fn insert(&mut self, kind: ArgKind, parser: Arc<dyn ArgumentParser>) {
        self.parsers.insert(kind, parser);
    }

    pub fn get(&self, kind: &ArgKind) -> Option<Arc<dyn ArgumentParser>> {
        self.parsers.get(kind).cloned()
    }
}
