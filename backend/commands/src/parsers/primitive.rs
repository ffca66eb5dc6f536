/// Built-in parsers for primitive kinds.
use async_trait::async_trait;

use herald_core::{MessageSegment, ParseFailure};

use super::{ArgumentParser, ParseContext};
use crate::values::ArgValue;

macro_rules! numeric_parser {
    ($parser:ident, $ty:ty, $variant:ident, $label:literal) => {
        pub struct $parser;

        #[async_trait]
        impl ArgumentParser for $parser {
            fn name(&self) -> &str {
                $label
            }

            async fn parse_text(
                &self,
                token: &str,
                _ctx: &ParseContext,
            ) -> Result<ArgValue, ParseFailure> {
                token
                    .parse::<$ty>()
                    .map(ArgValue::$variant)
                    .map_err(|_| ParseFailure::bad_token(token, $label))
            }
        }
    };
}

numeric_parser!(IntParser, i32, Int, "integer");
numeric_parser!(LongParser, i64, Long, "long");
numeric_parser!(ShortParser, i16, Short, "short");
numeric_parser!(ByteParser, i8, Byte, "byte");
numeric_parser!(FloatParser, f32, Float, "float");
numeric_parser!(DoubleParser, f64, Double, "double");

/// Words that read as `true`, case-insensitively. Everything else is
/// `false` — never a parse error.
const TRUE_WORDS: [&str; 5] = ["true", "yes", "enabled", "on", "1"];

pub struct BoolParser;

#[async_trait]
impl ArgumentParser for BoolParser {
    fn name(&self) -> &str {
        "bool"
    }

    async fn parse_text(&self, token: &str, _ctx: &ParseContext) -> Result<ArgValue, ParseFailure> {
        let folded = token.to_lowercase();
        Ok(ArgValue::Bool(TRUE_WORDS.contains(&folded.as_str())))
    }
}

pub struct StrParser;

#[async_trait]
impl ArgumentParser for StrParser {
    fn name(&self) -> &str {
        "string"
    }

    async fn parse_text(&self, token: &str, _ctx: &ParseContext) -> Result<ArgValue, ParseFailure> {
        Ok(ArgValue::Str(token.to_string()))
    }
}

/// Passes rich segments through unparsed; plain text becomes a text
/// segment.
pub struct SegmentParser;

#[async_trait]
impl ArgumentParser for SegmentParser {
    fn name(&self) -> &str {
        "segment"
    }

    async fn parse_text(&self, token: &str, _ctx: &ParseContext) -> Result<ArgValue, ParseFailure> {
        Ok(ArgValue::Segment(MessageSegment::text(token)))
    }

    async fn parse_rich(
        &self,
        segment: &MessageSegment,
        _ctx: &ParseContext,
    ) -> Result<ArgValue, ParseFailure> {
        Ok(ArgValue::Segment(segment.clone()))
    }
}
