/// Enum value parser.
///
/// An application registers one `EnumParser` per enum type, naming its
/// variants. Matching tries three rungs in order: exact, case-insensitive,
/// then a generated camelCase alias (for SCREAMING_SNAKE variant names).
/// Whether the looser rungs are safe is decided once, at construction:
/// case-insensitive matching is disabled when two variants collide
/// case-folded, and aliases are disabled when the alias set collides with
/// itself or the raw names. Nothing is ever ambiguous at dispatch time.
use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use herald_core::ParseFailure;

use super::{ArgumentParser, ParseContext};
use crate::values::ArgValue;

/// Construction-time configuration errors; programmer errors, fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumConfigError {
    #[error("enum {enum_name} declares no variants")]
    NoVariants { enum_name: String },

    #[error("enum {enum_name} declares duplicate variant \"{variant}\"")]
    DuplicateVariant { enum_name: String, variant: String },
}

pub struct EnumParser {
    enum_name: String,
    variants: Vec<String>,
    /// Lowercased name → variant; `None` when two variants collide folded.
    folded: Option<HashMap<String, String>>,
    /// camelCase alias → variant; `None` when the alias set is unsafe.
    aliases: Option<HashMap<String, String>>,
}

impl EnumParser {
    pub fn new<I, S>(enum_name: impl Into<String>, variants: I) -> Result<Self, EnumConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let enum_name = enum_name.into();
        let variants: Vec<String> = variants.into_iter().map(Into::into).collect();
        if variants.is_empty() {
            return Err(EnumConfigError::NoVariants { enum_name });
        }
        for (i, v) in variants.iter().enumerate() {
            if variants[..i].contains(v) {
                return Err(EnumConfigError::DuplicateVariant {
                    enum_name,
                    variant: v.clone(),
                });
            }
        }

        let mut folded: HashMap<String, String> = HashMap::new();
        let mut folded_safe = true;
        for v in &variants {
            if folded.insert(v.to_lowercase(), v.clone()).is_some() {
                folded_safe = false;
                break;
            }
        }

        let mut aliases: HashMap<String, String> = HashMap::new();
        let mut alias_safe = true;
        for v in &variants {
            let alias = camel_alias(v);
            if alias == *v {
                continue;
            }
            if variants.contains(&alias) || aliases.insert(alias, v.clone()).is_some() {
                alias_safe = false;
                break;
            }
        }

        Ok(Self {
            enum_name,
            variants,
            folded: folded_safe.then_some(folded),
            aliases: alias_safe.then_some(aliases),
        })
    }

    pub fn enum_name(&self) -> &str {
        &self.enum_name
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    fn resolve(&self, token: &str) -> Option<&str> {
        if let Some(v) = self.variants.iter().find(|v| v.as_str() == token) {
            return Some(v);
        }
        if let Some(folded) = &self.folded {
            if let Some(v) = folded.get(&token.to_lowercase()) {
                return Some(v);
            }
        }
        if let Some(aliases) = &self.aliases {
            if let Some(v) = aliases.get(token) {
                return Some(v);
            }
        }
        None
    }
}

/// camelCase alias for a SCREAMING_SNAKE variant name:
/// `RED_CARD` → `redCard`. A name without underscores just folds its
/// first segment: `RED` → `red`.
fn camel_alias(variant: &str) -> String {
    let mut out = String::with_capacity(variant.len());
    for (i, part) in variant.split('_').filter(|p| !p.is_empty()).enumerate() {
        let lower = part.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

#[async_trait]
impl ArgumentParser for EnumParser {
    fn name(&self) -> &str {
        &self.enum_name
    }

    async fn parse_text(&self, token: &str, _ctx: &ParseContext) -> Result<ArgValue, ParseFailure> {
        match self.resolve(token) {
            Some(variant) => Ok(ArgValue::Enum {
                enum_name: self.enum_name.clone(),
                variant: variant.to_string(),
            }),
            None => Err(ParseFailure::bad_token(token, &self.enum_name)),
        }
    }
}
