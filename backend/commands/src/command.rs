/// Command specification: names, prefix policy, and overloads.
///
/// A `CommandSpec` is constructed once at registration through
/// `CommandBuilder`, which enforces the declaration invariants: legal
/// names, at least one signature, and no two signatures sharing an erased
/// shape.
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::signature::{DeclarationError, Signature, ValueParameter};

/// Characters a command name may never contain.
static RESERVED_CHARS: Lazy<Vec<char>> =
    Lazy::new(|| "\\/!@#$%^&*()_+-={}[];':\",.<>?`~".chars().collect());

/// Validate one command name against the reserved character set.
pub fn validate_name(name: &str) -> Result<(), DeclarationError> {
    if name.is_empty() {
        return Err(DeclarationError::EmptyName);
    }
    for ch in name.chars() {
        if ch.is_whitespace() || RESERVED_CHARS.contains(&ch) {
            return Err(DeclarationError::ReservedCharacter { name: name.to_string(), ch });
        }
    }
    Ok(())
}

/// A registered command: owner tag, names, prefix policy, and overloads.
#[derive(Debug)]
pub struct CommandSpec {
    owner: String,
    primary: String,
    secondary: Vec<String>,
    prefix_optional: bool,
    description: Option<String>,
    signatures: Vec<Arc<Signature>>,
}

impl CommandSpec {
    pub fn builder(owner: impl Into<String>, primary: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            owner: owner.into(),
            primary: primary.into(),
            secondary: Vec::new(),
            prefix_optional: false,
            description: None,
            signatures: Vec::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn primary_name(&self) -> &str {
        &self.primary
    }

    /// All names: primary first, then aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.secondary.iter().map(String::as_str))
    }

    /// Whether the command may also be called without the prefix.
    pub fn prefix_optional(&self) -> bool {
        self.prefix_optional
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn signatures(&self) -> &[Arc<Signature>] {
        &self.signatures
    }

    /// Whether any of this command's names equals `name`, case-insensitively.
    pub fn answers_to(&self, name: &str) -> bool {
        self.names().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// Render the usage text: one line per signature.
    ///
    /// `prefix name <required> [optional]`, prefix parenthesized when the
    /// command is prefix-optional, with a ` # description` suffix when the
    /// signature carries one.
    pub fn usage(&self, prefix: &str) -> String {
        let shown_prefix = if self.prefix_optional {
            format!("({prefix})")
        } else {
            prefix.to_string()
        };
        let mut lines = Vec::with_capacity(self.signatures.len());
        for sig in &self.signatures {
            let mut line = format!("{shown_prefix}{}", self.primary);
            for param in sig.parameters() {
                match param {
                    ValueParameter::Constant { literal } => {
                        line.push(' ');
                        line.push_str(literal);
                    }
                    p if p.is_optional() || p.is_vararg() => {
                        line.push_str(&format!(" [{}]", p.display_name()));
                    }
                    p => line.push_str(&format!(" <{}>", p.display_name())),
                }
            }
            if let Some(desc) = sig.description() {
                line.push_str(&format!("    # {desc}"));
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

/// Builder for `CommandSpec`; all declaration checks happen in `build`.
pub struct CommandBuilder {
    owner: String,
    primary: String,
    secondary: Vec<String>,
    prefix_optional: bool,
    description: Option<String>,
    signatures: Vec<Arc<Signature>>,
}

impl CommandBuilder {
    /// Add a secondary name (alias).
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.secondary.push(name.into());
        self
    }

    pub fn prefix_optional(mut self, optional: bool) -> Self {
        self.prefix_optional = optional;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn signature(mut self, signature: Signature) -> Self {
        self.signatures.push(Arc::new(signature));
        self
    }

    pub fn build(self) -> Result<Arc<CommandSpec>, DeclarationError> {
        validate_name(&self.primary)?;
        for name in &self.secondary {
            validate_name(name)?;
        }
        if self.signatures.is_empty() {
            return Err(DeclarationError::NoSignatures);
        }
        // Declaration clash: no two overloads may share an erased shape.
        let shapes: Vec<_> = self.signatures.iter().map(|s| s.erased_shape()).collect();
        for i in 0..shapes.len() {
            for j in (i + 1)..shapes.len() {
                if shapes[i] == shapes[j] {
                    return Err(DeclarationError::SignatureClash { first: i, second: j });
                }
            }
        }
        Ok(Arc::new(CommandSpec {
            owner: self.owner,
            primary: self.primary,
            secondary: self.secondary,
            prefix_optional: self.prefix_optional,
            description: self.description,
            signatures: self.signatures,
        }))
    }
}
