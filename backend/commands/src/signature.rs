/// Parameter and signature model.
///
/// A `Signature` is one accepted shape of a command invocation: ordered
/// value parameters, an optional receiver capability, and the
/// implementation to run. Signatures are built declaratively at
/// registration time, validated once, and immutable afterwards — they are
/// freely shared across concurrent resolutions.
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use herald_core::ReceiverKind;

use crate::dispatch::CommandAction;

// ---------------------------------------------------------------------------
// Declared kinds
// ---------------------------------------------------------------------------

/// The closed set of declared parameter kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    Int,
    Long,
    Short,
    Byte,
    Float,
    Double,
    Bool,
    Str,
    /// A raw rich-content segment, passed through unparsed.
    Segment,
    Bot,
    Friend,
    Group,
    Member,
    /// A member or friend, whichever resolves.
    Contact,
    /// An application enum, keyed by its registered type name.
    Enum(String),
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum(name) => write!(f, "enum {name}"),
            other => write!(f, "{}", format!("{other:?}").to_lowercase()),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// One declared parameter of a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueParameter {
    /// A typed value parameter.
    Typed { name: String, kind: ArgKind, optional: bool, vararg: bool },
    /// A literal token that must match exactly; encodes multi-word
    /// subcommand names as leading parameters. Never passed to the
    /// implementation.
    Constant { literal: String },
}

impl ValueParameter {
    pub fn required(name: impl Into<String>, kind: ArgKind) -> Self {
        Self::Typed { name: name.into(), kind, optional: false, vararg: false }
    }

    pub fn optional(name: impl Into<String>, kind: ArgKind) -> Self {
        Self::Typed { name: name.into(), kind, optional: true, vararg: false }
    }

    pub fn vararg(name: impl Into<String>, kind: ArgKind) -> Self {
        Self::Typed { name: name.into(), kind, optional: false, vararg: true }
    }

    pub fn constant(literal: impl Into<String>) -> Self {
        Self::Constant { literal: literal.into() }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Typed { optional: true, .. })
    }

    pub fn is_vararg(&self) -> bool {
        matches!(self, Self::Typed { vararg: true, .. })
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant { .. })
    }

    /// The name used in diagnostics and usage rendering.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Typed { name, .. } => name,
            Self::Constant { literal } => literal,
        }
    }
}

// ---------------------------------------------------------------------------
// Erased shapes
// ---------------------------------------------------------------------------

/// The erased form of one parameter: type and variadicity, no names or
/// optionality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamShape {
    Kind { kind: ArgKind, vararg: bool },
    Constant(String),
}

/// The erased shape of a whole signature; two signatures of one command
/// may not share one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErasedShape {
    pub receiver: Option<ReceiverKind>,
    pub params: Vec<ParamShape>,
}

// ---------------------------------------------------------------------------
// Declaration errors
// ---------------------------------------------------------------------------

/// Registration-time declaration errors. Always fatal to the registration,
/// never a per-call concern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("a vararg parameter must be the last parameter")]
    VarargNotLast,

    #[error("a vararg parameter cannot also be optional")]
    OptionalVararg,

    #[error("signature declares no implementation")]
    MissingAction,

    #[error("command name \"{name}\" contains reserved character '{ch}'")]
    ReservedCharacter { name: String, ch: char },

    #[error("command name must not be empty")]
    EmptyName,

    #[error("command declares no signatures")]
    NoSignatures,

    #[error("signatures {first} and {second} share an identical erased shape")]
    SignatureClash { first: usize, second: usize },
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// One overload of a command. Immutable once built.
pub struct Signature {
    parameters: Vec<ValueParameter>,
    receiver: Option<ReceiverKind>,
    description: Option<String>,
    action: Arc<dyn CommandAction>,
}

impl Signature {
    pub fn builder() -> SignatureBuilder {
        SignatureBuilder::default()
    }

    pub fn parameters(&self) -> &[ValueParameter] {
        &self.parameters
    }

    pub fn receiver(&self) -> Option<ReceiverKind> {
        self.receiver
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn action(&self) -> &Arc<dyn CommandAction> {
        &self.action
    }

    pub fn has_vararg(&self) -> bool {
        self.parameters.last().is_some_and(ValueParameter::is_vararg)
    }

    /// The erased shape used for clash detection.
    pub fn erased_shape(&self) -> ErasedShape {
        let params = self
            .parameters
            .iter()
            .map(|p| match p {
                ValueParameter::Typed { kind, vararg, .. } => {
                    ParamShape::Kind { kind: kind.clone(), vararg: *vararg }
                }
                ValueParameter::Constant { literal } => ParamShape::Constant(literal.clone()),
            })
            .collect();
        ErasedShape { receiver: self.receiver, params }
    }

    /// Compact shape rendering for diagnostics, e.g. `(int, str...)`.
    pub fn shape_string(&self) -> String {
        let parts: Vec<String> = self
            .parameters
            .iter()
            .map(|p| match p {
                ValueParameter::Typed { kind, vararg: true, .. } => format!("{kind}..."),
                ValueParameter::Typed { kind, .. } => kind.to_string(),
                ValueParameter::Constant { literal } => format!("\"{literal}\""),
            })
            .collect();
        format!("({})", parts.join(", "))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("parameters", &self.parameters)
            .field("receiver", &self.receiver)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Builder for `Signature`; validates at `build`.
#[derive(Default)]
pub struct SignatureBuilder {
    parameters: Vec<ValueParameter>,
    receiver: Option<ReceiverKind>,
    description: Option<String>,
    action: Option<Arc<dyn CommandAction>>,
}

impl SignatureBuilder {
    pub fn receiver(mut self, receiver: ReceiverKind) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn param(mut self, parameter: ValueParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn required(self, name: impl Into<String>, kind: ArgKind) -> Self {
        self.param(ValueParameter::required(name, kind))
    }

    pub fn optional(self, name: impl Into<String>, kind: ArgKind) -> Self {
        self.param(ValueParameter::optional(name, kind))
    }

    pub fn vararg(self, name: impl Into<String>, kind: ArgKind) -> Self {
        self.param(ValueParameter::vararg(name, kind))
    }

    pub fn constant(self, literal: impl Into<String>) -> Self {
        self.param(ValueParameter::constant(literal))
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn action(mut self, action: Arc<dyn CommandAction>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn build(self) -> Result<Signature, DeclarationError> {
        let action = self.action.ok_or(DeclarationError::MissingAction)?;
        let last = self.parameters.len().saturating_sub(1);
        for (i, p) in self.parameters.iter().enumerate() {
            if p.is_vararg() {
                if i != last {
                    return Err(DeclarationError::VarargNotLast);
                }
                if p.is_optional() {
                    return Err(DeclarationError::OptionalVararg);
                }
            }
        }
        Ok(Signature {
            parameters: self.parameters,
            receiver: self.receiver,
            description: self.description,
            action,
        })
    }
}
