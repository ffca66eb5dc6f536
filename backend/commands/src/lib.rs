//! `herald-commands` — the command dispatch core.
//!
//! Text commands are declared as a set of overloaded signatures; inbound
//! messages are tokenized, matched against the registry, and resolved to
//! one overload at runtime by type-directed argument parsing. The pieces:
//!
//! - Declaration: `CommandSpec` / `Signature` builders with
//!   registration-time validation (names, erased-shape clashes)
//! - Registry: concurrent name lookup with snapshot reads
//! - Parsing: `ArgumentParser` implementations per declared kind,
//!   including identity parsers backed by a `ContactDirectory`
//! - Resolution: longest-match overload selection with exact-type
//!   tie-breaking and aggregated failure reports
//! - Dispatch: the pipeline gluing interception, resolution, and
//!   invocation together

pub mod call;
pub mod command;
pub mod dispatch;
pub mod parsers;
pub mod registry;
pub mod resolver;
pub mod signature;
pub mod values;

pub use call::{
    ArgumentAcceptance, Binding, CallParser, RawArgument, RawCommandCall, ResolvedCommandCall,
    SpaceSeparatedParser,
};
pub use command::{validate_name, CommandBuilder, CommandSpec};
pub use dispatch::{
    action_fn, CommandAction, CommandDispatcher, CommandResponse, ExecuteResult, InvokeContext,
};
pub use parsers::{ArgumentParser, EnumParser, ParseContext, ParserRegistry};
pub use registry::CommandRegistry;
pub use resolver::{
    resolve, RejectedSignature, ResolveFailure, SignatureRejection, OPTIONAL_PENALTY,
};
pub use signature::{
    ArgKind, DeclarationError, ErasedShape, ParamShape, Signature, SignatureBuilder,
    ValueParameter,
};
pub use values::ArgValue;
