/// Overload resolution.
///
/// Given a raw call and the matched command's signatures, build a
/// candidate per applicable signature, then select the best one:
/// a lone candidate wins; otherwise the "longest match" score keeps the
/// candidates binding the most parameters without leaning on unfilled
/// optionals, and a unique exact-type (Direct) acceptance breaks any
/// remaining tie. Irreconcilable ties are reported as a genuine
/// resolution ambiguity, which outranks ordinary mismatch reasons in the
/// aggregated failure because it signals a registration-design problem.
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use herald_core::{ParseFailure, ReceiverKind};

use crate::call::{
    ArgumentAcceptance, Binding, RawArgument, RawCommandCall, ResolvedCommandCall,
};
use crate::command::CommandSpec;
use crate::parsers::{ParseContext, ParserRegistry};
use crate::signature::{ArgKind, Signature, ValueParameter};
use crate::values::ArgValue;

/// Per unfilled optional parameter, a candidate's score drops by this
/// much. Slightly above 1 so that leaving an optional unfilled always
/// ranks below binding one more parameter, while never overturning a
/// whole-parameter-count difference between candidates.
pub const OPTIONAL_PENALTY: f64 = 1.001;

// ---------------------------------------------------------------------------
// Failure taxonomy
// ---------------------------------------------------------------------------

/// Why one signature rejected the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureRejection {
    #[error("not enough arguments")]
    NotEnoughArguments,

    #[error("too many arguments")]
    TooManyArguments,

    #[error("caller must satisfy {required:?}")]
    InapplicableReceiver { required: ReceiverKind },

    #[error("argument \"{argument}\" is not applicable to <{parameter}>: {failure}")]
    InapplicableArgument { parameter: String, argument: String, failure: ParseFailure },

    #[error("ambiguous match")]
    Ambiguous,
}

/// One rejected signature and its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSignature {
    /// The signature's shape rendering, e.g. `(int, str...)`.
    pub shape: String,
    pub rejection: SignatureRejection,
}

/// The aggregated resolver-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveFailure {
    /// True when two or more signatures tied irreconcilably; the tied
    /// signatures appear in `rejected` with `Ambiguous`.
    pub ambiguity: bool,
    pub rejected: Vec<RejectedSignature>,
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ambiguity {
            writeln!(f, "ambiguous call; equally matching overloads:")?;
            for r in self.rejected.iter().filter(|r| r.rejection == SignatureRejection::Ambiguous)
            {
                writeln!(f, "  {}", r.shape)?;
            }
            Ok(())
        } else {
            writeln!(f, "no applicable overload:")?;
            for r in &self.rejected {
                writeln!(f, "  {}: {}", r.shape, r.rejection)?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ResolveFailure {}

// ---------------------------------------------------------------------------
// Candidate construction
// ---------------------------------------------------------------------------

struct Candidate {
    signature: Arc<Signature>,
    bindings: Vec<Binding>,
    unfilled_optionals: usize,
}

impl Candidate {
    /// The "longest match" score.
    fn score(&self) -> f64 {
        self.signature.parameters().len() as f64
            - self.unfilled_optionals as f64 * OPTIONAL_PENALTY
    }
}

/// Match one raw argument against a declared kind.
async fn accept_typed(
    kind: &ArgKind,
    arg: &RawArgument,
    parsers: &ParserRegistry,
    ctx: &ParseContext,
) -> Result<(ArgValue, ArgumentAcceptance), ParseFailure> {
    if arg.natural_kind() == *kind {
        let value = match arg {
            RawArgument::Text { token } => ArgValue::Str(token.clone()),
            RawArgument::Rich { segment } => ArgValue::Segment(segment.clone()),
        };
        return Ok((value, ArgumentAcceptance::Direct));
    }
    let parser = parsers
        .get(kind)
        .ok_or_else(|| ParseFailure::new(format!("no parser registered for {kind}")))?;
    let value = match arg {
        RawArgument::Text { token } => parser.parse_text(token, ctx).await?,
        RawArgument::Rich { segment } => parser.parse_rich(segment, ctx).await?,
    };
    Ok((value, ArgumentAcceptance::Converted))
}

async fn try_candidate(
    signature: &Arc<Signature>,
    call: &RawCommandCall,
    parsers: &ParserRegistry,
    ctx: &ParseContext,
) -> Result<Candidate, SignatureRejection> {
    if let Some(required) = signature.receiver() {
        if !ctx.sender.satisfies(required) {
            return Err(SignatureRejection::InapplicableReceiver { required });
        }
    }

    let args = &call.arguments;
    let mut bindings = Vec::with_capacity(signature.parameters().len());
    let mut cursor = 0usize;
    let mut unfilled_optionals = 0usize;

    for param in signature.parameters() {
        match param {
            ValueParameter::Constant { literal } => {
                let Some(arg) = args.get(cursor) else {
                    return Err(SignatureRejection::NotEnoughArguments);
                };
                cursor += 1;
                let matches = matches!(arg, RawArgument::Text { token } if token == literal);
                if !matches {
                    return Err(SignatureRejection::InapplicableArgument {
                        parameter: literal.clone(),
                        argument: arg.render_text(),
                        failure: ParseFailure::new(format!("expected literal \"{literal}\"")),
                    });
                }
                bindings.push(Binding {
                    parameter: param.clone(),
                    value: ArgValue::Str(literal.clone()),
                    acceptance: ArgumentAcceptance::Direct,
                });
            }
            ValueParameter::Typed { name, kind, optional, vararg } => {
                if *vararg {
                    // Merge every trailing argument; zero is legal and
                    // yields an explicit empty value.
                    let mut elements = Vec::with_capacity(args.len() - cursor);
                    let mut all_direct = true;
                    for arg in &args[cursor..] {
                        match accept_typed(kind, arg, parsers, ctx).await {
                            Ok((value, acceptance)) => {
                                if acceptance != ArgumentAcceptance::Direct {
                                    all_direct = false;
                                }
                                elements.push(value);
                            }
                            Err(failure) => {
                                return Err(SignatureRejection::InapplicableArgument {
                                    parameter: name.clone(),
                                    argument: arg.render_text(),
                                    failure,
                                });
                            }
                        }
                    }
                    cursor = args.len();
                    let acceptance = if all_direct && !elements.is_empty() {
                        ArgumentAcceptance::Direct
                    } else {
                        ArgumentAcceptance::Converted
                    };
                    bindings.push(Binding {
                        parameter: param.clone(),
                        value: ArgValue::List(elements),
                        acceptance,
                    });
                } else if let Some(arg) = args.get(cursor) {
                    cursor += 1;
                    match accept_typed(kind, arg, parsers, ctx).await {
                        Ok((value, acceptance)) => bindings.push(Binding {
                            parameter: param.clone(),
                            value,
                            acceptance,
                        }),
                        Err(failure) => {
                            return Err(SignatureRejection::InapplicableArgument {
                                parameter: name.clone(),
                                argument: arg.render_text(),
                                failure,
                            });
                        }
                    }
                } else if *optional {
                    unfilled_optionals += 1;
                } else {
                    return Err(SignatureRejection::NotEnoughArguments);
                }
            }
        }
    }

    if cursor < args.len() {
        return Err(SignatureRejection::TooManyArguments);
    }
    Ok(Candidate { signature: Arc::clone(signature), bindings, unfilled_optionals })
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Resolve a raw call against a command's signatures.
pub async fn resolve(
    command: &Arc<CommandSpec>,
    call: &RawCommandCall,
    parsers: &ParserRegistry,
    ctx: &ParseContext,
) -> Result<ResolvedCommandCall, ResolveFailure> {
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut rejected: Vec<RejectedSignature> = Vec::new();

    for signature in command.signatures() {
        match try_candidate(signature, call, parsers, ctx).await {
            Ok(candidate) => candidates.push(candidate),
            Err(rejection) => rejected.push(RejectedSignature {
                shape: signature.shape_string(),
                rejection,
            }),
        }
    }

    let winner = match candidates.len() {
        0 => return Err(ResolveFailure { ambiguity: false, rejected }),
        1 => candidates.pop().expect("len checked"),
        _ => {
            let best = candidates.iter().map(Candidate::score).fold(f64::NEG_INFINITY, f64::max);
            let mut tied: Vec<Candidate> = candidates
                .into_iter()
                .filter(|c| (c.score() - best).abs() < 1e-9)
                .collect();
            if tied.len() == 1 {
                tied.pop().expect("len checked")
            } else {
                // Tie-break on exact-type acceptances, mirroring statically
                // typed overload resolution preferring non-converting
                // matches: when exactly one tied candidate holds Direct
                // matches, it wins. Direct matches spread across several
                // candidates discriminate nothing. Constants are excluded;
                // a matched constant is Direct in every tied candidate.
                let mut owners: Vec<usize> = tied
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| {
                        c.bindings.iter().any(|b| {
                            !b.parameter.is_constant()
                                && b.acceptance == ArgumentAcceptance::Direct
                        })
                    })
                    .map(|(ci, _)| ci)
                    .collect();
                if owners.len() == 1 {
                    tied.swap_remove(owners.pop().expect("len checked"))
                } else {
                    for c in &tied {
                        rejected.push(RejectedSignature {
                            shape: c.signature.shape_string(),
                            rejection: SignatureRejection::Ambiguous,
                        });
                    }
                    return Err(ResolveFailure { ambiguity: true, rejected });
                }
            }
        }
    };

    debug!(
        "[Resolver] \"{}\" resolved to {}",
        command.primary_name(),
        winner.signature.shape_string()
    );
    Ok(ResolvedCommandCall::new(
        ctx.sender.clone(),
        Arc::clone(command),
        winner.signature,
        winner.bindings,
    ))
}
