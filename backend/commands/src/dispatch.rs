/// Command dispatch: from inbound message to executed implementation.
///
/// The dispatcher owns the three interception stages. An inbound message
/// runs the pre-parse chain, the call parser, the post-parse chain,
/// registry lookup, overload resolution, the post-resolve chain, and
/// finally the chosen signature's action. Every failure mode is a value
/// in `ExecuteResult`; an action returning `Err` is contained and
/// reported, never propagated into the dispatch loop.
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use herald_core::{CommandSender, ContactDirectory, MessageSegment};
use herald_hooks::{HaltReason, InterceptOutcome, Interceptor, InterceptorChain};

use crate::call::{CallParser, RawCommandCall, ResolvedCommandCall, SpaceSeparatedParser};
use crate::parsers::{ParseContext, ParserRegistry};
use crate::registry::CommandRegistry;
use crate::resolver::{self, ResolveFailure};
use crate::values::ArgValue;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// What a command implementation hands back on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub text: String,
    /// Visible only to the caller, where the channel supports it.
    pub ephemeral: bool,
}

impl CommandResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: false }
    }

    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: true }
    }
}

/// Context handed to an action alongside its arguments.
#[derive(Clone)]
pub struct InvokeContext {
    pub sender: CommandSender,
    pub directory: Arc<dyn ContactDirectory>,
}

/// A command implementation. `args` holds the bound typed values in
/// parameter order; constants are already stripped.
#[async_trait]
pub trait CommandAction: Send + Sync {
    async fn invoke(
        &self,
        ctx: &InvokeContext,
        args: &[ArgValue],
    ) -> anyhow::Result<CommandResponse>;
}

type ActionFuture = Pin<Box<dyn Future<Output = anyhow::Result<CommandResponse>> + Send>>;

struct FnAction {
    f: Box<dyn Fn(InvokeContext, Vec<ArgValue>) -> ActionFuture + Send + Sync>,
}

#[async_trait]
impl CommandAction for FnAction {
    async fn invoke(
        &self,
        ctx: &InvokeContext,
        args: &[ArgValue],
    ) -> anyhow::Result<CommandResponse> {
        (self.f)(ctx.clone(), args.to_vec()).await
    }
}

/// Adapt an async closure into a `CommandAction`.
pub fn action_fn<F, Fut>(f: F) -> Arc<dyn CommandAction>
where
    F: Fn(InvokeContext, Vec<ArgValue>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<CommandResponse>> + Send + 'static,
{
    Arc::new(FnAction { f: Box::new(move |ctx, args| Box::pin(f(ctx, args))) })
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Terminal outcome of one dispatch.
#[derive(Debug)]
pub enum ExecuteResult {
    /// The action ran and returned a response.
    Success { response: CommandResponse },
    /// Not a command call, or no command answers to the callee name.
    Unresolved,
    /// An interceptor halted the named stage.
    Intercepted { stage: &'static str, reason: HaltReason },
    /// A command matched but no overload accepted the call.
    ResolutionFailed(ResolveFailure),
    /// The action itself failed; the error is contained here.
    ExecutionFailed(anyhow::Error),
}

impl ExecuteResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// The dispatch pipeline, shared across concurrent message handlers.
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
    parsers: ParserRegistry,
    directory: Arc<dyn ContactDirectory>,
    call_parser: Arc<dyn CallParser>,
    message_chain: InterceptorChain<Vec<MessageSegment>>,
    call_chain: InterceptorChain<RawCommandCall>,
    resolved_chain: InterceptorChain<ResolvedCommandCall>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>, directory: Arc<dyn ContactDirectory>) -> Self {
        Self {
            registry,
            parsers: ParserRegistry::builtin(),
            directory,
            call_parser: Arc::new(SpaceSeparatedParser),
            message_chain: InterceptorChain::new("message"),
            call_chain: InterceptorChain::new("call"),
            resolved_chain: InterceptorChain::new("resolved"),
        }
    }

    /// Replace the parser table, e.g. to add enum parsers.
    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = parsers;
        self
    }

    /// Replace the call tokenizer.
    pub fn with_call_parser(mut self, parser: Arc<dyn CallParser>) -> Self {
        self.call_parser = parser;
        self
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Runs on the whole inbound message, before call parsing.
    pub async fn intercept_messages(&self, interceptor: Arc<dyn Interceptor<Vec<MessageSegment>>>) {
        self.message_chain.register(interceptor).await;
    }

    /// Runs on the raw call, before command lookup and resolution.
    pub async fn intercept_calls(&self, interceptor: Arc<dyn Interceptor<RawCommandCall>>) {
        self.call_chain.register(interceptor).await;
    }

    /// Runs on the resolved call, just before invocation.
    pub async fn intercept_resolved(
        &self,
        interceptor: Arc<dyn Interceptor<ResolvedCommandCall>>,
    ) {
        self.resolved_chain.register(interceptor).await;
    }

    /// Dispatch a plain text line, e.g. console input.
    pub async fn dispatch_text(&self, sender: CommandSender, text: &str) -> ExecuteResult {
        self.dispatch_message(sender, vec![MessageSegment::text(text)]).await
    }

    /// Dispatch an inbound message through the full pipeline.
    pub async fn dispatch_message(
        &self,
        sender: CommandSender,
        message: Vec<MessageSegment>,
    ) -> ExecuteResult {
        let message = match self.message_chain.run(message).await {
            InterceptOutcome::Continue(message) => message,
            InterceptOutcome::Halt(reason) => {
                return ExecuteResult::Intercepted { stage: self.message_chain.stage(), reason };
            }
        };
        let Some(call) = self.call_parser.parse(&message) else {
            return ExecuteResult::Unresolved;
        };
        self.dispatch_call(sender, call).await
    }

    /// Dispatch an already-tokenized call.
    pub async fn dispatch_call(&self, sender: CommandSender, call: RawCommandCall) -> ExecuteResult {
        let call = match self.call_chain.run(call).await {
            InterceptOutcome::Continue(call) => call,
            InterceptOutcome::Halt(reason) => {
                return ExecuteResult::Intercepted { stage: self.call_chain.stage(), reason };
            }
        };

        let Some(command) = self.registry.match_command(&call.callee) else {
            debug!("[Dispatch] no command answers to \"{}\"", call.callee);
            return ExecuteResult::Unresolved;
        };

        let ctx = ParseContext { sender, directory: Arc::clone(&self.directory) };
        let resolved = match resolver::resolve(&command, &call, &self.parsers, &ctx).await {
            Ok(resolved) => resolved,
            Err(failure) => {
                warn!(
                    "[Dispatch] \"{}\" did not resolve: {failure}usage:\n{}",
                    command.primary_name(),
                    command.usage(self.registry.prefix())
                );
                return ExecuteResult::ResolutionFailed(failure);
            }
        };

        let resolved = match self.resolved_chain.run(resolved).await {
            InterceptOutcome::Continue(resolved) => resolved,
            InterceptOutcome::Halt(reason) => {
                return ExecuteResult::Intercepted { stage: self.resolved_chain.stage(), reason };
            }
        };

        let invoke_ctx = InvokeContext {
            sender: resolved.sender.clone(),
            directory: Arc::clone(&self.directory),
        };
        let args = resolved.invocation_args();
        match resolved.signature.action().invoke(&invoke_ctx, &args).await {
            Ok(response) => {
                debug!("[Dispatch] \"{}\" succeeded", resolved.command.primary_name());
                ExecuteResult::Success { response }
            }
            Err(error) => {
                warn!(
                    "[Dispatch] \"{}\" failed in its action: {error:#}",
                    resolved.command.primary_name()
                );
                ExecuteResult::ExecutionFailed(error)
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::command::CommandSpec;
    use crate::signature::{ArgKind, Signature};
    use herald_core::ReceiverKind;
    use herald_directory::InMemoryDirectory;
    use herald_hooks::halt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Action that replies "ok" and ignores its input; shared by tests
    /// across the crate.
    pub fn noop_action() -> Arc<dyn CommandAction> {
        action_fn(|_ctx, _args| async { Ok(CommandResponse::ok("ok")) })
    }

    fn dispatcher_with(commands: Vec<Arc<CommandSpec>>) -> CommandDispatcher {
        let registry = Arc::new(CommandRegistry::default());
        for cmd in commands {
            assert!(registry.register(cmd, false));
        }
        CommandDispatcher::new(registry, Arc::new(InMemoryDirectory::new()))
    }

    fn echo_command() -> Arc<CommandSpec> {
        CommandSpec::builder("test", "echo")
            .signature(
                Signature::builder()
                    .vararg("words", ArgKind::Str)
                    .action(action_fn(|_ctx, args| async move {
                        let words = match &args[0] {
                            ArgValue::List(items) => items
                                .iter()
                                .filter_map(ArgValue::as_str)
                                .collect::<Vec<_>>()
                                .join(" "),
                            other => panic!("expected list, got {other:?}"),
                        };
                        Ok(CommandResponse::ok(words))
                    }))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn full_pipeline_from_text_to_response() {
        let dispatcher = dispatcher_with(vec![echo_command()]);
        let result = dispatcher.dispatch_text(CommandSender::Console, "/echo hello world").await;
        match result {
            ExecuteResult::Success { response } => assert_eq!(response.text, "hello world"),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_command_input_is_unresolved() {
        let dispatcher = dispatcher_with(vec![echo_command()]);
        let result = dispatcher.dispatch_text(CommandSender::Console, "just chatting").await;
        assert!(matches!(result, ExecuteResult::Unresolved));
        let result = dispatcher.dispatch_text(CommandSender::Console, "/missing").await;
        assert!(matches!(result, ExecuteResult::Unresolved));
    }

    #[tokio::test]
    async fn action_error_is_contained_not_propagated() {
        let failing = CommandSpec::builder("test", "boom")
            .signature(
                Signature::builder()
                    .action(action_fn(|_ctx, _args| async {
                        Err(anyhow::anyhow!("intentional failure"))
                    }))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let dispatcher = dispatcher_with(vec![failing]);
        let result = dispatcher.dispatch_text(CommandSender::Console, "/boom").await;
        match result {
            ExecuteResult::ExecutionFailed(error) => {
                assert!(error.to_string().contains("intentional failure"));
            }
            other => panic!("expected contained failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolution_failure_is_reported_with_rejections() {
        let strict = CommandSpec::builder("test", "mute")
            .signature(
                Signature::builder()
                    .required("minutes", ArgKind::Int)
                    .action(noop_action())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let dispatcher = dispatcher_with(vec![strict]);
        let result = dispatcher.dispatch_text(CommandSender::Console, "/mute forever").await;
        match result {
            ExecuteResult::ResolutionFailed(failure) => {
                assert!(!failure.ambiguity);
                assert_eq!(failure.rejected.len(), 1);
            }
            other => panic!("expected resolution failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn receiver_restricted_command_rejects_console() {
        let group_only = CommandSpec::builder("test", "kick")
            .signature(
                Signature::builder()
                    .receiver(ReceiverKind::Group)
                    .required("member", ArgKind::Str)
                    .action(noop_action())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let dispatcher = dispatcher_with(vec![group_only]);
        let result = dispatcher.dispatch_text(CommandSender::Console, "/kick Alice").await;
        assert!(matches!(result, ExecuteResult::ResolutionFailed(_)));
    }

    struct Gate {
        blocked: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Interceptor<RawCommandCall> for Gate {
        fn name(&self) -> &str {
            "gate"
        }
        async fn intercept(&self, call: RawCommandCall) -> InterceptOutcome<RawCommandCall> {
            if call.callee == "/echo" {
                self.blocked.fetch_add(1, Ordering::SeqCst);
                return halt("gate", "echo is disabled here");
            }
            InterceptOutcome::Continue(call)
        }
    }

    #[tokio::test]
    async fn call_interceptor_halts_before_resolution() {
        let dispatcher = dispatcher_with(vec![echo_command()]);
        let blocked = Arc::new(AtomicUsize::new(0));
        dispatcher.intercept_calls(Arc::new(Gate { blocked: Arc::clone(&blocked) })).await;

        let result = dispatcher.dispatch_text(CommandSender::Console, "/echo hi").await;
        match result {
            ExecuteResult::Intercepted { stage, reason } => {
                assert_eq!(stage, "call");
                assert_eq!(reason.interceptor, "gate");
            }
            other => panic!("expected interception, got {other:?}"),
        }
        assert_eq!(blocked.load(Ordering::SeqCst), 1);
    }

    struct Rewriter;

    #[async_trait]
    impl Interceptor<Vec<MessageSegment>> for Rewriter {
        fn name(&self) -> &str {
            "rewriter"
        }
        async fn intercept(
            &self,
            _message: Vec<MessageSegment>,
        ) -> InterceptOutcome<Vec<MessageSegment>> {
            InterceptOutcome::Continue(vec![MessageSegment::text("/echo rewritten")])
        }
    }

    #[tokio::test]
    async fn message_interceptor_can_rewrite_the_input() {
        let dispatcher = dispatcher_with(vec![echo_command()]);
        dispatcher.intercept_messages(Arc::new(Rewriter)).await;
        let result = dispatcher.dispatch_text(CommandSender::Console, "anything at all").await;
        match result {
            ExecuteResult::Success { response } => assert_eq!(response.text, "rewritten"),
            other => panic!("expected success, got {other:?}"),
        }
    }

    struct ResolvedSpy {
        seen: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Interceptor<ResolvedCommandCall> for ResolvedSpy {
        fn name(&self) -> &str {
            "resolved_spy"
        }
        async fn intercept(
            &self,
            call: ResolvedCommandCall,
        ) -> InterceptOutcome<ResolvedCommandCall> {
            assert_eq!(call.command.primary_name(), "echo");
            self.seen.fetch_add(1, Ordering::SeqCst);
            InterceptOutcome::Continue(call)
        }
    }

    #[tokio::test]
    async fn resolved_interceptor_sees_the_chosen_overload() {
        let dispatcher = dispatcher_with(vec![echo_command()]);
        let seen = Arc::new(AtomicUsize::new(0));
        dispatcher.intercept_resolved(Arc::new(ResolvedSpy { seen: Arc::clone(&seen) })).await;
        let result = dispatcher.dispatch_text(CommandSender::Console, "/echo x").await;
        assert!(result.is_success());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
