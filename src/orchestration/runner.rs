//! The orchestration loop: render, call, classify, dispatch.
//!
//! One run owns one conversation. Every iteration re-renders the whole
//! history into a single prompt, sends it over the transport, and
//! classifies the response as either the final answer or a tool call.
//! Tool calls are validated, resolved, checked against loop-breaking
//! policy, executed, and their results appended back into the history.
//!
//! The loop is fail-fast throughout: protocol violations, unknown
//! tools, duplicate calls, and tool failures all stop the run instead
//! of being fed back to the model for repair.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::{ExecutionConfig, TransportConfig};
use crate::observability::Logger;
use crate::orchestration::events::{EventSink, RunEvent};
use crate::protocol::formatter::PromptFormatter;
use crate::protocol::parser::ResponseParser;
use crate::protocol::types::{Message, ParsedResponse, ToolCall, ToolOutcome};
use crate::registry::{DefaultToolRegistry, ToolDefinition};
use crate::transport::{CallOptions, Transport};

/// Per-run options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Restrict the run to these tools. None means the full catalog.
    pub tools: Option<Vec<String>>,
    /// Maximum model turns before the run is exhausted.
    pub max_iterations: u32,
    /// Maximum tool executions across the whole run.
    pub max_tool_calls: u32,
    /// Whether to stop on repeated identical calls.
    pub detect_duplicates: bool,
    /// How many recent calls a new call is compared against.
    pub duplicate_window: usize,
    /// Model identifier passed to the transport.
    pub model: Option<String>,
    /// Generation temperature passed to the transport.
    pub temperature: Option<f32>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tools: None,
            max_iterations: 10,
            max_tool_calls: 20,
            detect_duplicates: true,
            duplicate_window: 3,
            model: None,
            temperature: None,
        }
    }
}

impl RunOptions {
    /// Build run options from loaded configuration sections.
    pub fn from_config(execution: &ExecutionConfig, transport: &TransportConfig) -> Self {
        Self {
            tools: None,
            max_iterations: execution.max_iterations,
            max_tool_calls: execution.max_tool_calls,
            detect_duplicates: execution.detect_duplicates,
            duplicate_window: execution.duplicate_window,
            model: transport.model.clone(),
            temperature: transport.temperature,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// The model produced a final text answer.
    Done,
    /// The run stopped on an error.
    Failed,
    /// The iteration cap ran out before a final answer.
    Exhausted,
}

impl RunStatus {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Done => "done",
            RunStatus::Failed => "failed",
            RunStatus::Exhausted => "exhausted",
        }
    }
}

/// Classification of a run failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The model violated the text protocol.
    Protocol,
    /// A loop-breaking limit tripped (caps, duplicates).
    Policy,
    /// The model called a tool outside the run's snapshot.
    Resolution,
    /// A resolved tool reported failure.
    Execution,
    /// The transport failed.
    Transport {
        /// Whether the channel must be reinitialized.
        session_lost: bool,
    },
}

/// Complete record of one orchestration run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Whether the run produced a final answer.
    pub success: bool,
    /// How the run ended.
    pub status: RunStatus,
    /// Failure classification when `status` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Final answer text on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Error description on failure or exhaustion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Model turns consumed.
    pub iterations: u32,
    /// Full conversation history, in append order.
    pub messages: Vec<Message>,
    /// Every tool call dispatched, in execution order.
    pub tool_calls: Vec<ToolCall>,
    /// Count of dispatched tool calls.
    pub total_tool_calls: u32,
    /// Wall-clock duration of the run.
    #[serde(skip)]
    pub duration: Duration,
}

/// Drives tool-calling conversations over a text-only transport.
///
/// The orchestrator owns the registry and shares the transport; each
/// [`run`](Orchestrator::run) works against an immutable snapshot of
/// the tool catalog taken at run start.
pub struct Orchestrator {
    transport: Arc<dyn Transport>,
    registry: DefaultToolRegistry,
    formatter: PromptFormatter,
    parser: ResponseParser,
    logger: Option<Arc<Logger>>,
    events: EventSink,
}

impl Orchestrator {
    /// Create an orchestrator over a transport and tool registry.
    pub fn new(transport: Arc<dyn Transport>, registry: DefaultToolRegistry) -> Self {
        Self {
            transport,
            registry,
            formatter: PromptFormatter::new(),
            parser: ResponseParser::new(),
            logger: None,
            events: EventSink::disabled(),
        }
    }

    /// Attach a run logger.
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Attach an event sink.
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Wire up an event channel and return the receiver to drain it.
    /// Replaces any previously attached sink.
    pub fn event_channel(&mut self) -> tokio::sync::mpsc::UnboundedReceiver<RunEvent> {
        let (sink, receiver) = EventSink::channel();
        self.events = sink;
        receiver
    }

    /// The tool registry backing this orchestrator.
    pub fn registry(&self) -> &DefaultToolRegistry {
        &self.registry
    }

    /// Mutable access to the tool registry.
    pub fn registry_mut(&mut self) -> &mut DefaultToolRegistry {
        &mut self.registry
    }

    /// Run a task to completion with default options.
    pub async fn run(&self, task: &str) -> ExecutionResult {
        self.run_with_options(task, RunOptions::default()).await
    }

    /// Run a task to completion.
    ///
    /// Never returns `Err`: every failure mode is folded into the
    /// returned [`ExecutionResult`] so callers always get the full
    /// history and counters alongside the error.
    pub async fn run_with_options(&self, task: &str, options: RunOptions) -> ExecutionResult {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        let snapshot = self.registry.snapshot(options.tools.as_deref());

        self.log(|logger| {
            let names: Vec<String> = snapshot.iter().map(|t| t.name.clone()).collect();
            logger.log_run_start(&run_id, task, &names)
        });

        let mut state = RunState::new(&self.formatter, &snapshot, task);
        let call_options = CallOptions {
            model: options.model.clone(),
            temperature: options.temperature,
            attachments: Vec::new(),
            workspace_summary: None,
        };

        for iteration in 1..=options.max_iterations {
            state.iterations = iteration;

            let prompt = self.formatter.format_conversation(&state.messages);
            let response = match self.transport.call(&prompt, &call_options).await {
                Ok(text) => text,
                Err(err) => {
                    let failure = FailureKind::Transport {
                        session_lost: err.is_session_lost(),
                    };
                    return self.fail(&run_id, state, failure, err.to_string(), started);
                }
            };

            state.messages.push(Message::assistant(&response));

            let parsed = match self.parser.parse(&response) {
                Ok(parsed) => parsed,
                Err(err) => {
                    return self.fail(
                        &run_id,
                        state,
                        FailureKind::Protocol,
                        err.to_string(),
                        started,
                    );
                }
            };

            self.log(|logger| {
                logger.log_llm_interaction(&run_id, iteration, &response, parsed.kind())
            });
            self.events.emit(RunEvent::Iteration {
                iteration,
                kind: parsed.kind(),
                content: match &parsed {
                    ParsedResponse::Text(text) => Some(text.clone()),
                    ParsedResponse::ToolCall(_) => None,
                },
                tool_calls_so_far: state.total_tool_calls,
            });

            let call = match parsed {
                ParsedResponse::Text(content) => {
                    return self.finish(&run_id, state, content, started);
                }
                ParsedResponse::ToolCall(call) => call,
            };

            if state.total_tool_calls >= options.max_tool_calls {
                return self.fail(
                    &run_id,
                    state,
                    FailureKind::Policy,
                    format!(
                        "Max tool calls limit reached ({}). Possible infinite loop.",
                        options.max_tool_calls
                    ),
                    started,
                );
            }

            if let Err(err) = self.parser.validate(&call) {
                return self.fail(
                    &run_id,
                    state,
                    FailureKind::Protocol,
                    err.to_string(),
                    started,
                );
            }

            let definition = match snapshot.iter().find(|t| t.name == call.tool) {
                Some(def) => def,
                None => {
                    return self.fail(
                        &run_id,
                        state,
                        FailureKind::Resolution,
                        format!("Tool not found: {}", call.tool),
                        started,
                    );
                }
            };

            if options.detect_duplicates && state.is_recent_duplicate(&call, options.duplicate_window)
            {
                self.events.emit(RunEvent::DuplicateDetected { call: call.clone() });
                return self.fail(
                    &run_id,
                    state,
                    FailureKind::Policy,
                    format!(
                        "Duplicate tool call detected: \"{}\". Possible infinite loop.",
                        call.tool
                    ),
                    started,
                );
            }

            self.events.emit(RunEvent::ToolCall { call: call.clone() });

            let outcome = self.execute_tool(definition, &call).await;
            self.log(|logger| logger.log_tool_execution(&run_id, &call, &outcome));

            // Every dispatched call counts toward the cap and the
            // record, whether or not it succeeded.
            state.tool_calls.push(call.clone());
            state.total_tool_calls += 1;

            if outcome.is_failure() {
                return self.fail(
                    &run_id,
                    state,
                    FailureKind::Execution,
                    format!(
                        "Tool \"{}\" failed: {}",
                        call.tool,
                        outcome.error.as_deref().unwrap_or("Unknown error")
                    ),
                    started,
                );
            }

            let result_text = self.formatter.format_tool_result(&outcome);
            state.messages.push(Message::tool(result_text));
        }

        let error = format!(
            "Max iterations reached ({}). LLM did not provide final answer.",
            options.max_iterations
        );
        self.log(|logger| logger.log_error(&run_id, &error));
        self.log(|logger| {
            logger.log_completion(
                &run_id,
                RunStatus::Exhausted.label(),
                state.iterations,
                state.total_tool_calls,
            )
        });
        self.events.emit(RunEvent::Error {
            message: error.clone(),
        });

        state.into_result(RunStatus::Exhausted, None, None, Some(error), started)
    }

    /// Dispatch a call to its handler, folding handler faults into the
    /// standard failure shape.
    async fn execute_tool(&self, definition: &ToolDefinition, call: &ToolCall) -> ToolOutcome {
        match definition.handler.execute(&call.args).await {
            Ok(outcome) => outcome,
            Err(err) => ToolOutcome::failure(err.to_string()),
        }
    }

    fn finish(
        &self,
        run_id: &str,
        state: RunState,
        content: String,
        started: Instant,
    ) -> ExecutionResult {
        self.log(|logger| {
            logger.log_completion(
                run_id,
                RunStatus::Done.label(),
                state.iterations,
                state.total_tool_calls,
            )
        });

        state.into_result(RunStatus::Done, None, Some(content), None, started)
    }

    fn fail(
        &self,
        run_id: &str,
        state: RunState,
        failure: FailureKind,
        error: String,
        started: Instant,
    ) -> ExecutionResult {
        self.log(|logger| logger.log_error(run_id, &error));
        self.log(|logger| {
            logger.log_completion(
                run_id,
                RunStatus::Failed.label(),
                state.iterations,
                state.total_tool_calls,
            )
        });
        self.events.emit(RunEvent::Error {
            message: error.clone(),
        });

        state.into_result(RunStatus::Failed, Some(failure), None, Some(error), started)
    }

    /// Best-effort logging: failures go to stderr, never to the run.
    fn log<F>(&self, entry: F)
    where
        F: FnOnce(&Logger) -> anyhow::Result<()>,
    {
        if let Some(logger) = &self.logger {
            if let Err(err) = entry(logger) {
                eprintln!("WARN: Failed to write run log: {}", err);
            }
        }
    }
}

/// Mutable per-run state threaded through the loop.
struct RunState {
    messages: Vec<Message>,
    tool_calls: Vec<ToolCall>,
    total_tool_calls: u32,
    iterations: u32,
}

impl RunState {
    fn new(formatter: &PromptFormatter, snapshot: &[ToolDefinition], task: &str) -> Self {
        Self {
            messages: vec![
                Message::system(formatter.format_system_prompt(snapshot)),
                Message::user(task),
            ],
            tool_calls: Vec::new(),
            total_tool_calls: 0,
            iterations: 0,
        }
    }

    /// Whether `call` repeats one of the last `window` dispatched calls.
    fn is_recent_duplicate(&self, call: &ToolCall, window: usize) -> bool {
        self.tool_calls
            .iter()
            .rev()
            .take(window)
            .any(|recent| call.is_duplicate_of(recent))
    }

    fn into_result(
        self,
        status: RunStatus,
        failure: Option<FailureKind>,
        content: Option<String>,
        error: Option<String>,
        started: Instant,
    ) -> ExecutionResult {
        ExecutionResult {
            success: status == RunStatus::Done,
            status,
            failure,
            content,
            error,
            iterations: self.iterations,
            messages: self.messages,
            tool_calls: self.tool_calls,
            total_tool_calls: self.total_tool_calls,
            duration: started.elapsed(),
        }
    }
}
