// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-turn pipeline: search, prompt assembly, completion, tool pass,
//! re-synthesis and memory capture.

use std::sync::Arc;

use futures::future::ready;
use futures::stream::{self, Stream, StreamExt};
use genzsmart_config::GenzsmartConfig;
use genzsmart_config::model::{AgentConfig, MemoryConfig};
use genzsmart_core::stream::DEFAULT_FINISH_REASON;
use genzsmart_core::{
    ChatCompletionRequest, ChatCompletionResponse, ChunkStream, FileContentSource, GenzsmartError,
    MemoryLookup, Message, MessageRole, Metadata, ProviderAdapter, SearchResponse,
    normalize_stream,
};
use genzsmart_memory::{ConversationMemory, MemoryContextBuilder, MemoryExtractor, MemoryStorage};
use genzsmart_providers::build_default_provider;
use genzsmart_search::{SearchRequest, SearchService};
use genzsmart_tools::{ToolRegistry, ToolServices};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::detect::{ToolCallRecord, detect_tool_calls};
use crate::events::{AgentEvent, AgentEventStream};
use crate::files::load_attached_files;
use crate::history::{HistorySource, HistoryTurn};
use crate::prompt::{
    SYNTHESIS_INSTRUCTION, build_system_prompt, history_messages, needs_search, search_message,
};

/// Results fetched for an automatic search.
const SEARCH_RESULTS: usize = 5;

/// Tunables for orchestrated completions.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    /// Used when a turn carries no system prompt of its own.
    pub system_prompt: String,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Prior turns replayed into each prompt.
    pub history_limit: usize,
    pub enable_tools: bool,
    pub memory_max_facts: usize,
    /// Floor for persisting extracted facts; never below 0.5.
    pub memory_min_confidence: f64,
}

impl AgentSettings {
    pub fn from_config(agent: &AgentConfig, memory: &MemoryConfig) -> Self {
        Self {
            system_prompt: agent.system_prompt.clone(),
            model: None,
            temperature: agent.temperature,
            max_tokens: agent.max_tokens,
            history_limit: agent.history_limit,
            enable_tools: agent.enable_tools,
            memory_max_facts: memory.context_max_facts,
            memory_min_confidence: memory.min_confidence,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default(), &MemoryConfig::default())
    }
}

/// Fact storage plus the extractor that feeds it.
#[derive(Clone)]
pub struct AgentMemory {
    pub storage: Arc<MemoryStorage>,
    pub extractor: Arc<MemoryExtractor>,
}

impl AgentMemory {
    pub fn new(storage: Arc<MemoryStorage>, extractor: Arc<MemoryExtractor>) -> Self {
        Self { storage, extractor }
    }
}

/// Everything an orchestrator talks to, constructed by the caller.
///
/// Only the provider is required. A missing search service, memory, history
/// source or file source simply switches that step off.
#[derive(Clone)]
pub struct AgentServices {
    pub provider: Arc<dyn ProviderAdapter>,
    /// Defaults to the built-in tools wired to the services below.
    pub tools: Option<Arc<ToolRegistry>>,
    pub search: Option<Arc<SearchService>>,
    pub memory: Option<AgentMemory>,
    pub history: Option<Arc<dyn HistorySource>>,
    pub files: Option<Arc<dyn FileContentSource>>,
    pub settings: AgentSettings,
}

impl AgentServices {
    pub fn new(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            provider,
            tools: None,
            search: None,
            memory: None,
            history: None,
            files: None,
            settings: AgentSettings::default(),
        }
    }

    /// Default provider, search service and (if enabled) memory from
    /// configuration.
    pub async fn from_config(config: &GenzsmartConfig) -> Result<Self, GenzsmartError> {
        let provider = build_default_provider(config)?;
        let search = Arc::new(SearchService::from_config(&config.search)?);

        let memory = if config.memory.enabled {
            let storage = Arc::new(MemoryStorage::from_config(&config.memory).await?);
            let extractor = MemoryExtractor::new(Some(provider.clone()))
                .with_ai(config.memory.ai_extraction);
            Some(AgentMemory::new(storage, Arc::new(extractor)))
        } else {
            None
        };

        Ok(Self {
            settings: AgentSettings::from_config(&config.agent, &config.memory),
            search: Some(search),
            memory,
            ..Self::new(provider)
        })
    }

    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_search(mut self, search: Arc<SearchService>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_memory(mut self, memory: AgentMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_history(mut self, history: Arc<dyn HistorySource>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_files(mut self, files: Arc<dyn FileContentSource>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Input for one turn.
#[derive(Debug, Clone, Default)]
pub struct AgentContext {
    pub conversation_id: Option<String>,
    pub user_message: String,
    /// Replaces the configured base prompt when set and non-blank.
    pub system_prompt: Option<String>,
    /// Search even when the message has no freshness keyword.
    pub enable_search: bool,
    pub enable_memory: bool,
    pub attached_files: Vec<String>,
    pub metadata: Metadata,
}

impl AgentContext {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            enable_memory: true,
            ..Self::default()
        }
    }

    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_search(mut self, enable: bool) -> Self {
        self.enable_search = enable;
        self
    }

    pub fn with_memory(mut self, enable: bool) -> Self {
        self.enable_memory = enable;
        self
    }

    pub fn with_files(mut self, file_ids: Vec<String>) -> Self {
        self.attached_files = file_ids;
        self
    }
}

/// Result of one non-streamed turn.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub search_results: Option<SearchResponse>,
    /// Memory was injected into the prompt or new facts were stored.
    pub memory_used: bool,
    pub files_processed: Vec<String>,
    pub metadata: Metadata,
}

/// Prompt and side information gathered before the first completion.
struct PreparedTurn {
    messages: Vec<Message>,
    search_results: Option<SearchResponse>,
    memory_injected: bool,
    files_processed: Vec<String>,
    history: Vec<HistoryTurn>,
}

pub struct AgentOrchestrator {
    provider: Arc<dyn ProviderAdapter>,
    tools: Option<Arc<ToolRegistry>>,
    search: Option<Arc<SearchService>>,
    memory: Option<AgentMemory>,
    history: Option<Arc<dyn HistorySource>>,
    files: Option<Arc<dyn FileContentSource>>,
    settings: AgentSettings,
}

impl AgentOrchestrator {
    pub fn new(services: AgentServices) -> Self {
        let AgentServices {
            provider,
            tools,
            search,
            memory,
            history,
            files,
            settings,
        } = services;

        let tools = if settings.enable_tools {
            tools.or_else(|| {
                let tool_services = ToolServices {
                    search: search.clone(),
                    memory: memory
                        .as_ref()
                        .map(|m| m.storage.clone() as Arc<dyn MemoryLookup>),
                    files: files.clone(),
                };
                Some(Arc::new(ToolRegistry::with_builtins(&tool_services)))
            })
        } else {
            None
        };

        info!(
            provider = provider.provider_id(),
            tools = tools.as_ref().map_or(0, |t| t.len()),
            search = search.is_some(),
            memory = memory.is_some(),
            "agent orchestrator initialized"
        );

        Self {
            provider,
            tools,
            search,
            memory,
            history,
            files,
            settings,
        }
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn tools(&self) -> Option<&Arc<ToolRegistry>> {
        self.tools.as_ref()
    }

    fn model(&self) -> &str {
        self.settings
            .model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Runs a full turn.
    ///
    /// Only a blank message is an error. Search, memory and file failures
    /// are logged and skipped; a failing completion becomes an apology in
    /// `content`.
    pub async fn process_message(
        &self,
        ctx: &AgentContext,
        history: Option<&[HistoryTurn]>,
    ) -> Result<AgentResponse, GenzsmartError> {
        validate_message(ctx)?;

        let wants_search = ctx.enable_search || needs_search(&ctx.user_message);
        let PreparedTurn {
            mut messages,
            search_results,
            memory_injected,
            files_processed,
            history,
        } = self.prepare(ctx, history, wants_search).await;

        let mut response = AgentResponse {
            search_results,
            memory_used: memory_injected,
            files_processed,
            metadata: ctx.metadata.clone(),
            ..AgentResponse::default()
        };
        response
            .metadata
            .insert("provider".to_string(), json!(self.provider.provider_id()));
        response
            .metadata
            .insert("model".to_string(), json!(self.model()));

        if let Err(e) = self.answer(&mut messages, &mut response).await {
            warn!(error = %e, code = e.code(), "completion failed, answering with apology");
            response.content = format!("I apologize, but I encountered an error: {e}");
        }

        if self.remember(ctx, &history).await {
            response.memory_used = true;
        }
        Ok(response)
    }

    /// Streams a turn as `start`, `token`s, then `done` or `error`.
    ///
    /// Search runs only when the context asks for it, and there is no tool
    /// pass or memory capture. Dropping the stream closes the provider
    /// connection.
    pub async fn stream_message(
        &self,
        ctx: &AgentContext,
        history: Option<&[HistoryTurn]>,
    ) -> AgentEventStream {
        let start = AgentEvent::start(Uuid::new_v4().to_string());
        if let Err(e) = validate_message(ctx) {
            return Box::pin(stream::iter([start, AgentEvent::error(&e)]));
        }

        let turn = self.prepare(ctx, history, ctx.enable_search).await;
        let request = self.request(turn.messages).streaming();
        match self.provider.stream(request).await {
            Ok(chunks) => Box::pin(stream::once(ready(start)).chain(chunk_events(chunks))),
            Err(e) => {
                warn!(error = %e, "provider stream failed to start");
                Box::pin(stream::iter([start, AgentEvent::error(&e)]))
            }
        }
    }

    async fn prepare(
        &self,
        ctx: &AgentContext,
        history: Option<&[HistoryTurn]>,
        search: bool,
    ) -> PreparedTurn {
        let search_results = if search {
            self.run_search(&ctx.user_message).await
        } else {
            None
        };

        let digest = if ctx.enable_memory {
            self.memory_digest(&ctx.user_message).await
        } else {
            None
        };

        let base = ctx
            .system_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(self.settings.system_prompt.as_str());
        let system = build_system_prompt(base, digest.as_deref(), self.tools.is_some());

        let mut messages = vec![Message::system(system)];
        if let Some(message) = search_results.as_ref().and_then(search_message) {
            messages.push(message);
        }

        let mut files_processed = Vec::new();
        if !ctx.attached_files.is_empty() {
            match &self.files {
                Some(source) => {
                    let files = load_attached_files(source.as_ref(), &ctx.attached_files).await;
                    files_processed = files.processed_ids();
                    messages.extend(files.to_message());
                }
                None => warn!(
                    count = ctx.attached_files.len(),
                    "files attached but no file source configured"
                ),
            }
        }

        let history = self.resolve_history(ctx, history).await;
        messages.extend(history_messages(&history, self.settings.history_limit));
        messages.push(Message::user(ctx.user_message.clone()));

        PreparedTurn {
            messages,
            search_results,
            memory_injected: digest.is_some(),
            files_processed,
            history,
        }
    }

    async fn run_search(&self, query: &str) -> Option<SearchResponse> {
        let Some(search) = &self.search else {
            debug!("search wanted but no search service configured");
            return None;
        };
        let request = SearchRequest::new(query).num_results(SEARCH_RESULTS);
        match search.search_web(request).await {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(error = %e, "web search failed, continuing without results");
                None
            }
        }
    }

    async fn memory_digest(&self, query: &str) -> Option<String> {
        let memory = self.memory.as_ref()?;
        let max_facts = self.settings.memory_max_facts;
        let builder = MemoryContextBuilder::new(memory.storage.clone()).with_max_facts(max_facts);
        match builder
            .build_memory_context(Some(query), max_facts, None)
            .await
        {
            Ok(digest) if !digest.is_empty() => Some(digest),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "memory context unavailable");
                None
            }
        }
    }

    async fn resolve_history(
        &self,
        ctx: &AgentContext,
        history: Option<&[HistoryTurn]>,
    ) -> Vec<HistoryTurn> {
        if let Some(turns) = history {
            return turns.to_vec();
        }
        let (Some(source), Some(conversation_id)) = (&self.history, &ctx.conversation_id) else {
            return Vec::new();
        };
        match source
            .recent_turns(conversation_id, self.settings.history_limit)
            .await
        {
            Ok(turns) => turns,
            Err(e) => {
                warn!(conversation_id = conversation_id.as_str(), error = %e, "history unavailable");
                Vec::new()
            }
        }
    }

    fn request(&self, messages: Vec<Message>) -> ChatCompletionRequest {
        ChatCompletionRequest::new(self.model(), messages)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
    }

    async fn complete(&self, messages: &[Message]) -> Result<ChatCompletionResponse, GenzsmartError> {
        debug!(
            provider = self.provider.provider_id(),
            model = self.model(),
            messages = messages.len(),
            "requesting completion"
        );
        self.provider.complete(self.request(messages.to_vec())).await
    }

    /// Primary completion, tool pass, and re-synthesis when a tool ran.
    async fn answer(
        &self,
        messages: &mut Vec<Message>,
        response: &mut AgentResponse,
    ) -> Result<(), GenzsmartError> {
        let completion = self.complete(messages).await?;
        record_completion(response, &completion);
        response.content = completion.content;

        let Some(tools) = &self.tools else {
            return Ok(());
        };
        for call in detect_tool_calls(&response.content) {
            let outcome = tools.execute_tool(call.tool_name(), call.arguments()).await;
            response.tool_calls.push(call.into_record(outcome));
        }
        if !response.tool_calls.iter().any(|r| r.executed) {
            return Ok(());
        }

        info!(calls = response.tool_calls.len(), "re-synthesizing with tool results");
        messages.push(Message::system(tool_results_message(&response.tool_calls)));
        messages.push(Message::system(SYNTHESIS_INSTRUCTION));
        let completion = self.complete(messages).await?;
        record_completion(response, &completion);
        response.content = completion.content;
        Ok(())
    }

    /// Extracts and stores facts from the user message. Returns whether
    /// anything was stored.
    async fn remember(&self, ctx: &AgentContext, history: &[HistoryTurn]) -> bool {
        let Some(memory) = &self.memory else {
            return false;
        };
        let context: Vec<String> = history.iter().map(|t| t.content.clone()).collect();
        let conversation = ConversationMemory::new(
            memory.storage.clone(),
            memory.extractor.clone(),
            ctx.conversation_id.clone(),
        )
        .with_min_confidence(self.settings.memory_min_confidence);

        let facts = conversation
            .extract_and_store(&ctx.user_message, MessageRole::User, &context)
            .await;
        if facts.is_empty() {
            return false;
        }
        info!(count = facts.len(), "stored memory facts");
        true
    }
}

fn validate_message(ctx: &AgentContext) -> Result<(), GenzsmartError> {
    if ctx.user_message.trim().is_empty() {
        return Err(GenzsmartError::validation(
            "user_message",
            "message must not be empty",
        ));
    }
    Ok(())
}

fn record_completion(response: &mut AgentResponse, completion: &ChatCompletionResponse) {
    response
        .metadata
        .insert("finish_reason".to_string(), json!(completion.finish_reason));
    response
        .metadata
        .insert("usage".to_string(), json!(completion.usage));
}

fn tool_results_message(records: &[ToolCallRecord]) -> String {
    let mut content = String::from("Tool execution results:\n");
    for record in records.iter().filter(|r| r.executed) {
        let result = serde_json::to_string_pretty(&record.result).unwrap_or_default();
        content.push_str(&format!("\n{}: {result}\n", record.tool));
    }
    content
}

/// Provider chunks as `token` events followed by `done`, or `error`.
fn chunk_events(chunks: ChunkStream) -> impl Stream<Item = AgentEvent> + Send {
    let mut index = 0;
    normalize_stream(chunks).flat_map(move |item| {
        let mut events = Vec::with_capacity(2);
        match item {
            Ok(chunk) => {
                if !chunk.content.is_empty() {
                    events.push(AgentEvent::Token {
                        token: chunk.content,
                        index,
                    });
                    index += 1;
                }
                if chunk.is_finished {
                    events.push(AgentEvent::Done {
                        finish_reason: chunk
                            .finish_reason
                            .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string()),
                    });
                }
            }
            Err(e) => {
                warn!(error = %e, "provider stream failed");
                events.push(AgentEvent::error(&e));
            }
        }
        stream::iter(events)
    })
}
