use crate::core::tools::ToolRegistry;
use crate::domain::chat::{ChatMessage, ToolSpec};
use crate::domain::ports::ChatModel;
use crate::domain::session::Session;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const DEFAULT_MAX_STEPS: usize = 5;

pub const GREETING: &str = "Hi there! How can I assist you today?";
pub const STEP_LIMIT_REPLY: &str =
    "I'm sorry, I couldn't finish that request. Could you rephrase it?";

pub const SYSTEM_PROMPT: &str = "You are 'The Hitchhiker's Guide to Puerto Rico', a travel assistant.
Your job is to help users plan trips by:
- Asking for travel dates and storing them
- Asking for interests and storing them
- Suggesting locations based on interests
- Locking locations if the user confirms
- Providing a finalized itinerary when asked

Keep track of the conversation history and follow up where needed.";

/// Bounded tool-calling loop. Each step asks the model for the next message
/// and runs at most one tool; the loop stops at the first plain reply or
/// after `max_steps` model calls.
pub struct AgentExecutor {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    specs: Vec<ToolSpec>,
    max_steps: usize,
}

impl AgentExecutor {
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        let specs = tools.specs();
        Self {
            model,
            tools,
            specs,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Handles one user turn and returns the assistant's reply. On a model
    /// failure the session history is rolled back to where it was before the
    /// turn, so the user can simply retry.
    pub async fn run_turn(&self, session: &mut Session, input: &str) -> Result<String> {
        self.turn(session, input, None).await
    }

    /// `run_turn` with the reply streamed to `token_tx`. Replies the model
    /// did not generate (greeting, step limit) are sent as one chunk.
    pub async fn run_turn_streaming(
        &self,
        session: &mut Session,
        input: &str,
        token_tx: mpsc::Sender<String>,
    ) -> Result<String> {
        self.turn(session, input, Some(&token_tx)).await
    }

    async fn turn(
        &self,
        session: &mut Session,
        input: &str,
        token_tx: Option<&mpsc::Sender<String>>,
    ) -> Result<String> {
        let input = input.trim();
        if input.is_empty() {
            forward(token_tx, GREETING).await;
            return Ok(GREETING.to_string());
        }

        let checkpoint = session.history.len();
        session.history.push(ChatMessage::user(input));

        match self.run_steps(session, token_tx).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                session.history.truncate(checkpoint);
                Err(e)
            }
        }
    }

    async fn run_steps(
        &self,
        session: &mut Session,
        token_tx: Option<&mpsc::Sender<String>>,
    ) -> Result<String> {
        for step in 1..=self.max_steps {
            let mut messages = Vec::with_capacity(session.history.len() + 1);
            messages.push(ChatMessage::system(SYSTEM_PROMPT));
            messages.extend(session.history.iter().cloned());

            let reply = match token_tx {
                Some(tx) => self.model.stream(&messages, &self.specs, tx.clone()).await?,
                None => self.model.complete(&messages, &self.specs).await?,
            };

            let Some(call) = reply.tool_calls.first().cloned() else {
                let text = reply.content.unwrap_or_default();
                session.history.push(ChatMessage::assistant(text.as_str()));
                return Ok(text);
            };

            if reply.tool_calls.len() > 1 {
                tracing::debug!(
                    "Model requested {} tools, running only {}",
                    reply.tool_calls.len(),
                    call.name
                );
            }
            tracing::debug!("Step {}: {}({})", step, call.name, call.arguments);

            let output = self
                .tools
                .dispatch(&call.name, &mut session.preferences, &call.arguments)
                .await;

            let call_id = call.id.clone();
            let mut request = ChatMessage::tool_request(call);
            request.content = reply.content;
            session.history.push(request);
            session.history.push(ChatMessage::tool_result(call_id, output));
        }

        tracing::warn!(
            "Session {} hit the {} step limit",
            session.id,
            self.max_steps
        );
        session.history.push(ChatMessage::assistant(STEP_LIMIT_REPLY));
        forward(token_tx, STEP_LIMIT_REPLY).await;
        Ok(STEP_LIMIT_REPLY.to_string())
    }
}

async fn forward(token_tx: Option<&mpsc::Sender<String>>, text: &str) {
    if let Some(tx) = token_tx {
        // a closed receiver only means nobody is printing
        let _ = tx.send(text.to_string()).await;
    }
}
