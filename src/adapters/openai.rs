//! OpenAI client: embeddings for the location index and tool-calling chat
//! completions for the agent loop.

use crate::adapters::http::{build_client, ensure_success, join_url};
use crate::domain::chat::{ChatMessage, Role, ToolCall, ToolSpec};
use crate::domain::ports::{ChatModel, Embedder};
use crate::utils::error::{Result, TravelError};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub timeout: Option<Duration>,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            temperature: 0.0,
            timeout: None,
        }
    }
}

pub struct OpenAiClient {
    http: Client,
    api_key: SecretString,
    settings: OpenAiSettings,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

// Server-sent chunks of a streamed completion.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<StreamToolCall>>,
}

#[derive(Debug, Deserialize)]
struct StreamToolCall {
    #[serde(default)]
    index: usize,
    id: Option<String>,
    function: Option<StreamFunction>,
}

#[derive(Debug, Deserialize)]
struct StreamFunction {
    name: Option<String>,
    arguments: Option<String>,
}

/// Accumulates deltas into the final assistant message. Tool call fragments
/// are keyed by their index in the response.
#[derive(Default)]
struct StreamedReply {
    content: String,
    calls: BTreeMap<usize, ToolCall>,
}

impl StreamedReply {
    /// Applies one chunk and returns the text it added, if any.
    fn apply(&mut self, chunk: StreamChunk) -> Option<String> {
        let delta = chunk.choices.into_iter().next()?.delta;

        for fragment in delta.tool_calls.unwrap_or_default() {
            let call = self.calls.entry(fragment.index).or_default();
            if let Some(id) = fragment.id {
                call.id = id;
            }
            if let Some(function) = fragment.function {
                if let Some(name) = function.name {
                    call.name = name;
                }
                if let Some(arguments) = function.arguments {
                    call.arguments.push_str(&arguments);
                }
            }
        }

        let text = delta.content.filter(|t| !t.is_empty())?;
        self.content.push_str(&text);
        Some(text)
    }

    fn into_message(self) -> ChatMessage {
        ChatMessage {
            role: Role::Assistant,
            content: (!self.content.is_empty()).then_some(self.content),
            tool_calls: self.calls.into_values().collect(),
            tool_call_id: None,
        }
    }
}

/// Payload of an SSE `data:` line; `None` for other lines and the final
/// `[DONE]` marker.
fn sse_data(line: &str) -> Option<&str> {
    let data = line.trim().strip_prefix("data:")?.trim();
    (!data.is_empty() && data != "[DONE]").then_some(data)
}

impl OpenAiClient {
    pub fn new(api_key: SecretString, settings: OpenAiSettings) -> Result<Self> {
        Ok(Self {
            http: build_client(settings.timeout)?,
            api_key,
            settings,
        })
    }

    fn role_name(role: Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }

    fn convert_messages(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                let mut value = json!({
                    "role": Self::role_name(msg.role),
                    "content": msg.content,
                });
                if !msg.tool_calls.is_empty() {
                    value["tool_calls"] = msg
                        .tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.name,
                                    "arguments": call.arguments,
                                }
                            })
                        })
                        .collect();
                }
                if let Some(id) = &msg.tool_call_id {
                    value["tool_call_id"] = json!(id);
                }
                value
            })
            .collect()
    }

    fn build_chat_body(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Value {
        let mut body = json!({
            "model": self.settings.chat_model,
            "temperature": self.settings.temperature,
            "messages": Self::convert_messages(messages),
        });

        if !tools.is_empty() {
            body["tools"] = tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters,
                        }
                    })
                })
                .collect();
            body["tool_choice"] = json!("auto");
            // one tool per step
            body["parallel_tool_calls"] = json!(false);
        }

        body
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(join_url(&self.settings.base_url, path))
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await?;
        ensure_success("openai", response).await
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = json!({
            "model": self.settings.embedding_model,
            "input": text,
        });
        let response: EmbeddingResponse = self.post("embeddings", &body).await?.json().await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| TravelError::InvalidResponse {
                service: "openai".to_string(),
                message: "embedding response contained no data".to_string(),
            })
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatMessage> {
        tracing::debug!(
            "Chat completion with {} messages and {} tools",
            messages.len(),
            tools.len()
        );
        let body = self.build_chat_body(messages, tools);
        let response: ChatResponse = self.post("chat/completions", &body).await?.json().await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TravelError::InvalidResponse {
                service: "openai".to_string(),
                message: "completion returned no choices".to_string(),
            })?;

        Ok(ChatMessage {
            role: Role::Assistant,
            content: choice.message.content,
            tool_calls: choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: call.function.arguments,
                })
                .collect(),
            tool_call_id: None,
        })
    }

    async fn stream(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
        token_tx: mpsc::Sender<String>,
    ) -> Result<ChatMessage> {
        tracing::debug!("Streaming chat completion with {} messages", messages.len());
        let mut body = self.build_chat_body(messages, tools);
        body["stream"] = json!(true);

        let response = self.post("chat/completions", &body).await?;
        let mut bytes = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut reply = StreamedReply::default();

        while let Some(chunk) = bytes.next().await {
            buffer.extend_from_slice(&chunk?);

            // lines end in ASCII '\n', so splitting bytes never cuts a character
            while let Some(end) = buffer.iter().position(|b| *b == b'\n') {
                let raw: Vec<u8> = buffer.drain(..=end).collect();
                let line = String::from_utf8_lossy(&raw);
                let Some(data) = sse_data(&line) else {
                    continue;
                };

                let chunk: StreamChunk = serde_json::from_str(data)?;
                if let Some(token) = reply.apply(chunk) {
                    let _ = token_tx.send(token).await;
                }
            }
        }

        Ok(reply.into_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> OpenAiClient {
        let settings = OpenAiSettings {
            base_url: server.url("/v1"),
            ..OpenAiSettings::default()
        };
        OpenAiClient::new(SecretString::from("sk-test".to_string()), settings).unwrap()
    }

    #[tokio::test]
    async fn test_embed() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/embeddings")
                .header("Authorization", "Bearer sk-test")
                .json_body(json!({"model": DEFAULT_EMBEDDING_MODEL, "input": "beaches"}));
            then.status(200)
                .json_body(json!({"data": [{"embedding": [0.1, 0.2, 0.3]}]}));
        });

        let vector = client(&server).embed("beaches").await.unwrap();

        mock.assert();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_complete_parses_tool_calls() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("\"parallel_tool_calls\":false")
                .body_contains("\"name\":\"ask_interests\"");
            then.status(200).json_body(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "ask_interests", "arguments": "{}"}
                        }]
                    }
                }]
            }));
        });

        let tools = vec![ToolSpec {
            name: "ask_interests".to_string(),
            description: "Ask user for travel interests.".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        }];
        let reply = client(&server)
            .complete(&[ChatMessage::user("plan my trip")], &tools)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(reply.content, None);
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].name, "ask_interests");
        assert_eq!(reply.tool_calls[0].id, "call_1");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401).body("invalid api key");
        });

        let err = client(&server)
            .complete(&[ChatMessage::user("hola")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, TravelError::RemoteStatus { status: 401, .. }));
    }

    #[test]
    fn test_convert_tool_messages() {
        let call = ToolCall {
            id: "call_9".to_string(),
            name: "lock_location".to_string(),
            arguments: "{\"location\":\"El Yunque\"}".to_string(),
        };
        let converted = OpenAiClient::convert_messages(&[
            ChatMessage::tool_request(call),
            ChatMessage::tool_result("call_9", "El Yunque has been locked in your itinerary."),
        ]);

        assert_eq!(converted[0]["role"], "assistant");
        assert_eq!(converted[0]["tool_calls"][0]["function"]["name"], "lock_location");
        assert_eq!(converted[1]["role"], "tool");
        assert_eq!(converted[1]["tool_call_id"], "call_9");
    }

    async fn collect(mut rx: mpsc::Receiver<String>) -> Vec<String> {
        let mut tokens = Vec::new();
        while let Some(token) = rx.recv().await {
            tokens.push(token);
        }
        tokens
    }

    #[tokio::test]
    async fn test_stream_forwards_tokens() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("\"stream\":true");
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(concat!(
                    "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
                    "data: {\"choices\":[{\"delta\":{\"content\":\"¡Hola\"}}]}\n\n",
                    "data: {\"choices\":[{\"delta\":{\"content\":\", amigo!\"}}]}\n\n",
                    "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
                    "data: [DONE]\n\n"
                ));
        });

        let (tx, rx) = mpsc::channel(16);
        let reply = client(&server)
            .stream(&[ChatMessage::user("hola")], &[], tx)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(collect(rx).await, ["¡Hola", ", amigo!"]);
        assert_eq!(reply.content.as_deref(), Some("¡Hola, amigo!"));
        assert!(reply.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn test_stream_assembles_tool_call_fragments() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).body(concat!(
                "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_7\",",
                "\"type\":\"function\",\"function\":{\"name\":\"lock_location\",\"arguments\":\"\"}}]}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,",
                "\"function\":{\"arguments\":\"{\\\"location\\\"\"}}]}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,",
                "\"function\":{\"arguments\":\":\\\"Culebra\\\"}\"}}]}}]}\n\n",
                "data: [DONE]\n\n"
            ));
        });

        let (tx, rx) = mpsc::channel(16);
        let reply = client(&server)
            .stream(&[ChatMessage::user("lock Culebra")], &[], tx)
            .await
            .unwrap();

        assert!(collect(rx).await.is_empty());
        assert_eq!(reply.content, None);
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].id, "call_7");
        assert_eq!(reply.tool_calls[0].name, "lock_location");
        assert_eq!(reply.tool_calls[0].arguments, "{\"location\":\"Culebra\"}");
    }
}
