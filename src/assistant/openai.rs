//! OpenAI Assistants v2 client.

use std::time::Duration;

use anyhow::{Context, Result};
use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::io::StreamReader;
use tracing::{debug, trace};

use super::sse::{sse_events, SseEvent};
use super::{AssistantDefinition, AssistantService, EventStream, RunEvent};
use crate::config::Config;
use crate::constants::{HTTP_CONNECT_TIMEOUT_SECS, OPENAI_ASSISTANTS_BETA};
use crate::message::{Role, ToolCallRequest, ToolCallResult};

/// HTTP client for the threads/runs API.
pub struct OpenAiAssistants {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

// ── Requests ──

#[derive(Serialize)]
struct CreateAssistantRequest<'a> {
    name: &'a str,
    model: &'a str,
    instructions: &'a str,
    tools: Vec<AssistantTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_resources: Option<ToolResources<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AssistantTool<'a> {
    FileSearch,
    Function { function: FunctionDefinition<'a> },
}

#[derive(Serialize)]
struct FunctionDefinition<'a> {
    name: &'a str,
    description: &'a str,
    strict: bool,
    parameters: &'a Value,
}

#[derive(Serialize)]
struct ToolResources<'a> {
    file_search: FileSearchResources<'a>,
}

#[derive(Serialize)]
struct FileSearchResources<'a> {
    vector_store_ids: &'a [String],
}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
    stream: bool,
}

#[derive(Serialize)]
struct SubmitToolOutputsRequest<'a> {
    tool_outputs: Vec<ToolOutputEntry<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ToolOutputEntry<'a> {
    tool_call_id: &'a str,
    output: &'a str,
}

// ── Responses ──

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct MessageDeltaEvent {
    delta: MessageDelta,
}

#[derive(Deserialize)]
struct MessageDelta {
    #[serde(default)]
    content: Vec<DeltaContent>,
}

#[derive(Deserialize)]
struct DeltaContent {
    #[serde(default)]
    text: Option<DeltaText>,
}

#[derive(Deserialize)]
struct DeltaText {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Deserialize)]
struct RunObject {
    id: String,
    #[serde(default)]
    required_action: Option<RequiredAction>,
    #[serde(default)]
    last_error: Option<LastError>,
    #[serde(default)]
    incomplete_details: Option<IncompleteDetails>,
}

#[derive(Deserialize)]
struct RequiredAction {
    submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Deserialize)]
struct SubmitToolOutputs {
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct LastError {
    code: String,
    message: String,
}

#[derive(Deserialize)]
struct IncompleteDetails {
    reason: Option<String>,
}

impl OpenAiAssistants {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Builds a client from the `[provider.openai]` config section.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .resolve_api_key("openai")
            .context("No API key found for OpenAI. Set OPENAI_API_KEY or configure it in config.toml")?;
        Self::new(api_key, config.base_url("openai"))
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", OPENAI_ASSISTANTS_BETA)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text: String = text.chars().take(200).collect();
            anyhow::bail!("OpenAI {} returned HTTP {}: {}", path, status, text);
        }
        Ok(response)
    }

    async fn post_for_id(&self, path: &str, body: &impl Serialize) -> Result<String> {
        let response: IdResponse = self
            .post(path, body)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to decode OpenAI {} response", path))?;
        Ok(response.id)
    }

    async fn post_stream(&self, path: &str, body: &impl Serialize) -> Result<EventStream> {
        let response = self.post(path, body).await?;
        let bytes = response.bytes_stream().map(|chunk| chunk.map_err(std::io::Error::other));
        let reader = tokio::io::BufReader::new(StreamReader::new(bytes));

        let events = sse_events(reader).try_filter_map(|event| async move {
            trace!(event = ?event.event, "sse event");
            decode_event(&event)
        });
        Ok(Box::pin(events))
    }
}

#[async_trait::async_trait]
impl AssistantService for OpenAiAssistants {
    async fn create_assistant(&self, definition: &AssistantDefinition) -> Result<String> {
        let body = assistant_request(definition);
        let id = self
            .post_for_id("assistants", &body)
            .await
            .context("Failed to create assistant")?;
        debug!(assistant_id = %id, "assistant created");
        Ok(id)
    }

    async fn create_thread(&self) -> Result<String> {
        let id = self
            .post_for_id("threads", &serde_json::json!({}))
            .await
            .context("Failed to create thread")?;
        debug!(thread_id = %id, "thread created");
        Ok(id)
    }

    async fn add_message(&self, thread_id: &str, role: Role, text: &str) -> Result<()> {
        let body = CreateMessageRequest {
            role: role.as_str(),
            content: text,
        };
        self.post(&format!("threads/{}/messages", thread_id), &body)
            .await
            .context("Failed to add message to thread")?;
        Ok(())
    }

    async fn stream_run(&self, thread_id: &str, assistant_id: &str) -> Result<EventStream> {
        let body = CreateRunRequest {
            assistant_id,
            stream: true,
        };
        self.post_stream(&format!("threads/{}/runs", thread_id), &body)
            .await
            .context("Failed to start run")
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        results: &[ToolCallResult],
    ) -> Result<EventStream> {
        let body = tool_outputs_request(results);
        self.post_stream(
            &format!("threads/{}/runs/{}/submit_tool_outputs", thread_id, run_id),
            &body,
        )
        .await
        .context("Failed to submit tool outputs")
    }
}

fn assistant_request(definition: &AssistantDefinition) -> CreateAssistantRequest<'_> {
    let mut tools = vec![AssistantTool::FileSearch];
    tools.extend(definition.tools.iter().map(|t| AssistantTool::Function {
        function: FunctionDefinition {
            name: &t.name,
            description: &t.description,
            strict: true,
            parameters: &t.parameters,
        },
    }));

    let tool_resources = (!definition.vector_store_ids.is_empty()).then(|| ToolResources {
        file_search: FileSearchResources {
            vector_store_ids: &definition.vector_store_ids,
        },
    });

    CreateAssistantRequest {
        name: &definition.name,
        model: &definition.model,
        instructions: &definition.instructions,
        tools,
        tool_resources,
    }
}

fn tool_outputs_request(results: &[ToolCallResult]) -> SubmitToolOutputsRequest<'_> {
    SubmitToolOutputsRequest {
        tool_outputs: results
            .iter()
            .map(|r| ToolOutputEntry {
                tool_call_id: &r.call_id,
                output: r.output_text(),
            })
            .collect(),
        stream: true,
    }
}

/// Maps one SSE event to a [`RunEvent`]. Events the turn doesn't care about yield `None`.
fn decode_event(event: &SseEvent) -> Result<Option<RunEvent>> {
    let Some(name) = event.event.as_deref() else {
        return Ok(None);
    };

    let decoded = match name {
        "thread.message.delta" => {
            let delta: MessageDeltaEvent = parse_data(event)?;
            let text: String = delta
                .delta
                .content
                .into_iter()
                .filter_map(|c| c.text.and_then(|t| t.value))
                .collect();
            (!text.is_empty()).then_some(RunEvent::TextDelta(text))
        }
        "thread.run.requires_action" => {
            let run: RunObject = parse_data(event)?;
            let action = run
                .required_action
                .context("requires_action event carried no required_action")?;
            let tool_calls = action
                .submit_tool_outputs
                .tool_calls
                .into_iter()
                .map(|call| ToolCallRequest {
                    call_id: call.id,
                    tool_name: call.function.name,
                    arguments: call.function.arguments,
                })
                .collect();
            Some(RunEvent::RequiresAction {
                run_id: run.id,
                tool_calls,
            })
        }
        "thread.run.failed" => {
            let run: RunObject = parse_data(event)?;
            let detail = match run.last_error {
                Some(err) => format!("{}: {}", err.code, err.message),
                None => "run failed without error detail".to_string(),
            };
            Some(RunEvent::Failed { detail })
        }
        "thread.run.incomplete" => {
            let run: RunObject = parse_data(event)?;
            let reason = run
                .incomplete_details
                .and_then(|d| d.reason)
                .unwrap_or_else(|| "unknown reason".to_string());
            Some(RunEvent::Failed {
                detail: format!("run incomplete: {}", reason),
            })
        }
        "thread.run.cancelled" => Some(RunEvent::Failed {
            detail: "run cancelled".to_string(),
        }),
        "thread.run.expired" => Some(RunEvent::Failed {
            detail: "run expired".to_string(),
        }),
        "error" => {
            let detail = serde_json::from_str::<Value>(&event.data)
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .or_else(|| v.pointer("/error/message"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| event.data.clone());
            Some(RunEvent::Failed { detail })
        }
        "thread.run.completed" => Some(RunEvent::Completed),
        _ => None,
    };
    Ok(decoded)
}

fn parse_data<T: serde::de::DeserializeOwned>(event: &SseEvent) -> Result<T> {
    serde_json::from_str(&event.data).with_context(|| {
        format!(
            "Malformed {} event",
            event.event.as_deref().unwrap_or("unnamed")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolDescriptor;
    use serde_json::json;

    fn sse(name: &str, data: Value) -> SseEvent {
        SseEvent {
            event: Some(name.into()),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_decode_text_delta() {
        let event = sse(
            "thread.message.delta",
            json!({
                "id": "msg_1",
                "object": "thread.message.delta",
                "delta": {"content": [
                    {"index": 0, "type": "text", "text": {"value": "Kyle Dake ", "annotations": []}},
                    {"index": 0, "type": "text", "text": {"value": "won gold."}}
                ]}
            }),
        );
        assert_eq!(
            decode_event(&event).unwrap(),
            Some(RunEvent::TextDelta("Kyle Dake won gold.".into()))
        );
    }

    #[test]
    fn test_decode_delta_without_text_is_skipped() {
        let event = sse(
            "thread.message.delta",
            json!({"delta": {"content": [{"index": 0, "type": "image_file"}]}}),
        );
        assert_eq!(decode_event(&event).unwrap(), None);
    }

    #[test]
    fn test_decode_requires_action() {
        let event = sse(
            "thread.run.requires_action",
            json!({
                "id": "run_42",
                "object": "thread.run",
                "status": "requires_action",
                "required_action": {
                    "type": "submit_tool_outputs",
                    "submit_tool_outputs": {"tool_calls": [
                        {"id": "call_a", "type": "function",
                         "function": {"name": "web_search", "arguments": "{\"query\":\"ncaa\"}"}},
                        {"id": "call_b", "type": "function",
                         "function": {"name": "extract_content", "arguments": "{\"urls\":[]}"}}
                    ]}
                }
            }),
        );
        let Some(RunEvent::RequiresAction { run_id, tool_calls }) = decode_event(&event).unwrap()
        else {
            panic!("expected RequiresAction");
        };
        assert_eq!(run_id, "run_42");
        assert_eq!(tool_calls.len(), 2);
        assert_eq!(tool_calls[0].call_id, "call_a");
        assert_eq!(tool_calls[0].tool_name, "web_search");
        assert_eq!(tool_calls[0].arguments, "{\"query\":\"ncaa\"}");
        assert_eq!(tool_calls[1].tool_name, "extract_content");
    }

    #[test]
    fn test_decode_failed_keeps_remote_detail() {
        let event = sse(
            "thread.run.failed",
            json!({
                "id": "run_1",
                "status": "failed",
                "last_error": {"code": "rate_limit_exceeded", "message": "You exceeded your quota."}
            }),
        );
        assert_eq!(
            decode_event(&event).unwrap(),
            Some(RunEvent::Failed {
                detail: "rate_limit_exceeded: You exceeded your quota.".into()
            })
        );
    }

    #[test]
    fn test_decode_other_terminal_events() {
        let completed = sse("thread.run.completed", json!({"id": "run_1"}));
        assert_eq!(decode_event(&completed).unwrap(), Some(RunEvent::Completed));

        let expired = sse("thread.run.expired", json!({"id": "run_1"}));
        assert!(matches!(
            decode_event(&expired).unwrap(),
            Some(RunEvent::Failed { .. })
        ));

        let incomplete = sse(
            "thread.run.incomplete",
            json!({"id": "run_1", "incomplete_details": {"reason": "max_completion_tokens"}}),
        );
        assert_eq!(
            decode_event(&incomplete).unwrap(),
            Some(RunEvent::Failed {
                detail: "run incomplete: max_completion_tokens".into()
            })
        );

        let error = sse("error", json!({"code": "server_error", "message": "boom"}));
        assert_eq!(
            decode_event(&error).unwrap(),
            Some(RunEvent::Failed {
                detail: "boom".into()
            })
        );
    }

    #[test]
    fn test_decode_ignores_bookkeeping_events() {
        for name in ["thread.run.created", "thread.run.step.created", "thread.message.completed"] {
            assert_eq!(decode_event(&sse(name, json!({"id": "x"}))).unwrap(), None);
        }
        let done = SseEvent {
            event: Some("done".into()),
            data: "[DONE]".into(),
        };
        assert_eq!(decode_event(&done).unwrap(), None);
    }

    #[test]
    fn test_decode_malformed_payload_is_an_error() {
        let event = SseEvent {
            event: Some("thread.run.requires_action".into()),
            data: "{not json".into(),
        };
        assert!(decode_event(&event).is_err());
    }

    #[test]
    fn test_assistant_request_shape() {
        let definition = AssistantDefinition {
            name: "Aether Assistant".into(),
            model: "gpt-4o".into(),
            instructions: "Be helpful.".into(),
            tools: vec![ToolDescriptor {
                name: "web_search".into(),
                description: "Search the web.".into(),
                parameters: json!({"type": "object"}),
            }],
            vector_store_ids: vec!["vs_123".into()],
        };
        let json = serde_json::to_value(assistant_request(&definition)).unwrap();
        assert_eq!(json["tools"][0], json!({"type": "file_search"}));
        assert_eq!(json["tools"][1]["type"], "function");
        assert_eq!(json["tools"][1]["function"]["name"], "web_search");
        assert_eq!(json["tools"][1]["function"]["strict"], true);
        assert_eq!(
            json["tool_resources"]["file_search"]["vector_store_ids"],
            json!(["vs_123"])
        );

        let bare = AssistantDefinition {
            vector_store_ids: Vec::new(),
            ..definition
        };
        let json = serde_json::to_value(assistant_request(&bare)).unwrap();
        assert!(json.get("tool_resources").is_none());
    }

    #[test]
    fn test_tool_outputs_request_shape() {
        let results = vec![
            ToolCallResult::json("call_a", "{\"ok\":true}".into()),
            ToolCallResult::error("call_b", "Error: Unknown tool: x".into()),
        ];
        let json = serde_json::to_value(tool_outputs_request(&results)).unwrap();
        assert_eq!(
            json,
            json!({
                "tool_outputs": [
                    {"tool_call_id": "call_a", "output": "{\"ok\":true}"},
                    {"tool_call_id": "call_b", "output": "Error: Unknown tool: x"}
                ],
                "stream": true
            })
        );
    }
}
