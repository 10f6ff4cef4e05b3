use super::*;
use crate::message::{ToolCallRequest, ToolOutput};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Search service that records queries and echoes them back.
#[derive(Default)]
pub(crate) struct FakeSearch {
    pub calls: Mutex<Vec<(String, SearchOptions)>>,
}

#[async_trait::async_trait]
impl SearchService for FakeSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> anyhow::Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), options.clone()));
        Ok(json!({
            "query": query,
            "answer": "Top ranked at 65kg this season.",
            "results": [{"title": "Rankings", "url": "https://uww.org/rankings"}]
        }))
    }
}

/// Extraction service that either fails like a dropped connection or returns a stub page.
pub(crate) struct FakeExtractor {
    pub fail: bool,
}

#[async_trait::async_trait]
impl ExtractionService for FakeExtractor {
    async fn extract(&self, urls: &[String], include_images: bool) -> anyhow::Result<Value> {
        assert!(!include_images);
        if self.fail {
            anyhow::bail!("error sending request for url ({}): connection refused", urls[0]);
        }
        Ok(json!({
            "results": urls.iter().map(|u| json!({"url": u, "raw_content": "page"})).collect::<Vec<_>>()
        }))
    }
}

pub(crate) fn default_options() -> SearchOptions {
    SearchOptions {
        depth: "advanced".into(),
        max_results: 5,
        include_answer: true,
        include_raw_content: true,
    }
}

pub(crate) fn test_registry(extract_fails: bool) -> ToolRegistry {
    ToolRegistry::with_builtins(
        Arc::new(FakeSearch::default()),
        Arc::new(FakeExtractor {
            fail: extract_fails,
        }),
        default_options(),
    )
}

pub(crate) fn executor_for(registry: ToolRegistry) -> ToolExecutor {
    ToolExecutor::new(Arc::new(registry), Duration::from_secs(5), 4)
}

fn request(id: &str, name: &str, args: &str) -> ToolCallRequest {
    ToolCallRequest {
        call_id: id.into(),
        tool_name: name.into(),
        arguments: args.into(),
    }
}

/// Sleeps longer than any test timeout and tracks concurrent executions.
struct SlowTool {
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Tool for SlowTool {
    fn name(&self) -> &str {
        "slow"
    }
    fn description(&self) -> &str {
        "Sleeps."
    }
    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "additionalProperties": false})
    }
    async fn execute(&self, _input: Value) -> Result<Value, ToolError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(json!({"slept": true}))
    }
}

#[tokio::test]
async fn test_registry_with_builtins() {
    let registry = test_registry(false);
    assert_eq!(registry.len(), 2);
    assert!(!registry.is_empty());
    let defs = registry.descriptors();
    assert_eq!(defs[0].name, "web_search");
    assert_eq!(defs[1].name, "extract_content");
    for def in &defs {
        assert_eq!(def.parameters["additionalProperties"], false);
    }
    assert_eq!(defs[0].parameters["required"], json!(["query"]));
    assert_eq!(defs[1].parameters["required"], json!(["urls"]));
    assert_eq!(defs[1].parameters["properties"]["urls"]["items"]["type"], "string");
}

#[tokio::test]
async fn test_lookup_unknown_tool() {
    let registry = test_registry(false);
    assert!(matches!(
        registry.lookup("get_weather"),
        Err(ToolError::UnknownTool(name)) if name == "get_weather"
    ));
}

#[tokio::test]
async fn test_register_replaces_same_name() {
    let mut registry = test_registry(false);
    registry.register(Box::new(web_search::WebSearchTool::new(
        Arc::new(FakeSearch::default()),
        default_options(),
    )));
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn test_web_search_uses_fixed_options() {
    let search = Arc::new(FakeSearch::default());
    let registry = ToolRegistry::with_builtins(
        search.clone(),
        Arc::new(FakeExtractor { fail: false }),
        default_options(),
    );
    let executor = executor_for(registry);

    let result = executor
        .execute(&request(
            "call_1",
            "web_search",
            r#"{"query": "freestyle wrestling rankings amateur wrestling"}"#,
        ))
        .await;

    assert!(!result.is_error());
    assert!(result.output_text().contains("Top ranked at 65kg"));
    let calls = search.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "freestyle wrestling rankings amateur wrestling");
    assert_eq!(calls[0].1, default_options());
}

#[tokio::test]
async fn test_malformed_arguments_become_error_payload() {
    let executor = executor_for(test_registry(false));
    let result = executor
        .execute(&request("call_bad", "web_search", "{\"query\": "))
        .await;
    assert_eq!(result.call_id, "call_bad");
    assert!(result.is_error());
    assert!(result.output_text().starts_with("Error: Invalid arguments"));
}

#[tokio::test]
async fn test_additional_properties_rejected() {
    let executor = executor_for(test_registry(false));
    let result = executor
        .execute(&request(
            "call_extra",
            "web_search",
            r#"{"query": "rankings", "site": "uww.org"}"#,
        ))
        .await;
    assert!(result.is_error());
    assert!(result.output_text().contains("unknown field"));
}

#[tokio::test]
async fn test_unknown_tool_becomes_error_payload() {
    let executor = executor_for(test_registry(false));
    let result = executor
        .execute(&request("call_x", "get_weather", "{}"))
        .await;
    assert_eq!(
        result.output,
        ToolOutput::Error("Error: Unknown tool: get_weather".into())
    );
}

#[tokio::test]
async fn test_extraction_network_error_is_captured() {
    let executor = executor_for(test_registry(true));
    let result = executor
        .execute(&request(
            "call_mat",
            "extract_content",
            r#"{"urls": ["https://themat.com/x"]}"#,
        ))
        .await;
    assert_eq!(result.call_id, "call_mat");
    assert!(result.is_error());
    assert!(result.output_text().contains("connection refused"));
}

#[tokio::test]
async fn test_extract_content_success() {
    let executor = executor_for(test_registry(false));
    let result = executor
        .execute(&request(
            "call_ok",
            "extract_content",
            r#"{"urls": ["https://uww.org/a", "https://flowrestling.com/b"]}"#,
        ))
        .await;
    assert!(!result.is_error());
    let body: Value = serde_json::from_str(result.output_text()).unwrap();
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_slow_tool_times_out() {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SlowTool {
        delay: Duration::from_secs(10),
        in_flight: Arc::new(AtomicUsize::new(0)),
        peak: Arc::new(AtomicUsize::new(0)),
    }));
    let executor = ToolExecutor::new(Arc::new(registry), Duration::from_millis(50), 1);

    let result = executor.execute(&request("call_slow", "slow", "")).await;
    assert!(result.is_error());
    assert!(result.output_text().contains("timed out"));
}

#[tokio::test]
async fn test_batch_returns_one_result_per_request() {
    let executor = executor_for(test_registry(true));
    let requests = vec![
        request("a", "web_search", r#"{"query": "ncaa brackets"}"#),
        request("b", "extract_content", r#"{"urls": ["https://themat.com/x"]}"#),
        request("c", "no_such_tool", "{}"),
        request("d", "web_search", "not json"),
        request("e", "web_search", r#"{"query": "world championships"}"#),
    ];

    let results = executor.execute_batch(&requests).await;

    assert_eq!(results.len(), requests.len());
    let ids: HashSet<_> = results.iter().map(|r| r.call_id.as_str()).collect();
    assert_eq!(ids, HashSet::from(["a", "b", "c", "d", "e"]));
    let failed: HashSet<_> = results
        .iter()
        .filter(|r| r.is_error())
        .map(|r| r.call_id.as_str())
        .collect();
    assert_eq!(failed, HashSet::from(["b", "c", "d"]));
}

#[tokio::test]
async fn test_batch_respects_concurrency_bound() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SlowTool {
        delay: Duration::from_millis(20),
        in_flight: in_flight.clone(),
        peak: peak.clone(),
    }));
    let executor = ToolExecutor::new(Arc::new(registry), Duration::from_secs(5), 2);

    let requests: Vec<_> = (0..6)
        .map(|i| request(&format!("call_{i}"), "slow", "{}"))
        .collect();
    let results = executor.execute_batch(&requests).await;

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| !r.is_error()));
    assert_eq!(peak.load(Ordering::SeqCst), 2);
}
