use futures::stream;
use std::time::Duration;
use wardline::config::Config;
use wardline::error::{StreamFailure, TransportError};
use wardline::state::{
    RegionContent, RegionHandle, Renderer, StreamAggregator, StreamOutcome, StreamState,
    Transcript,
};
use wardline::types::{ContentBlock, Message};

fn config(host: Option<&str>, url: Option<&str>, token: Option<&str>) -> Config {
    Config {
        host: host.map(str::to_string),
        database: "SNOWFLAKE_INTELLIGENCE".to_string(),
        schema: "AGENTS".to_string(),
        agent: "STAFFADMINTESTAGENT".to_string(),
        url_override: url.map(str::to_string),
        token: token.map(str::to_string),
        request_timeout: Some(Duration::from_secs(5)),
    }
}

#[test]
fn test_config_derives_run_url_from_host() {
    let config = config(Some("acme.snowflakecomputing.com"), None, Some("pat"));
    assert_eq!(
        config.run_url(),
        "https://acme.snowflakecomputing.com/api/v2/databases/SNOWFLAKE_INTELLIGENCE/schemas/AGENTS/agents/STAFFADMINTESTAGENT:run"
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_requires_token_for_remote_endpoint() {
    let config = config(Some("acme.snowflakecomputing.com"), None, None);
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_allows_local_endpoint_without_token() {
    let config = config(None, Some("http://localhost:8000/agents/mock:run"), None);
    assert!(config.is_local_endpoint());
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_rejects_missing_host_and_bad_scheme() {
    assert!(config(None, None, Some("pat")).validate().is_err());
    assert!(config(None, Some("ftp://example.com/run"), Some("pat"))
        .validate()
        .is_err());
}

/// Keeps only what a terminal would end up showing.
#[derive(Default)]
struct ScreenRenderer {
    next_region: u64,
    regions: Vec<(RegionHandle, Option<RegionContent>)>,
    status_depth: i32,
    errors: Vec<String>,
}

impl Renderer for ScreenRenderer {
    fn create_region(&mut self, _content_index: usize) -> RegionHandle {
        let handle = RegionHandle::new(self.next_region);
        self.next_region += 1;
        self.regions.push((handle, None));
        handle
    }

    fn render(&mut self, region: RegionHandle, content: RegionContent) {
        if let Some(slot) = self.regions.iter_mut().find(|(handle, _)| *handle == region) {
            slot.1 = Some(content);
        }
    }

    fn begin_status(&mut self, _message: &str) {
        self.status_depth += 1;
    }

    fn update_status(&mut self, _message: &str) {}

    fn end_status(&mut self) {
        self.status_depth -= 1;
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn show_notice(&mut self, _text: &str) {}

    fn show_user(&mut self, _text: &str) {}
}

fn body(text: &str) -> Vec<Result<String, TransportError>> {
    text.lines().map(|line| Ok(line.to_string())).collect()
}

#[tokio::test]
async fn test_full_answer_with_table_commits_response() {
    let mut transcript = Transcript::from(vec![Message::user("How many ICU beds are free?")]);
    let sse = concat!(
        "event: response.status\n",
        "data: {\"message\":\"Executing SQL\"}\n",
        "\n",
        "event: response.text.delta\n",
        "data: {\"content_index\":0,\"text\":\"There are \"}\n",
        "\n",
        "event: response.text.delta\n",
        "data: {\"content_index\":0,\"text\":\"12 free beds.\"}\n",
        "\n",
        "event: response.table\n",
        "data: {\"content_index\":1,\"result_set\":{\"data\":[[\"ICU\",12]],\"result_set_meta_data\":{\"row_type\":[{\"name\":\"UNIT\"},{\"name\":\"FREE\"}]}}}\n",
        "\n",
        "event: response\n",
        "data: {\"role\":\"assistant\",\"content\":[{\"type\":\"text\",\"text\":\"There are 12 free beds.\"}]}\n",
    );

    let mut screen = ScreenRenderer::default();
    let outcome = StreamAggregator::new(&mut transcript)
        .run(stream::iter(body(sse)), &mut screen)
        .await;

    assert!(matches!(
        outcome,
        StreamOutcome::Completed { committed: Some(1) }
    ));
    assert_eq!(transcript.len(), 2);
    assert_eq!(
        transcript.messages()[1].content,
        vec![ContentBlock::Text {
            text: "There are 12 free beds.".to_string()
        }]
    );
    assert_eq!(screen.status_depth, 0);
    assert_eq!(
        screen.regions[0].1,
        Some(RegionContent::Markdown("There are 12 free beds.".to_string()))
    );
    assert!(matches!(
        &screen.regions[1].1,
        Some(RegionContent::Table { columns, .. }) if columns == &["UNIT", "FREE"]
    ));
}

#[tokio::test]
async fn test_agent_error_leaves_history_as_before_the_turn() {
    let mut transcript = Transcript::from(vec![
        Message::user("Where is radiology?"),
        Message::assistant(vec![ContentBlock::Text {
            text: "Level 2.".to_string(),
        }]),
        Message::user("And cardiology?"),
    ]);
    let sse = concat!(
        "event: response.text.delta\n",
        "data: {\"content_index\":0,\"text\":\"Card\"}\n",
        "\n",
        "event: error\n",
        "data: {\"code\":\"500\",\"message\":\"Warehouse suspended\"}\n",
        "\n",
    );

    let mut screen = ScreenRenderer::default();
    let outcome = StreamAggregator::new(&mut transcript)
        .run(stream::iter(body(sse)), &mut screen)
        .await;

    assert_eq!(outcome.state(), StreamState::Errored);
    assert!(matches!(outcome, StreamOutcome::Errored(StreamFailure::Agent { .. })));
    assert_eq!(transcript.len(), 2);
    assert_eq!(
        screen.errors,
        vec!["Error: Warehouse suspended (code: 500)".to_string()]
    );
    assert_eq!(screen.status_depth, 0);
}
