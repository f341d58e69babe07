//! Integration tests for docroute.
//!
//! These tests drive the analysis and chat flows end to end through the
//! container and controllers, using the offline client.

use std::io::Write;
use std::sync::Arc;

use docroute::connector::api::controller::{AnalyzeController, ChatController};
use docroute::{
    ClassificationOutput, Container, ContainerConfig, Conversation, DomainError, GeminiClient,
    MockGenerativeClient, OutputFormat, PriorityLevel, Sender, StreamChatUseCase, TurnOutcome,
};

const INVOICE: &str = "INVOICE #2024-118\nAmount due: $4,200.00\nPayment terms: Net 30";

/// Container around a shared mock so tests can inspect what was sent.
fn setup_mock_env(client: MockGenerativeClient) -> (Arc<MockGenerativeClient>, Container) {
    let client = Arc::new(client);
    let container = Container::with_client(client.clone(), "test-model");
    (client, container)
}

#[tokio::test]
async fn test_analyze_with_offline_container() {
    let container = Container::new(ContainerConfig {
        mock: true,
        model: Some("test-model".to_string()),
        base_url: None,
    });

    let output = container
        .analyze_use_case()
        .execute(INVOICE)
        .await
        .expect("Mock analysis should succeed");

    assert!(output.document_id.starts_with("mock-"));
    assert_eq!(output.confidence_score, 50);
    assert!(output.requires_human_review());
    assert!(!output.has_secondary_classification());
    assert_eq!(container.model(), "test-model");
}

#[tokio::test]
async fn test_analysis_prompt_embeds_document_and_sampling() {
    let (client, container) = setup_mock_env(MockGenerativeClient::new());

    container
        .analyze_use_case()
        .execute(INVOICE)
        .await
        .expect("Mock analysis should succeed");

    let requests = client.generate_requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model, "test-model");
    assert!(request.prompt.contains(INVOICE));
    assert!(!request.prompt.contains("[DOCUMENT_CONTENT]"));
    assert!(request.config.wants_json());
    assert_eq!(request.config.top_k, Some(40));
}

#[tokio::test]
async fn test_analyze_json_output_keeps_string_flags() {
    let response = r#"```json
{
  "document_id": "HR-77",
  "primary_classification": "HR Documents",
  "secondary_classification": "Legal Documents",
  "confidence_score": "85%",
  "routing_destination": "Human Resources",
  "alternative_routing": "N/A",
  "priority_level": "medium",
  "processing_notes": "Employment contract amendment.",
  "required_actions": ["Countersign"],
  "human_review_required": "false",
  "sensitive_content_detected": "true",
  "estimated_processing_time": "2 days"
}
```"#;
    let (_, container) = setup_mock_env(
        MockGenerativeClient::new().with_generate_response(Ok(response.to_string())),
    );
    let controller = AnalyzeController::new(&container);

    let json = controller
        .analyze_text("Amendment to employment contract", OutputFormat::Json)
        .await
        .expect("Analysis should succeed");

    let value: serde_json::Value = serde_json::from_str(&json).expect("Output should be JSON");
    assert_eq!(value["confidence_score"], 85);
    assert_eq!(value["human_review_required"], "false");
    assert_eq!(value["sensitive_content_detected"], "true");
    assert_eq!(value["priority_level"], "Medium");

    let output: ClassificationOutput = serde_json::from_str(&json).expect("Round trip");
    assert_eq!(output.priority_level, PriorityLevel::Medium);
    assert!(output.has_secondary_classification());
}

#[tokio::test]
async fn test_analyze_reads_document_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write!(file, "{}", INVOICE).expect("Failed to write temp file");

    let (client, container) = setup_mock_env(MockGenerativeClient::new());
    let controller = AnalyzeController::new(&container);

    let text = controller
        .analyze(
            Some(file.path().to_string_lossy().to_string()),
            OutputFormat::Text,
        )
        .await
        .expect("Analysis should succeed");

    assert!(text.starts_with("Classification Analysis"));
    assert!(text.contains("Human Review Required:"));
    assert!(!text.contains("Secondary Classification"));
    assert!(client.generate_requests()[0].prompt.contains("Net 30"));
}

#[tokio::test]
async fn test_blank_document_is_rejected_before_any_call() {
    let file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    std::fs::write(file.path(), "  \n\t\n").expect("Failed to write temp file");

    let (client, container) = setup_mock_env(MockGenerativeClient::new());
    let controller = AnalyzeController::new(&container);

    let err = controller
        .analyze(
            Some(file.path().to_string_lossy().to_string()),
            OutputFormat::Text,
        )
        .await
        .unwrap_err();

    let domain = err
        .downcast_ref::<DomainError>()
        .expect("Blank input is a domain error");
    assert!(domain.is_invalid_input());
    assert_eq!(
        err.to_string(),
        "Invalid input: Document content cannot be empty."
    );
    assert!(client.generate_requests().is_empty());
}

#[tokio::test]
async fn test_missing_file_reports_path() {
    let (_, container) = setup_mock_env(MockGenerativeClient::new());
    let controller = AnalyzeController::new(&container);

    let err = controller
        .analyze(Some("/nonexistent/doc.txt".to_string()), OutputFormat::Text)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("/nonexistent/doc.txt"));
}

#[tokio::test]
async fn test_invalid_model_output_surfaces_parse_error() {
    let (_, container) = setup_mock_env(
        MockGenerativeClient::new().with_generate_response(Ok("Sorry, I cannot help.".to_string())),
    );

    let err = container
        .analyze_use_case()
        .execute(INVOICE)
        .await
        .unwrap_err();

    assert!(err.is_parse_error());
    assert!(err.to_string().contains("Sorry, I cannot help."));
}

#[tokio::test]
async fn test_missing_credential_fails_every_flow_without_network() {
    // Port 9 (discard) is never contacted: the key check comes first.
    let client = Arc::new(GeminiClient::new(None, "http://127.0.0.1:9"));
    let container = Container::with_client(client, "test-model");

    let err = container
        .analyze_use_case()
        .execute(INVOICE)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ConfigError(_)));

    let mut conversation = container.conversation();
    let outcome = conversation.send("Hello", |_, _| {}).await;
    assert_eq!(outcome, TurnOutcome::Failed);
    assert!(conversation
        .last_message()
        .is_some_and(|m| m.text().starts_with("Error: Configuration error")));
    assert!(conversation.session_id().is_none());
}

#[tokio::test]
async fn test_two_turns_alternate_without_buffer_bleed() {
    let client = Arc::new(
        MockGenerativeClient::new()
            .with_chat_reply(vec![Ok("Hi".to_string()), Ok(" there!".to_string())])
            .with_chat_reply(vec![Ok("Doing ".to_string()), Ok("well.".to_string())]),
    );
    let mut conversation = Conversation::new(StreamChatUseCase::new(client.clone(), "test-model"));

    assert_eq!(conversation.send("Hello", |_, _| {}).await, TurnOutcome::Completed);
    let first_session = conversation.session_id().map(str::to_string);

    let mut updates = Vec::new();
    let outcome = conversation
        .send("How are you?", |message, _| updates.push(message.text().to_string()))
        .await;
    assert_eq!(outcome, TurnOutcome::Completed);

    let transcript: Vec<(Sender, String)> = conversation
        .messages()
        .iter()
        .map(|m| (m.sender(), m.text().to_string()))
        .collect();
    assert_eq!(
        transcript,
        vec![
            (Sender::User, "Hello".to_string()),
            (Sender::Ai, "Hi there!".to_string()),
            (Sender::User, "How are you?".to_string()),
            (Sender::Ai, "Doing well.".to_string()),
        ]
    );
    assert_eq!(updates, vec!["Doing ", "Doing well."]);
    assert_eq!(conversation.session_id().map(str::to_string), first_session);
    assert_eq!(client.sessions_started(), 1);
    assert_eq!(client.sent_messages(), vec!["Hello", "How are you?"]);
}

#[tokio::test]
async fn test_reset_starts_fresh_session_and_keeps_transcript() {
    let client = Arc::new(MockGenerativeClient::new());
    let mut conversation = Conversation::new(StreamChatUseCase::new(client.clone(), "test-model"));

    conversation.send("Remember the number 7", |_, _| {}).await;
    let old_session = conversation.session_id().map(str::to_string);

    conversation.reset_session();
    conversation.send("What number?", |_, _| {}).await;

    assert_eq!(client.sessions_started(), 2);
    assert_ne!(conversation.session_id().map(str::to_string), old_session);
    assert_eq!(conversation.messages().len(), 4);
}

#[tokio::test]
async fn test_chat_repl_handles_commands() {
    let (client, container) = setup_mock_env(MockGenerativeClient::new());
    let controller = ChatController::new(&container);
    let input: &[u8] = b"Hello\n\n/history\n/reset\nAgain\n/exit\nnever sent\n";
    let mut output = Vec::new();

    let summary = controller
        .run(input, &mut output)
        .await
        .expect("REPL should finish cleanly");

    let output = String::from_utf8(output).expect("UTF-8 output");
    assert!(output.contains("You said: Hello\n"));
    assert!(output.contains("[You] Hello\n[AI] You said: Hello\n"));
    assert!(output.contains("Session reset."));
    assert!(output.contains("You said: Again\n"));
    assert_eq!(summary, "Chat ended after 4 message(s).");
    assert_eq!(client.sessions_started(), 2);
    assert_eq!(client.sent_messages(), vec!["Hello", "Again"]);
}

#[tokio::test]
async fn test_chat_repl_stops_at_end_of_input() {
    let (_, container) = setup_mock_env(MockGenerativeClient::new());
    let controller = ChatController::new(&container);
    let input: &[u8] = b"/history\n";
    let mut output = Vec::new();

    let summary = controller.run(input, &mut output).await.expect("REPL");

    assert!(String::from_utf8_lossy(&output).contains("No messages yet."));
    assert_eq!(summary, "Chat ended after 0 message(s).");
}

#[tokio::test]
async fn test_ask_streams_reply_and_reports_failure() {
    let (_, container) = setup_mock_env(
        MockGenerativeClient::new()
            .with_chat_reply(vec![Ok("Sure".to_string()), Ok(".".to_string())])
            .with_chat_reply(vec![Err(DomainError::upstream("service unavailable"))]),
    );
    let controller = ChatController::new(&container);

    let mut output = Vec::new();
    controller
        .ask_to("Can you help?", &mut output)
        .await
        .expect("First ask succeeds");
    assert_eq!(String::from_utf8_lossy(&output), "Sure.\n");

    let mut output = Vec::new();
    let err = controller
        .ask_to("And again?", &mut output)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Upstream error: service unavailable");
    assert!(String::from_utf8_lossy(&output).contains("Error: Upstream error: service unavailable"));
}
