mod common;

use career_guide::chat::run_chat;
use career_guide::BackendError;
use common::{gateway_with, Behaviour, StubBackend};

async fn run(backend: std::sync::Arc<StubBackend>, input: &str) -> String {
    let gateway = gateway_with(backend);
    let mut output = Vec::new();
    run_chat(&gateway, input.as_bytes(), &mut output)
        .await
        .unwrap();
    String::from_utf8(output).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_each_line_is_an_independent_query() {
    let backend = StubBackend::new(Behaviour::Echo);
    let output = run(backend.clone(), "first question\nsecond question\n").await;

    assert!(output.contains("AI Career Guidance Assistant"));
    assert!(output.contains("echo:first question"));
    assert!(output.contains("echo:second question"));
    assert_eq!(
        backend.received(),
        vec!["first question".to_string(), "second question".to_string()]
    );
}

#[test_log::test(tokio::test)]
async fn test_shortcut_number_and_exit() {
    let backend = StubBackend::new(Behaviour::Reply(Some("ok".into())));
    run(backend.clone(), "3\nexit\nnever sent\n").await;
    assert_eq!(
        backend.received(),
        vec!["How do I improve my problem-solving skills?".to_string()]
    );
}

#[test_log::test(tokio::test)]
async fn test_blank_lines_are_not_sent() {
    let backend = StubBackend::new(Behaviour::Reply(Some("ok".into())));
    let output = run(backend.clone(), "\n   \n").await;
    assert!(output.contains("Please enter a query."));
    assert_eq!(backend.calls(), 0);
}

#[test_log::test(tokio::test)]
async fn test_failures_show_generic_message_and_continue() {
    let backend = StubBackend::new(Behaviour::Fail(|| BackendError::Transport("down".into())));
    let output = run(backend.clone(), "one\ntwo\n").await;
    assert_eq!(output.matches("An error occurred. Please try again.").count(), 2);
    assert!(!output.contains("down"));
    assert_eq!(backend.calls(), 2);
}
