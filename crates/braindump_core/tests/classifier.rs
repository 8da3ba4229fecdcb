use async_trait::async_trait;
use braindump_core::classify::error::{
    INPUT_TOO_LONG_MESSAGE, PARSE_FAILURE_MESSAGE, RATE_LIMITED_MESSAGE,
};
use braindump_core::{
    ClassificationStatus, ClassifierClient, ClassifierConfig, ClassifyError, CompletionBackend,
    CompletionRequest, ItemType, RateLimiter,
};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const EVENT_REPLY: &str = r##"{"mainNote":{"type":"event","title":"Meeting with Jane","content":"Meeting with Jane","tags":[{"label":"meeting","color":"#10b981"}],"dueDate":"2025-01-25T15:00:00.000Z","hasTime":true,"priority":null,"recurrence":null},"status":"success"}"##;

struct ScriptedBackend {
    reply: Result<String, ClassifyError>,
    delay: Option<Duration>,
    configured: bool,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedBackend {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            delay: None,
            configured: true,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    fn failing(error: ClassifyError) -> Self {
        Self {
            reply: Err(error),
            ..Self::replying("")
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn ensure_configured(&self) -> Result<(), ClassifyError> {
        if self.configured {
            Ok(())
        } else {
            Err(ClassifyError::Configuration("missing key".to_string()))
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

fn client(backend: ScriptedBackend) -> ClassifierClient<Arc<ScriptedBackend>> {
    ClassifierClient::new(
        Arc::new(backend),
        Arc::new(RateLimiter::default()),
        &ClassifierConfig::default(),
    )
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 24, 9, 30, 0).unwrap()
}

#[tokio::test]
async fn blank_input_is_rejected_before_any_call() {
    let client = client(ScriptedBackend::replying(EVENT_REPLY));

    let err = client.classify_at("   \n", fixed_now()).await.unwrap_err();
    assert!(matches!(err, ClassifyError::Validation(_)));
    assert_eq!(client.backend().calls(), 0);
}

#[tokio::test]
async fn missing_credentials_surface_as_configuration_error() {
    let backend = ScriptedBackend {
        configured: false,
        ..ScriptedBackend::replying(EVENT_REPLY)
    };
    let client = client(backend);

    let err = client.classify_at("call mom", fixed_now()).await.unwrap_err();
    assert!(matches!(err, ClassifyError::Configuration(_)));
    assert_eq!(client.backend().calls(), 0);
}

#[tokio::test]
async fn successful_call_keeps_original_input_and_sends_sanitized_text() {
    let client = client(ScriptedBackend::replying(EVENT_REPLY));
    let input = "meeting with `Jane` \"tomorrow\" at 3pm";

    let result = client.classify_at(input, fixed_now()).await.unwrap();

    assert_eq!(result.status, ClassificationStatus::Success);
    assert_eq!(result.item.kind, ItemType::Event);
    assert_eq!(result.item.original_input, input);
    assert!(result.item.has_time);
    assert_eq!(
        result.item.due_date,
        Some(Utc.with_ymd_and_hms(2025, 1, 25, 15, 0, 0).unwrap())
    );

    let request = client.backend().last_request.lock().clone().unwrap();
    assert!(request.user.contains("Current datetime: 2025-01-24T09:30:00.000Z"));
    assert!(request.user.contains("'Jane'"));
    assert!(request.user.contains("\\\"tomorrow\\\""));
    assert!(!request.user.contains('`'));
}

#[tokio::test]
async fn input_over_ceiling_never_reaches_limiter_or_backend() {
    let client = client(ScriptedBackend::replying(EVENT_REPLY));
    let input = "a".repeat(1001);

    let result = client.classify_at(&input, fixed_now()).await.unwrap();

    assert_eq!(result.status, ClassificationStatus::Error);
    assert_eq!(result.message.as_deref(), Some(INPUT_TOO_LONG_MESSAGE));
    assert_eq!(result.item.title, "Input Too Long");
    assert_eq!(result.item.content, format!("{}...", "a".repeat(1000)));
    assert_eq!(result.item.original_input, input);
    assert_eq!(client.backend().calls(), 0);
    assert_eq!(client.limiter().remaining_at(fixed_now()), 20);
}

#[tokio::test]
async fn input_at_ceiling_is_sent() {
    let client = client(ScriptedBackend::replying(EVENT_REPLY));

    let result = client
        .classify_at(&"b".repeat(1000), fixed_now())
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(client.backend().calls(), 1);
}

#[tokio::test]
async fn twenty_first_request_in_a_window_is_rate_limited() {
    let client = client(ScriptedBackend::replying(EVENT_REPLY));
    let now = fixed_now();

    for offset in 0..20 {
        let result = client
            .classify_at("buy milk", now + ChronoDuration::seconds(offset))
            .await
            .unwrap();
        assert!(result.is_success());
    }

    let limited = client
        .classify_at("buy milk", now + ChronoDuration::seconds(25))
        .await
        .unwrap();
    assert_eq!(limited.status, ClassificationStatus::Error);
    assert_eq!(limited.message.as_deref(), Some(RATE_LIMITED_MESSAGE));
    assert_eq!(limited.failure, Some(ClassifyError::RateLimited));
    assert_eq!(limited.item.kind, ItemType::Note);
    assert_eq!(client.backend().calls(), 20);

    let next_window = client
        .classify_at("buy milk", now + ChronoDuration::seconds(61))
        .await
        .unwrap();
    assert!(next_window.is_success());
}

#[tokio::test]
async fn limiter_is_shared_between_clients() {
    let limiter = Arc::new(RateLimiter::new(1));
    let config = ClassifierConfig::default();
    let first = ClassifierClient::new(
        ScriptedBackend::replying(EVENT_REPLY),
        Arc::clone(&limiter),
        &config,
    );
    let second = ClassifierClient::new(
        ScriptedBackend::replying(EVENT_REPLY),
        Arc::clone(&limiter),
        &config,
    );

    assert!(first.classify_at("a", fixed_now()).await.unwrap().is_success());
    let denied = second.classify_at("b", fixed_now()).await.unwrap();
    assert_eq!(denied.failure, Some(ClassifyError::RateLimited));
}

#[tokio::test(start_paused = true)]
async fn slow_backend_times_out_with_fallback() {
    let backend = ScriptedBackend {
        delay: Some(Duration::from_secs(30)),
        ..ScriptedBackend::replying(EVENT_REPLY)
    };
    let client = client(backend);

    let result = client.classify_at("call the bank", fixed_now()).await.unwrap();

    assert_eq!(result.status, ClassificationStatus::Error);
    assert_eq!(result.failure, Some(ClassifyError::Timeout { after_ms: 10_000 }));
    assert_eq!(result.item.kind, ItemType::Note);
    assert_eq!(result.item.content, "call the bank");
    assert_eq!(client.backend().calls(), 1);
}

#[tokio::test]
async fn unparseable_reply_yields_generic_parse_message() {
    let client = client(ScriptedBackend::replying("Sure! Here is your note."));
    let input = "x".repeat(60);

    let result = client.classify_at(&input, fixed_now()).await.unwrap();

    assert_eq!(result.status, ClassificationStatus::Error);
    assert_eq!(result.message.as_deref(), Some(PARSE_FAILURE_MESSAGE));
    assert_eq!(result.item.title, format!("{}...", "x".repeat(50)));
    assert_eq!(result.item.content, input);
    assert!(result.item.tags.is_empty());
    assert_eq!(result.item.due_date, None);
}

#[tokio::test]
async fn upstream_failure_is_reported_in_result() {
    let client = client(ScriptedBackend::failing(ClassifyError::Upstream(
        "AI processing failed".to_string(),
    )));

    let result = client.classify_at("note this", fixed_now()).await.unwrap();

    assert_eq!(result.status, ClassificationStatus::Error);
    assert_eq!(result.message.as_deref(), Some("AI processing failed"));
    assert_eq!(result.item.kind, ItemType::Note);
}
