use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use copydesk::api::{
    ApprovalPayload, HttpApiClient, PlatformSource, Publisher, ValidationRequest,
    ValidationService,
};
use copydesk::auth::SessionContext;
use copydesk::content::{ContentField, FieldEdit, GeneratedContent, HashtagSet, PlatformKey};
use copydesk::error::{ApiError, ReviewError};
use copydesk::review::{
    ApprovalBlocker, GatePhase, LocalValidator, PlatformCatalog, ReviewSession,
    StaticPlatformSource, ValidationResult, ValidationStatus,
};

const QUIET: Duration = Duration::from_millis(500);

fn key(name: &str) -> PlatformKey {
    PlatformKey::from(name)
}

fn generated() -> GeneratedContent {
    serde_json::from_value(json!({
        "title": "Linen summer shirt",
        "description": "Breathable linen shirt for warm days.",
        "hashtags": ["#linen", "#summer"],
        "variations": [{"title": "Linen shirt", "description": "Light and airy."}],
        "platform_specific": {
            "instagram": {
                "title": "Linen summer shirt",
                "description": "Breathable linen for warm days ☀️",
                "hashtags": ["#linen", "summer", " #ootd "]
            },
            "twitter": {
                "title": "Linen shirt",
                "description": "x".repeat(300),
                "hashtags": ["#linen"]
            },
            "myspace": {
                "title": "Not a catalog platform",
                "description": "",
                "hashtags": []
            }
        }
    }))
    .unwrap()
}

async fn catalog() -> Arc<PlatformCatalog> {
    Arc::new(
        PlatformCatalog::load(&StaticPlatformSource::builtin())
            .await
            .unwrap(),
    )
}

struct FlakyValidator {
    inner: LocalValidator,
    fail: AtomicBool,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

#[async_trait]
impl ValidationService for FlakyValidator {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationResult, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Request {
                endpoint: "content/validate".into(),
                message: "connection reset by peer".into(),
            });
        }
        self.inner.validate(request).await
    }
}

#[derive(Default)]
struct RecordingPublisher {
    approved: Mutex<Vec<ApprovalPayload>>,
    rejected: AtomicUsize,
    regenerated: AtomicUsize,
    fail_next: AtomicBool,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingPublisher {
    async fn outcome(&self) -> Result<(), ApiError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Status {
                endpoint: "content/approve".into(),
                status: 503,
                message: "publishing backend unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn approve(&self, payload: &ApprovalPayload) -> Result<(), ApiError> {
        self.outcome().await?;
        self.approved.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn reject(&self) -> Result<(), ApiError> {
        self.outcome().await?;
        self.rejected.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn regenerate(&self) -> Result<(), ApiError> {
        self.outcome().await?;
        self.regenerated.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Harness {
    session: ReviewSession,
    validator: Arc<FlakyValidator>,
    publisher: Arc<RecordingPublisher>,
}

async fn harness(publisher: RecordingPublisher) -> Harness {
    gated_harness(publisher, None).await
}

async fn gated_harness(
    publisher: RecordingPublisher,
    validator_gate: Option<Arc<Semaphore>>,
) -> Harness {
    let catalog = catalog().await;
    let validator = Arc::new(FlakyValidator {
        inner: LocalValidator::new(Arc::clone(&catalog)),
        fail: AtomicBool::new(false),
        calls: AtomicUsize::new(0),
        gate: validator_gate,
    });
    let publisher = Arc::new(publisher);
    let session = ReviewSession::new(catalog, validator.clone(), publisher.clone(), QUIET);
    Harness {
        session,
        validator,
        publisher,
    }
}

#[tokio::test(start_paused = true)]
async fn initialize_seeds_known_platforms_and_validates_them() {
    let h = harness(RecordingPublisher::default()).await;
    assert_eq!(h.session.initialize(generated()).unwrap(), 2);
    h.session.settle().await;

    let state = h.session.state();
    assert!(!state.edited_content.contains_key(&key("myspace")));
    assert_eq!(state.original_content.platform_specific.len(), 3);
    assert_eq!(
        state.edited_content[&key("instagram")].hashtags.as_slice(),
        ["linen", "summer", "ootd"]
    );
    assert!(state.validation_results[&key("instagram")].valid);
    assert!(!state.validation_results[&key("twitter")].valid);
    assert_eq!(h.validator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn deselecting_the_invalid_platform_enables_approval() {
    let h = harness(RecordingPublisher::default()).await;
    h.session.initialize(generated()).unwrap();
    h.session.settle().await;

    let readiness = h.session.readiness();
    assert!(!readiness.can_approve);
    let [ApprovalBlocker::Invalid { platform, issues }] = readiness.blockers.as_slice() else {
        panic!("expected one invalid blocker, got {:?}", readiness.blockers);
    };
    assert_eq!(platform, &key("twitter"));
    assert_eq!(issues[0].field, ContentField::Description);
    assert_eq!(issues[0].current_length, Some(300));
    assert!(matches!(
        h.session.approve().await,
        Err(ReviewError::NotReady(_))
    ));

    assert!(h.session.set_platform_selected(&key("twitter"), false).unwrap());
    assert!(h.session.readiness().can_approve);

    let payload = h.session.approve().await.unwrap();
    assert_eq!(payload.keys().collect::<Vec<_>>(), vec![&key("instagram")]);
    assert_eq!(h.session.phase(), GatePhase::Closed);
    assert_eq!(h.publisher.approved.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn fixing_the_draft_enables_approval_after_quiet_period() {
    let h = harness(RecordingPublisher::default()).await;
    h.session.initialize(generated()).unwrap();
    h.session.settle().await;

    h.session
        .edit_field(
            &key("twitter"),
            FieldEdit::Description("Linen for summer.".into()),
        )
        .unwrap();
    let readiness = h.session.readiness();
    assert!(!readiness.can_approve);
    assert_eq!(
        readiness.blockers,
        vec![ApprovalBlocker::AwaitingValidation {
            platform: key("twitter")
        }]
    );

    h.session.settle().await;
    assert!(h.session.readiness().can_approve);
    let payload = h.session.approve().await.unwrap();
    assert_eq!(payload.len(), 2);
    assert_eq!(payload[&key("twitter")].description, "Linen for summer.");
}

#[tokio::test(start_paused = true)]
async fn failed_validation_keeps_previous_result_and_stays_reviewing() {
    let h = harness(RecordingPublisher::default()).await;
    h.session.initialize(generated()).unwrap();
    h.session.settle().await;
    let before = h.session.state().validation_results[&key("instagram")].clone();

    h.validator.fail.store(true, Ordering::SeqCst);
    h.session
        .edit_field(&key("instagram"), FieldEdit::Title("Linen shirt".into()))
        .unwrap();
    h.session.settle().await;

    assert_eq!(h.session.state().validation_results[&key("instagram")], before);
    assert_eq!(h.session.phase(), GatePhase::Reviewing);
    let report = h
        .session
        .reports()
        .into_iter()
        .find(|r| r.platform == key("instagram"))
        .unwrap();
    assert_eq!(report.status, ValidationStatus::Failed);
    assert!(report.error.unwrap().contains("connection reset"));

    h.validator.fail.store(false, Ordering::SeqCst);
    assert!(h.session.validate_now(&key("instagram")).await);
    assert!(h.session.state().validation_results[&key("instagram")].valid);
}

#[tokio::test(start_paused = true)]
async fn failed_submission_preserves_edits_for_retry() {
    let publisher = RecordingPublisher::default();
    publisher.fail_next.store(true, Ordering::SeqCst);
    let h = harness(publisher).await;
    h.session.initialize(generated()).unwrap();
    h.session.set_platform_selected(&key("twitter"), false).unwrap();
    h.session
        .edit_field(&key("instagram"), FieldEdit::Title("Final title".into()))
        .unwrap();
    h.session.settle().await;
    let before = h.session.state();

    let err = h.session.approve().await.unwrap_err();
    assert!(matches!(err, ReviewError::Submission(ApiError::Status { status: 503, .. })));
    assert_eq!(h.session.phase(), GatePhase::Reviewing);
    assert_eq!(h.session.state(), before);

    let payload = h.session.approve().await.unwrap();
    assert_eq!(payload[&key("instagram")].title, "Final title");
}

#[tokio::test(start_paused = true)]
async fn only_one_action_in_flight_and_edits_locked_meanwhile() {
    let gate = Arc::new(Semaphore::new(0));
    let h = harness(RecordingPublisher {
        gate: Some(Arc::clone(&gate)),
        ..RecordingPublisher::default()
    })
    .await;
    h.session.initialize(generated()).unwrap();
    h.session.settle().await;

    let (rejected, probes) = tokio::join!(h.session.reject(), async {
        tokio::task::yield_now().await;
        let phase = h.session.phase();
        let regenerate = h.session.regenerate().await;
        let edit = h
            .session
            .edit_field(&key("instagram"), FieldEdit::Title("late".into()));
        let select = h.session.set_platform_selected(&key("twitter"), false);
        gate.add_permits(1);
        (phase, regenerate, edit, select)
    });

    let (phase, regenerate, edit, select) = probes;
    assert_eq!(phase, GatePhase::Rejecting);
    assert!(matches!(regenerate, Err(ReviewError::Busy)));
    assert!(matches!(edit, Err(ReviewError::Busy)));
    assert!(matches!(select, Err(ReviewError::Busy)));
    rejected.unwrap();
    assert_eq!(h.publisher.regenerated.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn reject_discards_state_until_new_content_arrives() {
    let h = harness(RecordingPublisher::default()).await;
    h.session.initialize(generated()).unwrap();
    h.session.settle().await;

    h.session.reject().await.unwrap();
    assert_eq!(h.publisher.rejected.load(Ordering::SeqCst), 1);
    assert_eq!(h.session.phase(), GatePhase::Closed);
    assert!(h.session.state().edited_content.is_empty());
    assert!(matches!(
        h.session
            .edit_field(&key("instagram"), FieldEdit::Title("x".into())),
        Err(ReviewError::Closed)
    ));

    h.session.initialize(generated()).unwrap();
    assert_eq!(h.session.phase(), GatePhase::Reviewing);
    h.session.regenerate().await.unwrap();
    assert_eq!(h.publisher.regenerated.load(Ordering::SeqCst), 1);
}

fn twitter_only(title: &str) -> GeneratedContent {
    serde_json::from_value(json!({
        "platform_specific": {
            "twitter": {"title": title, "description": "Linen.", "hashtags": ["linen"]}
        }
    }))
    .unwrap()
}

async fn wait_for_calls(validator: &FlakyValidator, count: usize) {
    while validator.calls.load(Ordering::SeqCst) < count {
        tokio::task::yield_now().await;
    }
}

fn twitter_status(session: &ReviewSession) -> ValidationStatus {
    session
        .reports()
        .into_iter()
        .find(|r| r.platform == key("twitter"))
        .unwrap()
        .status
}

#[tokio::test(start_paused = true)]
async fn late_result_for_replaced_content_is_discarded() {
    let gate = Arc::new(Semaphore::new(0));
    let h = gated_harness(RecordingPublisher::default(), Some(Arc::clone(&gate))).await;

    h.session.initialize(twitter_only("short")).unwrap();
    wait_for_calls(&h.validator, 1).await;
    h.session.initialize(twitter_only(&"t".repeat(150))).unwrap();
    wait_for_calls(&h.validator, 2).await;

    // The semaphore is fair: the call for the replaced content finishes first.
    gate.add_permits(1);
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    assert!(h.session.state().validation_results.is_empty());
    assert_eq!(twitter_status(&h.session), ValidationStatus::Pending);
    assert!(!h.session.readiness().can_approve);

    gate.add_permits(1);
    h.session.settle().await;
    let state = h.session.state();
    let result = &state.validation_results[&key("twitter")];
    assert!(!result.valid);
    assert_eq!(result.character_counts.title, 150);
    assert_eq!(twitter_status(&h.session), ValidationStatus::Fresh);
    assert!(!h.session.readiness().can_approve);
}

#[tokio::test(start_paused = true)]
async fn loading_content_is_refused_while_an_action_is_in_flight() {
    let gate = Arc::new(Semaphore::new(0));
    let h = harness(RecordingPublisher {
        gate: Some(Arc::clone(&gate)),
        ..RecordingPublisher::default()
    })
    .await;
    h.session.initialize(generated()).unwrap();
    h.session.settle().await;

    let (rejected, reload) = tokio::join!(h.session.reject(), async {
        tokio::task::yield_now().await;
        let reload = h.session.initialize(twitter_only("second"));
        let drafts = h.session.state().edited_content.len();
        gate.add_permits(1);
        (reload, drafts)
    });

    let (reload, drafts_during) = reload;
    assert!(matches!(reload, Err(ReviewError::Busy)));
    assert_eq!(drafts_during, 2);
    rejected.unwrap();
    assert_eq!(h.session.phase(), GatePhase::Closed);

    assert_eq!(h.session.initialize(twitter_only("second")).unwrap(), 1);
    assert_eq!(h.session.phase(), GatePhase::Reviewing);
    h.session.settle().await;
    let state = h.session.state();
    assert_eq!(state.edited_content[&key("twitter")].title, "second");
    assert!(h.session.readiness().can_approve);
}

#[tokio::test(start_paused = true)]
async fn unknown_platform_operations_are_no_ops() {
    let h = harness(RecordingPublisher::default()).await;
    h.session.initialize(generated()).unwrap();
    h.session.settle().await;
    let before = h.session.state();

    assert_eq!(
        h.session
            .edit_field(&key("myspace"), FieldEdit::Title("x".into()))
            .unwrap(),
        None
    );
    assert!(!h.session.set_platform_selected(&key("myspace"), true).unwrap());
    h.session.settle().await;
    assert_eq!(h.session.state(), before);
}

#[tokio::test(start_paused = true)]
async fn hashtag_suggestions_stop_at_platform_cap_but_free_text_does_not() {
    let h = harness(RecordingPublisher::default()).await;
    h.session.initialize(generated()).unwrap();
    h.session.settle().await;

    // twitter allows three hashtags
    let twitter = key("twitter");
    assert!(h.session.add_hashtag_suggestion(&twitter, "#summer").unwrap());
    assert!(h.session.add_hashtag_suggestion(&twitter, "ootd").unwrap());
    assert!(!h.session.add_hashtag_suggestion(&twitter, "style").unwrap());

    h.session
        .edit_field(
            &twitter,
            FieldEdit::from_raw(ContentField::Hashtags, "#a, b c #d"),
        )
        .unwrap();
    h.session.settle().await;

    let state = h.session.state();
    assert_eq!(
        state.edited_content[&twitter].hashtags,
        HashtagSet::parse("a b c d")
    );
    let result = &state.validation_results[&twitter];
    let issue = result.issues_for(ContentField::Hashtags).next().unwrap();
    assert_eq!(issue.current_count, Some(4));
    assert_eq!(issue.max_count, Some(3));
}

#[tokio::test]
async fn remote_collaborator_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/platforms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "platforms": {
                "etsy": {"name": "Etsy", "type": "marketplace", "title_max_length": 100,
                         "description_max_length": 5000, "hashtag_limit": 13, "features": []}
            },
            "total_count": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/content/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "valid": false,
            "platform": "etsy",
            "issues": [{"field": "title", "issue": "Title too long",
                        "current_length": 105, "max_length": 100}],
            "character_counts": {"title": 105, "description": 4, "hashtag_count": 0}
        })))
        .mount(&server)
        .await;

    let session = SessionContext::new(&server.uri(), Some("token".into()), None);
    let client = Arc::new(HttpApiClient::new(session, 5));
    let catalog = Arc::new(
        PlatformCatalog::load(client.as_ref() as &dyn PlatformSource)
            .await
            .unwrap(),
    );

    let review = ReviewSession::new(catalog, client.clone(), client.clone(), QUIET);
    let content: GeneratedContent = serde_json::from_value(json!({
        "platform_specific": {"etsy": {"title": "t".repeat(105), "description": "Soft"}}
    }))
    .unwrap();
    review.initialize(content).unwrap();
    review.settle().await;

    let state = review.state();
    let result = &state.validation_results[&key("etsy")];
    assert!(!result.valid);
    assert_eq!(result.issues[0].current_length, Some(105));
    assert_eq!(result.issues[0].max_length, Some(100));
    assert!(!review.readiness().can_approve);
}

#[tokio::test]
async fn catalog_outage_blocks_review_setup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/platforms"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = HttpApiClient::new(SessionContext::new(&server.uri(), Some("t".into()), None), 5);
    let err = PlatformCatalog::load(&client).await.unwrap_err();
    assert!(err.is_retryable());
}
