//! Form controller tests with in-process collaborators.
//!
//! Run with: `cargo test -p gustav-forms --test controller_test`

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use gustav_api_client::{ApiClient, Auth, UploadPreparer};
use gustav_core::{
    DigestSource, FormMode, MetadataPayload, UploadError, UploadFile, UploadIntent,
    UploadOutcome, UploadPolicy, UploadResult,
};
use gustav_forms::{
    FormContext, FormController, FormSubmitter, NotificationCenter, NotificationLevel,
    PreparationState, PrepareUpload, SubmitOutcome,
};
use mockito::Matcher;
use serde_json::json;

/// Returns a canned intent response, or a canned error.
struct FakePreparer {
    response: Mutex<Result<serde_json::Value, Option<UploadError>>>,
    calls: Mutex<Vec<String>>,
}

impl FakePreparer {
    fn ok(raw: serde_json::Value) -> Self {
        Self {
            response: Mutex::new(Ok(raw)),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: UploadError) -> Self {
        Self {
            response: Mutex::new(Err(Some(err))),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PrepareUpload for FakePreparer {
    async fn prepare(
        &self,
        intent_endpoint: &str,
        file: &UploadFile,
        _policy: &UploadPolicy,
        _payload: &MetadataPayload,
    ) -> UploadResult<UploadOutcome> {
        self.calls.lock().unwrap().push(intent_endpoint.to_string());
        let mut response = self.response.lock().unwrap();
        match &mut *response {
            Ok(raw) => Ok(UploadOutcome {
                intent: UploadIntent::from_response(raw.clone(), file)?,
                digest: "a".repeat(64),
                digest_source: DigestSource::Local,
                mime: file.effective_mime().to_string(),
                size: file.size,
            }),
            Err(err) => Err(err.take().unwrap_or(UploadError::TransferTargetMissing)),
        }
    }
}

struct FakeSubmitter {
    status: Result<u16, u16>,
    posts: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeSubmitter {
    fn new() -> Self {
        Self {
            status: Ok(200),
            posts: Mutex::new(Vec::new()),
        }
    }

    fn rejecting(status: u16) -> Self {
        Self {
            status: Err(status),
            posts: Mutex::new(Vec::new()),
        }
    }

    fn posts(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl FormSubmitter for FakeSubmitter {
    async fn submit(&self, action: &str, fields: &[(String, String)]) -> UploadResult<u16> {
        self.posts
            .lock()
            .unwrap()
            .push((action.to_string(), fields.to_vec()));
        self.status
            .map_err(|status| UploadError::SubmissionFailed { status })
    }
}

fn material_form() -> FormController {
    FormController::new(
        FormContext::MaterialCreate {
            intent_url: Some("/api/materials/upload-intents".to_string()),
            policy: UploadPolicy::default(),
        },
        "/materials",
        &UploadPolicy::learning(),
    )
    .with_mode(FormMode::Upload)
}

fn learning_form() -> FormController {
    FormController::new(
        FormContext::LearningSubmission {
            course_id: "c1".to_string(),
            task_id: "t1".to_string(),
        },
        "/learning/courses/c1/tasks/t1/submissions",
        &UploadPolicy::learning(),
    )
    .with_mode(FormMode::Upload)
}

fn pdf() -> UploadFile {
    UploadFile::new("report.pdf", "application/pdf", vec![b'x'; 2048])
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn test_submit_prepares_then_posts_once() {
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "intent_id": "i1"}));
    let submitter = FakeSubmitter::new();
    let mut notifications = NotificationCenter::new();

    let mut form = material_form();
    form.set_field("title", "Week 1");
    form.select_file(Some(pdf()));
    assert_eq!(form.state(), PreparationState::Dirty);

    let outcome = form
        .submit(&preparer, &submitter, &mut notifications)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Submitted {
            status: 200,
            prepared_now: true
        }
    );
    assert_eq!(form.state(), PreparationState::Prepared);
    assert!(form.submit_enabled());
    assert_eq!(preparer.calls(), vec!["/api/materials/upload-intents"]);

    let posts = submitter.posts();
    assert_eq!(posts.len(), 1);
    let (action, fields) = &posts[0];
    assert_eq!(action, "/materials");
    assert_eq!(field(fields, "title"), Some("Week 1"));
    assert_eq!(field(fields, "intent_id"), Some("i1"));
    assert_eq!(field(fields, "mime_type"), Some("application/pdf"));
    assert_eq!(field(fields, "size_bytes"), Some("2048"));
    assert_eq!(field(fields, "sha256").map(str::len), Some(64));
}

#[tokio::test]
async fn test_prepared_form_submits_without_new_upload() {
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "intent_id": "i1"}));
    let submitter = FakeSubmitter::new();
    let mut notifications = NotificationCenter::new();

    let mut form = material_form();
    form.select_file(Some(pdf()));
    form.prepare(&preparer, &mut notifications).await.unwrap();

    let outcome = form
        .submit(&preparer, &submitter, &mut notifications)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Submitted {
            status: 200,
            prepared_now: false
        }
    );
    assert_eq!(preparer.calls().len(), 1);
    assert_eq!(submitter.posts().len(), 1);
}

#[tokio::test]
async fn test_upload_mode_without_file_is_blocked() {
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "intent_id": "i1"}));
    let submitter = FakeSubmitter::new();
    let mut notifications = NotificationCenter::new();

    let mut form = material_form();
    let err = form
        .submit(&preparer, &submitter, &mut notifications)
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::NoFileSelected));
    assert!(preparer.calls().is_empty());
    assert!(submitter.posts().is_empty());
    assert!(form.submit_enabled());

    let notice = notifications.last().unwrap();
    assert_eq!(notice.level, NotificationLevel::Error);
    assert_eq!(notice.message, "Please choose a file.");
}

#[tokio::test]
async fn test_text_mode_submits_as_is() {
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "storage_key": "k1"}));
    let submitter = FakeSubmitter::new();
    let mut notifications = NotificationCenter::new();

    let mut form = learning_form();
    form.set_mode(FormMode::parse("text"));
    form.set_field("text_body", "My answer");

    form.submit(&preparer, &submitter, &mut notifications)
        .await
        .unwrap();

    assert!(preparer.calls().is_empty());
    assert_eq!(
        submitter.posts()[0].1,
        vec![("text_body".to_string(), "My answer".to_string())]
    );
}

#[tokio::test]
async fn test_failed_preparation_blocks_submission() {
    let preparer = FakePreparer::failing(UploadError::TransferFailed { status: 500 });
    let submitter = FakeSubmitter::new();
    let mut notifications = NotificationCenter::new();

    let mut form = material_form();
    form.select_file(Some(pdf()));
    let err = form
        .submit(&preparer, &submitter, &mut notifications)
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::TransferFailed { status: 500 }));
    assert_eq!(form.state(), PreparationState::Dirty);
    assert!(form.fields().is_empty());
    assert!(form.submit_enabled());
    assert!(submitter.posts().is_empty());
    assert_eq!(
        notifications.last().unwrap().message,
        "Upload failed. Please try again."
    );
}

#[tokio::test]
async fn test_learning_form_prepares_on_file_change() {
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "storage_key": "k1"}));
    let submitter = FakeSubmitter::new();
    let mut notifications = NotificationCenter::new();

    let mut form = learning_form();
    form.handle_file_change(Some(pdf()), &preparer, &mut notifications)
        .await
        .unwrap();

    assert_eq!(form.state(), PreparationState::Prepared);
    assert_eq!(form.fields().get("storage_key"), Some("k1"));
    assert_eq!(
        preparer.calls(),
        vec!["/api/learning/courses/c1/tasks/t1/upload-intents"]
    );

    let notice = notifications.last().unwrap();
    assert_eq!(notice.level, NotificationLevel::Info);
    assert_eq!(notice.duration_ms, 2500);

    let outcome = form
        .submit(&preparer, &submitter, &mut notifications)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Submitted {
            status: 200,
            prepared_now: false
        }
    );
    assert_eq!(preparer.calls().len(), 1);
}

#[tokio::test]
async fn test_material_form_waits_for_submit() {
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "intent_id": "i1"}));
    let mut notifications = NotificationCenter::new();

    let mut form = material_form();
    form.handle_file_change(Some(pdf()), &preparer, &mut notifications)
        .await
        .unwrap();

    assert_eq!(form.state(), PreparationState::Dirty);
    assert!(preparer.calls().is_empty());
    assert!(notifications.last().is_none());
}

#[tokio::test]
async fn test_file_change_after_preparation_clears_fields() {
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "intent_id": "i1"}));
    let mut notifications = NotificationCenter::new();

    let mut form = material_form();
    form.select_file(Some(pdf()));
    form.prepare(&preparer, &mut notifications).await.unwrap();
    assert!(form.fields().is_complete());

    form.select_file(Some(UploadFile::new("b.pdf", "application/pdf", vec![1u8; 10])));
    assert_eq!(form.state(), PreparationState::Dirty);
    assert!(form.fields().is_empty());

    form.select_file(None);
    assert_eq!(form.state(), PreparationState::Idle);
}

#[tokio::test]
async fn test_intent_without_identifier_leaves_form_dirty() {
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "storage_key": "k1"}));
    let submitter = FakeSubmitter::new();
    let mut notifications = NotificationCenter::new();

    let mut form = material_form();
    form.select_file(Some(pdf()));
    let err = form
        .submit(&preparer, &submitter, &mut notifications)
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::IdentifierMissing("intent_id")));
    assert_eq!(form.state(), PreparationState::Dirty);
    assert!(form.fields().is_empty());
    assert!(submitter.posts().is_empty());
}

#[tokio::test]
async fn test_learning_form_without_ids() {
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "storage_key": "k1"}));
    let mut notifications = NotificationCenter::new();

    let mut form = FormController::new(
        FormContext::LearningSubmission {
            course_id: String::new(),
            task_id: "t1".to_string(),
        },
        "/submit",
        &UploadPolicy::learning(),
    )
    .with_mode(FormMode::Upload);

    let err = form
        .handle_file_change(Some(pdf()), &preparer, &mut notifications)
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::MissingFormContext(_)));
    assert!(preparer.calls().is_empty());
    assert_eq!(form.state(), PreparationState::Dirty);
}

#[tokio::test]
async fn test_submit_ignored_while_disabled() {
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "intent_id": "i1"}));
    let submitter = FakeSubmitter::new();
    let mut notifications = NotificationCenter::new();

    let mut form = material_form();
    form.select_file(Some(pdf()));
    form.set_submit_enabled(false);

    let outcome = form
        .submit(&preparer, &submitter, &mut notifications)
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Ignored);
    assert!(preparer.calls().is_empty());
    assert!(submitter.posts().is_empty());
}

#[tokio::test]
async fn test_rejected_submission_keeps_preparation() {
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "intent_id": "i1"}));
    let submitter = FakeSubmitter::rejecting(422);
    let mut notifications = NotificationCenter::new();

    let mut form = material_form();
    form.select_file(Some(pdf()));
    let err = form
        .submit(&preparer, &submitter, &mut notifications)
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::SubmissionFailed { status: 422 }));
    assert_eq!(form.state(), PreparationState::Prepared);
    assert!(form.submit_enabled());
    assert_eq!(
        notifications.last().unwrap().message,
        "Submission failed. Please try again."
    );
}

#[tokio::test]
async fn test_learning_report_pdf_against_server() {
    let mut server = mockito::Server::new_async().await;
    let target = format!("{}/store/x", server.url());

    let _intent = server
        .mock("POST", "/api/learning/courses/c1/tasks/t1/upload-intents")
        .with_status(200)
        .with_body(json!({"url": target, "storage_key": "k1"}).to_string())
        .create_async()
        .await;
    let _put = server
        .mock("PUT", "/store/x")
        .with_status(200)
        .create_async()
        .await;
    let submit = server
        .mock("POST", "/learning/courses/c1/tasks/t1/submissions")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("storage_key".into(), "k1".into()),
            Matcher::UrlEncoded("mime_type".into(), "application/pdf".into()),
            Matcher::UrlEncoded("size_bytes".into(), "2048".into()),
        ]))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let api = ApiClient::new(&server.url(), Auth::Anonymous, Duration::from_secs(5)).unwrap();
    let preparer = UploadPreparer::new(api.clone(), "sha256");
    let mut notifications = NotificationCenter::new();

    let mut form = learning_form();
    form.handle_file_change(Some(pdf()), &preparer, &mut notifications)
        .await
        .unwrap();
    assert_eq!(form.state(), PreparationState::Prepared);
    assert_eq!(form.fields().get("sha256").map(str::len), Some(64));

    let outcome = form
        .submit(&preparer, &api, &mut notifications)
        .await
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Submitted { .. }));
    submit.assert_async().await;
}

/// Never completes, like a stalled intent request.
struct StalledPreparer;

#[async_trait]
impl PrepareUpload for StalledPreparer {
    async fn prepare(
        &self,
        _intent_endpoint: &str,
        _file: &UploadFile,
        _policy: &UploadPolicy,
        _payload: &MetadataPayload,
    ) -> UploadResult<UploadOutcome> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_cancelled_submit_re_enables_control() {
    let submitter = FakeSubmitter::new();
    let mut notifications = NotificationCenter::new();

    let mut form = material_form();
    form.select_file(Some(pdf()));

    let timed_out = tokio::time::timeout(
        Duration::from_millis(50),
        form.submit(&StalledPreparer, &submitter, &mut notifications),
    )
    .await
    .is_err();

    assert!(timed_out);
    assert!(form.submit_enabled());
    assert!(submitter.posts().is_empty());

    // A later submit is handled rather than ignored.
    let preparer = FakePreparer::ok(json!({"url": "https://s/x", "intent_id": "i1"}));
    let outcome = form
        .submit(&preparer, &submitter, &mut notifications)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Submitted {
            status: 200,
            prepared_now: true
        }
    );
}
