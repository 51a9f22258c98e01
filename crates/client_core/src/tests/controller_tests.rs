use super::*;
use crate::{
    api::MutationReceipt,
    error::ClientError,
    view::{ListArea, StatusMessage, LOAD_FAILED_MESSAGE},
};
use shared::domain::Activity;
use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
};
use tokio::sync::Mutex;

fn activity(max: u32, participants: &[&str]) -> Activity {
    Activity {
        description: "d".into(),
        schedule: "Mon".into(),
        max_participants: max,
        participants: participants.iter().map(|p| p.to_string()).collect(),
    }
}

fn chess_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.insert("Chess Club".into(), activity(2, &["a@x.com"]));
    catalog.insert("Drama".into(), activity(4, &[]));
    catalog
}

fn rejected(status: u16, detail: Option<&str>) -> ClientError {
    ClientError::Rejected {
        status,
        detail: detail.map(str::to_string),
    }
}

fn malformed() -> ClientError {
    ClientError::Malformed(serde_json::from_str::<u8>("<html>").expect_err("not json"))
}

/// Serves `catalog` on every fetch unless a failure is queued. Mutations
/// answer from their queues, defaulting to an empty receipt.
#[derive(Default)]
struct ScriptedApi {
    catalog: Mutex<Catalog>,
    fetch_failures: Mutex<VecDeque<ClientError>>,
    signup_results: Mutex<VecDeque<Result<MutationReceipt, ClientError>>>,
    unregister_results: Mutex<VecDeque<Result<MutationReceipt, ClientError>>>,
    fetch_calls: AtomicUsize,
    signup_requests: Mutex<Vec<SignupRequest>>,
    unregister_requests: Mutex<Vec<UnregisterRequest>>,
}

impl ScriptedApi {
    fn serving(catalog: Catalog) -> Self {
        Self {
            catalog: Mutex::new(catalog),
            ..Self::default()
        }
    }

    fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivityApi for ScriptedApi {
    async fn fetch_activities(&self) -> Result<Catalog, ClientError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fetch_failures.lock().await.pop_front() {
            return Err(err);
        }
        Ok(self.catalog.lock().await.clone())
    }

    async fn signup(&self, request: &SignupRequest) -> Result<MutationReceipt, ClientError> {
        self.signup_requests.lock().await.push(request.clone());
        self.signup_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(MutationReceipt::default()))
    }

    async fn unregister(
        &self,
        request: &UnregisterRequest,
    ) -> Result<MutationReceipt, ClientError> {
        self.unregister_requests.lock().await.push(request.clone());
        self.unregister_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(MutationReceipt::default()))
    }
}

struct RecordingDialogs {
    answer: bool,
    confirms: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl RecordingDialogs {
    fn answering(answer: bool) -> Self {
        Self {
            answer,
            confirms: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Dialogs for RecordingDialogs {
    async fn confirm(&self, message: &str) -> bool {
        self.confirms.lock().await.push(message.to_string());
        self.answer
    }

    async fn alert(&self, message: &str) {
        self.alerts.lock().await.push(message.to_string());
    }
}

async fn loaded_board(answer: bool) -> BoardController<ScriptedApi, RecordingDialogs> {
    let mut board = BoardController::new(
        ScriptedApi::serving(chess_catalog()),
        RecordingDialogs::answering(answer),
    );
    board.fetch_activities().await;
    board
}

fn chess_affordance() -> DeleteAffordance {
    DeleteAffordance {
        activity: "Chess Club".into(),
        email: "a@x.com".into(),
    }
}

#[tokio::test]
async fn starts_idle_with_loading_placeholder() {
    let board = BoardController::new(ScriptedApi::default(), RecordingDialogs::answering(true));
    assert_eq!(board.load_state(), LoadState::Idle);
    assert_eq!(board.view().list, ListArea::Loading);
    assert!(board.catalog().is_none());
}

#[tokio::test]
async fn fetch_renders_one_card_and_option_per_activity() {
    let board = loaded_board(true).await;

    assert_eq!(board.load_state(), LoadState::Rendered);
    let view = board.view();
    assert_eq!(view.cards().len(), 2);
    assert_eq!(view.selector.options.len(), 2);

    let chess = view.card("Chess Club").expect("chess card");
    assert_eq!(chess.spots_left, 1);
    assert_eq!(chess.delete_affordances(), &[chess_affordance()]);

    let drama = view.card("Drama").expect("drama card");
    assert!(drama.delete_affordances().is_empty());
    assert_eq!(board.catalog().map(|c| c.len()), Some(2));
}

#[tokio::test]
async fn repeated_fetch_of_unchanged_catalog_is_idempotent() {
    let mut board = loaded_board(true).await;
    let first = board.view().clone();

    board.fetch_activities().await;
    assert_eq!(board.view(), &first);
    assert_eq!(board.api().fetch_calls(), 2);
}

#[tokio::test]
async fn fetch_failure_replaces_list_and_leaves_selector() {
    let mut board = loaded_board(true).await;
    assert!(board.select_activity("Drama"));
    board
        .api()
        .fetch_failures
        .lock()
        .await
        .push_back(malformed());

    board.fetch_activities().await;

    assert_eq!(board.load_state(), LoadState::LoadFailed);
    assert_eq!(
        board.view().list,
        ListArea::Failed(LOAD_FAILED_MESSAGE.to_string())
    );
    assert_eq!(board.view().selector.options.len(), 2);
    assert_eq!(board.view().selector.selected.as_deref(), Some("Drama"));
    assert!(board.catalog().is_none());
}

#[tokio::test]
async fn rejected_signup_shows_detail_without_reload() {
    let mut board = loaded_board(true).await;
    board
        .api()
        .signup_results
        .lock()
        .await
        .push_back(Err(rejected(400, Some("Already signed up"))));
    board.set_email("a@x.com");
    assert!(board.select_activity("Chess Club"));

    let outcome = board.submit_signup().await;

    assert_eq!(outcome, SignupOutcome::Rejected);
    assert_eq!(
        board.view().message,
        Some(StatusMessage {
            text: "Already signed up".into(),
            kind: StatusKind::Error,
        })
    );
    assert_eq!(board.view().selector.selected.as_deref(), Some("Chess Club"));
    assert_eq!(board.view().email, "a@x.com");
    assert_eq!(board.api().fetch_calls(), 1);
}

#[tokio::test]
async fn rejected_signup_without_detail_uses_fallback() {
    let mut board = loaded_board(true).await;
    board
        .api()
        .signup_results
        .lock()
        .await
        .push_back(Err(rejected(500, None)));
    board.set_email("b@x.com");
    board.select_activity("Drama");

    assert_eq!(board.submit_signup().await, SignupOutcome::Rejected);
    let message = board.view().message.clone().expect("message");
    assert_eq!(message.text, "An error occurred");
    assert_eq!(message.kind.class_name(), "error");
}

#[tokio::test]
async fn successful_signup_reports_resets_form_and_reloads_once() {
    let mut board = loaded_board(true).await;
    board
        .api()
        .signup_results
        .lock()
        .await
        .push_back(Ok(MutationReceipt {
            message: Some("Signed up b@x.com for Drama".into()),
        }));
    board.set_email("b@x.com");
    board.select_activity("Drama");

    assert_eq!(board.submit_signup().await, SignupOutcome::SignedUp);

    let requests = board.api().signup_requests.lock().await.clone();
    assert_eq!(
        requests,
        vec![SignupRequest {
            email: "b@x.com".into(),
            activity: "Drama".into(),
        }]
    );
    assert_eq!(
        board.view().message,
        Some(StatusMessage {
            text: "Signed up b@x.com for Drama".into(),
            kind: StatusKind::Success,
        })
    );
    assert!(board.view().email.is_empty());
    assert_eq!(board.view().selector.selected, None);
    assert_eq!(board.api().fetch_calls(), 2);
}

#[tokio::test]
async fn signup_network_failure_shows_generic_error() {
    let mut board = loaded_board(true).await;
    board
        .api()
        .signup_results
        .lock()
        .await
        .push_back(Err(malformed()));
    board.set_email("b@x.com");
    board.select_activity("Drama");

    assert_eq!(board.submit_signup().await, SignupOutcome::NetworkFailure);
    let message = board.view().message.clone().expect("message");
    assert_eq!(message.text, "Failed to sign up. Please try again.");
    assert_eq!(message.kind, StatusKind::Error);
}

#[tokio::test]
async fn signup_failure_with_non_json_body_shows_retry_message() {
    let mut board = loaded_board(true).await;
    board
        .api()
        .signup_results
        .lock()
        .await
        .push_back(Err(ClientError::UnreadableRejection { status: 502 }));
    board.set_email("b@x.com");
    board.select_activity("Drama");

    assert_eq!(board.submit_signup().await, SignupOutcome::NetworkFailure);
    let message = board.view().message.clone().expect("message");
    assert_eq!(message.text, "Failed to sign up. Please try again.");
    assert_eq!(message.kind, StatusKind::Error);
    assert_eq!(board.view().selector.selected.as_deref(), Some("Drama"));
    assert_eq!(board.api().fetch_calls(), 1);
}

#[tokio::test]
async fn status_message_is_overwritten_per_attempt() {
    let mut board = loaded_board(true).await;
    {
        let mut results = board.api().signup_results.lock().await;
        results.push_back(Err(rejected(400, Some("Activity is full"))));
        results.push_back(Ok(MutationReceipt::default()));
    }
    board.set_email("b@x.com");
    board.select_activity("Drama");
    board.submit_signup().await;

    board.set_email("c@x.com");
    board.select_activity("Drama");
    board.submit_signup().await;

    let message = board.view().message.clone().expect("message");
    assert_eq!(message.text, "Signed up successfully");
    assert_eq!(message.kind, StatusKind::Success);
}

#[tokio::test]
async fn incomplete_form_sends_nothing() {
    let mut board = loaded_board(true).await;
    board.set_email("b@x.com");
    assert_eq!(board.submit_signup().await, SignupOutcome::Incomplete);

    board.set_email("");
    board.select_activity("Drama");
    assert_eq!(board.submit_signup().await, SignupOutcome::Incomplete);

    assert!(board.api().signup_requests.lock().await.is_empty());
    assert_eq!(board.view().message, None);
}

#[tokio::test]
async fn confirmed_unregister_reloads_once_without_alert() {
    let mut board = loaded_board(true).await;

    let outcome = board.delete_participant(&chess_affordance()).await;

    assert_eq!(outcome, UnregisterOutcome::Unregistered);
    assert_eq!(board.api().fetch_calls(), 2);
    assert_eq!(
        board.dialogs().confirms.lock().await.clone(),
        vec!["Are you sure you want to unregister a@x.com from Chess Club?".to_string()]
    );
    assert!(board.dialogs().alerts.lock().await.is_empty());
    assert_eq!(
        board.api().unregister_requests.lock().await.clone(),
        vec![UnregisterRequest {
            email: "a@x.com".into(),
            activity: "Chess Club".into(),
        }]
    );
}

#[tokio::test]
async fn declined_unregister_sends_nothing() {
    let mut board = loaded_board(false).await;

    let outcome = board.delete_participant(&chess_affordance()).await;

    assert_eq!(outcome, UnregisterOutcome::Declined);
    assert!(board.api().unregister_requests.lock().await.is_empty());
    assert_eq!(board.api().fetch_calls(), 1);
}

#[tokio::test]
async fn rejected_unregister_alerts_detail_or_fallback() {
    let mut board = loaded_board(true).await;
    {
        let mut results = board.api().unregister_results.lock().await;
        results.push_back(Err(rejected(400, Some("Participant not found in this activity"))));
        results.push_back(Err(rejected(502, None)));
        results.push_back(Err(ClientError::UnreadableRejection { status: 500 }));
        results.push_back(Err(malformed()));
    }

    assert_eq!(
        board.delete_participant(&chess_affordance()).await,
        UnregisterOutcome::Rejected
    );
    assert_eq!(
        board.delete_participant(&chess_affordance()).await,
        UnregisterOutcome::Rejected
    );
    assert_eq!(
        board.delete_participant(&chess_affordance()).await,
        UnregisterOutcome::Rejected
    );
    assert_eq!(
        board.delete_participant(&chess_affordance()).await,
        UnregisterOutcome::NetworkFailure
    );

    assert_eq!(
        board.dialogs().alerts.lock().await.clone(),
        vec![
            "Participant not found in this activity".to_string(),
            "Failed to unregister participant".to_string(),
            "Failed to unregister participant".to_string(),
            "Failed to unregister participant. Please try again.".to_string(),
        ]
    );
    assert_eq!(board.api().fetch_calls(), 1);
}

#[tokio::test]
async fn affordance_from_previous_render_is_stale() {
    let mut board = loaded_board(true).await;
    *board.api().catalog.lock().await = {
        let mut catalog = Catalog::new();
        catalog.insert("Chess Club".into(), activity(2, &[]));
        catalog
    };
    board.fetch_activities().await;

    let outcome = board.delete_participant(&chess_affordance()).await;

    assert_eq!(outcome, UnregisterOutcome::Stale);
    assert!(board.dialogs().confirms.lock().await.is_empty());
}
