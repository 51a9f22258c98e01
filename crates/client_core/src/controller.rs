//! Board controller: fetch-and-render, signup submission, participant removal.
//!
//! Every successful mutation is followed by a full reload. Nothing is updated
//! locally ahead of the server.

use async_trait::async_trait;
use shared::{
    domain::Catalog,
    protocol::{SignupRequest, UnregisterRequest},
};
use tracing::{debug, error, info};

use crate::{
    api::ActivityApi,
    error::ClientError,
    view::{BoardView, DeleteAffordance, StatusKind},
};

const SIGNUP_SUCCESS_FALLBACK: &str = "Signed up successfully";
const SIGNUP_REJECTED_FALLBACK: &str = "An error occurred";
const SIGNUP_NETWORK_FAILURE: &str = "Failed to sign up. Please try again.";
const UNREGISTER_REJECTED_FALLBACK: &str = "Failed to unregister participant";
const UNREGISTER_NETWORK_FAILURE: &str = "Failed to unregister participant. Please try again.";

/// Modal prompts. Each call completes before the controller moves on, so a
/// confirmation always precedes its request and the request its reload.
#[async_trait]
pub trait Dialogs: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
    async fn alert(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Rendered,
    LoadFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Email empty or no activity selected; the form refuses to submit.
    Incomplete,
    SignedUp,
    Rejected,
    NetworkFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnregisterOutcome {
    /// The affordance is not part of the current render pass.
    Stale,
    Declined,
    Unregistered,
    Rejected,
    NetworkFailure,
}

pub fn unregister_confirmation(affordance: &DeleteAffordance) -> String {
    format!(
        "Are you sure you want to unregister {} from {}?",
        affordance.email, affordance.activity
    )
}

pub struct BoardController<A, D> {
    api: A,
    dialogs: D,
    view: BoardView,
    catalog: Option<Catalog>,
    state: LoadState,
}

impl<A: ActivityApi, D: Dialogs> BoardController<A, D> {
    pub fn new(api: A, dialogs: D) -> Self {
        Self {
            api,
            dialogs,
            view: BoardView::default(),
            catalog: None,
            state: LoadState::Idle,
        }
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.view.email = email.into();
    }

    /// Chooses a selector option. Returns false when no option has that value.
    pub fn select_activity(&mut self, activity: &str) -> bool {
        self.view.selector.select(activity)
    }

    /// Fetches the catalog and re-renders the list and selector from it. On
    /// failure the list shows the failure text and the selector is untouched.
    pub async fn fetch_activities(&mut self) {
        self.state = LoadState::Loading;
        match self.api.fetch_activities().await {
            Ok(catalog) => {
                self.view.render_catalog(&catalog);
                debug!(activities = catalog.len(), "rendered catalog");
                self.catalog = Some(catalog);
                self.state = LoadState::Rendered;
            }
            Err(err) => {
                error!(error = %err, "error fetching activities");
                self.view.render_load_failure();
                self.catalog = None;
                self.state = LoadState::LoadFailed;
            }
        }
    }

    /// Submits the form with the email and selection as they are right now. A
    /// failure body that is not JSON counts as a failed attempt, not as a
    /// rejection with a missing detail.
    pub async fn submit_signup(&mut self) -> SignupOutcome {
        let Some(activity) = self.view.selector.selected.clone() else {
            return SignupOutcome::Incomplete;
        };
        if self.view.email.is_empty() {
            return SignupOutcome::Incomplete;
        }
        let request = SignupRequest {
            email: self.view.email.clone(),
            activity,
        };

        match self.api.signup(&request).await {
            Ok(receipt) => {
                info!(activity = %request.activity, email = %request.email, "signed up");
                let text = receipt
                    .message
                    .unwrap_or_else(|| SIGNUP_SUCCESS_FALLBACK.to_string());
                self.view.show_message(text, StatusKind::Success);
                self.view.reset_form();
                self.fetch_activities().await;
                SignupOutcome::SignedUp
            }
            Err(ClientError::Rejected { detail, .. }) => {
                let text = detail.unwrap_or_else(|| SIGNUP_REJECTED_FALLBACK.to_string());
                self.view.show_message(text, StatusKind::Error);
                SignupOutcome::Rejected
            }
            Err(err) => {
                error!(error = %err, "error signing up");
                self.view
                    .show_message(SIGNUP_NETWORK_FAILURE, StatusKind::Error);
                SignupOutcome::NetworkFailure
            }
        }
    }

    /// Runs the delete control: confirm, request, then reload on success.
    pub async fn delete_participant(&mut self, affordance: &DeleteAffordance) -> UnregisterOutcome {
        if !self.view.is_live(affordance) {
            return UnregisterOutcome::Stale;
        }
        if !self
            .dialogs
            .confirm(&unregister_confirmation(affordance))
            .await
        {
            return UnregisterOutcome::Declined;
        }

        let request = UnregisterRequest {
            email: affordance.email.clone(),
            activity: affordance.activity.clone(),
        };
        match self.api.unregister(&request).await {
            Ok(_) => {
                info!(activity = %request.activity, email = %request.email, "unregistered");
                self.fetch_activities().await;
                UnregisterOutcome::Unregistered
            }
            Err(err) if err.is_rejection() => {
                let text = err.detail().unwrap_or(UNREGISTER_REJECTED_FALLBACK);
                self.dialogs.alert(text).await;
                UnregisterOutcome::Rejected
            }
            Err(err) => {
                error!(error = %err, "error unregistering participant");
                self.dialogs.alert(UNREGISTER_NETWORK_FAILURE).await;
                UnregisterOutcome::NetworkFailure
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
