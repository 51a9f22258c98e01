//! HTTP access to the activity endpoints.

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::Catalog,
    error::ErrorBody,
    protocol::{activities_route, EmailRequest, MessageResponse, SignupRequest, UnregisterRequest},
};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

/// What a successful mutation returned. The body is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationReceipt {
    pub message: Option<String>,
}

#[async_trait]
pub trait ActivityApi: Send + Sync {
    async fn fetch_activities(&self) -> Result<Catalog, ClientError>;
    async fn signup(&self, request: &SignupRequest) -> Result<MutationReceipt, ClientError>;
    async fn unregister(&self, request: &UnregisterRequest)
        -> Result<MutationReceipt, ClientError>;
}

pub struct HttpActivityApi {
    http: Client,
    base: Url,
}

impl HttpActivityApi {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(server_url)?;
        if base.cannot_be_a_base() {
            return Err(ClientError::CannotBeABase(server_url.to_string()));
        }
        Ok(Self { http, base })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::CannotBeABase(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `/activities/{name}/{action}`; the name is encoded as one path segment.
    pub fn activity_action_url(&self, activity: &str, action: &str) -> Result<Url, ClientError> {
        let collection = activities_route().trim_start_matches('/');
        self.endpoint([collection, activity, action])
    }

    async fn post_email(
        &self,
        activity: &str,
        action: &str,
        email: &str,
    ) -> Result<MutationReceipt, ClientError> {
        let url = self.activity_action_url(activity, action)?;
        debug!(%url, "posting {action}");
        let res = self
            .http
            .post(url)
            .json(&EmailRequest {
                email: email.to_string(),
            })
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        let message = res
            .json::<MessageResponse>()
            .await
            .ok()
            .map(|body| body.message);
        Ok(MutationReceipt { message })
    }
}

#[async_trait]
impl ActivityApi for HttpActivityApi {
    async fn fetch_activities(&self) -> Result<Catalog, ClientError> {
        let url = self.endpoint([activities_route().trim_start_matches('/')])?;
        let res = self.http.get(url).send().await?;
        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        let bytes = res.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn signup(&self, request: &SignupRequest) -> Result<MutationReceipt, ClientError> {
        self.post_email(&request.activity, "signup", &request.email)
            .await
    }

    async fn unregister(
        &self,
        request: &UnregisterRequest,
    ) -> Result<MutationReceipt, ClientError> {
        self.post_email(&request.activity, "unregister", &request.email)
            .await
    }
}

/// Builds the rejection for a non-success response. A JSON body without a
/// string `detail` yields no detail; a body that is not JSON at all is
/// reported separately.
async fn rejection(res: Response) -> ClientError {
    let status = res.status().as_u16();
    let Ok(bytes) = res.bytes().await else {
        return ClientError::UnreadableRejection { status };
    };
    match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(body) => ClientError::Rejected {
            status,
            detail: serde_json::from_value::<ErrorBody>(body)
                .ok()
                .map(|body| body.detail),
        },
        Err(_) => ClientError::UnreadableRejection { status },
    }
}
