use serde::{Deserialize, Serialize};

/// Body of both the signup and unregister calls; the activity travels in the
/// URL path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbStatus {
    pub activities_count: i64,
    pub connection_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub email: String,
    pub activity: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnregisterRequest {
    pub email: String,
    pub activity: String,
}

pub fn activities_route() -> &'static str {
    "/activities"
}
