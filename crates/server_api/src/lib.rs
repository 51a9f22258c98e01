use shared::{
    domain::Catalog,
    error::{ApiError, ErrorCode},
    protocol::{DbStatus, MessageResponse},
};
use storage::{AddParticipantOutcome, RemoveParticipantOutcome, Storage};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Store already held activities; nothing written.
    Kept { existing: i64 },
    /// Store was empty (or wiped) and has been filled from the seed.
    Populated { inserted: usize, wiped: bool },
}

pub async fn list_activities(ctx: &ApiContext) -> Result<Catalog, ApiError> {
    ctx.storage.list_activities().await.map_err(internal)
}

pub async fn signup_for_activity(
    ctx: &ApiContext,
    activity_name: &str,
    email: &str,
) -> Result<MessageResponse, ApiError> {
    let outcome = ctx
        .storage
        .add_participant(activity_name, email)
        .await
        .map_err(internal)?;
    match outcome {
        AddParticipantOutcome::Added => {
            info!(activity = %activity_name, %email, "participant signed up");
            Ok(MessageResponse {
                message: format!("Signed up {email} for {activity_name}"),
            })
        }
        AddParticipantOutcome::ActivityMissing => Err(activity_not_found()),
        AddParticipantOutcome::AlreadyRegistered => Err(ApiError::new(
            ErrorCode::Conflict,
            "Already signed up for this activity",
        )),
        AddParticipantOutcome::Full => Err(ApiError::new(ErrorCode::Conflict, "Activity is full")),
    }
}

pub async fn unregister_participant(
    ctx: &ApiContext,
    activity_name: &str,
    email: &str,
) -> Result<MessageResponse, ApiError> {
    let outcome = ctx
        .storage
        .remove_participant(activity_name, email)
        .await
        .map_err(internal)?;
    match outcome {
        RemoveParticipantOutcome::Removed => {
            info!(activity = %activity_name, %email, "participant unregistered");
            Ok(MessageResponse {
                message: format!("Unregistered {email} from {activity_name}"),
            })
        }
        RemoveParticipantOutcome::ActivityMissing => Err(activity_not_found()),
        RemoveParticipantOutcome::NotRegistered => Err(ApiError::new(
            ErrorCode::Conflict,
            "Participant not found in this activity",
        )),
    }
}

pub async fn health_check(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.storage.health_check().await.map_err(internal)
}

pub async fn db_status(ctx: &ApiContext) -> Result<DbStatus, ApiError> {
    let count = ctx.storage.count_activities().await.map_err(internal)?;
    Ok(DbStatus {
        activities_count: count,
        connection_status: "Connected".to_string(),
    })
}

/// Brings the store to a usable state at startup. A store holding more than
/// `duplicate_threshold` activities is assumed to carry duplicate seed runs
/// and is wiped; an empty store is filled from `seed`.
pub async fn seed_activities(
    ctx: &ApiContext,
    seed: &Catalog,
    duplicate_threshold: i64,
) -> anyhow::Result<SeedOutcome> {
    let mut count = ctx.storage.count_activities().await?;
    info!(count, "found existing activities in the database");

    let mut wiped = false;
    if count > duplicate_threshold {
        warn!(
            count,
            duplicate_threshold, "detected possible duplicates, clearing activities"
        );
        ctx.storage.clear_activities().await?;
        wiped = true;
        count = 0;
    }

    if count > 0 {
        return Ok(SeedOutcome::Kept { existing: count });
    }

    info!(activities = seed.len(), "populating database with initial activities");
    let inserted = ctx.storage.populate(seed).await?;
    Ok(SeedOutcome::Populated { inserted, wiped })
}

fn activity_not_found() -> ApiError {
    ApiError::new(ErrorCode::NotFound, "Activity not found")
}

fn internal(err: anyhow::Error) -> ApiError {
    error!(error = ?err, "storage operation failed");
    ApiError::new(ErrorCode::Internal, "Internal server error")
}
