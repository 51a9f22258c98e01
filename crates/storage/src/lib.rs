use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::info;

use shared::domain::{Activity, Catalog};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddParticipantOutcome {
    Added,
    ActivityMissing,
    AlreadyRegistered,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveParticipantOutcome {
    Removed,
    ActivityMissing,
    NotRegistered,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // Every connection to `sqlite::memory:` opens its own empty database,
        // so an in-memory store must live on exactly one long-lived connection.
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn count_activities(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activities")
            .fetch_one(&self.pool)
            .await
            .context("failed to count activities")?;
        Ok(count)
    }

    /// Full catalog in insertion order, each roster in signup order.
    pub async fn list_activities(&self) -> Result<Catalog> {
        let rows = sqlx::query(
            "SELECT name, description, schedule, max_participants
             FROM activities
             ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list activities")?;

        let mut catalog = Catalog::with_capacity(rows.len());
        for row in rows {
            let name: String = row.get(0);
            let max_participants: i64 = row.get(3);
            catalog.insert(
                name,
                Activity {
                    description: row.get(1),
                    schedule: row.get(2),
                    max_participants: u32::try_from(max_participants).unwrap_or_default(),
                    participants: Vec::new(),
                },
            );
        }

        let participant_rows = sqlx::query(
            "SELECT activity_name, email
             FROM participants
             ORDER BY participant_id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list participants")?;
        for row in participant_rows {
            let activity_name: String = row.get(0);
            if let Some(activity) = catalog.get_mut(&activity_name) {
                activity.participants.push(row.get(1));
            }
        }

        Ok(catalog)
    }

    pub async fn get_activity(&self, name: &str) -> Result<Option<Activity>> {
        let Some(row) = sqlx::query(
            "SELECT description, schedule, max_participants FROM activities WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let participants = sqlx::query_scalar::<_, String>(
            "SELECT email FROM participants WHERE activity_name = ? ORDER BY participant_id",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        let max_participants: i64 = row.get(2);
        Ok(Some(Activity {
            description: row.get(0),
            schedule: row.get(1),
            max_participants: u32::try_from(max_participants).unwrap_or_default(),
            participants,
        }))
    }

    pub async fn insert_activity(&self, name: &str, activity: &Activity) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO activities (name, description, schedule, max_participants)
             VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(&activity.description)
        .bind(&activity.schedule)
        .bind(i64::from(activity.max_participants))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to insert activity '{name}'"))?;

        for email in &activity.participants {
            sqlx::query("INSERT INTO participants (activity_name, email) VALUES (?, ?)")
                .bind(name)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Appends `email` to the roster unless the activity is unknown, the email
    /// is already present, or the roster has reached capacity. The checks and
    /// the insert are one statement; concurrent signups queue on the write lock.
    pub async fn add_participant(
        &self,
        activity_name: &str,
        email: &str,
    ) -> Result<AddParticipantOutcome> {
        let inserted = sqlx::query(
            "INSERT INTO participants (activity_name, email)
             SELECT a.name, ?2
             FROM activities a
             WHERE a.name = ?1
               AND NOT EXISTS (
                   SELECT 1 FROM participants p
                   WHERE p.activity_name = ?1 AND p.email = ?2
               )
               AND (SELECT COUNT(*) FROM participants p WHERE p.activity_name = ?1)
                   < a.max_participants",
        )
        .bind(activity_name)
        .bind(email)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to add participant to '{activity_name}'"))?
        .rows_affected();
        if inserted > 0 {
            return Ok(AddParticipantOutcome::Added);
        }

        let row = sqlx::query(
            "SELECT EXISTS (
                 SELECT 1 FROM participants WHERE activity_name = ?1 AND email = ?2
             )
             FROM activities
             WHERE name = ?1",
        )
        .bind(activity_name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to classify rejected signup for '{activity_name}'"))?;
        Ok(match row {
            None => AddParticipantOutcome::ActivityMissing,
            Some(row) if row.get::<i64, _>(0) != 0 => AddParticipantOutcome::AlreadyRegistered,
            Some(_) => AddParticipantOutcome::Full,
        })
    }

    /// Removes every roster entry for `email` in the activity.
    pub async fn remove_participant(
        &self,
        activity_name: &str,
        email: &str,
    ) -> Result<RemoveParticipantOutcome> {
        let removed = sqlx::query("DELETE FROM participants WHERE activity_name = ? AND email = ?")
            .bind(activity_name)
            .bind(email)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to remove participant from '{activity_name}'"))?
            .rows_affected();
        if removed > 0 {
            return Ok(RemoveParticipantOutcome::Removed);
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM activities WHERE name = ?")
            .bind(activity_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(match exists {
            None => RemoveParticipantOutcome::ActivityMissing,
            Some(_) => RemoveParticipantOutcome::NotRegistered,
        })
    }

    pub async fn clear_activities(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM participants")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM activities")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("cleared activity store");
        Ok(())
    }

    /// Inserts every seed entry in catalog order. Returns the number inserted.
    pub async fn populate(&self, seed: &Catalog) -> Result<usize> {
        for (name, activity) in seed {
            self.insert_activity(name, activity).await?;
        }
        Ok(seed.len())
    }
}

/// Reads a seed catalog: the same JSON shape `GET /activities` returns.
pub fn read_seed_file(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
    let catalog: Catalog = serde_json::from_str(&raw)
        .with_context(|| format!("seed file '{}' is not a valid catalog", path.display()))?;
    Ok(catalog)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_in_memory(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
