/// Roadmap model and database operations
///
/// A roadmap is an ordered list of phases, each holding ordered modules. The
/// phase tree is stored as a single JSONB column so the document round-trips
/// exactly as the client and the generator produce it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roadmaps (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     role VARCHAR(255) NOT NULL,
///     description TEXT,
///     phases JSONB NOT NULL DEFAULT '[]',
///     status VARCHAR(16) NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Reads are ownership-checked in the request handlers through
/// [`crate::auth::authorization::require_owner`]. Progress updates check the
/// owner themselves because they hold the row lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::auth::authorization::{AuthzError, Owned};
use crate::models::user::{User, UserStats};

const ROADMAP_COLUMNS: &str =
    "id, user_id, title, role, description, phases, status, created_at, updated_at";

/// Roadmap lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadmapStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

impl RoadmapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadmapStatus::Active => "active",
            RoadmapStatus::Completed => "completed",
            RoadmapStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for RoadmapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown roadmap status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for RoadmapStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RoadmapStatus::Active),
            "completed" => Ok(RoadmapStatus::Completed),
            "archived" => Ok(RoadmapStatus::Archived),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for RoadmapStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Kind of learning material a module points at
///
/// Any value not in the known set deserializes as [`ModuleType::Article`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum ModuleType {
    Video,
    #[default]
    Article,
    Quiz,
    Project,
    VoiceInteraction,
}

impl From<String> for ModuleType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "video" => ModuleType::Video,
            "quiz" => ModuleType::Quiz,
            "project" => ModuleType::Project,
            "voice-interaction" => ModuleType::VoiceInteraction,
            _ => ModuleType::Article,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub correct_answer: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: ModuleType,

    /// Link to a video or external resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,

    /// Markdown body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Free-form, e.g. "15 mins"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub modules: Vec<Module>,
}

/// Roadmap row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub role: String,
    pub description: Option<String>,
    pub phases: Json<Vec<Phase>>,
    #[sqlx(try_from = "String")]
    pub status: RoadmapStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Roadmap {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// Input for saving a roadmap
///
/// Accepts generator output directly: unknown fields are ignored, but a
/// document missing `title`, `role` or a phase/module `title` is rejected.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoadmap {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, max = 255, message = "Role is required"))]
    pub role: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub phases: Vec<Phase>,
}

/// Failure to address a module inside a roadmap
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("Phase {0} does not exist")]
    PhaseNotFound(usize),

    #[error("Module {module} does not exist in phase {phase}")]
    ModuleNotFound { phase: usize, module: usize },
}

/// Result of toggling a module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressChange {
    /// The module went from incomplete to complete
    pub newly_completed: bool,

    /// Roadmap status after the change
    pub status: RoadmapStatus,
}

/// Failure of [`Roadmap::update_module_progress`]
#[derive(Debug, Error)]
pub enum ProgressUpdateError {
    #[error("Roadmap not found")]
    NotFound,

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Committed result of a progress update
#[derive(Debug)]
pub struct ModuleProgress {
    pub roadmap: Roadmap,
    pub change: ProgressChange,

    /// Owner's stats after the XP award, `None` when nothing was awarded
    pub stats: Option<UserStats>,
}

impl Roadmap {
    /// (completed, total) module counts
    pub fn progress(&self) -> (usize, usize) {
        let modules = self.phases.iter().flat_map(|p| p.modules.iter());
        let (done, total) = modules.fold((0, 0), |(done, total), m| {
            (done + usize::from(m.completed), total + 1)
        });
        (done, total)
    }

    /// Sets a module's completion flag and recomputes the status
    ///
    /// The roadmap becomes `completed` once every module is done and goes back
    /// to `active` when one is reopened. Archived roadmaps keep their status.
    pub fn set_module_completed(
        &mut self,
        phase: usize,
        module: usize,
        completed: bool,
    ) -> Result<ProgressChange, ProgressError> {
        let target = self
            .phases
            .get_mut(phase)
            .ok_or(ProgressError::PhaseNotFound(phase))?
            .modules
            .get_mut(module)
            .ok_or(ProgressError::ModuleNotFound { phase, module })?;

        let newly_completed = completed && !target.completed;
        target.completed = completed;

        if self.status != RoadmapStatus::Archived {
            let (done, total) = self.progress();
            self.status = if total > 0 && done == total {
                RoadmapStatus::Completed
            } else {
                RoadmapStatus::Active
            };
        }

        Ok(ProgressChange {
            newly_completed,
            status: self.status,
        })
    }

    /// Inserts a roadmap owned by `user_id`
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateRoadmap,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO roadmaps (user_id, title, role, description, phases, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ROADMAP_COLUMNS}"
        );

        sqlx::query_as::<_, Roadmap>(&query)
            .bind(user_id)
            .bind(data.title)
            .bind(data.role)
            .bind(data.description)
            .bind(Json(data.phases))
            .bind(RoadmapStatus::Active.as_str())
            .fetch_one(pool)
            .await
    }

    /// Finds a roadmap by ID regardless of owner
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {ROADMAP_COLUMNS} FROM roadmaps WHERE id = $1");

        sqlx::query_as::<_, Roadmap>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists a user's roadmaps, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {ROADMAP_COLUMNS} FROM roadmaps
             WHERE user_id = $1
             ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Roadmap>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Sets a module's completion flag and awards XP in one transaction
    ///
    /// The roadmap row is locked for the whole read-modify-write, so
    /// concurrent updates on the same roadmap apply one after another and a
    /// module can only be newly completed once. XP goes to the owner's stats
    /// in the same transaction; nothing is written if any step fails.
    pub async fn update_module_progress(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        phase: usize,
        module: usize,
        completed: bool,
    ) -> Result<ModuleProgress, ProgressUpdateError> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {ROADMAP_COLUMNS} FROM roadmaps WHERE id = $1 FOR UPDATE");
        let mut roadmap = sqlx::query_as::<_, Roadmap>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ProgressUpdateError::NotFound)?;

        if roadmap.user_id != user_id {
            return Err(AuthzError::NotOwner {
                user_id,
                owner_id: roadmap.user_id,
            }
            .into());
        }

        let change = roadmap.set_module_completed(phase, module, completed)?;

        let update = format!(
            "UPDATE roadmaps
             SET phases = $2, status = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {ROADMAP_COLUMNS}"
        );
        let roadmap = sqlx::query_as::<_, Roadmap>(&update)
            .bind(id)
            .bind(&roadmap.phases)
            .bind(roadmap.status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let stats = if change.newly_completed {
            User::update_stats(&mut *tx, user_id, UserStats::record_module_completion).await?
        } else {
            None
        };

        tx.commit().await?;

        Ok(ModuleProgress {
            roadmap,
            change,
            stats,
        })
    }

    /// Deletes a roadmap; returns whether a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roadmaps WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
