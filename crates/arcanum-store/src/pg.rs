//! `PostgreSQL` implementations of the repository traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use arcanum_core::error::DomainError;
use arcanum_core::store::{DocumentRepository, Versioned};

use arcanum_campaign::domain::progress::CampaignProgress;
use arcanum_campaign::domain::repository::CampaignRepository;
use arcanum_duel::domain::duel::{Duel, RoundStatus};
use arcanum_duel::domain::repository::{DuelRepository, WizardRepository};
use arcanum_duel::domain::wizard::Wizard;
use arcanum_lobby::domain::entry::{DuelType, LobbyEntry};
use arcanum_lobby::domain::repository::LobbyRepository;

use crate::schema::ALL_TABLES;

/// Creates every table and index if missing.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` on DDL failure.
pub async fn migrate(pool: &PgPool) -> Result<(), DomainError> {
    for ddl in ALL_TABLES {
        sqlx::raw_sql(ddl).execute(pool).await.map_err(infra)?;
    }
    Ok(())
}

fn infra(e: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(e.to_string())
}

fn decode<T: DeserializeOwned>(row: &PgRow) -> Result<Versioned<T>, DomainError> {
    let document: serde_json::Value = row.try_get("document").map_err(infra)?;
    let version: i64 = row.try_get("version").map_err(infra)?;
    Ok(Versioned {
        document: serde_json::from_value(document)
            .map_err(|e| DomainError::Infrastructure(format!("document decode failed: {e}")))?,
        version,
    })
}

fn encode<T: Serialize>(document: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(document)
        .map_err(|e| DomainError::Infrastructure(format!("document encode failed: {e}")))
}

/// One versioned JSONB table.
#[derive(Debug, Clone)]
struct PgCollection {
    pool: PgPool,
    table: &'static str,
}

impl PgCollection {
    async fn get<T: DeserializeOwned>(
        &self,
        id: Uuid,
    ) -> Result<Option<Versioned<T>>, DomainError> {
        let sql = format!(
            "SELECT document, version FROM {} WHERE id = $1",
            self.table
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;
        row.as_ref().map(decode).transpose()
    }

    async fn insert<T: Serialize>(&self, id: Uuid, document: &T) -> Result<(), DomainError> {
        let sql = format!(
            "INSERT INTO {} (id, version, document) VALUES ($1, 1, $2)",
            self.table
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(encode(document)?)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(())
    }

    async fn current_version(&self, id: Uuid) -> Result<Option<i64>, DomainError> {
        let sql = format!("SELECT version FROM {} WHERE id = $1", self.table);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;
        row.map(|r| r.try_get("version").map_err(infra)).transpose()
    }

    async fn update<T: Serialize>(
        &self,
        id: Uuid,
        expected_version: i64,
        document: &T,
    ) -> Result<(), DomainError> {
        let sql = format!(
            "UPDATE {} SET document = $3, version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND version = $2",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(expected_version)
            .bind(encode(document)?)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        if result.rows_affected() == 0 {
            return Err(self.version_conflict(id, expected_version).await?);
        }
        Ok(())
    }

    async fn remove(&self, id: Uuid, expected_version: i64) -> Result<(), DomainError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 AND version = $2",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(expected_version)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        if result.rows_affected() == 0 {
            return Err(self.version_conflict(id, expected_version).await?);
        }
        Ok(())
    }

    /// A zero-row swap is either a missing document or a lost race;
    /// probe the stored version to tell them apart.
    async fn version_conflict(
        &self,
        id: Uuid,
        expected: i64,
    ) -> Result<DomainError, DomainError> {
        Ok(match self.current_version(id).await? {
            Some(actual) => DomainError::ConcurrencyConflict {
                document_id: id,
                expected,
                actual,
            },
            None => DomainError::DocumentNotFound(id),
        })
    }

    async fn find_where<T: DeserializeOwned>(
        &self,
        predicate: &str,
        binds: &[String],
    ) -> Result<Vec<Versioned<T>>, DomainError> {
        let sql = format!(
            "SELECT document, version FROM {} WHERE {predicate}",
            self.table
        );
        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(infra)?;
        rows.iter().map(decode).collect()
    }
}

macro_rules! delegate_document_repository {
    ($repo:ty, $doc:ty) => {
        #[async_trait]
        impl DocumentRepository<$doc> for $repo {
            async fn get(&self, id: Uuid) -> Result<Option<Versioned<$doc>>, DomainError> {
                self.collection.get(id).await
            }

            async fn insert(&self, id: Uuid, document: &$doc) -> Result<(), DomainError> {
                self.collection.insert(id, document).await
            }

            async fn update(
                &self,
                id: Uuid,
                expected_version: i64,
                document: &$doc,
            ) -> Result<(), DomainError> {
                self.collection.update(id, expected_version, document).await
            }

            async fn remove(&self, id: Uuid, expected_version: i64) -> Result<(), DomainError> {
                self.collection.remove(id, expected_version).await
            }
        }
    };
}

/// Postgres-backed wizard repository.
#[derive(Debug, Clone)]
pub struct PgWizardRepository {
    collection: PgCollection,
}

impl PgWizardRepository {
    /// Creates a repository over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            collection: PgCollection {
                pool,
                table: "wizards",
            },
        }
    }
}

delegate_document_repository!(PgWizardRepository, Wizard);

#[async_trait]
impl WizardRepository for PgWizardRepository {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Versioned<Wizard>>, DomainError> {
        self.collection
            .find_where("document->>'owner' = $1", &[owner.to_string()])
            .await
    }
}

/// Postgres-backed duel repository.
#[derive(Debug, Clone)]
pub struct PgDuelRepository {
    collection: PgCollection,
}

impl PgDuelRepository {
    /// Creates a repository over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            collection: PgCollection {
                pool,
                table: "duels",
            },
        }
    }
}

delegate_document_repository!(PgDuelRepository, Duel);

#[async_trait]
impl DuelRepository for PgDuelRepository {
    async fn find_by_join_code(&self, code: &str) -> Result<Option<Versioned<Duel>>, DomainError> {
        let mut found = self
            .collection
            .find_where("document->>'join_code' = $1", &[code.to_owned()])
            .await?;
        Ok(found.pop())
    }

    async fn find_stuck(&self, cutoff: DateTime<Utc>) -> Result<Vec<Versioned<Duel>>, DomainError> {
        // The active set stays small; the resolving-since comparison
        // happens here rather than in a JSON path expression.
        let active: Vec<Versioned<Duel>> = self
            .collection
            .find_where("document->>'status' = $1", &["active".to_owned()])
            .await?;
        Ok(active
            .into_iter()
            .filter(|v| {
                v.document.current_round_state().is_some_and(|round| {
                    round.status == RoundStatus::Resolving
                        && round.resolving_since.is_some_and(|since| since <= cutoff)
                })
            })
            .collect())
    }
}

/// Postgres-backed lobby repository.
#[derive(Debug, Clone)]
pub struct PgLobbyRepository {
    collection: PgCollection,
}

impl PgLobbyRepository {
    /// Creates a repository over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            collection: PgCollection {
                pool,
                table: "lobby_entries",
            },
        }
    }
}

delegate_document_repository!(PgLobbyRepository, LobbyEntry);

fn duel_type_key(duel_type: DuelType) -> Result<String, DomainError> {
    let value = serde_json::to_value(duel_type)
        .map_err(|e| DomainError::Infrastructure(format!("duel type encode failed: {e}")))?;
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| DomainError::Infrastructure("duel type is not a string".to_owned()))
}

#[async_trait]
impl LobbyRepository for PgLobbyRepository {
    async fn find_by_actor(
        &self,
        actor: Uuid,
    ) -> Result<Option<Versioned<LobbyEntry>>, DomainError> {
        let mut found = self
            .collection
            .find_where("document->>'actor' = $1", &[actor.to_string()])
            .await?;
        Ok(found.pop())
    }

    async fn find_by_wizard(
        &self,
        wizard_id: Uuid,
    ) -> Result<Option<Versioned<LobbyEntry>>, DomainError> {
        let mut found = self
            .collection
            .find_where("document->>'wizard_id' = $1", &[wizard_id.to_string()])
            .await?;
        Ok(found.pop())
    }

    async fn find_waiting(
        &self,
        duel_type: DuelType,
    ) -> Result<Vec<Versioned<LobbyEntry>>, DomainError> {
        // Cast before ordering: RFC 3339 strings with fractional seconds
        // do not sort chronologically as text.
        self.collection
            .find_where(
                "document->>'status' = 'waiting' AND document->>'duel_type' = $1 \
                 ORDER BY (document->>'joined_at')::timestamptz ASC",
                &[duel_type_key(duel_type)?],
            )
            .await
    }
}

/// Postgres-backed campaign progress repository.
#[derive(Debug, Clone)]
pub struct PgCampaignRepository {
    collection: PgCollection,
}

impl PgCampaignRepository {
    /// Creates a repository over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            collection: PgCollection {
                pool,
                table: "campaign_progress",
            },
        }
    }
}

delegate_document_repository!(PgCampaignRepository, CampaignProgress);

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    async fn find_by_wizard(
        &self,
        actor: Uuid,
        wizard_id: Uuid,
    ) -> Result<Option<Versioned<CampaignProgress>>, DomainError> {
        let mut found = self
            .collection
            .find_where(
                "document->>'actor' = $1 AND document->>'wizard_id' = $2",
                &[actor.to_string(), wizard_id.to_string()],
            )
            .await?;
        Ok(found.pop())
    }
}
