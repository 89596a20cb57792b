use async_trait::async_trait;
use campusguard_application::{RoleRepository, SeedOutcome};
use campusguard_core::{AccountId, AppError, AppResult};
use campusguard_domain::{PermissionMap, Role, RoleId};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for account roles.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    account_id: String,
    role_id: String,
    name: String,
    description: String,
    permissions: Json<Value>,
    is_system: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let Json(permissions) = row.permissions;
        let permissions = permissions
            .as_object()
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "stored permissions of role '{}' are not a JSON object",
                    row.role_id
                ))
            })
            .and_then(PermissionMap::from_json_object)?;

        Role::restore(
            RoleId::new(row.role_id)?,
            AccountId::new(row.account_id)?,
            row.name,
            row.description,
            permissions,
            row.is_system,
            row.created_at,
            row.updated_at,
        )
    }
}

fn map_role_write_error(error: sqlx::Error, role: &Role) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!(
            "role '{}' already exists for account '{}'",
            role.name(),
            role.account_id()
        ));
    }

    AppError::Internal(format!(
        "failed to persist role '{}': {error}",
        role.role_id()
    ))
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_role(
        &self,
        account_id: &AccountId,
        role_id: &RoleId,
    ) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT account_id, role_id, name, description, permissions, is_system, created_at, updated_at
            FROM roles
            WHERE account_id = $1 AND role_id = $2
            "#,
        )
        .bind(account_id.as_str())
        .bind(role_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?
        .map(Role::try_from)
        .transpose()
    }

    async fn list_roles(&self, account_id: &AccountId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT account_id, role_id, name, description, permissions, is_system, created_at, updated_at
            FROM roles
            WHERE account_id = $1
            ORDER BY name COLLATE "C", role_id
            "#,
        )
        .bind(account_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn insert_role(&self, role: Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (
                account_id,
                role_id,
                name,
                description,
                permissions,
                is_system,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(role.account_id().as_str())
        .bind(role.role_id().as_str())
        .bind(role.name())
        .bind(role.description())
        .bind(Json(role.permissions()))
        .bind(role.is_system())
        .bind(role.created_at())
        .bind(role.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_write_error(error, &role))?;

        Ok(())
    }

    async fn save_role(&self, role: Role) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE roles
            SET name = $3,
                description = $4,
                permissions = $5,
                updated_at = $6
            WHERE account_id = $1 AND role_id = $2
            "#,
        )
        .bind(role.account_id().as_str())
        .bind(role.role_id().as_str())
        .bind(role.name())
        .bind(role.description())
        .bind(Json(role.permissions()))
        .bind(role.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_write_error(error, &role))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist for account '{}'",
                role.role_id(),
                role.account_id()
            )));
        }

        Ok(())
    }

    async fn delete_role(&self, account_id: &AccountId, role_id: &RoleId) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM roles
            WHERE account_id = $1 AND role_id = $2
            "#,
        )
        .bind(account_id.as_str())
        .bind(role_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist for account '{account_id}'"
            )));
        }

        Ok(())
    }

    async fn seed_roles(
        &self,
        account_id: &AccountId,
        roles: Vec<Role>,
    ) -> AppResult<SeedOutcome> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;
        let mut outcome = SeedOutcome::default();

        for role in roles {
            if role.account_id() != account_id {
                return Err(AppError::Internal(format!(
                    "seeded role '{}' belongs to account '{}' instead of '{account_id}'",
                    role.role_id(),
                    role.account_id()
                )));
            }

            let inserted = sqlx::query_scalar::<_, String>(
                r#"
                INSERT INTO roles (
                    account_id,
                    role_id,
                    name,
                    description,
                    permissions,
                    is_system,
                    created_at,
                    updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT DO NOTHING
                RETURNING role_id
                "#,
            )
            .bind(account_id.as_str())
            .bind(role.role_id().as_str())
            .bind(role.name())
            .bind(role.description())
            .bind(Json(role.permissions()))
            .bind(role.is_system())
            .bind(role.created_at())
            .bind(role.updated_at())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to seed role: {error}")))?;

            match inserted {
                Some(_) => outcome.inserted.push(role.role_id().clone()),
                None => {
                    let id_present = sqlx::query_scalar::<_, bool>(
                        r#"
                        SELECT EXISTS (
                            SELECT 1
                            FROM roles
                            WHERE account_id = $1 AND role_id = $2
                        )
                        "#,
                    )
                    .bind(account_id.as_str())
                    .bind(role.role_id().as_str())
                    .fetch_one(&mut *transaction)
                    .await
                    .map_err(|error| {
                        AppError::Internal(format!("failed to inspect seeded role: {error}"))
                    })?;

                    if id_present {
                        debug!(
                            account_id = %account_id,
                            role_id = %role.role_id(),
                            "seeded role already present"
                        );
                    } else {
                        warn!(
                            account_id = %account_id,
                            role_id = %role.role_id(),
                            name = role.name(),
                            "seeded role skipped: name already used by another role"
                        );
                    }
                    outcome.skipped.push(role.role_id().clone());
                }
            }
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(outcome)
    }
}
