use async_trait::async_trait;
use campusguard_application::{UserRoleAssignment, UserRoleRepository};
use campusguard_core::{AccountId, AppError, AppResult};
use campusguard_domain::RoleId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed repository for subject role assignments.
///
/// Assignments are removed by the database when their role is deleted.
#[derive(Clone)]
pub struct PostgresUserRoleRepository {
    pool: PgPool,
}

impl PostgresUserRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    account_id: String,
    subject: String,
    role_id: String,
    assigned_at: DateTime<Utc>,
}

impl TryFrom<UserRoleRow> for UserRoleAssignment {
    type Error = AppError;

    fn try_from(row: UserRoleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            account_id: AccountId::new(row.account_id)?,
            subject: row.subject,
            role_id: RoleId::new(row.role_id)?,
            assigned_at: row.assigned_at,
        })
    }
}

#[async_trait]
impl UserRoleRepository for PostgresUserRoleRepository {
    async fn find_assignment(
        &self,
        account_id: &AccountId,
        subject: &str,
    ) -> AppResult<Option<UserRoleAssignment>> {
        sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT account_id, subject, role_id, assigned_at
            FROM user_roles
            WHERE account_id = $1 AND subject = $2
            "#,
        )
        .bind(account_id.as_str())
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role assignment: {error}")))?
        .map(UserRoleAssignment::try_from)
        .transpose()
    }

    async fn assign(&self, assignment: UserRoleAssignment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (account_id, subject, role_id, assigned_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (account_id, subject) DO UPDATE
            SET role_id = EXCLUDED.role_id,
                assigned_at = EXCLUDED.assigned_at
            "#,
        )
        .bind(assignment.account_id.as_str())
        .bind(assignment.subject.as_str())
        .bind(assignment.role_id.as_str())
        .bind(assignment.assigned_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23503")
            {
                return AppError::NotFound(format!(
                    "role '{}' does not exist for account '{}'",
                    assignment.role_id, assignment.account_id
                ));
            }

            AppError::Internal(format!("failed to assign role: {error}"))
        })?;

        Ok(())
    }

    async fn claim_first_assignment(&self, assignment: UserRoleAssignment) -> AppResult<bool> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        // Concurrent first claims for one account serialize on the role row.
        let locked_role = sqlx::query_scalar::<_, String>(
            r#"
            SELECT role_id
            FROM roles
            WHERE account_id = $1 AND role_id = $2
            FOR UPDATE
            "#,
        )
        .bind(assignment.account_id.as_str())
        .bind(assignment.role_id.as_str())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?;
        if locked_role.is_none() {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist for account '{}'",
                assignment.role_id, assignment.account_id
            )));
        }

        let account_has_holders = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_roles
                WHERE account_id = $1
            )
            "#,
        )
        .bind(assignment.account_id.as_str())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check role assignments: {error}"))
        })?;
        if account_has_holders {
            return Ok(false);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO user_roles (account_id, subject, role_id, assigned_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (account_id, subject) DO NOTHING
            "#,
        )
        .bind(assignment.account_id.as_str())
        .bind(assignment.subject.as_str())
        .bind(assignment.role_id.as_str())
        .bind(assignment.assigned_at)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign first role: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_assignments(
        &self,
        account_id: &AccountId,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT account_id, subject, role_id, assigned_at
            FROM user_roles
            WHERE account_id = $1
            ORDER BY subject COLLATE "C"
            "#,
        )
        .bind(account_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role assignments: {error}"))
        })?;

        rows.into_iter().map(UserRoleAssignment::try_from).collect()
    }

    async fn remove_for_role(&self, account_id: &AccountId, role_id: &RoleId) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE account_id = $1 AND role_id = $2
            "#,
        )
        .bind(account_id.as_str())
        .bind(role_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove role assignments: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}
