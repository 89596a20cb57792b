use campusguard_core::{AccountId, AppResult, UserIdentity};
use campusguard_domain::{AuditAction, DEFAULT_ROLE_TABLE_VERSION, DefaultRole, Role};
use chrono::Utc;
use tracing::info;

use crate::{AuditEvent, SeedOutcome};

use super::{ROLE_RESOURCE_TYPE, RoleService};

/// Audit subject recorded when seeding runs on the provisioning path.
const PROVISIONING_SUBJECT: &str = "system";

impl RoleService {
    /// Seeds the default role table into an account.
    ///
    /// Roles that already exist are skipped, never overwritten, so running
    /// this repeatedly is safe. Runs on the provisioning path before any
    /// subject in the account holds a role.
    pub async fn initialize_default_roles(&self, account_id: &AccountId) -> AppResult<SeedOutcome> {
        self.seed_defaults(account_id, PROVISIONING_SUBJECT).await
    }

    /// Re-runs default role seeding for the actor's account.
    pub async fn reseed_default_roles(&self, actor: &UserIdentity) -> AppResult<SeedOutcome> {
        self.require_role_manage_permission(actor).await?;
        self.seed_defaults(actor.account_id(), actor.subject()).await
    }

    async fn seed_defaults(&self, account_id: &AccountId, subject: &str) -> AppResult<SeedOutcome> {
        let now = Utc::now();
        let roles = DefaultRole::all()
            .iter()
            .map(|default_role| Role::from_default(*default_role, account_id.clone(), now))
            .collect();

        let outcome = self.role_repository.seed_roles(account_id, roles).await?;

        info!(
            account_id = %account_id,
            table_version = DEFAULT_ROLE_TABLE_VERSION,
            inserted = outcome.inserted.len(),
            skipped = outcome.skipped.len(),
            "default roles seeded"
        );

        if outcome.is_noop() {
            return Ok(outcome);
        }

        let inserted = outcome
            .inserted
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.audit_repository
            .append_event(AuditEvent {
                account_id: account_id.clone(),
                subject: subject.to_owned(),
                action: AuditAction::SecurityRoleDefaultsSeeded,
                resource_type: ROLE_RESOURCE_TYPE.to_owned(),
                resource_id: format!("defaults:v{DEFAULT_ROLE_TABLE_VERSION}"),
                detail: Some(format!("seeded default roles [{inserted}]")),
            })
            .await?;

        Ok(outcome)
    }
}
