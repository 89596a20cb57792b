//! Built-in role tiers seeded into every new account.
//!
//! This table is consulted only when an account's roles are seeded. Permission
//! checks always read the persisted role, so editing this table never changes
//! what existing accounts can do.

use std::str::FromStr;

use campusguard_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{Permission, PermissionMap};

/// Version of the default role table. Bump when tier grants change.
pub const DEFAULT_ROLE_TABLE_VERSION: u32 = 1;

/// Built-in role tiers, ordered from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefaultRole {
    /// Platform operator with every permission.
    SuperAdmin,
    /// Account administrator.
    Admin,
    /// Administrator of a single campus site.
    SiteAdmin,
    /// Safety coordinator who plans drills and authors reports.
    PowerUser,
    /// Staff member who completes assignments and drills.
    User,
    /// Read-only visitor.
    Guest,
}

const GUEST_GRANTS: &[Permission] = &[
    Permission::DashboardOverviewView,
    Permission::MapCampusView,
    Permission::DrillsEventsView,
];

const USER_GRANTS: &[Permission] = &[
    Permission::DashboardOverviewView,
    Permission::AssignmentsTasksView,
    Permission::AssignmentsTasksComplete,
    Permission::MessagingInboxView,
    Permission::MessagingMessagesSend,
    Permission::ReportingReportsView,
    Permission::MapCampusView,
    Permission::DrillsEventsView,
    Permission::DrillsCompletionsRecord,
    Permission::ResourcesViewAll,
    Permission::AnalysisToolsUse,
    Permission::SettingsProfileEdit,
];

const POWER_USER_GRANTS: &[Permission] = &[
    Permission::DashboardOverviewView,
    Permission::DashboardWidgetsCustomize,
    Permission::AssignmentsTasksView,
    Permission::AssignmentsTasksCreate,
    Permission::AssignmentsTasksComplete,
    Permission::MessagingInboxView,
    Permission::MessagingMessagesSend,
    Permission::ReportingReportsView,
    Permission::ReportingReportsCreate,
    Permission::ReportingReportsExport,
    Permission::MapCampusView,
    Permission::DrillsEventsView,
    Permission::DrillsEventsSchedule,
    Permission::DrillsCompletionsRecord,
    Permission::ResourcesViewAll,
    Permission::ResourcesDocumentsUpload,
    Permission::AnalysisToolsUse,
    Permission::AnalysisAssessmentsManage,
    Permission::SettingsProfileEdit,
];

const SITE_ADMIN_GRANTS: &[Permission] = &[
    Permission::DashboardOverviewView,
    Permission::DashboardWidgetsCustomize,
    Permission::AssignmentsTasksView,
    Permission::AssignmentsTasksCreate,
    Permission::AssignmentsTasksAssign,
    Permission::AssignmentsTasksComplete,
    Permission::AdminUsersView,
    Permission::AdminRolesView,
    Permission::MessagingInboxView,
    Permission::MessagingMessagesSend,
    Permission::MessagingBroadcastsSend,
    Permission::ReportingReportsView,
    Permission::ReportingReportsCreate,
    Permission::ReportingReportsExport,
    Permission::MapCampusView,
    Permission::MapLayersEdit,
    Permission::DrillsEventsView,
    Permission::DrillsEventsSchedule,
    Permission::DrillsCompletionsRecord,
    Permission::DrillsRequirementsManage,
    Permission::ResourcesViewAll,
    Permission::ResourcesDocumentsUpload,
    Permission::ResourcesDocumentsManage,
    Permission::AnalysisToolsUse,
    Permission::AnalysisAssessmentsManage,
    Permission::SettingsProfileEdit,
];

const ADMIN_GRANTS: &[Permission] = &[
    Permission::DashboardOverviewView,
    Permission::DashboardWidgetsCustomize,
    Permission::AssignmentsTasksView,
    Permission::AssignmentsTasksCreate,
    Permission::AssignmentsTasksAssign,
    Permission::AssignmentsTasksComplete,
    Permission::AdminUsersView,
    Permission::AdminUsersManage,
    Permission::AdminRolesView,
    Permission::AdminRolesManage,
    Permission::AdminSitesManage,
    Permission::MessagingInboxView,
    Permission::MessagingMessagesSend,
    Permission::MessagingBroadcastsSend,
    Permission::ReportingReportsView,
    Permission::ReportingReportsCreate,
    Permission::ReportingReportsExport,
    Permission::MapCampusView,
    Permission::MapLayersEdit,
    Permission::DrillsEventsView,
    Permission::DrillsEventsSchedule,
    Permission::DrillsCompletionsRecord,
    Permission::DrillsRequirementsManage,
    Permission::ResourcesViewAll,
    Permission::ResourcesDocumentsUpload,
    Permission::ResourcesDocumentsManage,
    Permission::AnalysisToolsUse,
    Permission::AnalysisAssessmentsManage,
    Permission::SettingsProfileEdit,
    Permission::SettingsAccountManage,
    Permission::ThemingBrandingEdit,
];

impl DefaultRole {
    /// Returns every tier in seeding order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[DefaultRole] = &[
            DefaultRole::SuperAdmin,
            DefaultRole::Admin,
            DefaultRole::SiteAdmin,
            DefaultRole::PowerUser,
            DefaultRole::User,
            DefaultRole::Guest,
        ];

        ALL
    }

    /// Returns the table key, also used as the seeded role identifier.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "superAdmin",
            Self::Admin => "admin",
            Self::SiteAdmin => "siteAdmin",
            Self::PowerUser => "powerUser",
            Self::User => "user",
            Self::Guest => "guest",
        }
    }

    /// Returns the display name given to the seeded role.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Admin => "Admin",
            Self::SiteAdmin => "Site Admin",
            Self::PowerUser => "Power User",
            Self::User => "User",
            Self::Guest => "Guest",
        }
    }

    /// Returns the description given to the seeded role.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Full access to every feature, including account management.",
            Self::Admin => "Manages users, roles, sites and account settings.",
            Self::SiteAdmin => "Runs drills, resources and assignments for a campus site.",
            Self::PowerUser => "Plans drills, authors reports and manages assessments.",
            Self::User => "Completes assignments and drills and reads resources.",
            Self::Guest => "Views the dashboard, campus map and drill calendar.",
        }
    }

    /// Returns the permissions granted by this tier.
    #[must_use]
    pub fn granted(&self) -> &'static [Permission] {
        match self {
            Self::SuperAdmin => Permission::all(),
            Self::Admin => ADMIN_GRANTS,
            Self::SiteAdmin => SITE_ADMIN_GRANTS,
            Self::PowerUser => POWER_USER_GRANTS,
            Self::User => USER_GRANTS,
            Self::Guest => GUEST_GRANTS,
        }
    }

    /// Returns the seeded permission map, listing every known permission explicitly.
    #[must_use]
    pub fn permission_map(&self) -> PermissionMap {
        PermissionMap::explicit(self.granted())
    }
}

impl FromStr for DefaultRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.key() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown default role '{value}'")))
    }
}
