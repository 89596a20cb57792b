use std::fmt::{Display, Formatter};
use std::str::FromStr;

use campusguard_core::AppError;
use serde::{Deserialize, Serialize};

/// Known permission identifiers, one per flag named in the default role table.
///
/// Storage values follow the `module.function.action` convention. The single
/// two-segment key (`resources.view_all`) predates the convention and is kept
/// verbatim so existing role documents keep resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Permission {
    /// Allows viewing the safety overview dashboard.
    DashboardOverviewView,
    /// Allows rearranging dashboard widgets.
    DashboardWidgetsCustomize,
    /// Allows viewing assigned tasks.
    AssignmentsTasksView,
    /// Allows creating tasks.
    AssignmentsTasksCreate,
    /// Allows assigning tasks to other users.
    AssignmentsTasksAssign,
    /// Allows marking tasks complete.
    AssignmentsTasksComplete,
    /// Allows viewing the user directory.
    AdminUsersView,
    /// Allows managing users and their role assignments.
    AdminUsersManage,
    /// Allows viewing roles.
    AdminRolesView,
    /// Allows creating, editing and deleting roles.
    AdminRolesManage,
    /// Allows managing campus sites.
    AdminSitesManage,
    /// Allows managing accounts across the platform.
    AdminAccountsManage,
    /// Allows reading the message inbox.
    MessagingInboxView,
    /// Allows sending direct messages.
    MessagingMessagesSend,
    /// Allows sending account-wide broadcasts.
    MessagingBroadcastsSend,
    /// Allows viewing reports.
    ReportingReportsView,
    /// Allows creating reports.
    ReportingReportsCreate,
    /// Allows exporting reports.
    ReportingReportsExport,
    /// Allows viewing the campus map.
    MapCampusView,
    /// Allows editing map layers.
    MapLayersEdit,
    /// Allows viewing drill events.
    DrillsEventsView,
    /// Allows scheduling drill events.
    DrillsEventsSchedule,
    /// Allows recording drill completions.
    DrillsCompletionsRecord,
    /// Allows managing drill requirements.
    DrillsRequirementsManage,
    /// Allows viewing every resource document.
    ResourcesViewAll,
    /// Allows uploading resource documents.
    ResourcesDocumentsUpload,
    /// Allows editing and deleting resource documents.
    ResourcesDocumentsManage,
    /// Allows using analysis tools.
    AnalysisToolsUse,
    /// Allows managing assessment templates.
    AnalysisAssessmentsManage,
    /// Allows editing one's own profile settings.
    SettingsProfileEdit,
    /// Allows managing account-level settings.
    SettingsAccountManage,
    /// Allows editing account branding.
    ThemingBrandingEdit,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DashboardOverviewView => "dashboard.overview.view",
            Self::DashboardWidgetsCustomize => "dashboard.widgets.customize",
            Self::AssignmentsTasksView => "assignments.tasks.view",
            Self::AssignmentsTasksCreate => "assignments.tasks.create",
            Self::AssignmentsTasksAssign => "assignments.tasks.assign",
            Self::AssignmentsTasksComplete => "assignments.tasks.complete",
            Self::AdminUsersView => "admin.users.view",
            Self::AdminUsersManage => "admin.users.manage",
            Self::AdminRolesView => "admin.roles.view",
            Self::AdminRolesManage => "admin.roles.manage",
            Self::AdminSitesManage => "admin.sites.manage",
            Self::AdminAccountsManage => "admin.accounts.manage",
            Self::MessagingInboxView => "messaging.inbox.view",
            Self::MessagingMessagesSend => "messaging.messages.send",
            Self::MessagingBroadcastsSend => "messaging.broadcasts.send",
            Self::ReportingReportsView => "reporting.reports.view",
            Self::ReportingReportsCreate => "reporting.reports.create",
            Self::ReportingReportsExport => "reporting.reports.export",
            Self::MapCampusView => "map.campus.view",
            Self::MapLayersEdit => "map.layers.edit",
            Self::DrillsEventsView => "drills.events.view",
            Self::DrillsEventsSchedule => "drills.events.schedule",
            Self::DrillsCompletionsRecord => "drills.completions.record",
            Self::DrillsRequirementsManage => "drills.requirements.manage",
            Self::ResourcesViewAll => "resources.view_all",
            Self::ResourcesDocumentsUpload => "resources.documents.upload",
            Self::ResourcesDocumentsManage => "resources.documents.manage",
            Self::AnalysisToolsUse => "analysis.tools.use",
            Self::AnalysisAssessmentsManage => "analysis.assessments.manage",
            Self::SettingsProfileEdit => "settings.profile.edit",
            Self::SettingsAccountManage => "settings.account.manage",
            Self::ThemingBrandingEdit => "theming.branding.edit",
        }
    }

    /// Returns the feature area (first key segment) of this permission.
    #[must_use]
    pub fn module(&self) -> &'static str {
        let value = self.as_str();
        value.split('.').next().unwrap_or(value)
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
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
            Permission::AdminAccountsManage,
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

        ALL
    }

    /// Parses a transport value into a known permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown permission value '{value}'")))
    }
}

impl TryFrom<String> for Permission {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

impl From<Permission> for &'static str {
    fn from(value: Permission) -> Self {
        value.as_str()
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Key of a permission map entry.
///
/// Parsing never fails: keys outside the known catalogue are kept verbatim as
/// [`PermissionKey::Unknown`] so flags written by newer clients survive a
/// read-modify-write cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PermissionKey {
    /// Key from the known catalogue.
    Known(Permission),
    /// Key not present in the known catalogue.
    Unknown(String),
}

impl PermissionKey {
    /// Classifies a raw key.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Permission::from_str(value)
            .map(Self::Known)
            .unwrap_or_else(|_| Self::Unknown(value.to_owned()))
    }

    /// Returns the storage value of the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(permission) => permission.as_str(),
            Self::Unknown(value) => value.as_str(),
        }
    }

    /// Returns the known permission, if any.
    #[must_use]
    pub fn known(&self) -> Option<Permission> {
        match self {
            Self::Known(permission) => Some(*permission),
            Self::Unknown(_) => None,
        }
    }
}

impl From<Permission> for PermissionKey {
    fn from(value: Permission) -> Self {
        Self::Known(value)
    }
}

impl From<&Permission> for PermissionKey {
    fn from(value: &Permission) -> Self {
        Self::Known(*value)
    }
}

impl From<&PermissionKey> for PermissionKey {
    fn from(value: &PermissionKey) -> Self {
        value.clone()
    }
}

impl From<&str> for PermissionKey {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for PermissionKey {
    fn from(value: String) -> Self {
        match Permission::from_str(value.as_str()) {
            Ok(permission) => Self::Known(permission),
            Err(_) => Self::Unknown(value),
        }
    }
}

impl From<&String> for PermissionKey {
    fn from(value: &String) -> Self {
        Self::parse(value.as_str())
    }
}

impl From<PermissionKey> for String {
    fn from(value: PermissionKey) -> Self {
        match value {
            PermissionKey::Known(permission) => permission.as_str().to_owned(),
            PermissionKey::Unknown(raw) => raw,
        }
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
