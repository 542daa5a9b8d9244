use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::EventHubError;

pub type UserId = String;
pub type EventId = String;
pub type OrganizationId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Organization,
}

impl Default for Role {
    fn default() -> Self {
        Role::Student
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Student => "student",
            Role::Organization => "organization",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Role {
    type Err = EventHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "organization" | "organisation" => Ok(Role::Organization),
            other => Err(EventHubError::Validation(format!("unknown role: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserProfile {
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email: email.into(),
            avatar_url: None,
            role: Role::Student,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Student record as stored in the profile collection.
///
/// The four academic/contact fields are optional in storage because a
/// freshly registered account has none of them; completeness is judged by
/// [`crate::completion::is_incomplete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(flatten)]
    pub user: UserProfile,
    #[serde(default)]
    pub matric_no: Option<String>,
    #[serde(default)]
    pub programme: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub registered_events: BTreeSet<EventId>,
    #[serde(default)]
    pub attended_events: BTreeSet<EventId>,
    #[serde(default)]
    pub organizations: BTreeSet<OrganizationId>,
    #[serde(default)]
    pub mycsd_points: u32,
}

impl StudentProfile {
    pub fn new(user: UserProfile) -> Self {
        Self {
            user,
            matric_no: None,
            programme: None,
            year: None,
            phone: None,
            registered_events: BTreeSet::new(),
            attended_events: BTreeSet::new(),
            organizations: BTreeSet::new(),
            mycsd_points: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.user.id
    }

    /// Apply the owner's edits. Fields left as `None` in the update are kept.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.display_name {
            self.user.display_name = name;
        }
        if let Some(avatar) = update.avatar_url {
            self.user.avatar_url = Some(avatar);
        }
        if let Some(matric) = update.matric_no {
            self.matric_no = Some(matric);
        }
        if let Some(programme) = update.programme {
            self.programme = Some(programme);
        }
        if let Some(year) = update.year {
            self.year = Some(year);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
    }
}

/// Editable subset of a student profile. The id, email and role are not
/// editable through the profile flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub matric_no: Option<String>,
    #[serde(default)]
    pub programme: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Read-only projection of an organization used by search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: OrganizationId,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub event_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub organization_id: OrganizationId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub points: u32,
}

/// Authenticated identity as exposed by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub role: Role,
}

impl Session {
    pub fn student(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Student,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Error,
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Error => write!(f, "error"),
            NotificationKind::Info => write!(f, "info"),
        }
    }
}
