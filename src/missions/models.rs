//! Mission Models
//! Mission records: a dispatchable job with a client, schedule, locations,
//! and a two-state assignment lifecycle.

use serde::{Deserialize, Serialize};

/// Dispatchable mission record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: i64,
    pub client: String,
    /// Scheduled date/time, ISO-8601 text. Listing orders on this column.
    pub dt: String,
    pub pickup: String,
    pub dropoff: String,
    /// Weak reference to a user id. May dangle; listing resolves it with a
    /// LEFT JOIN instead of failing.
    pub assigned_to: Option<i64>,
    pub status: MissionStatus,
}

/// Mission lifecycle.
///
/// `New` iff no assignee, `Assigned` iff an assignee is present. The only
/// transition is `assign`, which may also re-enter `Assigned` by
/// overwriting the previous assignee.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MissionStatus {
    #[serde(rename = "new")]
    New,
    #[serde(rename = "assigned")]
    Assigned,
}

impl MissionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MissionStatus::New => "new",
            MissionStatus::Assigned => "assigned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(MissionStatus::New),
            "assigned" => Some(MissionStatus::Assigned),
            _ => None,
        }
    }
}

/// Mission as returned by the list endpoint: the record plus the assignee's
/// display name (left-join semantics, absent when unassigned or dangling).
#[derive(Debug, Clone, Serialize)]
pub struct MissionListItem {
    #[serde(flatten)]
    pub mission: Mission,
    pub assigned_name: Option<String>,
}

/// Create mission request
#[derive(Debug, Deserialize)]
pub struct CreateMissionRequest {
    pub client: Option<String>,
    pub dt: Option<String>,
    pub pickup: Option<String>,
    pub dropoff: Option<String>,
}

/// Assign mission request
#[derive(Debug, Deserialize)]
pub struct AssignMissionRequest {
    pub user_id: Option<i64>,
}
