use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Meeting record. `company_id` and `created_by` always come from the
/// caller's trusted identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meeting {
    pub id: Uuid,
    pub company_id: i64,
    pub title: String,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Fields a client may set when creating a meeting. Unknown fields in the
/// request body, including any attempt at `company_id`, are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMeeting {
    pub title: String,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// In-memory meeting storage partitioned by company. Every read and write
/// names the company explicitly; there is no cross-tenant lookup.
#[derive(Debug, Default)]
pub struct MeetingStore {
    by_company: RwLock<HashMap<i64, Vec<Meeting>>>,
}

impl MeetingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, company_id: i64, created_by: i64, new: NewMeeting) -> Meeting {
        let meeting = Meeting {
            id: Uuid::new_v4(),
            company_id,
            title: new.title,
            scheduled_for: new.scheduled_for,
            created_by,
            created_at: Utc::now(),
        };

        self.by_company
            .write()
            .await
            .entry(company_id)
            .or_default()
            .push(meeting.clone());

        meeting
    }

    pub async fn list(&self, company_id: i64) -> Vec<Meeting> {
        self.by_company
            .read()
            .await
            .get(&company_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn get(&self, company_id: i64, id: Uuid) -> Option<Meeting> {
        self.by_company
            .read()
            .await
            .get(&company_id)
            .and_then(|meetings| meetings.iter().find(|m| m.id == id).cloned())
    }

    /// Number of meetings per company, for platform reporting.
    pub async fn counts_by_company(&self) -> BTreeMap<i64, usize> {
        self.by_company
            .read()
            .await
            .iter()
            .map(|(company, meetings)| (*company, meetings.len()))
            .collect()
    }
}
