//! Persisted records and the list the screen shows

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::backend::{AuthBackend, RecordStore};
use crate::error::{Error, Result};
use crate::form::{DraftError, RecordDraft};

/// A row of the records table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(rename = "primeiro_nome")]
    pub first_name: String,
    #[serde(rename = "sobrenome")]
    pub last_name: String,
    /// Null for rows written with an unparseable age
    #[serde(rename = "idade")]
    pub age: Option<i32>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; `id` and `created_at` are assigned by the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRecord {
    #[serde(rename = "primeiro_nome")]
    pub first_name: String,
    #[serde(rename = "sobrenome")]
    pub last_name: String,
    #[serde(rename = "idade")]
    pub age: i32,
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Row inserted and draft cleared
    Saved,
    /// Draft incomplete; nothing was sent
    Skipped,
}

/// Records as of the last successful reload, newest first
#[derive(Debug, Default)]
pub struct RecordList {
    records: Vec<Record>,
}

impl RecordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Replace the list with whatever the store returns.
    ///
    /// On failure the previous list is kept.
    pub async fn reload<S>(&mut self, store: &S) -> Result<&[Record]>
    where
        S: RecordStore + ?Sized,
    {
        match store.fetch_all().await {
            Ok(records) => {
                debug!("Loaded {} record(s)", records.len());
                self.records = records;
                Ok(&self.records)
            }
            Err(err) => {
                error!("Failed to load records: {}", err);
                Err(err)
            }
        }
    }

    /// Insert the draft as a row owned by the current user.
    ///
    /// The user is looked up right before the insert. An incomplete draft is
    /// a no-op. The draft is only cleared once the insert succeeded; the list
    /// is left for the caller to reload.
    pub async fn submit<A, S>(
        &mut self,
        draft: &mut RecordDraft,
        auth: &A,
        store: &S,
    ) -> Result<SubmitOutcome>
    where
        A: AuthBackend + ?Sized,
        S: RecordStore + ?Sized,
    {
        let valid = match draft.validate() {
            Ok(valid) => valid,
            Err(DraftError::Incomplete) => {
                debug!("Ignoring submit of incomplete draft");
                return Ok(SubmitOutcome::Skipped);
            }
            Err(err) => return Err(err.into()),
        };

        let user = auth.get_user().await.map_err(|err| {
            error!("Could not look up user before saving record: {}", err);
            Error::from(err)
        })?;

        let row = valid.owned_by(user.id);
        if let Err(err) = store.insert(&row).await {
            error!("Failed to save record: {}", err);
            return Err(err);
        }
        info!("Saved record for user {}", row.user_id);

        draft.clear();
        Ok(SubmitOutcome::Saved)
    }
}
