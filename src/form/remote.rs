use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::domain::SelectOption;

/// Identifies one outstanding reference-data request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub field: String,
    pub parent_value: String,
}

/// Loading/error pass-through for a collaborator-backed option list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RemoteStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Default)]
struct RemoteList {
    options: Vec<SelectOption>,
    status: RemoteStatus,
    pending: Option<FetchTicket>,
}

/// Option lists that arrive asynchronously from a reference-data source,
/// e.g. country → state → city lookups.
///
/// The form never waits on a fetch: [`RemoteOptions::begin`] clears the list
/// and hands back a request; the host later calls [`RemoteOptions::deliver`].
/// Only the newest request per field is honoured.
#[derive(Debug, Clone, Default)]
pub struct RemoteOptions {
    lists: IndexMap<String, RemoteList>,
    next_ticket: u64,
}

impl RemoteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear `field`'s list and start a fetch for `parent_value`. A blank
    /// parent leaves the list empty and idle.
    pub fn begin(&mut self, field: &str, parent_value: &str) -> Option<FetchRequest> {
        let list = self.lists.entry(field.to_string()).or_default();
        list.options.clear();
        if parent_value.trim().is_empty() {
            list.status = RemoteStatus::Idle;
            list.pending = None;
            return None;
        }
        self.next_ticket += 1;
        let ticket = FetchTicket(self.next_ticket);
        list.status = RemoteStatus::Loading;
        list.pending = Some(ticket);
        debug!(field, parent_value, "requesting dependent options");
        Some(FetchRequest {
            ticket,
            field: field.to_string(),
            parent_value: parent_value.to_string(),
        })
    }

    /// Apply a collaborator response and return the field it belongs to.
    /// `None` when the ticket was superseded or the lists were cleared in
    /// the meantime.
    pub fn deliver(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<SelectOption>, String>,
    ) -> Option<String> {
        let Some((field, list)) = self
            .lists
            .iter_mut()
            .find(|(_, list)| list.pending == Some(ticket))
        else {
            debug!(?ticket, "dropping stale reference-data response");
            return None;
        };
        list.pending = None;
        match result {
            Ok(options) => {
                list.options = options;
                list.status = RemoteStatus::Ready;
            }
            Err(message) => {
                warn!(field = %field, %message, "reference-data fetch failed");
                list.options.clear();
                list.status = RemoteStatus::Failed(message);
            }
        }
        Some(field.clone())
    }

    pub fn options(&self, field: &str) -> &[SelectOption] {
        self.lists
            .get(field)
            .map(|list| list.options.as_slice())
            .unwrap_or(&[])
    }

    pub fn status(&self, field: &str) -> RemoteStatus {
        self.lists
            .get(field)
            .map(|list| list.status.clone())
            .unwrap_or_default()
    }

    pub fn is_loading(&self, field: &str) -> bool {
        self.status(field) == RemoteStatus::Loading
    }

    /// Forget every list and pending request.
    pub fn clear(&mut self) {
        self.lists.clear();
    }
}
