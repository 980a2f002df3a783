use crate::console::messages;
use crate::core::error::DirectoryError;
use crate::models::user::UserRecord;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error};

/// How long success/error notices stay visible unless superseded.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Why a requested action was not started.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ActionRefused {
    #[error("No such user")]
    UnknownUser,

    #[error("User is already approved")]
    AlreadyChecked,

    #[error("User must be approved before deletion")]
    NotYetChecked,

    #[error("Another request is still in flight")]
    RequestInFlight,

    #[error("A delete confirmation is already open")]
    ConfirmationOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    /// Requires an explicit confirm/cancel; never auto-dismisses.
    Confirm,
}

/// The single notification slot. A new notice replaces whatever is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
    deadline: Option<Instant>,
}

impl Notification {
    fn new(kind: NoticeKind, message: String, now: Instant) -> Self {
        let deadline = match kind {
            NoticeKind::Confirm => None,
            _ => Some(now + NOTICE_TTL),
        };
        Self {
            kind,
            message,
            deadline,
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }
}

/// Delete is two-phase: a confirmation prompt holds the candidate id without
/// any network effect, then an explicit confirm puts the request in flight.
/// One slot for both phases makes "confirming and in flight at once"
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DeleteState {
    Confirming(String),
    InFlight(String),
}

/// In-memory user collection plus the transient action state that guards it.
///
/// Pure state transitions, no I/O: the shell decides when to fire the actual
/// HTTP calls and feeds their results back through the `finish_*` methods.
/// Mutations are optimistic: on success only the affected record is patched
/// or removed, with no follow-up refetch; on failure the collection is left
/// untouched. A refresh racing an in-flight mutation may overwrite the
/// patch; that race is accepted, not masked.
pub struct Dashboard {
    users: Vec<UserRecord>,
    loading: bool,
    approving: Option<String>,
    delete: Option<DeleteState>,
    notice: Option<Notification>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            loading: false,
            approving: None,
            delete: None,
            notice: None,
        }
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn user(&self, id: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notice(&self) -> Option<&Notification> {
        self.notice.as_ref()
    }

    /// Id held by an open confirmation prompt, if any.
    pub fn confirm_candidate(&self) -> Option<&str> {
        match &self.delete {
            Some(DeleteState::Confirming(id)) => Some(id),
            _ => None,
        }
    }

    /// Approve is available iff the record is not yet checked and no
    /// approval for that same id is pending.
    pub fn approve_enabled(&self, id: &str) -> bool {
        match self.user(id) {
            Some(user) => !user.checked && self.approving.as_deref() != Some(id),
            None => false,
        }
    }

    /// Delete is available iff the record is checked, no delete for that
    /// same id is pending or awaiting confirmation, and no delete request at
    /// all is in flight (one delete may be in flight at a time).
    pub fn delete_enabled(&self, id: &str) -> bool {
        let delete_blocked = match &self.delete {
            Some(DeleteState::Confirming(held)) => held == id,
            Some(DeleteState::InFlight(_)) => true,
            None => false,
        };
        match self.user(id) {
            Some(user) => user.checked && !delete_blocked,
            None => false,
        }
    }

    /// Drop an expired notice. Confirmation prompts never expire.
    pub fn tick(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.expired(now)) {
            self.notice = None;
        }
    }

    fn raise(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) {
        self.notice = Some(Notification::new(kind, message.into(), now));
    }

    /// Begin a full list refresh. Returns false if one is already running.
    pub fn begin_refresh(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Settle a list refresh: wholesale replacement on success, prior list
    /// kept on failure.
    pub fn finish_refresh(
        &mut self,
        result: Result<Vec<UserRecord>, DirectoryError>,
        now: Instant,
    ) {
        self.loading = false;
        match result {
            Ok(users) => {
                debug!(count = users.len(), "User list refreshed");
                self.users = users;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch users from the directory API");
                self.raise(NoticeKind::Error, messages::FETCH_FAILED, now);
            }
        }
    }

    /// Start approving a user. The caller fires the HTTP call only when this
    /// returns Ok. The guard mirrors `approve_enabled`: only the record's own
    /// pending approval blocks it, so actions on different records may race.
    pub fn request_approve(&mut self, id: &str) -> Result<(), ActionRefused> {
        let user = self.user(id).ok_or(ActionRefused::UnknownUser)?;
        if user.checked {
            return Err(ActionRefused::AlreadyChecked);
        }
        if self.approving.as_deref() == Some(id) {
            return Err(ActionRefused::RequestInFlight);
        }
        self.approving = Some(id.to_string());
        Ok(())
    }

    /// Settle an approve request. Success patches exactly that record's
    /// `checked` flag in place; failure changes nothing. Either way the
    /// pending marker is cleared so the control becomes retryable.
    pub fn finish_approve(
        &mut self,
        id: &str,
        result: Result<(), DirectoryError>,
        now: Instant,
    ) {
        if self.approving.as_deref() == Some(id) {
            self.approving = None;
        }
        match result {
            Ok(()) => {
                if let Some(user) = self.users.iter_mut().find(|u| u.id == id) {
                    user.checked = true;
                }
                self.raise(NoticeKind::Success, messages::APPROVE_SUCCESS, now);
            }
            Err(e) => {
                error!(user_id = %id, error = %e, "Approve request failed");
                self.raise(NoticeKind::Error, messages::APPROVE_FAILED, now);
            }
        }
    }

    /// Phase one of deletion: open a confirmation prompt holding the
    /// candidate id. No network call happens here. Asking for a different
    /// record while a confirmation is open replaces the candidate, the same
    /// way a new notification replaces the current one.
    pub fn request_delete(&mut self, id: &str, now: Instant) -> Result<(), ActionRefused> {
        let user = self.user(id).ok_or(ActionRefused::UnknownUser)?;
        if !user.checked {
            return Err(ActionRefused::NotYetChecked);
        }
        match &self.delete {
            Some(DeleteState::Confirming(held)) if held == id => {
                return Err(ActionRefused::ConfirmationOpen)
            }
            Some(DeleteState::InFlight(_)) => return Err(ActionRefused::RequestInFlight),
            _ => {}
        }

        let message = messages::confirm_delete(&user.full_name);
        self.delete = Some(DeleteState::Confirming(id.to_string()));
        self.raise(NoticeKind::Confirm, message, now);
        Ok(())
    }

    /// Phase two: the operator confirmed. Returns the id to delete, moving
    /// the candidate into the in-flight state; None when nothing was being
    /// confirmed.
    pub fn confirm_delete(&mut self) -> Option<String> {
        match self.delete.take() {
            Some(DeleteState::Confirming(id)) => {
                self.delete = Some(DeleteState::InFlight(id.clone()));
                self.notice = None;
                Some(id)
            }
            other => {
                self.delete = other;
                None
            }
        }
    }

    /// Discard the confirmation candidate. No network effect.
    pub fn cancel_delete(&mut self) {
        if matches!(self.delete, Some(DeleteState::Confirming(_))) {
            self.delete = None;
            self.notice = None;
        }
    }

    /// Settle a delete request. Success removes exactly that record;
    /// failure leaves the collection unchanged.
    pub fn finish_delete(&mut self, id: &str, result: Result<(), DirectoryError>, now: Instant) {
        if matches!(&self.delete, Some(DeleteState::InFlight(held)) if held == id) {
            self.delete = None;
        }
        match result {
            Ok(()) => {
                self.users.retain(|u| u.id != id);
                self.raise(NoticeKind::Success, messages::DELETE_SUCCESS, now);
            }
            Err(e) => {
                error!(user_id = %id, error = %e, "Delete request failed");
                self.raise(NoticeKind::Error, messages::DELETE_FAILED, now);
            }
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}
