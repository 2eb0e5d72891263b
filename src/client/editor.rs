use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::api::NoteApi;
use super::session::{EditorSession, Snapshot};
use crate::error::{NotesError, Result};

/// Result of asking the editor to save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// This call sent the save (and any that queued behind it).
    Saved,
    /// Another save was in flight; this one was queued behind it,
    /// replacing any older queued save. The queued save is dropped if the
    /// in-flight one fails. Its edits stay in the session, which remains
    /// dirty, so the next save or autosave tick sends them.
    Queued,
    /// The session was clean or unnamed.
    NothingToSave,
}

#[derive(Debug, Default)]
struct Flight {
    in_flight: bool,
    queued: Option<Snapshot>,
}

/// Clears the flight when a save ends early: on error, or when the future
/// driving it is dropped mid-request.
struct FlightGuard<'a> {
    flight: &'a Mutex<Flight>,
    armed: bool,
}

impl FlightGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut flight = self.flight.lock().unwrap_or_else(PoisonError::into_inner);
            flight.in_flight = false;
            flight.queued = None;
        }
    }
}

/// An editor session bound to a backend.
///
/// At most one save request is outstanding at a time. Manual saves and
/// autosave ticks share the same guard, so an older snapshot can never land
/// after a newer one.
pub struct Editor<A> {
    api: A,
    session: Mutex<EditorSession>,
    flight: Mutex<Flight>,
}

impl<A: NoteApi> Editor<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            session: Mutex::new(EditorSession::new()),
            flight: Mutex::new(Flight::default()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the current session.
    pub fn session(&self) -> EditorSession {
        self.lock_session().clone()
    }

    /// Apply an edit to the session.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut EditorSession) -> R) -> R {
        f(&mut self.lock_session())
    }

    pub fn is_saving(&self) -> bool {
        self.lock_flight().in_flight
    }

    fn lock_session(&self) -> MutexGuard<'_, EditorSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_flight(&self) -> MutexGuard<'_, Flight> {
        self.flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Save the current document if it is dirty.
    pub async fn save(&self) -> Result<SaveOutcome> {
        let pending = self.lock_session().pending();
        match pending {
            Some(snapshot) => self.submit(snapshot).await,
            None => Ok(SaveOutcome::NothingToSave),
        }
    }

    async fn submit(&self, snapshot: Snapshot) -> Result<SaveOutcome> {
        {
            let mut flight = self.lock_flight();
            if flight.in_flight {
                flight.queued = Some(snapshot);
                return Ok(SaveOutcome::Queued);
            }
            flight.in_flight = true;
        }
        let mut guard = FlightGuard {
            flight: &self.flight,
            armed: true,
        };

        let mut next = snapshot;
        loop {
            self.api.save(&next.name, &next.content).await?;
            self.lock_session().saved(&next);
            debug!(note = %next.name, "saved");

            let queued = {
                let mut flight = self.lock_flight();
                match flight.queued.take() {
                    Some(queued) => queued,
                    None => {
                        flight.in_flight = false;
                        guard.disarm();
                        return Ok(SaveOutcome::Saved);
                    }
                }
            };
            next = queued;
        }
    }

    /// One autosave attempt. Failures are logged and otherwise ignored.
    pub async fn autosave_tick(&self) -> Option<SaveOutcome> {
        if !self.lock_session().can_save() {
            return None;
        }
        match self.save().await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                debug!(error = %e, "autosave failed");
                None
            }
        }
    }

    /// Autosave every `period` until `cancel` fires.
    pub async fn run_autosave(&self, period: Duration, cancel: CancellationToken) {
        self.run_autosave_with(period, cancel, |_| {}).await
    }

    /// Like [`run_autosave`](Self::run_autosave), calling `before_tick` on the
    /// session ahead of each attempt.
    pub async fn run_autosave_with<F>(&self, period: Duration, cancel: CancellationToken, mut before_tick: F)
    where
        F: FnMut(&mut EditorSession) + Send,
    {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.with_session(&mut before_tick);
                    self.autosave_tick().await;
                }
            }
        }
        info!("autosave stopped");
    }

    /// Load a note into the session.
    ///
    /// Unsaved changes to the current note are saved first. If that save
    /// fails, or can only be queued behind another one, the open is abandoned
    /// and the session is left as it was.
    pub async fn open(&self, name: &str) -> Result<()> {
        let current = self.lock_session().name().to_string();
        match self.save().await? {
            SaveOutcome::Queued => return Err(NotesError::UnsavedChanges(current)),
            SaveOutcome::Saved | SaveOutcome::NothingToSave => {}
        }
        let content = self.api.open(name).await?;
        self.lock_session().opened(name, content);
        Ok(())
    }

    /// Rename the current note. A blank or unchanged name is a no-op.
    pub async fn rename(&self, new_name: &str) -> Result<()> {
        let old_name = self.lock_session().name().to_string();
        if old_name.is_empty() {
            return Err(NotesError::MissingName);
        }
        let new_name = new_name.trim();
        if new_name.is_empty() || new_name == old_name {
            return Ok(());
        }
        self.api.rename(&old_name, new_name).await?;
        self.lock_session().renamed(new_name);
        Ok(())
    }

    /// Delete the current note and start an empty session.
    pub async fn delete(&self) -> Result<()> {
        let name = self.lock_session().name().to_string();
        if name.is_empty() {
            return Err(NotesError::MissingName);
        }
        self.api.delete(&name).await?;
        *self.lock_session() = EditorSession::new();
        Ok(())
    }

    /// Upload an image and return the Markdown reference for it.
    pub async fn attach_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let url = self.api.upload_image(file_name, bytes).await?;
        Ok(format!("![{}]({})", file_name, url))
    }
}
