//! Form session controller
//!
//! Owns the active form configuration, the in-progress answers, validation
//! errors and committed entries. Loading a configuration is split into
//! [`FormSession::begin_load`] and [`FormSession::complete_load`] so the fetch
//! itself can run elsewhere; each load is tagged with a token and only the
//! most recent one is ever applied.

use super::field::FieldValue;
use super::form_state::{AnswerMap, Entry, ErrorMap, FormConfig};
use crate::error::FormError;
use crate::state::{FormType, Notification, NotificationSink};
use chrono::Utc;

/// Handle for one in-flight configuration load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    token: u64,
    form_type: FormType,
}

impl LoadTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn form_type(&self) -> FormType {
        self.form_type
    }
}

/// Configuration loading lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading(LoadTicket),
    Ready,
    LoadFailed(FormType),
}

/// Result of handing a finished fetch to the session
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied,
    Failed(FormError),
    /// A newer load was requested after this one; the result was dropped
    Stale,
}

/// What a successful submit did to the entry list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(String),
    Updated(String),
}

impl SubmitOutcome {
    pub fn entry_id(&self) -> &str {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

/// Entry values waiting for their form configuration to arrive
#[derive(Debug, Clone)]
struct PendingEdit {
    token: u64,
    entry_id: String,
    seed: AnswerMap,
}

/// Per-session form state owner
#[derive(Debug, Default)]
pub struct FormSession {
    form_type: FormType,
    config: Option<FormConfig>,
    answers: AnswerMap,
    errors: ErrorMap,
    entries: Vec<Entry>,
    load_state: LoadState,
    last_token: u64,
    pending_edit: Option<PendingEdit>,
    editing: Option<String>,
}

impl FormSession {
    pub fn new(form_type: FormType) -> Self {
        Self {
            form_type,
            ..Default::default()
        }
    }

    /// Form type of the active configuration
    pub fn form_type(&self) -> FormType {
        self.form_type
    }

    /// Form type the user last asked for, even if still loading
    pub fn requested_form_type(&self) -> FormType {
        match self.load_state {
            LoadState::Loading(ticket) => ticket.form_type,
            LoadState::LoadFailed(form_type) => form_type,
            LoadState::Idle | LoadState::Ready => self.form_type,
        }
    }

    /// Form type the selector shows; a failed switch falls back to the active form
    pub fn selected_form_type(&self) -> FormType {
        match self.load_state {
            LoadState::LoadFailed(_) => self.form_type,
            _ => self.requested_form_type(),
        }
    }

    pub fn config(&self) -> Option<&FormConfig> {
        self.config.as_ref()
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn answer(&self, name: &str) -> Option<&FieldValue> {
        self.answers.get(name)
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load_state, LoadState::Loading(_))
    }

    /// Id of the entry the next submit will replace
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Start loading the configuration for `form_type`.
    ///
    /// Any earlier in-flight load becomes stale and edit mode is dropped.
    pub fn begin_load(&mut self, form_type: FormType) -> LoadTicket {
        self.last_token += 1;
        let ticket = LoadTicket {
            token: self.last_token,
            form_type,
        };
        self.load_state = LoadState::Loading(ticket);
        self.pending_edit = None;
        self.editing = None;
        tracing::debug!("Loading {form_type} configuration (token {})", ticket.token());
        ticket
    }

    /// Apply the result of a fetch started by [`FormSession::begin_load`]
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<FormConfig, FormError>,
        sink: &mut dyn NotificationSink,
    ) -> LoadOutcome {
        if self.load_state != LoadState::Loading(ticket) {
            tracing::debug!(
                "Discarding stale {} configuration (token {})",
                ticket.form_type,
                ticket.token
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(config) => {
                self.answers = match self.pending_edit.take() {
                    Some(edit) if edit.token == ticket.token => {
                        self.editing = Some(edit.entry_id);
                        edit.seed
                            .into_iter()
                            .filter(|(name, _)| config.contains(name))
                            .collect()
                    }
                    _ => AnswerMap::new(),
                };
                self.errors.clear();
                self.form_type = ticket.form_type;
                self.config = Some(config);
                self.load_state = LoadState::Ready;
                tracing::info!("Loaded {} configuration", ticket.form_type);
                LoadOutcome::Applied
            }
            Err(err) => {
                tracing::warn!("Configuration load failed: {err}");
                self.pending_edit = None;
                self.load_state = LoadState::LoadFailed(ticket.form_type);
                sink.notify(Notification::error(err.user_message()));
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Record an answer, clearing any error shown for that field
    pub fn update_field(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.answers.insert(name.to_string(), value.into());
        self.errors.remove(name);
    }

    fn is_answered(&self, name: &str) -> bool {
        self.answers.get(name).is_some_and(FieldValue::is_truthy)
    }

    /// Percentage of required fields answered.
    ///
    /// A form without required fields is complete (100); no form is 0.
    pub fn progress(&self) -> f64 {
        let Some(config) = &self.config else {
            return 0.0;
        };
        let (required, answered) = config
            .required_fields()
            .fold((0usize, 0usize), |(required, answered), field| {
                let hit = usize::from(self.is_answered(&field.name));
                (required + 1, answered + hit)
            });
        if required == 0 {
            return 100.0;
        }
        answered as f64 / required as f64 * 100.0
    }

    /// Recompute the error map; true when every required field is answered
    pub fn validate(&mut self) -> bool {
        let Some(config) = &self.config else {
            return false;
        };
        let errors: ErrorMap = config
            .required_fields()
            .filter(|field| !self.is_answered(&field.name))
            .map(|field| (field.name.clone(), format!("{} is required", field.label)))
            .collect();
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate and commit the current answers as an entry
    pub fn submit(
        &mut self,
        sink: &mut dyn NotificationSink,
    ) -> Result<SubmitOutcome, FormError> {
        if self.config.is_none() {
            let err = FormError::NoActiveForm;
            sink.notify(Notification::error(err.user_message()));
            return Err(err);
        }

        if !self.validate() {
            let err = FormError::Validation {
                missing: self.errors.keys().cloned().collect(),
            };
            sink.notify(Notification::error(err.user_message()));
            return Err(err);
        }

        let values = std::mem::take(&mut self.answers);
        let edited = self
            .editing
            .take()
            .and_then(|id| self.entries.iter().position(|e| e.id == id));

        let outcome = match edited {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.values = values;
                entry.form_type = self.form_type;
                entry.timestamp = Utc::now().timestamp_millis();
                sink.notify(Notification::success("Entry updated successfully!"));
                SubmitOutcome::Updated(entry.id.clone())
            }
            None => {
                let mut entry = Entry::new(self.form_type, values);
                while self.entries.iter().any(|e| e.id == entry.id) {
                    entry.id = Entry::new(self.form_type, AnswerMap::new()).id;
                }
                let id = entry.id.clone();
                self.entries.push(entry);
                sink.notify(Notification::success("Form submitted successfully!"));
                SubmitOutcome::Created(id)
            }
        };

        tracing::info!(
            "Submitted {} entry {} ({} total)",
            self.form_type,
            outcome.entry_id(),
            self.entries.len()
        );
        Ok(outcome)
    }

    /// Reload the entry's form and seed it with the entry's values once loaded.
    ///
    /// The next successful submit replaces that entry in place.
    pub fn edit_entry(
        &mut self,
        id: &str,
        sink: &mut dyn NotificationSink,
    ) -> Result<LoadTicket, FormError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| FormError::EntryNotFound(id.to_string()))?;

        let ticket = self.begin_load(entry.form_type);
        self.pending_edit = Some(PendingEdit {
            token: ticket.token,
            entry_id: entry.id,
            seed: entry.values,
        });
        sink.notify(Notification::info("Edit mode activated"));
        Ok(ticket)
    }

    /// Remove an entry by id; returns whether anything was removed
    pub fn delete_entry(&mut self, id: &str, sink: &mut dyn NotificationSink) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;

        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        if self.pending_edit.as_ref().is_some_and(|p| p.entry_id == id) {
            self.pending_edit = None;
        }

        if removed {
            tracing::info!("Deleted entry {id}");
        }
        sink.notify(Notification::success("Entry deleted successfully"));
        removed
    }
}
