//! Application state and core logic

use crate::config::AppConfig;
use crate::error::FormError;
use crate::platform;
use crate::source::{fetch_with_timeout, CatalogSource, ConfigSource};
use crate::state::{
    AppState, FieldSpec, Focus, FormConfig, FormSession, FormType, LoadOutcome, LoadTicket,
    Notification, NotificationSink, SubmitOutcome, ToastState,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

const INVALID_OVERRIDES_MESSAGE: &str = "Invalid forms.json, using built-in forms";

/// A finished configuration fetch waiting to be applied
type LoadResult = (LoadTicket, Result<FormConfig, FormError>);

/// Main application struct
pub struct App {
    /// Form session controller
    pub session: FormSession,
    /// Focus, table selection and toasts
    pub state: AppState,
    /// Where form configurations come from
    source: Arc<dyn ConfigSource>,
    fetch_timeout: Duration,
    loads_tx: UnboundedSender<LoadResult>,
    loads_rx: UnboundedReceiver<LoadResult>,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App backed by the form catalog
    pub fn new(config: &AppConfig) -> Self {
        Self::with_catalog(CatalogSource::load(config), config)
    }

    /// Create an App from a catalog, reporting overrides it had to reject
    fn with_catalog(catalog: CatalogSource, config: &AppConfig) -> Self {
        let rejected_overrides = catalog.override_error().is_some();
        let mut app = Self::with_source(Arc::new(catalog), config);
        if rejected_overrides {
            app.state
                .toasts
                .notify(Notification::error(INVALID_OVERRIDES_MESSAGE));
        }
        app
    }

    /// Create an App with an explicit configuration source
    pub fn with_source(source: Arc<dyn ConfigSource>, config: &AppConfig) -> Self {
        let (loads_tx, loads_rx) = mpsc::unbounded_channel();
        Self {
            session: FormSession::new(config.starting_form_type()),
            state: AppState::new(ToastState::new(config.toast_duration())),
            source,
            fetch_timeout: config.fetch_timeout(),
            loads_tx,
            loads_rx,
            quit: false,
        }
    }

    /// Kick off the first configuration load
    pub fn start(&mut self) {
        let form_type = self.session.form_type();
        self.set_form_type(form_type);
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    fn quit(&mut self) {
        self.quit = true;
    }

    /// Switch to a form type, fetching its configuration in the background
    pub fn set_form_type(&mut self, form_type: FormType) {
        let ticket = self.session.begin_load(form_type);
        self.spawn_fetch(ticket);
    }

    fn spawn_fetch(&self, ticket: LoadTicket) {
        let source = Arc::clone(&self.source);
        let tx = self.loads_tx.clone();
        let timeout = self.fetch_timeout;
        tokio::spawn(async move {
            let result = fetch_with_timeout(source.as_ref(), ticket.form_type(), timeout).await;
            // Receiver only goes away when the app is shutting down
            let _ = tx.send((ticket, result));
        });
    }

    /// Apply every fetch that has finished since the last call
    pub fn poll_loads(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((ticket, result)) = self.loads_rx.try_recv() {
            self.apply_load(ticket, result);
            applied += 1;
        }
        applied
    }

    /// Wait for the next fetch to finish and apply it
    #[cfg(test)]
    pub async fn next_load(&mut self) -> Option<LoadOutcome> {
        let (ticket, result) = self.loads_rx.recv().await?;
        Some(self.apply_load(ticket, result))
    }

    fn apply_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<FormConfig, FormError>,
    ) -> LoadOutcome {
        let outcome = self
            .session
            .complete_load(ticket, result, &mut self.state.toasts);
        if outcome == LoadOutcome::Applied {
            self.clamp_focus();
        }
        outcome
    }

    /// Periodic housekeeping from the run loop
    pub fn tick(&mut self, now: Instant) {
        self.state.toasts.expire(now);
    }

    fn field_count(&self) -> usize {
        self.session.config().map_or(0, FormConfig::field_count)
    }

    fn has_entries(&self) -> bool {
        !self.session.entries().is_empty()
    }

    fn clamp_focus(&mut self) {
        self.state.focus = self
            .state
            .focus
            .clamp(self.field_count(), self.has_entries());
        self.state.clamp_selection(self.session.entries().len());
    }

    fn focus_next(&mut self) {
        self.state.focus = self.state.focus.next(self.field_count(), self.has_entries());
    }

    fn focus_prev(&mut self) {
        self.state.focus = self.state.focus.prev(self.field_count(), self.has_entries());
    }

    /// Field under the cursor, if focus is on a field
    pub fn focused_field(&self) -> Option<&FieldSpec> {
        match self.state.focus {
            Focus::Field(i) => self.session.config().and_then(|c| c.fields.get(i)),
            _ => None,
        }
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Global quit: Ctrl+C
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        if key.code == KeyCode::Esc && self.state.toasts.is_visible() {
            self.state.toasts.dismiss();
            return;
        }

        match key.code {
            // Ctrl+S works everywhere; Cmd+S as well on macOS
            KeyCode::Char('s')
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | platform::SUBMIT_MODIFIER) =>
            {
                self.submit();
                return;
            }
            KeyCode::Tab => {
                self.focus_next();
                return;
            }
            KeyCode::BackTab => {
                self.focus_prev();
                return;
            }
            _ => {}
        }

        match self.state.focus {
            Focus::FormTypeSelector => self.handle_selector_key(key),
            Focus::Field(_) => self.handle_field_key(key),
            Focus::Submit => self.handle_submit_key(key),
            Focus::Entries => self.handle_entries_key(key),
        }
    }

    fn handle_selector_key(&mut self, key: KeyEvent) {
        let current = self.session.selected_form_type();
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.set_form_type(current.prev()),
            KeyCode::Right | KeyCode::Char('l') => self.set_form_type(current.next()),
            KeyCode::Enter => self.set_form_type(current),
            KeyCode::Down => self.focus_next(),
            _ => {}
        }
    }

    fn handle_field_key(&mut self, key: KeyEvent) {
        // Inputs are hidden while a configuration is loading
        if self.session.is_loading() {
            return;
        }
        let Some(field) = self.focused_field().cloned() else {
            return;
        };
        let current = self.session.answer(&field.name).cloned().unwrap_or_default();

        if field.kind.is_dropdown() {
            let selected = current.to_string();
            let selected = (!selected.is_empty()).then_some(selected.as_str());
            match key.code {
                KeyCode::Right | KeyCode::Char(' ') => {
                    let choice = field.next_option(selected).unwrap_or_default();
                    self.session.update_field(&field.name, choice);
                }
                KeyCode::Left => {
                    let choice = field.prev_option(selected).unwrap_or_default();
                    self.session.update_field(&field.name, choice);
                }
                KeyCode::Up => self.focus_prev(),
                KeyCode::Down | KeyCode::Enter => self.focus_next(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(c)
                if field.kind.accepts_char(c)
                    && !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.session.update_field(&field.name, current.with_char(c));
            }
            KeyCode::Backspace => {
                self.session
                    .update_field(&field.name, current.without_last_char());
            }
            KeyCode::Up => self.focus_prev(),
            KeyCode::Down | KeyCode::Enter => self.focus_next(),
            _ => {}
        }
    }

    fn handle_submit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.submit(),
            KeyCode::Up => self.focus_prev(),
            KeyCode::Down => self.focus_next(),
            _ => {}
        }
    }

    fn handle_entries_key(&mut self, key: KeyEvent) {
        let count = self.session.entries().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.state.move_selection_up(),
            KeyCode::Down | KeyCode::Char('j') => self.state.move_selection_down(count),
            KeyCode::Char('e') | KeyCode::Enter => self.edit_selected_entry(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected_entry(),
            _ => {}
        }
    }

    /// Submit the current answers
    pub fn submit(&mut self) {
        if self.session.is_loading() {
            return;
        }
        match self.session.submit(&mut self.state.toasts) {
            Ok(SubmitOutcome::Created(_)) => {
                self.state.selected_entry = self.session.entries().len().saturating_sub(1);
                self.state.focus = Focus::FormTypeSelector.next(self.field_count(), true);
            }
            Ok(SubmitOutcome::Updated(id)) => {
                if let Some(index) = self.session.entries().iter().position(|e| e.id == id) {
                    self.state.selected_entry = index;
                }
                self.state.focus = Focus::Entries;
            }
            Err(FormError::Validation { missing }) => {
                let first_missing = missing.first().and_then(|name| {
                    self.session.config().and_then(|c| c.index_of(name))
                });
                if let Some(index) = first_missing {
                    self.state.focus = Focus::Field(index);
                }
            }
            Err(_) => {}
        }
    }

    fn selected_entry_id(&self) -> Option<String> {
        self.session
            .entries()
            .get(self.state.selected_entry)
            .map(|e| e.id.clone())
    }

    /// Load the highlighted entry back into the form
    pub fn edit_selected_entry(&mut self) {
        let Some(id) = self.selected_entry_id() else {
            return;
        };
        match self.session.edit_entry(&id, &mut self.state.toasts) {
            Ok(ticket) => {
                self.spawn_fetch(ticket);
                self.state.focus = Focus::Field(0);
            }
            Err(err) => self
                .state
                .toasts
                .notify(Notification::error(err.user_message())),
        }
    }

    /// Delete the highlighted entry
    pub fn delete_selected_entry(&mut self) {
        let Some(id) = self.selected_entry_id() else {
            return;
        };
        self.session.delete_entry(&id, &mut self.state.toasts);
        self.clamp_focus();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockConfigSource;
    use crate::state::{FieldValue, LoadState, NotificationKind};
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;

    fn contact_config() -> FormConfig {
        FormConfig::new(vec![
            FieldSpec::text("name", "Name", true),
            FieldSpec::input("number", "age", "Age", false),
            FieldSpec::dropdown("plan", "Plan", true, &["Free", "Pro"]),
        ])
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn mock_source() -> MockConfigSource {
        let mut source = MockConfigSource::new();
        source
            .expect_fetch_form_config()
            .returning(|_| Ok(contact_config()));
        source
    }

    fn test_app(source: MockConfigSource) -> App {
        let config = AppConfig {
            default_form_type: Some(FormType::UserInfo),
            ..Default::default()
        };
        App::with_source(Arc::new(source), &config)
    }

    async fn loaded_app() -> App {
        let mut app = test_app(mock_source());
        app.start();
        assert_eq!(app.next_load().await, Some(LoadOutcome::Applied));
        app
    }

    #[test]
    fn test_should_quit_initially_false() {
        let mut app = test_app(MockConfigSource::new());
        assert!(!app.should_quit());
        app.handle_key(ctrl('c'));
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_start_loads_configuration() {
        let app = loaded_app().await;
        assert_eq!(app.session.load_state(), LoadState::Ready);
        assert_eq!(app.session.config(), Some(&contact_config()));
    }

    #[tokio::test]
    async fn test_failed_load_shows_error_toast() {
        let mut source = MockConfigSource::new();
        source
            .expect_fetch_form_config()
            .returning(|_| Err(anyhow!("offline")));
        let mut app = test_app(source);
        app.start();

        let outcome = app.next_load().await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Failed(FormError::ConfigFetch { .. })));
        let toast = app.state.toasts.current().unwrap();
        assert_eq!(toast.kind, NotificationKind::Error);
        assert_eq!(toast.message, "Failed to load form configuration");
    }

    #[tokio::test]
    async fn test_rapid_switching_applies_latest_only() {
        let mut source = MockConfigSource::new();
        source
            .expect_fetch_form_config()
            .returning(|form_type| {
                let label = form_type.label();
                Ok(FormConfig::new(vec![FieldSpec::text("title", label, true)]))
            });
        let mut app = test_app(source);
        app.set_form_type(FormType::Address);
        app.set_form_type(FormType::Payment);

        let mut outcomes = vec![app.next_load().await.unwrap(), app.next_load().await.unwrap()];
        outcomes.sort_by_key(|o| *o != LoadOutcome::Applied);

        assert_eq!(outcomes, vec![LoadOutcome::Applied, LoadOutcome::Stale]);
        assert_eq!(app.session.form_type(), FormType::Payment);
        assert_eq!(
            app.session.config().unwrap().fields[0].label,
            "Payment Information"
        );
    }

    #[tokio::test]
    async fn test_selector_keys_switch_form_type() {
        let mut app = loaded_app().await;
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.requested_form_type(), FormType::Address);
        assert!(app.session.is_loading());

        app.next_load().await;
        assert_eq!(app.session.form_type(), FormType::Address);

        app.handle_key(key(KeyCode::Left));
        app.next_load().await;
        assert_eq!(app.session.form_type(), FormType::UserInfo);
    }

    #[tokio::test]
    async fn test_selector_moves_from_active_form_after_failed_switch() {
        let mut source = MockConfigSource::new();
        source
            .expect_fetch_form_config()
            .returning(|form_type| match form_type {
                FormType::Payment => Err(anyhow!("offline")),
                _ => Ok(contact_config()),
            });
        let mut app = test_app(source);
        app.start();
        app.next_load().await;

        app.handle_key(key(KeyCode::Left));
        app.next_load().await;
        assert_eq!(app.session.selected_form_type(), FormType::UserInfo);

        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.requested_form_type(), FormType::Address);
    }

    #[tokio::test]
    async fn test_typing_updates_focused_field() {
        let mut app = loaded_app().await;
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state.focus, Focus::Field(0));

        type_text(&mut app, "Adx");
        app.handle_key(key(KeyCode::Backspace));
        type_text(&mut app, "a");

        assert_eq!(app.session.answer("name"), Some(&FieldValue::from("Ada")));
    }

    #[tokio::test]
    async fn test_number_field_ignores_letters() {
        let mut app = loaded_app().await;
        app.state.focus = Focus::Field(1);
        type_text(&mut app, "4x2");
        assert_eq!(app.session.answer("age"), Some(&FieldValue::from("42")));
    }

    #[tokio::test]
    async fn test_dropdown_cycles_options() {
        let mut app = loaded_app().await;
        app.state.focus = Focus::Field(2);

        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.answer("plan"), Some(&FieldValue::from("Free")));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.answer("plan"), Some(&FieldValue::from("Pro")));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.answer("plan"), Some(&FieldValue::from("")));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.session.answer("plan"), Some(&FieldValue::from("Pro")));
    }

    #[tokio::test]
    async fn test_submit_with_missing_fields_focuses_first_error() {
        let mut app = loaded_app().await;
        app.state.focus = Focus::Field(0);
        type_text(&mut app, "Ada");

        app.handle_key(ctrl('s'));

        assert!(app.session.entries().is_empty());
        assert_eq!(app.state.focus, Focus::Field(2));
        assert_eq!(
            app.session.errors().get("plan").map(String::as_str),
            Some("Plan is required")
        );
        assert_eq!(
            app.state.toasts.current().unwrap().message,
            "Please fill in all required fields"
        );
    }

    #[tokio::test]
    async fn test_submit_button_creates_entry() {
        let mut app = loaded_app().await;
        app.session.update_field("name", "Ada");
        app.session.update_field("plan", "Pro");
        app.state.focus = Focus::Submit;

        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.session.entries().len(), 1);
        assert!(app.session.answers().is_empty());
        assert_eq!(app.state.focus, Focus::Field(0));
        assert_eq!(
            app.state.toasts.current().unwrap().message,
            "Form submitted successfully!"
        );
    }

    #[tokio::test]
    async fn test_input_ignored_while_loading() {
        let mut app = loaded_app().await;
        app.state.focus = Focus::Field(0);
        app.set_form_type(FormType::Address);

        type_text(&mut app, "x");
        app.submit();

        assert!(app.session.answers().is_empty());
        assert!(app.session.entries().is_empty());
    }

    #[tokio::test]
    async fn test_edit_and_resubmit_updates_entry() {
        let mut app = loaded_app().await;
        app.session.update_field("name", "Ada");
        app.session.update_field("plan", "Pro");
        app.submit();
        let id = app.session.entries()[0].id.clone();

        app.state.focus = Focus::Entries;
        app.handle_key(key(KeyCode::Char('e')));
        assert_eq!(app.state.toasts.current().unwrap().message, "Edit mode activated");
        assert_eq!(app.next_load().await, Some(LoadOutcome::Applied));
        assert_eq!(app.session.answer("name"), Some(&FieldValue::from("Ada")));

        type_text(&mut app, " L");
        app.handle_key(ctrl('s'));

        assert_eq!(app.session.entries().len(), 1);
        assert_eq!(app.session.entries()[0].id, id);
        assert_eq!(
            app.session.entries()[0].value("name"),
            Some(&FieldValue::from("Ada L"))
        );
        assert_eq!(app.state.focus, Focus::Entries);
    }

    #[tokio::test]
    async fn test_delete_selected_entry_moves_focus_when_list_empties() {
        let mut app = loaded_app().await;
        app.session.update_field("name", "Ada");
        app.session.update_field("plan", "Pro");
        app.submit();

        app.state.focus = Focus::Entries;
        app.handle_key(key(KeyCode::Char('d')));

        assert!(app.session.entries().is_empty());
        assert_eq!(app.state.focus, Focus::Submit);
        assert_eq!(
            app.state.toasts.current().unwrap().message,
            "Entry deleted successfully"
        );
    }

    #[tokio::test]
    async fn test_entries_navigation() {
        let mut app = loaded_app().await;
        for name in ["A", "B", "C"] {
            app.session.update_field("name", name);
            app.session.update_field("plan", "Free");
            app.submit();
        }
        assert_eq!(app.state.selected_entry, 2);

        app.state.focus = Focus::Entries;
        app.handle_key(key(KeyCode::Char('k')));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.state.selected_entry, 0);
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.state.selected_entry, 1);
    }

    #[tokio::test]
    async fn test_esc_dismisses_toast() {
        let mut app = loaded_app().await;
        app.submit();
        assert!(app.state.toasts.is_visible());
        app.handle_key(key(KeyCode::Esc));
        assert!(!app.state.toasts.is_visible());
    }

    #[tokio::test]
    async fn test_tab_cycles_focus() {
        let mut app = loaded_app().await;
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.state.focus, Focus::Submit);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state.focus, Focus::FormTypeSelector);
    }

    #[tokio::test]
    async fn test_poll_loads_drains_channel() {
        let mut app = test_app(mock_source());
        app.start();
        tokio::task::yield_now().await;
        // The spawned fetch needs a moment to run on the test runtime
        for _ in 0..10 {
            if app.poll_loads() > 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(app.session.load_state(), LoadState::Ready);
    }

    #[test]
    fn test_broken_form_overrides_do_not_stop_startup() {
        let path = std::env::temp_dir().join(format!("formdeck-app-forms-{}.json", std::process::id()));
        std::fs::write(&path, "{not json").unwrap();
        let catalog = CatalogSource::builtin().with_overrides(&path);
        std::fs::remove_file(&path).unwrap();

        let app = App::with_catalog(catalog, &AppConfig::default());

        let toast = app.state.toasts.current().unwrap();
        assert_eq!(toast.kind, NotificationKind::Error);
        assert_eq!(toast.message, "Invalid forms.json, using built-in forms");
        assert!(!app.should_quit());
    }

    #[tokio::test]
    async fn test_builtin_catalog_loads_after_rejected_overrides() {
        let path = std::env::temp_dir().join(format!("formdeck-app-dupes-{}.json", std::process::id()));
        let json = r#"{"userInfo":{"fields":[
            {"name":"email","type":"email","label":"Email"},
            {"name":"email","type":"text","label":"Email again"}
        ]}}"#;
        std::fs::write(&path, json).unwrap();
        let catalog = CatalogSource::builtin().with_overrides(&path);
        std::fs::remove_file(&path).unwrap();
        let config = AppConfig {
            default_form_type: Some(FormType::UserInfo),
            ..Default::default()
        };

        let mut app = App::with_catalog(catalog, &config);
        app.start();

        assert_eq!(app.next_load().await, Some(LoadOutcome::Applied));
        let config = app.session.config().unwrap();
        assert!(config.contains("firstName"));
        assert_eq!(config.index_of("email"), Some(2));
    }

    #[test]
    fn test_tick_expires_toast() {
        let config = AppConfig {
            toast_duration_ms: Some(10),
            ..Default::default()
        };
        let mut app = App::with_source(Arc::new(MockConfigSource::new()), &config);
        app.session.delete_entry("missing", &mut app.state.toasts);
        assert!(app.state.toasts.is_visible());

        app.tick(Instant::now() + Duration::from_millis(20));
        assert!(!app.state.toasts.is_visible());
    }
}
