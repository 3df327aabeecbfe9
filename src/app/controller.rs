use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use tracing::debug;

use crate::{
    domain::{FieldValue, FormMode, FormSchema, SelectOption},
    form::{
        DependencyResolver, FetchTicket, FormState, ListError, RemoteOptions, RemoteStatus,
        ValidationEngine, first_error_section, matches, retain_offered, section_error_counts,
        upsert, visible_fields,
    },
    navigation::{ScrollSyncNavigator, ViewportPort},
};

use super::{
    collaborators::{ReferenceSource, SubmitSink},
    options::EngineOptions,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Values were handed to the sink and the form was reset; the host
    /// should close the dialog.
    Submitted,
    /// Validation failed; errors stay in state for display.
    Rejected { errors: usize },
    /// The form is not open.
    Closed,
}

/// Orchestrates one form dialog: edits with cascading resets, mode and search,
/// scroll sync, repeatable lists, collaborator lists and submission.
pub struct FormController {
    schema: Arc<FormSchema>,
    options: EngineOptions,
    state: FormState,
    navigator: ScrollSyncNavigator,
    remote: RemoteOptions,
    sink: Box<dyn SubmitSink>,
    source: Option<Box<dyn ReferenceSource>>,
    open: bool,
}

impl FormController {
    pub fn new(schema: Arc<FormSchema>, sink: impl SubmitSink + 'static) -> Self {
        let options = EngineOptions::default();
        Self {
            state: FormState::from_schema(Arc::clone(&schema)),
            navigator: ScrollSyncNavigator::new(schema.scroll().unwrap_or(options.scroll)),
            remote: RemoteOptions::new(),
            sink: Box::new(sink),
            source: None,
            open: false,
            options,
            schema,
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.navigator = ScrollSyncNavigator::new(self.schema.scroll().unwrap_or(options.scroll));
        self.options = options;
        self
    }

    pub fn with_reference_source(mut self, source: impl ReferenceSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn schema(&self) -> &Arc<FormSchema> {
        &self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn navigator(&self) -> &ScrollSyncNavigator {
        &self.navigator
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    pub fn version(&self) -> u64 {
        self.state.version()
    }

    /// Open the dialog with schema defaults.
    pub fn open_create(&mut self) {
        self.start();
        self.open = true;
        self.request_initial_lists();
        debug!(title = ?self.schema.title(), "form opened for create");
    }

    /// Open the dialog pre-filled from an existing record.
    pub fn open_edit(&mut self, record: &Value) {
        self.start();
        self.state.hydrate(record);
        let stale = DependencyResolver::new(&self.schema).normalize(self.state.values());
        if self.state.apply_patch(stale) {
            self.state.rebase();
        }
        self.open = true;
        self.request_initial_lists();
        debug!(title = ?self.schema.title(), "form opened for edit");
    }

    /// Discard everything and close. No confirmation, no partial save.
    pub fn close(&mut self) {
        if self.open {
            debug!(dirty = self.state.is_dirty(), "form closed");
        }
        self.start();
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    /// Write a value, reset stale dependents and lapsed conditional fields,
    /// and kick off fetches for remote-backed dependents, all as one
    /// transition. Returns `false` for a closed form or an unknown field.
    pub fn set_field(&mut self, key: &str, value: impl Into<FieldValue>) -> bool {
        self.open && self.commit(key, value.into())
    }

    pub fn add_entry(&mut self, key: &str) -> Result<usize, ListError> {
        self.edit_list(key, |state| state.add_entry(key))
    }

    pub fn remove_entry(&mut self, key: &str, index: usize) -> Result<usize, ListError> {
        self.edit_list(key, |state| state.remove_entry(key, index))
    }

    pub fn set_entry(
        &mut self,
        key: &str,
        index: usize,
        entry: impl Into<String>,
    ) -> Result<(), ListError> {
        let entry = entry.into();
        self.edit_list(key, |state| state.set_entry(key, index, entry))
    }

    /// Switch between full and quick views. Values are kept; errors on fields
    /// that become hidden are dropped.
    pub fn set_mode(&mut self, mode: FormMode) {
        if !self.open || !self.state.set_mode(mode) {
            return;
        }
        let visible = self.visible_fields();
        let kept = self
            .state
            .errors()
            .iter()
            .filter(|(key, _)| visible.contains(*key))
            .map(|(key, message)| (key.clone(), message.clone()))
            .collect();
        self.state.replace_errors(kept);
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        if self.open {
            self.state.set_search_term(term);
        }
    }

    pub fn visible_fields(&self) -> IndexSet<String> {
        visible_fields(&self.schema, self.state.mode(), self.state.values())
    }

    pub fn required_fields(&self) -> IndexSet<String> {
        self.validator(&self.schema)
            .required_fields(self.state.mode(), self.state.values())
    }

    /// Fields to highlight for the current search term.
    pub fn highlighted(&self) -> IndexSet<String> {
        matches(
            self.state.search_term(),
            self.state.values(),
            &self.schema.searchable_keys(),
        )
    }

    pub fn section_error_counts(&self) -> IndexMap<String, usize> {
        section_error_counts(&self.schema, self.state.errors())
    }

    /// Options currently offered by `key`, whatever their source.
    pub fn options_for(&self, key: &str) -> &[SelectOption] {
        let Some(field) = self.schema.field(key) else {
            return &[];
        };
        if field.is_remote() {
            return self.remote.options(key);
        }
        DependencyResolver::new(&self.schema).options_for(field, self.state.values())
    }

    pub fn remote_status(&self, key: &str) -> RemoteStatus {
        self.remote.status(key)
    }

    /// Hand a collaborator response back to the form. Responses for closed
    /// forms or superseded requests are dropped. A stored value the new list
    /// does not offer is cleared, with the usual cascade.
    pub fn deliver(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<SelectOption>, String>,
    ) -> bool {
        if !self.open {
            return false;
        }
        let Some(field) = self.remote.deliver(ticket, result) else {
            return false;
        };
        if self.remote.status(&field) != RemoteStatus::Ready {
            return true;
        }
        let Some(current) = self.state.value(&field) else {
            return true;
        };
        let kept = retain_offered(current, self.remote.options(&field));
        if &kept != current {
            debug!(field = %field, "stored value missing from delivered options");
            self.commit(&field, kept);
        }
        true
    }

    /// Run validation and publish the error map. Returns `true` when clean.
    pub fn validate(&mut self) -> bool {
        let errors = self
            .validator(&self.schema)
            .validate(self.state.mode(), self.state.values());
        let clean = errors.is_empty();
        self.state.replace_errors(errors);
        clean
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.open {
            return SubmitOutcome::Closed;
        }
        if !self.validate() {
            let errors = self.state.error_count();
            debug!(errors, "submit rejected");
            if self.options.focus_first_error
                && let Some(section) = first_error_section(&self.schema, self.state.errors())
            {
                let section = section.to_string();
                self.state.set_active_section(&section);
            }
            return SubmitOutcome::Rejected { errors };
        }
        self.sink.submit(self.state.values());
        debug!("form submitted");
        self.close();
        SubmitOutcome::Submitted
    }

    pub fn on_scroll(&mut self, now: Duration) {
        if self.open {
            self.navigator.on_scroll(now);
        }
    }

    pub fn tick(&mut self, now: Duration, viewport: &impl ViewportPort) -> Option<String> {
        if !self.open {
            return None;
        }
        self.navigator.tick(now, viewport, &mut self.state)
    }

    pub fn scroll_to_section(&mut self, key: &str, viewport: &mut impl ViewportPort) -> bool {
        if !self.open {
            return false;
        }
        self.navigator
            .scroll_to_section(key, viewport, &mut self.state)
    }

    fn validator<'a>(&self, schema: &'a FormSchema) -> ValidationEngine<'a> {
        ValidationEngine::new(schema).with_format_checks(self.options.validate_formats)
    }

    fn start(&mut self) {
        self.state = FormState::from_schema(Arc::clone(&self.schema));
        self.navigator =
            ScrollSyncNavigator::new(self.schema.scroll().unwrap_or(self.options.scroll));
        self.remote.clear();
        self.open = false;
    }

    /// Write `value` together with everything it forces: stale dependents,
    /// conditional fields whose requirement lapsed and refetches for
    /// remote-backed dependents. Clearing a lapsed field can lapse another,
    /// so lapses are collected until none are left.
    fn commit(&mut self, key: &str, value: FieldValue) -> bool {
        let schema = Arc::clone(&self.schema);
        let Some(field) = schema.field(key) else {
            return false;
        };
        let resolver = DependencyResolver::new(&schema);
        let validator = self.validator(&schema);
        let mode = self.state.mode();
        let before = self.state.values().clone();
        let mut cascade = resolver.cascade(key, value.conform_to(field), &before);
        let mut after = before.clone();
        after.extend(cascade.patch.iter().cloned());

        let mut cleared = HashSet::new();
        loop {
            let lapsed: Vec<String> = validator
                .lapsed_requirements(mode, &before, &after)
                .into_iter()
                .filter(|lapsed| cleared.insert(lapsed.clone()))
                .collect();
            if lapsed.is_empty() {
                break;
            }
            for lapsed_key in lapsed {
                let Some(lapsed_field) = schema.field(&lapsed_key) else {
                    continue;
                };
                debug!(field = %lapsed_key, "requirement lapsed; clearing stored value");
                let reset = FieldValue::default_for(lapsed_field);
                let follow = resolver.cascade(&lapsed_key, reset, &after);
                for (follow_key, follow_value) in follow.patch {
                    after.insert(follow_key.clone(), follow_value.clone());
                    upsert(&mut cascade.patch, &follow_key, follow_value);
                }
                for dependent in follow.refetch {
                    if !cascade.refetch.contains(&dependent) {
                        cascade.refetch.push(dependent);
                    }
                }
            }
        }

        if !self.state.apply_patch(cascade.patch) {
            return false;
        }
        for dependent in cascade.refetch {
            self.refresh_remote(&dependent);
        }
        true
    }

    /// Run a list operation on a draft of the state, then commit the
    /// resulting list like any other write.
    fn edit_list<R>(
        &mut self,
        key: &str,
        edit: impl FnOnce(&mut FormState) -> Result<R, ListError>,
    ) -> Result<R, ListError> {
        if !self.open {
            return Err(ListError::Closed);
        }
        let mut draft = self.state.clone();
        let result = edit(&mut draft)?;
        if let Some(value) = draft.value(key).cloned() {
            self.commit(key, value);
        }
        Ok(result)
    }

    fn request_initial_lists(&mut self) {
        let remote_fields: Vec<String> = self
            .schema
            .fields()
            .iter()
            .filter(|field| field.is_remote())
            .map(|field| field.key.clone())
            .collect();
        for field in remote_fields {
            self.refresh_remote(&field);
        }
    }

    /// The dependent value and list are already cleared when the request
    /// goes out.
    fn refresh_remote(&mut self, field: &str) {
        let Some(parent) = self.schema.field(field).and_then(|f| f.parent()) else {
            return;
        };
        let parent_value = self
            .state
            .value(parent)
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string();
        let Some(request) = self.remote.begin(field, &parent_value) else {
            return;
        };
        match self.source.as_mut() {
            Some(source) => source.request(request),
            None => debug!(field, "no reference source configured; list stays loading"),
        }
    }
}

impl std::fmt::Debug for FormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("schema", &self.schema.title())
            .field("open", &self.open)
            .field("state", &self.state)
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}
