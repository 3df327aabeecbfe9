use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::domain::{ErrorMap, FieldValue, FormMode, FormSchema, Values};

/// Mutable state of one open form: values, inline errors, navigation and
/// search metadata.
///
/// Every mutation goes through a method here and bumps [`FormState::version`]
/// exactly once, so a multi-field update (a parent edit plus its cascading
/// resets) is observed as a single transition.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Arc<FormSchema>,
    values: Values,
    errors: ErrorMap,
    active_section: String,
    search_term: String,
    mode: FormMode,
    baseline: Values,
    version: u64,
}

impl FormState {
    pub fn from_schema(schema: Arc<FormSchema>) -> Self {
        let baseline = schema.default_values();
        let active_section = schema.first_section().key.clone();
        Self {
            values: baseline.clone(),
            errors: ErrorMap::new(),
            active_section,
            search_term: String::new(),
            mode: FormMode::default(),
            baseline,
            version: 0,
            schema,
        }
    }

    pub fn schema(&self) -> &Arc<FormSchema> {
        &self.schema
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn active_section(&self) -> &str {
        &self.active_section
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Values differ from the defaults (or the hydrated record).
    pub fn is_dirty(&self) -> bool {
        self.values != self.baseline
    }

    /// Replace one value and drop its error. Unknown keys are ignored.
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> bool {
        self.apply_patch(vec![(key.to_string(), value)])
    }

    /// Apply several writes as one transition. Each value is first shaped to
    /// its field's kind and padded to the list minimum. Nothing is written
    /// unless every key is declared and no collection exceeds its maximum.
    pub fn apply_patch(&mut self, patch: Vec<(String, FieldValue)>) -> bool {
        if patch.is_empty() {
            return false;
        }
        let mut writes = Vec::with_capacity(patch.len());
        for (key, value) in patch {
            let Some(field) = self.schema.field(&key) else {
                debug!(field = %key, "ignoring write to undeclared field");
                return false;
            };
            let value = value.conform_to(field);
            let max = field.list_bounds().max;
            if field.kind.is_collection()
                && let Some(items) = value.as_list()
                && items.len() > max
            {
                debug!(field = %key, max, "rejecting write over the entry limit");
                return false;
            }
            writes.push((key, value));
        }
        for (key, value) in writes {
            trace!(field = %key, %value, "field updated");
            self.errors.shift_remove(&key);
            self.values.insert(key, value);
        }
        self.bump();
        true
    }

    /// Mutate a value in place, e.g. one slot of a repeatable list. An edit
    /// that returns `None` changed nothing and leaves the state untouched.
    pub(crate) fn update_field<R>(
        &mut self,
        key: &str,
        edit: impl FnOnce(&mut FieldValue) -> Option<R>,
    ) -> Option<R> {
        let result = edit(self.values.get_mut(key)?)?;
        self.errors.shift_remove(key);
        self.bump();
        Some(result)
    }

    /// Restore defaults (or the hydrated record), clear errors and search,
    /// and jump back to the first section.
    pub fn reset_to_initial(&mut self) {
        self.values = self.baseline.clone();
        self.errors.clear();
        self.active_section = self.schema.first_section().key.clone();
        self.search_term.clear();
        self.bump();
    }

    /// Seed the form from an existing record. Keys matching a declared field
    /// replace its default; everything else keeps the schema default. The
    /// hydrated values become the baseline for [`FormState::reset_to_initial`].
    pub fn hydrate(&mut self, record: &Value) {
        let mut baseline = self.schema.default_values();
        if let Some(map) = record.as_object() {
            for (key, raw) in map {
                let Some(field) = self.schema.field(key) else {
                    debug!(field = %key, "record field has no schema counterpart");
                    continue;
                };
                let mut value = FieldValue::from_json(raw, field.kind);
                value.pad_to(field.list_bounds().min);
                baseline.insert(key.clone(), value);
            }
        } else {
            debug!("hydration record is not an object; keeping defaults");
        }
        self.baseline = baseline;
        self.reset_to_initial();
    }

    /// Make the current values the reset target, e.g. after hydration was
    /// normalized.
    pub(crate) fn rebase(&mut self) {
        self.baseline = self.values.clone();
    }

    pub fn set_error(&mut self, key: &str, message: impl Into<String>) -> bool {
        if !self.schema.contains_field(key) {
            return false;
        }
        self.errors.insert(key.to_string(), message.into());
        self.bump();
        true
    }

    pub fn clear_error(&mut self, key: &str) -> bool {
        let removed = self.errors.shift_remove(key).is_some();
        if removed {
            self.bump();
        }
        removed
    }

    /// Replace the whole error map; entries for undeclared keys are dropped.
    pub fn replace_errors(&mut self, errors: ErrorMap) {
        self.errors = errors
            .into_iter()
            .filter(|(key, _)| self.schema.contains_field(key))
            .collect();
        self.bump();
    }

    pub fn clear_errors(&mut self) {
        if !self.errors.is_empty() {
            self.errors.clear();
            self.bump();
        }
    }

    /// Returns `true` when the active section actually changed.
    pub fn set_active_section(&mut self, key: &str) -> bool {
        if self.active_section == key || self.schema.section(key).is_none() {
            return false;
        }
        self.active_section = key.to_string();
        self.bump();
        true
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.bump();
    }

    pub fn set_mode(&mut self, mode: FormMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.bump();
        true
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}
