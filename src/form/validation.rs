use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;

use crate::domain::{
    ErrorMap, FieldDefinition, FieldKind, FieldValue, FormMode, FormSchema, Values,
};

use super::visibility::{is_visible, visible_fields};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .expect("email pattern compiles")
});

/// Decides which fields are required and produces the inline error map.
///
/// Validation never fails as an operation: an empty map is success.
#[derive(Debug, Clone, Copy)]
pub struct ValidationEngine<'a> {
    schema: &'a FormSchema,
    check_formats: bool,
}

impl<'a> ValidationEngine<'a> {
    pub fn new(schema: &'a FormSchema) -> Self {
        Self {
            schema,
            check_formats: true,
        }
    }

    pub fn with_format_checks(mut self, enabled: bool) -> Self {
        self.check_formats = enabled;
        self
    }

    /// Base requirements of `mode` plus every conditional requirement that
    /// currently holds, restricted to visible fields.
    pub fn required_fields(&self, mode: FormMode, values: &Values) -> IndexSet<String> {
        let visible = visible_fields(self.schema, mode, values);
        self.schema
            .fields()
            .iter()
            .filter(|field| visible.contains(&field.key))
            .filter(|field| {
                let base = match mode {
                    FormMode::Quick => self.schema.quick_mode_fields().contains(&field.key),
                    FormMode::Full => field.required,
                };
                base || field.required_when.evaluate(mode, values)
            })
            .map(|field| field.key.clone())
            .collect()
    }

    pub fn validate(&self, mode: FormMode, values: &Values) -> ErrorMap {
        let required = self.required_fields(mode, values);
        let mut errors = ErrorMap::new();
        for field in self.schema.fields() {
            let value = values.get(&field.key);
            let blank = value.is_none_or(FieldValue::is_blank);
            if required.contains(&field.key) && blank {
                errors.insert(field.key.clone(), required_message(field));
                continue;
            }
            let hidden = !is_visible(self.schema, field, mode, values);
            if !self.check_formats || blank || hidden {
                continue;
            }
            if let Some(message) = value.and_then(|value| format_error(field, value)) {
                errors.insert(field.key.clone(), message);
            }
        }
        errors
    }

    /// Conditionally-required fields whose condition held for `before` but no
    /// longer holds for `after`. Their values and errors must be cleared.
    pub fn lapsed_requirements(
        &self,
        mode: FormMode,
        before: &Values,
        after: &Values,
    ) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .filter(|field| field.is_conditionally_required())
            .filter(|field| {
                let condition = &field.required_when;
                condition.evaluate(mode, before) && !condition.evaluate(mode, after)
            })
            .map(|field| field.key.clone())
            .collect()
    }
}

fn required_message(field: &FieldDefinition) -> String {
    if field.kind.is_collection() {
        format!("{} needs at least one entry", field.label)
    } else {
        format!("{} is required", field.label)
    }
}

fn format_error(field: &FieldDefinition, value: &FieldValue) -> Option<String> {
    let text = value.as_text()?.trim();
    match field.kind {
        FieldKind::Email if !EMAIL_PATTERN.is_match(text) => {
            Some(format!("{} must be a valid email address", field.label))
        }
        FieldKind::Number if text.parse::<f64>().is_err() => {
            Some(format!("{} must be a number", field.label))
        }
        _ => None,
    }
}

/// Error counts per section, for navigation badges. Sections without errors
/// are omitted.
pub fn section_error_counts(schema: &FormSchema, errors: &ErrorMap) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for section in schema.sections() {
        let count = schema
            .fields_in_section(&section.key)
            .filter(|field| errors.contains_key(&field.key))
            .count();
        if count > 0 {
            counts.insert(section.key.clone(), count);
        }
    }
    counts
}

/// The first section, in navigation order, holding an error.
pub fn first_error_section<'a>(schema: &'a FormSchema, errors: &ErrorMap) -> Option<&'a str> {
    schema
        .sections()
        .iter()
        .find(|section| {
            schema
                .fields_in_section(&section.key)
                .any(|field| errors.contains_key(&field.key))
        })
        .map(|section| section.key.as_str())
}
