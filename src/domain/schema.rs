use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::navigation::ScrollConfig;

use super::condition::Condition;

/// Upper bound on repeatable entries when a field declares no `list.max`.
pub const DEFAULT_MAX_ENTRIES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    #[default]
    Full,
    Quick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Email,
    Date,
    Datetime,
    Number,
    Select,
    Multiselect,
    Textarea,
    Checkbox,
    FileList,
    RepeatableList,
}

impl FieldKind {
    pub fn is_multi_value(self) -> bool {
        matches!(
            self,
            FieldKind::Multiselect | FieldKind::FileList | FieldKind::RepeatableList
        )
    }

    /// Slot-based collections that support add/remove.
    pub fn is_collection(self) -> bool {
        matches!(self, FieldKind::FileList | FieldKind::RepeatableList)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl<'de> Deserialize<'de> for SelectOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bare(String),
            Full {
                value: String,
                label: Option<String>,
            },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bare(value) => SelectOption::new(value.clone(), value),
            Raw::Full { value, label } => {
                let label = label.unwrap_or_else(|| value.clone());
                SelectOption { value, label }
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBounds {
    #[serde(default = "default_min_entries")]
    pub min: usize,
    #[serde(default = "default_max_entries")]
    pub max: usize,
}

impl Default for ListBounds {
    fn default() -> Self {
        Self {
            min: default_min_entries(),
            max: default_max_entries(),
        }
    }
}

fn default_min_entries() -> usize {
    1
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

/// Where a dependent field's options come from once its parent has a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub parent: String,
    /// Static option lists keyed by the parent's value.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub catalog: IndexMap<String, Vec<SelectOption>>,
    /// Options are fetched from a reference-data collaborator instead.
    #[serde(default)]
    pub remote: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,
    pub label: String,
    pub section: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Base requirement in full mode.
    #[serde(default)]
    pub required: bool,
    #[serde(default = "Condition::never")]
    pub required_when: Condition,
    #[serde(default)]
    pub visible_when: Condition,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Dependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListBounds>,
}

impl FieldDefinition {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        section: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            section: section.into(),
            kind,
            description: None,
            required: false,
            required_when: Condition::Never,
            visible_when: Condition::Always,
            searchable: false,
            default: None,
            options: Vec::new(),
            depends_on: None,
            list: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn required_when(mut self, condition: Condition) -> Self {
        self.required_when = condition;
        self
    }

    pub fn visible_when(mut self, condition: Condition) -> Self {
        self.visible_when = condition;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn depends_on(mut self, dependency: Dependency) -> Self {
        self.depends_on = Some(dependency);
        self
    }

    pub fn with_list(mut self, bounds: ListBounds) -> Self {
        self.list = Some(bounds);
        self
    }

    /// Effective slot bounds. Undeclared collections may be emptied.
    pub fn list_bounds(&self) -> ListBounds {
        match self.list {
            Some(bounds) => bounds,
            None if self.kind.is_multi_value() => ListBounds {
                min: 0,
                max: DEFAULT_MAX_ENTRIES,
            },
            None => ListBounds { min: 0, max: 0 },
        }
    }

    /// Whether the requirement can switch on and off with other values.
    pub fn is_conditionally_required(&self) -> bool {
        !matches!(self.required_when, Condition::Never)
    }

    pub fn parent(&self) -> Option<&str> {
        self.depends_on.as_ref().map(|dep| dep.parent.as_str())
    }

    pub fn is_remote(&self) -> bool {
        self.depends_on.as_ref().is_some_and(|dep| dep.remote)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SectionDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>, order: i32) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            order,
            description: None,
        }
    }
}

/// A validated form shape. Build one with [`super::parse_form_schema`] or
/// [`FormSchema::new`]; both reject inconsistent definitions, and the result
/// is read-only afterwards.
#[derive(Debug, Clone)]
pub struct FormSchema {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    /// Sorted by `order`, ties keep declaration order. Never empty.
    pub(crate) sections: Vec<SectionDefinition>,
    pub(crate) fields: Vec<FieldDefinition>,
    pub(crate) quick_mode_fields: IndexSet<String>,
    pub(crate) scroll: Option<ScrollConfig>,
    pub(crate) field_index: HashMap<String, usize>,
}

impl FormSchema {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Per-form scroll thresholds, overriding the engine defaults.
    pub fn with_scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = Some(scroll);
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn sections(&self) -> &[SectionDefinition] {
        &self.sections
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn quick_mode_fields(&self) -> &IndexSet<String> {
        &self.quick_mode_fields
    }

    pub fn scroll(&self) -> Option<ScrollConfig> {
        self.scroll
    }

    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.field_index.get(key).map(|idx| &self.fields[*idx])
    }

    pub fn contains_field(&self, key: &str) -> bool {
        self.field_index.contains_key(key)
    }

    pub fn section(&self, key: &str) -> Option<&SectionDefinition> {
        self.sections.iter().find(|section| section.key == key)
    }

    pub fn first_section(&self) -> &SectionDefinition {
        &self.sections[0]
    }

    pub fn section_position(&self, key: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.key == key)
    }

    pub fn fields_in_section<'a>(
        &'a self,
        key: &'a str,
    ) -> impl Iterator<Item = &'a FieldDefinition> + 'a {
        self.fields.iter().filter(move |f| f.section == key)
    }

    /// Fields whose options are driven by `parent`.
    pub fn dependents_of<'a>(
        &'a self,
        parent: &'a str,
    ) -> impl Iterator<Item = &'a FieldDefinition> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.parent() == Some(parent))
    }

    pub fn searchable_keys(&self) -> IndexSet<String> {
        self.fields
            .iter()
            .filter(|field| field.searchable)
            .map(|field| field.key.clone())
            .collect()
    }

    pub fn default_values(&self) -> super::Values {
        self.fields
            .iter()
            .map(|field| (field.key.clone(), super::FieldValue::default_for(field)))
            .collect()
    }
}
