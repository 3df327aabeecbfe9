use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::navigation::ScrollConfig;

use super::schema::{FieldDefinition, FormSchema, SectionDefinition};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("schema declares no sections")]
    NoSections,
    #[error("duplicate section key '{0}'")]
    DuplicateSection(String),
    #[error("duplicate field key '{0}'")]
    DuplicateField(String),
    #[error("field '{field}' refers to unknown section '{section}'")]
    UnknownSection { field: String, section: String },
    #[error("field '{field}' depends on unknown field '{parent}'")]
    UnknownParent { field: String, parent: String },
    #[error("field '{field}' declares both a catalog and a remote option source")]
    AmbiguousDependency { field: String },
    #[error("dependency cycle through field '{0}'")]
    DependencyCycle(String),
    #[error("quick mode lists unknown field '{0}'")]
    UnknownQuickField(String),
    #[error("field '{field}' has list bounds min {min} > max {max}")]
    InvalidBounds {
        field: String,
        min: usize,
        max: usize,
    },
    #[error("a rule on field '{field}' refers to unknown field '{reference}'")]
    UnknownReference { field: String, reference: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormDocument {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    sections: Vec<SectionDefinition>,
    fields: Vec<FieldDefinition>,
    #[serde(default, alias = "quick_mode_fields")]
    quick_mode_fields: Vec<String>,
    #[serde(default)]
    scroll: Option<ScrollConfig>,
}

/// Parse and validate a form schema document.
pub fn parse_form_schema(document: &Value) -> Result<FormSchema, SchemaError> {
    let doc: FormDocument = serde_json::from_value(document.clone())?;
    let mut schema = FormSchema::new(doc.sections, doc.fields, doc.quick_mode_fields)?;
    schema.title = doc.title;
    schema.description = doc.description;
    schema.scroll = doc.scroll;
    Ok(schema)
}

impl FormSchema {
    pub fn new(
        sections: Vec<SectionDefinition>,
        fields: Vec<FieldDefinition>,
        quick_mode_fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, SchemaError> {
        if sections.is_empty() {
            return Err(SchemaError::NoSections);
        }
        let mut seen = HashSet::new();
        for section in &sections {
            if !seen.insert(section.key.as_str()) {
                return Err(SchemaError::DuplicateSection(section.key.clone()));
            }
        }

        let mut field_index = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            if field_index.insert(field.key.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateField(field.key.clone()));
            }
            if !seen.contains(field.section.as_str()) {
                return Err(SchemaError::UnknownSection {
                    field: field.key.clone(),
                    section: field.section.clone(),
                });
            }
            if let Some(bounds) = field.list
                && bounds.min > bounds.max
            {
                return Err(SchemaError::InvalidBounds {
                    field: field.key.clone(),
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }

        for field in &fields {
            check_references(field, &field_index)?;
        }
        check_cycles(&fields, &field_index)?;

        let quick_mode_fields = quick_mode_fields
            .into_iter()
            .map(Into::into)
            .collect::<IndexSet<String>>();
        if let Some(unknown) = quick_mode_fields
            .iter()
            .find(|key| !field_index.contains_key(*key))
        {
            return Err(SchemaError::UnknownQuickField(unknown.clone()));
        }

        let mut ordered: Vec<(usize, SectionDefinition)> =
            sections.into_iter().enumerate().collect();
        ordered.sort_by_key(|(idx, section)| (section.order, *idx));

        Ok(Self {
            title: None,
            description: None,
            sections: ordered.into_iter().map(|(_, section)| section).collect(),
            fields,
            quick_mode_fields,
            scroll: None,
            field_index,
        })
    }
}

fn check_references(
    field: &FieldDefinition,
    index: &HashMap<String, usize>,
) -> Result<(), SchemaError> {
    if let Some(dependency) = &field.depends_on {
        if !index.contains_key(&dependency.parent) {
            return Err(SchemaError::UnknownParent {
                field: field.key.clone(),
                parent: dependency.parent.clone(),
            });
        }
        if dependency.remote && !dependency.catalog.is_empty() {
            return Err(SchemaError::AmbiguousDependency {
                field: field.key.clone(),
            });
        }
    }
    let rules = field
        .visible_when
        .referenced_fields()
        .into_iter()
        .chain(field.required_when.referenced_fields());
    for reference in rules {
        if !index.contains_key(reference) {
            return Err(SchemaError::UnknownReference {
                field: field.key.clone(),
                reference: reference.to_string(),
            });
        }
    }
    Ok(())
}

fn check_cycles(
    fields: &[FieldDefinition],
    index: &HashMap<String, usize>,
) -> Result<(), SchemaError> {
    for field in fields {
        let mut cursor = field.parent();
        let mut hops = 0;
        while let Some(parent) = cursor {
            if parent == field.key || hops > fields.len() {
                return Err(SchemaError::DependencyCycle(field.key.clone()));
            }
            cursor = index.get(parent).and_then(|idx| fields[*idx].parent());
            hops += 1;
        }
    }
    Ok(())
}
