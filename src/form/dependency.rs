use tracing::debug;

use crate::domain::{FieldDefinition, FieldValue, FormSchema, SelectOption, Values};

/// Writes produced by a parent edit: the edit itself first, then any
/// dependent resets, in the order they were discovered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cascade {
    pub patch: Vec<(String, FieldValue)>,
    /// Remote-backed fields whose option list must be refetched.
    pub refetch: Vec<String>,
}

/// Computes option lists for dependent fields and the resets a parent change
/// forces on them.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    schema: &'a FormSchema,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(schema: &'a FormSchema) -> Self {
        Self { schema }
    }

    /// Options currently offered by `field`.
    ///
    /// Independent fields return their static list. Catalog-backed fields
    /// return the list registered under the parent's current value, or
    /// nothing when the parent is unset or unknown. Remote-backed fields are
    /// always empty here; their lists live in [`super::RemoteOptions`].
    pub fn options_for<'f>(
        &self,
        field: &'f FieldDefinition,
        values: &Values,
    ) -> &'f [SelectOption] {
        let Some(dependency) = &field.depends_on else {
            return &field.options;
        };
        if dependency.remote {
            return &[];
        }
        values
            .get(&dependency.parent)
            .and_then(FieldValue::as_text)
            .and_then(|parent| dependency.catalog.get(parent))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve the effect of writing `value` into `key`, following chains of
    /// dependents until nothing else changes.
    pub fn cascade(&self, key: &str, value: FieldValue, values: &Values) -> Cascade {
        let mut cascade = Cascade::default();
        let changed = values.get(key) != Some(&value);
        let mut staged = values.clone();
        staged.insert(key.to_string(), value.clone());
        cascade.patch.push((key.to_string(), value));
        if !changed {
            return cascade;
        }

        let mut worklist = vec![key.to_string()];
        while let Some(parent) = worklist.pop() {
            for dependent in self.schema.dependents_of(&parent) {
                let remote = dependent.is_remote();
                if remote && !cascade.refetch.contains(&dependent.key) {
                    cascade.refetch.push(dependent.key.clone());
                }
                let Some(current) = staged.get(&dependent.key) else {
                    continue;
                };
                let next = if remote {
                    FieldValue::empty_for(dependent.kind)
                } else {
                    retain_offered(current, self.options_for(dependent, &staged))
                };
                if &next == current {
                    continue;
                }
                debug!(parent = %parent, field = %dependent.key, "resetting stale dependent value");
                staged.insert(dependent.key.clone(), next.clone());
                upsert(&mut cascade.patch, &dependent.key, next);
                worklist.push(dependent.key.clone());
            }
        }
        cascade
    }

    /// Drop every catalog-backed selection that its parent no longer offers.
    /// Used after hydrating an external record.
    pub fn normalize(&self, values: &Values) -> Vec<(String, FieldValue)> {
        let mut staged = values.clone();
        let mut patch = Vec::new();
        // each pass settles at least one more level of the dependency chain
        for _ in 0..=self.schema.fields().len() {
            let mut settled = true;
            for field in self.schema.fields() {
                let Some(dependency) = &field.depends_on else {
                    continue;
                };
                if dependency.remote {
                    continue;
                }
                let Some(current) = staged.get(&field.key) else {
                    continue;
                };
                let next = retain_offered(current, self.options_for(field, &staged));
                if &next != current {
                    debug!(field = %field.key, "dropping stale hydrated selection");
                    staged.insert(field.key.clone(), next.clone());
                    upsert(&mut patch, &field.key, next);
                    settled = false;
                }
            }
            if settled {
                break;
            }
        }
        patch
    }
}

/// `current` restricted to what `options` offers. A single selection that is
/// no longer offered becomes blank; lists keep their offered entries.
pub(crate) fn retain_offered(current: &FieldValue, options: &[SelectOption]) -> FieldValue {
    let offered = |candidate: &str| options.iter().any(|option| option.value == candidate);
    match current {
        FieldValue::Text(text) if text.is_empty() || offered(text.as_str()) => current.clone(),
        FieldValue::Text(_) => FieldValue::Text(String::new()),
        FieldValue::List(items) => FieldValue::List(
            items
                .iter()
                .filter(|item| offered(item.as_str()))
                .cloned()
                .collect(),
        ),
        FieldValue::Bool(_) => current.clone(),
    }
}

/// Replace the write for `key` in place, or append it.
pub(crate) fn upsert(patch: &mut Vec<(String, FieldValue)>, key: &str, value: FieldValue) {
    match patch.iter_mut().find(|(existing, _)| existing == key) {
        Some((_, slot)) => *slot = value,
        None => patch.push((key.to_string(), value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, FieldKind, SectionDefinition};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn options(values: &[&str]) -> Vec<SelectOption> {
        values.iter().map(|v| SelectOption::new(*v, *v)).collect()
    }

    fn schema() -> FormSchema {
        let mut stages = IndexMap::new();
        stages.insert("Sales".to_string(), options(&["Prospect", "Won"]));
        stages.insert("Renewals".to_string(), options(&["Due", "Renewed"]));
        let mut owners = IndexMap::new();
        owners.insert("Prospect".to_string(), options(&["asha"]));
        owners.insert("Won".to_string(), options(&["asha", "ravi"]));
        FormSchema::new(
            vec![SectionDefinition::new("deal", "Deal", 0)],
            vec![
                FieldDefinition::new("pipeline", "Pipeline", "deal", FieldKind::Select)
                    .with_options(options(&["Sales", "Renewals"])),
                FieldDefinition::new("stage", "Stage", "deal", FieldKind::Select)
                    .depends_on(Dependency {
                        parent: "pipeline".into(),
                        catalog: stages,
                        remote: false,
                    }),
                FieldDefinition::new("owners", "Owners", "deal", FieldKind::Multiselect)
                    .depends_on(Dependency {
                        parent: "stage".into(),
                        catalog: owners,
                        remote: false,
                    }),
            ],
            Vec::<String>::new(),
        )
        .unwrap()
    }

    fn values(pairs: &[(&str, FieldValue)]) -> Values {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn options_follow_parent_value() {
        let schema = schema();
        let resolver = DependencyResolver::new(&schema);
        let stage = schema.field("stage").unwrap();
        let unset = values(&[("pipeline", FieldValue::text(""))]);
        assert!(resolver.options_for(stage, &unset).is_empty());
        let sales = values(&[("pipeline", FieldValue::text("Sales"))]);
        assert_eq!(
            resolver.options_for(stage, &sales),
            options(&["Prospect", "Won"]).as_slice()
        );
        let unknown = values(&[("pipeline", FieldValue::text("Partners"))]);
        assert!(resolver.options_for(stage, &unknown).is_empty());
    }

    #[test]
    fn parent_change_cascades_through_chain() {
        let schema = schema();
        let resolver = DependencyResolver::new(&schema);
        let current = values(&[
            ("pipeline", FieldValue::text("Sales")),
            ("stage", FieldValue::text("Won")),
            ("owners", FieldValue::list(["asha", "ravi"])),
        ]);
        let cascade = resolver.cascade("pipeline", FieldValue::text("Renewals"), &current);
        assert_eq!(
            cascade.patch,
            vec![
                ("pipeline".to_string(), FieldValue::text("Renewals")),
                ("stage".to_string(), FieldValue::text("")),
                ("owners".to_string(), FieldValue::List(Vec::new())),
            ]
        );
        assert!(cascade.refetch.is_empty());
    }

    #[test]
    fn multiselect_keeps_still_offered_entries() {
        let schema = schema();
        let resolver = DependencyResolver::new(&schema);
        let current = values(&[
            ("pipeline", FieldValue::text("Sales")),
            ("stage", FieldValue::text("Won")),
            ("owners", FieldValue::list(["asha", "ravi"])),
        ]);
        let cascade = resolver.cascade("stage", FieldValue::text("Prospect"), &current);
        assert_eq!(
            cascade.patch.last(),
            Some(&("owners".to_string(), FieldValue::list(["asha"])))
        );
    }

    #[test]
    fn unchanged_write_does_not_cascade() {
        let schema = schema();
        let resolver = DependencyResolver::new(&schema);
        let current = values(&[
            ("pipeline", FieldValue::text("Sales")),
            ("stage", FieldValue::text("Won")),
        ]);
        let cascade = resolver.cascade("pipeline", FieldValue::text("Sales"), &current);
        assert_eq!(cascade.patch.len(), 1);
    }

    #[test]
    fn normalize_drops_stale_hydrated_values() {
        let schema = schema();
        let resolver = DependencyResolver::new(&schema);
        let hydrated = values(&[
            ("pipeline", FieldValue::text("Renewals")),
            ("stage", FieldValue::text("Won")),
            ("owners", FieldValue::list(["ravi"])),
        ]);
        let patch = resolver.normalize(&hydrated);
        assert_eq!(
            patch,
            vec![
                ("stage".to_string(), FieldValue::text("")),
                ("owners".to_string(), FieldValue::List(Vec::new())),
            ]
        );
    }
}
