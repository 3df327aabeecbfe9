use indexmap::IndexSet;

use crate::domain::{FieldDefinition, FormMode, FormSchema, Values};

/// Field keys that should render for `mode` and `values`, in declaration
/// order.
///
/// Quick mode is a projection of full mode: a field must be on the schema's
/// quick allow-list *and* pass its own `visible_when` rule.
pub fn visible_fields(schema: &FormSchema, mode: FormMode, values: &Values) -> IndexSet<String> {
    schema
        .fields()
        .iter()
        .filter(|field| is_visible(schema, field, mode, values))
        .map(|field| field.key.clone())
        .collect()
}

pub fn is_visible(
    schema: &FormSchema,
    field: &FieldDefinition,
    mode: FormMode,
    values: &Values,
) -> bool {
    if mode == FormMode::Quick && !schema.quick_mode_fields().contains(&field.key) {
        return false;
    }
    field.visible_when.evaluate(mode, values)
}

/// Sections that still contain at least one visible field.
pub fn visible_sections(schema: &FormSchema, mode: FormMode, values: &Values) -> Vec<String> {
    let visible = visible_fields(schema, mode, values);
    schema
        .sections()
        .iter()
        .filter(|section| {
            schema
                .fields_in_section(&section.key)
                .any(|field| visible.contains(&field.key))
        })
        .map(|section| section.key.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Condition, FieldKind, FieldValue, SectionDefinition};

    fn schema() -> FormSchema {
        FormSchema::new(
            vec![
                SectionDefinition::new("lead", "Lead", 0),
                SectionDefinition::new("extra", "Extra", 1),
            ],
            vec![
                FieldDefinition::new("leadRemark", "Lead remark", "lead", FieldKind::Select),
                FieldDefinition::new("lostReason", "Lost reason", "lead", FieldKind::Textarea)
                    .visible_when(Condition::equals("leadRemark", "Lost")),
                FieldDefinition::new("notes", "Notes", "extra", FieldKind::Textarea),
            ],
            ["leadRemark", "lostReason"],
        )
        .unwrap()
    }

    fn values(remark: &str) -> Values {
        [("leadRemark".to_string(), FieldValue::text(remark))]
            .into_iter()
            .collect()
    }

    #[test]
    fn conditional_field_appears_with_its_trigger() {
        let schema = schema();
        let open = visible_fields(&schema, FormMode::Full, &values("Open"));
        assert!(!open.contains("lostReason"));
        let lost = visible_fields(&schema, FormMode::Full, &values("Lost"));
        assert!(lost.contains("lostReason"));
    }

    #[test]
    fn quick_mode_is_a_subset_of_full_mode() {
        let schema = schema();
        for remark in ["", "Open", "Lost"] {
            let values = values(remark);
            let quick = visible_fields(&schema, FormMode::Quick, &values);
            let full = visible_fields(&schema, FormMode::Full, &values);
            assert!(
                quick.is_subset(&full),
                "quick view leaked fields for {remark:?}"
            );
            assert!(!quick.contains("notes"));
        }
    }

    #[test]
    fn sections_without_visible_fields_drop_out() {
        let schema = schema();
        assert_eq!(
            visible_sections(&schema, FormMode::Quick, &values("Open")),
            vec!["lead".to_string()]
        );
        assert_eq!(
            visible_sections(&schema, FormMode::Full, &values("Open")).len(),
            2
        );
    }
}
