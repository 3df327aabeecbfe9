use indexmap::IndexSet;

use crate::domain::Values;

/// Searchable fields whose current value contains `term`, ignoring case.
///
/// A blank term highlights nothing. Otherwise the term is matched as typed,
/// surrounding spaces included. The result is render metadata only; it never
/// hides fields.
pub fn matches(term: &str, values: &Values, searchable: &IndexSet<String>) -> IndexSet<String> {
    if term.trim().is_empty() {
        return IndexSet::new();
    }
    let needle = term.to_lowercase();
    values
        .iter()
        .filter(|(key, _)| searchable.contains(*key))
        .filter(|(_, value)| value.to_string().to_lowercase().contains(&needle))
        .map(|(key, _)| key.clone())
        .collect()
}
