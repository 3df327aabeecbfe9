use thiserror::Error;

use crate::domain::{FieldDefinition, ListBounds};

use super::FormState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("field '{0}' is not a repeatable list")]
    NotAList(String),
    #[error("'{field}' already holds the maximum of {max} entries")]
    AtCapacity { field: String, max: usize },
    #[error("'{field}' must keep at least {min} entries")]
    AtMinimum { field: String, min: usize },
    #[error("'{field}' has no entry at index {index}")]
    OutOfRange { field: String, index: usize },
    #[error("form is not open")]
    Closed,
}

impl FormState {
    /// Append a blank slot. Returns the new length.
    pub fn add_entry(&mut self, key: &str) -> Result<usize, ListError> {
        let bounds = self.collection_bounds(key)?;
        let len = self.entry_count(key);
        if len >= bounds.max {
            return Err(ListError::AtCapacity {
                field: key.to_string(),
                max: bounds.max,
            });
        }
        self.update_list(key, |items| {
            items.push(String::new());
            items.len()
        })
    }

    /// Remove the slot at `index`; refused when it would drop below the
    /// declared minimum. Returns the new length.
    pub fn remove_entry(&mut self, key: &str, index: usize) -> Result<usize, ListError> {
        let bounds = self.collection_bounds(key)?;
        let len = self.entry_count(key);
        if bounds.min > 0 && len <= bounds.min {
            return Err(ListError::AtMinimum {
                field: key.to_string(),
                min: bounds.min,
            });
        }
        if index >= len {
            return Err(ListError::OutOfRange {
                field: key.to_string(),
                index,
            });
        }
        self.update_list(key, |items| {
            items.remove(index);
            items.len()
        })
    }

    /// Overwrite one slot, e.g. a typed phone number or a picked file handle.
    pub fn set_entry(
        &mut self,
        key: &str,
        index: usize,
        entry: impl Into<String>,
    ) -> Result<(), ListError> {
        self.collection_bounds(key)?;
        if index >= self.entry_count(key) {
            return Err(ListError::OutOfRange {
                field: key.to_string(),
                index,
            });
        }
        let entry = entry.into();
        self.update_list(key, move |items| items[index] = entry)
    }

    pub fn entry_count(&self, key: &str) -> usize {
        self.value(key)
            .and_then(|value| value.as_list())
            .map_or(0, <[String]>::len)
    }

    pub fn can_add_entry(&self, key: &str) -> bool {
        self.collection_bounds(key)
            .is_ok_and(|bounds| self.entry_count(key) < bounds.max)
    }

    pub fn can_remove_entry(&self, key: &str) -> bool {
        self.collection_bounds(key)
            .is_ok_and(|bounds| self.entry_count(key) > bounds.min)
    }

    fn collection_bounds(&self, key: &str) -> Result<ListBounds, ListError> {
        self.schema()
            .field(key)
            .filter(|field| field.kind.is_collection())
            .map(FieldDefinition::list_bounds)
            .ok_or_else(|| ListError::NotAList(key.to_string()))
    }

    fn update_list<R>(
        &mut self,
        key: &str,
        edit: impl FnOnce(&mut Vec<String>) -> R,
    ) -> Result<R, ListError> {
        self.update_field(key, |value| value.as_list_mut().map(edit))
            .ok_or_else(|| ListError::NotAList(key.to_string()))
    }
}
