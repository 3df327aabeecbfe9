mod condition;
mod parser;
mod schema;
mod value;

pub use condition::Condition;
pub use parser::{SchemaError, parse_form_schema};
pub use schema::{
    DEFAULT_MAX_ENTRIES, Dependency, FieldDefinition, FieldKind, FormMode, FormSchema, ListBounds,
    SectionDefinition, SelectOption,
};
pub use value::{ErrorMap, FieldValue, Values};
