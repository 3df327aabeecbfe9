mod format;
mod input;

pub use format::DocumentFormat;
pub use input::{load_form_schema_file, load_form_schema_str, parse_document_str, parse_record_str};
