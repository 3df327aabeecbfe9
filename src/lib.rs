#![deny(rust_2018_idioms)]

//! Schema-driven engine for large multi-section data-entry forms.
//!
//! A [`FormSchema`] describes fields and sections as data. [`FormController`]
//! owns the [`FormState`] of one open dialog and keeps it consistent: dependent
//! option lists cascade, conditionally-required fields appear and clear
//! themselves, quick mode projects a subset of fields, the active section
//! follows the scroll position, and search highlights matching values.

mod app;
mod domain;
mod form;
mod io;
mod navigation;

pub use app::{EngineOptions, FormController, ReferenceSource, SubmitOutcome, SubmitSink};
pub use domain::{
    Condition, DEFAULT_MAX_ENTRIES, Dependency, ErrorMap, FieldDefinition, FieldKind, FieldValue,
    FormMode, FormSchema, ListBounds, SchemaError, SectionDefinition, SelectOption, Values,
    parse_form_schema,
};
pub use form::{
    Cascade, DependencyResolver, FetchRequest, FetchTicket, FormState, ListError, RemoteOptions,
    RemoteStatus, ValidationEngine, first_error_section, is_visible, matches,
    section_error_counts, visible_fields, visible_sections,
};
pub use io::{
    DocumentFormat, load_form_schema_file, load_form_schema_str, parse_document_str,
    parse_record_str,
};
pub use navigation::{
    Debouncer, ScrollBehavior, ScrollConfig, ScrollPhase, ScrollSyncNavigator, SectionBounds,
    ViewportPort,
};

pub mod prelude {
    pub use super::{
        Condition, EngineOptions, FieldDefinition, FieldKind, FieldValue, FormController,
        FormMode, FormSchema, SectionDefinition, SubmitOutcome, ViewportPort,
    };
}
