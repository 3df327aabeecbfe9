mod dependency;
mod lists;
mod remote;
mod search;
mod state;
mod validation;
mod visibility;

pub use dependency::{Cascade, DependencyResolver};
pub(crate) use dependency::{retain_offered, upsert};
pub use lists::ListError;
pub use remote::{FetchRequest, FetchTicket, RemoteOptions, RemoteStatus};
pub use search::matches;
pub use state::FormState;
pub use validation::{ValidationEngine, first_error_section, section_error_counts};
pub use visibility::{is_visible, visible_fields, visible_sections};
