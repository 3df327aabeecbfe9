mod config;
mod debounce;
mod sync;
mod viewport;

pub use config::ScrollConfig;
pub use debounce::Debouncer;
pub use sync::{ScrollPhase, ScrollSyncNavigator};
pub use viewport::{ScrollBehavior, SectionBounds, ViewportPort};
