mod collaborators;
mod controller;
mod options;

pub use collaborators::{ReferenceSource, SubmitSink};
pub use controller::{FormController, SubmitOutcome};
pub use options::EngineOptions;
