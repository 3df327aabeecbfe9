use crate::{domain::Values, form::FetchRequest};

/// Receives the values of a successful submission, once per submit.
///
/// Persistence failures are the implementor's concern; the form is already
/// reset when this returns.
pub trait SubmitSink {
    fn submit(&mut self, values: &Values);
}

impl<F> SubmitSink for F
where
    F: FnMut(&Values),
{
    fn submit(&mut self, values: &Values) {
        self(values)
    }
}

/// Reference-data provider for remote-backed option lists.
///
/// `request` must not block. The host answers later through
/// [`super::FormController::deliver`]; fetching the same parent twice is
/// expected to be idempotent.
pub trait ReferenceSource {
    fn request(&mut self, request: FetchRequest);
}

impl<F> ReferenceSource for F
where
    F: FnMut(FetchRequest),
{
    fn request(&mut self, request: FetchRequest) {
        self(request)
    }
}
