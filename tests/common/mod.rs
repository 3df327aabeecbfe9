#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use schemaform::{
    DocumentFormat, FetchRequest, FormController, FormSchema, Values, load_form_schema_str,
};

pub const LEAD_SCHEMA: &str = include_str!("../../schemas/lead.json");

pub fn lead_schema() -> Arc<FormSchema> {
    let schema = load_form_schema_str(LEAD_SCHEMA, DocumentFormat::Json).unwrap();
    Arc::new(schema)
}

/// Controller over the lead schema whose sink records every submission.
pub fn lead_controller() -> (FormController, Rc<RefCell<Vec<Values>>>) {
    let submitted = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&submitted);
    let controller = FormController::new(lead_schema(), move |values: &Values| {
        sink.borrow_mut().push(values.clone());
    });
    (controller, submitted)
}

/// Like [`lead_controller`], additionally recording reference-data requests.
pub fn lead_controller_with_source() -> (FormController, Rc<RefCell<Vec<FetchRequest>>>) {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&requests);
    let (controller, _) = lead_controller();
    let controller = controller.with_reference_source(move |request: FetchRequest| {
        log.borrow_mut().push(request);
    });
    (controller, requests)
}

/// Fill every field the full-mode lead form requires.
pub fn fill_required(form: &mut FormController) {
    assert!(form.set_field("companyName", "Acme Corp"));
    assert!(form.set_field("contactName", "Priya Nair"));
    form.set_entry("mobileNumbers", 0, "+91 98450 00000")
        .unwrap();
    assert!(form.set_field("pipeline", "New business"));
    assert!(form.set_field("stage", "Qualified"));
    assert!(form.set_field("businessUnit", "Cloud"));
    assert!(form.set_field("productServices", "managed-kubernetes"));
}
