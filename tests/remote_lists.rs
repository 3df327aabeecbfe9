mod common;

use pretty_assertions::assert_eq;
use schemaform::{FieldValue, RemoteStatus, SelectOption};
use serde_json::json;

use common::lead_controller_with_source;

fn states() -> Vec<SelectOption> {
    vec![
        SelectOption::new("KA", "Karnataka"),
        SelectOption::new("MH", "Maharashtra"),
    ]
}

#[test]
fn blank_parent_issues_no_fetch() {
    let (mut form, requests) = lead_controller_with_source();
    form.open_create();
    assert!(requests.borrow().is_empty());
    assert_eq!(form.remote_status("state"), RemoteStatus::Idle);
    assert!(form.options_for("state").is_empty());
}

#[test]
fn parent_change_clears_child_before_requesting() {
    let (mut form, requests) = lead_controller_with_source();
    form.open_create();
    form.set_field("country", "IN");

    let request = requests.borrow()[0].clone();
    assert_eq!(request.field, "state");
    assert_eq!(request.parent_value, "IN");
    assert_eq!(form.remote_status("state"), RemoteStatus::Loading);
    assert!(form.options_for("state").is_empty());

    assert!(form.deliver(request.ticket, Ok(states())));
    assert_eq!(form.remote_status("state"), RemoteStatus::Ready);
    assert_eq!(form.options_for("state"), states().as_slice());

    form.set_field("state", "KA");
    let last = requests.borrow().last().cloned().unwrap();
    assert_eq!(last.field, "city");
    assert_eq!(last.parent_value, "KA");

    // a new country wipes state, city and the state list in one go
    form.set_field("country", "US");
    assert_eq!(form.state().value("state"), Some(&FieldValue::text("")));
    assert_eq!(form.state().value("city"), Some(&FieldValue::text("")));
    assert!(form.options_for("state").is_empty());
    assert_eq!(form.remote_status("state"), RemoteStatus::Loading);
    assert_eq!(form.remote_status("city"), RemoteStatus::Idle);
}

#[test]
fn superseded_responses_are_dropped() {
    let (mut form, requests) = lead_controller_with_source();
    form.open_create();
    form.set_field("country", "IN");
    form.set_field("country", "US");
    let (stale, current) = {
        let log = requests.borrow();
        (log[0].ticket, log[1].ticket)
    };

    assert!(!form.deliver(stale, Ok(states())));
    assert!(form.options_for("state").is_empty());
    assert_eq!(form.remote_status("state"), RemoteStatus::Loading);

    let us = vec![SelectOption::new("CA", "California")];
    assert!(form.deliver(current, Ok(us.clone())));
    assert_eq!(form.options_for("state"), us.as_slice());
    assert!(!form.deliver(current, Ok(states())));
}

#[test]
fn failed_fetch_is_reported_as_status() {
    let (mut form, requests) = lead_controller_with_source();
    form.open_create();
    form.set_field("country", "IN");
    let ticket = requests.borrow()[0].ticket;

    let outage = Err("reference service unavailable".to_string());
    assert!(form.deliver(ticket, outage));
    assert_eq!(
        form.remote_status("state"),
        RemoteStatus::Failed("reference service unavailable".to_string())
    );
    assert!(form.options_for("state").is_empty());
}

#[test]
fn responses_after_close_are_ignored() {
    let (mut form, requests) = lead_controller_with_source();
    form.open_create();
    form.set_field("country", "IN");
    let ticket = requests.borrow()[0].ticket;
    form.close();

    assert!(!form.deliver(ticket, Ok(states())));
    form.open_create();
    assert!(!form.deliver(ticket, Ok(states())));
    assert!(form.options_for("state").is_empty());
}

#[test]
fn edit_dialog_requests_lists_for_hydrated_parents() {
    let (mut form, requests) = lead_controller_with_source();
    form.open_edit(&json!({ "country": "IN", "state": "KA" }));

    let fields: Vec<(String, String)> = requests
        .borrow()
        .iter()
        .map(|request| (request.field.clone(), request.parent_value.clone()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("state".to_string(), "IN".to_string()),
            ("city".to_string(), "KA".to_string()),
        ]
    );
    assert_eq!(form.state().value("state"), Some(&FieldValue::text("KA")));
}

#[test]
fn delivered_list_clears_a_hydrated_value_it_does_not_offer() {
    let (mut form, requests) = lead_controller_with_source();
    let record = json!({ "country": "IN", "state": "ZZ", "city": "Atlantis" });
    form.open_edit(&record);
    let (state_ticket, city_ticket) = {
        let log = requests.borrow();
        (log[0].ticket, log[1].ticket)
    };
    let version = form.version();

    assert!(form.deliver(state_ticket, Ok(states())));
    assert_eq!(form.state().value("state"), Some(&FieldValue::text("")));
    // the city list hung off the dropped state, so it goes too
    assert_eq!(form.state().value("city"), Some(&FieldValue::text("")));
    assert_eq!(form.remote_status("city"), RemoteStatus::Idle);
    assert_eq!(form.version(), version + 1);

    let cities = vec![SelectOption::new("atl", "Atlantis")];
    assert!(!form.deliver(city_ticket, Ok(cities)));
    assert!(form.options_for("city").is_empty());
}

#[test]
fn delivered_list_keeps_an_offered_value() {
    let (mut form, requests) = lead_controller_with_source();
    form.open_edit(&json!({ "country": "IN", "state": "KA" }));
    let ticket = requests.borrow()[0].ticket;
    let version = form.version();

    assert!(form.deliver(ticket, Ok(states())));
    assert_eq!(form.state().value("state"), Some(&FieldValue::text("KA")));
    assert_eq!(form.remote_status("city"), RemoteStatus::Loading);
    assert_eq!(form.version(), version);
    assert!(!form.is_dirty());
}
