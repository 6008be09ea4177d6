use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

use chrono::Utc;
use serde_json::{Value, json};

use crate::{
    app::{EngineOptions, FormEvent, FormSession},
    domain::AnswerValue,
    form::SubmissionError,
};

fn schema() -> Value {
    json!({
        "household": {"label": "Ménage", "fields": {
            "geolocalisation": {"type": "gps", "required": true},
            "name": {"type": "text", "label": "Name", "required": true},
            "has_children": {"type": "radio", "options": ["yes", "no"]},
            "children_names": {
                "type": "text",
                "conditional": {"field": "has_children", "value": "yes"}
            }
        }}
    })
}

fn session() -> (FormSession, Rc<RefCell<Vec<FormEvent>>>) {
    let mut session = FormSession::new(
        EngineOptions::default().with_debounce(Duration::from_millis(300)),
    );
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    session.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    session.open(&schema());
    (session, events)
}

#[test]
fn opening_groups_fields_into_labelled_sections() {
    let (session, events) = session();
    assert_eq!(session.fields().len(), 4);
    assert_eq!(session.sections()["household"].label, "Ménage");
    assert_eq!(
        events.borrow().as_slice(),
        [FormEvent::SchemaLoaded { field_count: 4 }]
    );
}

#[test]
fn typed_text_is_committed_after_the_quiet_period() {
    let (mut session, events) = session();
    let start = Instant::now();
    session.mount("household.name");
    session.edit("household.name", "Ja", start);
    session.edit("household.name", "Jane", start + Duration::from_millis(100));

    assert_eq!(
        session.display_value("household.name"),
        Some(&AnswerValue::from("Jane"))
    );
    assert!(session.answers().get("household.name").is_none());
    assert!(session.tick(start + Duration::from_millis(350)).is_empty());

    let flushed = session.tick(start + Duration::from_millis(400));
    assert_eq!(flushed, vec!["household.name"]);
    assert_eq!(
        session.answers().get("household.name"),
        Some(&AnswerValue::from("Jane"))
    );
    assert!(events.borrow().contains(&FormEvent::AnswerCommitted {
        field_id: "household.name".to_string()
    }));
}

#[test]
fn hiding_a_field_flushes_its_open_input() {
    let (mut session, _) = session();
    let now = Instant::now();
    session.set_answer("household.has_children", "yes");
    assert!(session.is_visible("household.children_names"));

    session.mount("household.children_names");
    session.edit("household.children_names", "Ana, Bo", now);
    session.set_answer("household.has_children", "no");

    assert!(!session.is_visible("household.children_names"));
    assert_eq!(
        session.answers().get("household.children_names"),
        Some(&AnswerValue::from("Ana, Bo"))
    );
    assert!(session.next_deadline().is_none());
}

#[test]
fn reload_drops_answers_of_removed_fields() {
    let (mut session, events) = session();
    session.set_answer("household.name", "Jane");
    session.set_answer("household.has_children", "no");
    session.set_answer("household.geolocalisation.province", "Kinshasa");

    session.reload(&json!({
        "household": {"fields": {
            "geolocalisation": {"type": "gps"},
            "name": {"type": "text"}
        }}
    }));

    assert!(session.answers().contains("household.name"));
    assert!(session.answers().contains("household.geolocalisation.province"));
    assert!(!session.answers().contains("household.has_children"));
    assert!(events.borrow().contains(&FormEvent::AnswersDropped {
        field_ids: vec!["household.has_children".to_string()]
    }));
}

#[test]
fn reload_unmounts_inputs_of_removed_fields() {
    let mut session = FormSession::default();
    session.open(&json!({"s": {"fields": {"a": {"type": "text"}, "b": {"type": "text"}}}}));
    session.mount("s.a");
    session.mount("s.b");

    session.reload(&json!({"s": {"fields": {"b": {"type": "text"}}}}));
    assert!(!session.is_mounted("s.a"));
    assert!(session.is_mounted("s.b"));

    let start = Instant::now();
    session.edit("s.a", "ghost", start);
    session.set_answer("s.a", "ghost");
    assert!(session.tick(start + Duration::from_secs(1)).is_empty());
    assert!(!session.answers().contains("s.a"));
    assert!(!session.is_mounted("s.a"));
}

#[test]
fn opening_another_form_discards_answers() {
    let (mut session, events) = session();
    session.set_answer("household.name", "Jane");
    session.open(&json!([{"id": "q", "type": "text"}]));

    assert!(session.answers().is_empty());
    assert_eq!(session.fields().len(), 1);
    assert!(events.borrow().contains(&FormEvent::Closed));
}

#[test]
fn submit_flushes_pending_edits_and_wraps_the_payload() {
    let (mut session, events) = session();
    session.set_answer("household.geolocalisation", "-4.32, 15.31");
    session.mount("household.name");
    session.edit("household.name", "Jane", Instant::now());

    let submission = session.submit("form-1", "survey-9", true, Utc::now()).unwrap();
    assert_eq!(submission.form_id, "form-1");
    assert!(submission.is_online);
    assert_eq!(
        submission.form_data.get("household.name"),
        Some(&AnswerValue::from("Jane"))
    );
    assert!(events.borrow().contains(&FormEvent::Submitted {
        form_id: "form-1".to_string(),
        survey_id: "survey-9".to_string()
    }));
}

#[test]
fn submit_is_refused_without_location() {
    let (mut session, events) = session();
    session.set_answer("household.name", "Jane");
    let err = session.submit("form-1", "survey-9", false, Utc::now()).unwrap_err();
    assert!(matches!(err, SubmissionError::GeolocationMissing { .. }));
    assert!(!events
        .borrow()
        .iter()
        .any(|event| matches!(event, FormEvent::Submitted { .. })));
}

#[test]
fn choice_controls_write_immediately() {
    let (mut session, _) = session();
    let schema = json!([
        {"id": "assets", "type": "multiselect", "options": ["radio", "bike"]},
        {"id": "energy", "type": "ranking", "options": ["wood", "gas"]}
    ]);
    session.open(&schema);

    assert!(session.toggle_option("assets", "bike", true));
    assert!(!session.toggle_option("assets", "bike", true));
    assert!(session.assign_rank("energy", "wood", Some("1er")));
    assert!(session.assign_rank("energy", "gas", Some("1er")));

    let ranks = session.answers().get("energy").and_then(AnswerValue::as_ranking).unwrap();
    assert_eq!(ranks.len(), 1);
    assert_eq!(ranks.get("gas").map(String::as_str), Some("1er"));
    assert_eq!(
        session.clear_answer("assets"),
        Some(AnswerValue::List(vec!["bike".to_string()]))
    );
}
