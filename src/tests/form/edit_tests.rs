use std::time::{Duration, Instant};

use crate::{
    domain::AnswerValue,
    form::{AnswerStore, CommitTarget, EditController, FieldPatch, FormDraft},
};

#[derive(Default)]
struct Recorder {
    commits: Vec<(String, AnswerValue)>,
}

impl CommitTarget<AnswerValue> for Recorder {
    fn commit(&mut self, id: &str, patch: AnswerValue) {
        self.commits.push((id.to_string(), patch));
    }
}

const WINDOW: Duration = Duration::from_millis(300);

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn rapid_edits_coalesce_into_one_commit() {
    let start = Instant::now();
    let mut edits = EditController::new(WINDOW);
    let mut recorder = Recorder::default();

    edits.edit("f", AnswerValue::text("a"), start);
    edits.edit("f", AnswerValue::text("ab"), start + ms(100));
    edits.edit("f", AnswerValue::text("abc"), start + ms(200));

    assert!(edits.tick(start + ms(450), &mut recorder).is_empty());
    assert_eq!(edits.tick(start + ms(500), &mut recorder), vec!["f".to_string()]);
    assert!(edits.tick(start + ms(2000), &mut recorder).is_empty());

    assert_eq!(recorder.commits, vec![("f".to_string(), AnswerValue::text("abc"))]);
}

#[test]
fn blur_commits_once_and_cancels_the_timer() {
    let start = Instant::now();
    let mut edits = EditController::new(WINDOW);
    let mut recorder = Recorder::default();

    edits.edit("f", AnswerValue::text("partial"), start);
    assert!(edits.blur("f", &mut recorder));
    assert!(edits.next_deadline().is_none());
    assert!(edits.tick(start + ms(1000), &mut recorder).is_empty());
    assert!(!edits.blur("f", &mut recorder));

    assert_eq!(
        recorder.commits,
        vec![("f".to_string(), AnswerValue::text("partial"))]
    );
}

#[test]
fn unmount_flushes_pending_edits_then_forgets_the_buffer() {
    let start = Instant::now();
    let mut edits = EditController::new(WINDOW);
    let mut answers = AnswerStore::new();

    edits.mount("f");
    edits.edit("f", AnswerValue::text("typed"), start);
    assert!(edits.unmount("f", &mut answers));
    assert!(!edits.is_mounted("f"));
    assert_eq!(answers.get("f"), Some(&AnswerValue::text("typed")));

    answers.set("f", "changed elsewhere");
    assert!(edits.tick(start + ms(1000), &mut answers).is_empty());
    assert_eq!(answers.get("f"), Some(&AnswerValue::text("changed elsewhere")));
}

#[test]
fn buffers_of_different_fields_are_independent() {
    let start = Instant::now();
    let mut edits = EditController::new(WINDOW);
    let mut recorder = Recorder::default();

    edits.edit("a", AnswerValue::text("1"), start);
    edits.edit("b", AnswerValue::text("2"), start + ms(200));
    assert_eq!(edits.next_deadline(), Some(start + ms(300)));

    assert_eq!(edits.tick(start + ms(300), &mut recorder), vec!["a".to_string()]);
    assert_eq!(edits.draft("b"), Some(&AnswerValue::text("2")));
    assert_eq!(edits.tick(start + ms(500), &mut recorder), vec!["b".to_string()]);
    assert_eq!(recorder.commits.len(), 2);
}

#[test]
fn draft_edits_merge_partial_patches() {
    let start = Instant::now();
    let mut draft = FormDraft::from_fields(crate::normalize(&serde_json::json!({
        "s": {"fields": {"q": {"type": "select", "label": "Old"}}}
    })));
    let mut edits: EditController<FieldPatch> = EditController::new(WINDOW);

    edits.edit("s.q", FieldPatch::label("New label"), start);
    edits.edit("s.q", FieldPatch::options_text("yes\n\nno\n"), start + ms(50));
    edits.edit("s.q", FieldPatch::placeholder("Pick one"), start + ms(100));
    edits.tick(start + ms(400), &mut draft);

    let field = draft.field("s.q").unwrap();
    assert_eq!(field.label, "New label");
    assert_eq!(field.options(), ["yes", "no"]);
    assert_eq!(field.placeholder.as_deref(), Some("Pick one"));
}

#[test]
fn required_toggle_commits_immediately_with_pending_text() {
    let start = Instant::now();
    let mut draft = FormDraft::from_fields(crate::normalize(&serde_json::json!({
        "s": {"fields": {"q": {"type": "text", "label": "Old"}}}
    })));
    let mut edits: EditController<FieldPatch> = EditController::new(WINDOW);

    edits.edit("s.q", FieldPatch::label("Typed"), start);
    edits.commit_now("s.q", FieldPatch::required(true), &mut draft);

    let field = draft.field("s.q").unwrap();
    assert!(field.required);
    assert_eq!(field.label, "Typed");
    assert!(!edits.has_pending("s.q"));
}

#[test]
fn unmount_all_flushes_every_pending_buffer() {
    let start = Instant::now();
    let mut edits = EditController::new(WINDOW);
    let mut recorder = Recorder::default();

    edits.mount("idle");
    edits.edit("a", AnswerValue::text("1"), start);
    edits.edit("b", AnswerValue::text("2"), start);
    let flushed = edits.unmount_all(&mut recorder);

    assert_eq!(flushed, vec!["a".to_string(), "b".to_string()]);
    assert!(edits.mounted_ids().next().is_none());
}
