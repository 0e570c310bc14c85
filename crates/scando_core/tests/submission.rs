mod common;

use common::{date, result, task, upload, MemoryStorage, RecordingNotifier, ScriptedAnalysis};
use scando_core::calendar::tasks_for_date;
use scando_core::organizer::{DUE_TODAY_TITLE, NOTIFICATIONS_ENABLED_TITLE};
use scando_core::preferences::SUBSCRIPTION_KEY;
use scando_core::{
    AnalysisError, AnalysisMode, DocumentId, DocumentStatus, Organizer, Priority, StudyPlan,
    SubmissionOutcome,
};
use std::sync::Arc;

struct Harness {
    storage: Arc<MemoryStorage>,
    analysis: Arc<ScriptedAnalysis>,
    notifier: Arc<RecordingNotifier>,
    organizer: Organizer,
}

fn harness_with(storage: MemoryStorage) -> Harness {
    let storage = Arc::new(storage);
    let analysis = Arc::new(ScriptedAnalysis::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let organizer = Organizer::new(storage.clone(), analysis.clone(), notifier.clone());
    Harness {
        storage,
        analysis,
        notifier,
        organizer,
    }
}

fn harness() -> Harness {
    harness_with(MemoryStorage::default())
}

#[tokio::test]
async fn successful_scan_replaces_the_placeholder() {
    let h = harness();
    let reply = h.analysis.expect("groceries.png");

    let submission = h.organizer.submit(upload("groceries.png"), AnalysisMode::Fast).await;
    let docs = h.organizer.documents().await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, submission.document_id);
    assert_eq!(docs[0].status, DocumentStatus::Processing);
    assert!(docs[0].tasks.is_empty());

    reply
        .send(Ok(result(
            "Groceries",
            vec![task("Buy milk", Priority::High, Some(date(2025, 1, 10)))],
        )))
        .expect("analysis is waiting");
    assert_eq!(
        submission.wait().await.expect("task joins"),
        SubmissionOutcome::Completed { task_count: 1 }
    );

    let docs = h.organizer.documents().await;
    assert_eq!(docs[0].status, DocumentStatus::Completed);
    assert_eq!(docs[0].title, "Groceries");
    assert_eq!(docs[0].tasks[0].description, "Buy milk");
    assert!(!docs[0].tasks[0].is_completed);

    let on_tenth: Vec<_> = tasks_for_date(&docs, date(2025, 1, 10)).collect();
    assert_eq!(on_tenth.len(), 1);
    assert_eq!(on_tenth[0].task.description, "Buy milk");
    assert!(tasks_for_date(&docs, date(2025, 1, 11)).next().is_none());
}

#[tokio::test]
async fn failed_scan_becomes_an_error_document() {
    let h = harness();
    let reply = h.analysis.expect("blurry.png");

    let submission = h.organizer.submit(upload("blurry.png"), AnalysisMode::Fast).await;
    reply
        .send(Err(AnalysisError::from_provider_message("403 permission denied")))
        .expect("analysis is waiting");
    let outcome = submission.wait().await.expect("task joins");
    assert!(matches!(outcome, SubmissionOutcome::Failed(AnalysisError::AccessDenied(_))));

    let doc = h
        .organizer
        .document(h.organizer.documents().await[0].id)
        .await
        .expect("error documents stay listed");
    assert_eq!(doc.status, DocumentStatus::Error);
    assert!(doc.tasks.is_empty());
    assert!(doc.summary.starts_with("Access Denied"));
}

#[tokio::test]
async fn concurrent_scans_patch_their_own_placeholder() {
    let h = harness();
    let first_reply = h.analysis.expect("first.png");
    let second_reply = h.analysis.expect("second.png");

    let first = h.organizer.submit(upload("first.png"), AnalysisMode::Fast).await;
    let second = h.organizer.submit(upload("second.png"), AnalysisMode::Fast).await;
    let (first_id, second_id) = (first.document_id, second.document_id);

    second_reply
        .send(Ok(result("Second", vec![task("b", Priority::Low, None)])))
        .unwrap();
    second.wait().await.unwrap();
    let docs = h.organizer.documents().await;
    assert_eq!(docs[0].status, DocumentStatus::Completed);
    assert_eq!(docs[1].status, DocumentStatus::Processing);

    first_reply
        .send(Ok(result("First", vec![task("a", Priority::High, None)])))
        .unwrap();
    first.wait().await.unwrap();

    let docs = h.organizer.documents().await;
    let order: Vec<_> = docs.iter().map(|d| (d.id, d.title.as_str())).collect();
    assert_eq!(order, vec![(second_id, "Second"), (first_id, "First")]);
    assert!(docs.iter().all(|d| d.status == DocumentStatus::Completed));
}

#[tokio::test]
async fn deleting_while_processing_discards_the_result() {
    let h = harness();
    let reply = h.analysis.expect("gone.png");

    let submission = h.organizer.submit(upload("gone.png"), AnalysisMode::Fast).await;
    assert!(h.organizer.select(submission.document_id).await);
    let outcome = h.organizer.delete_document(submission.document_id).await;
    assert!(outcome.removed && outcome.selection_cleared);

    reply
        .send(Ok(result("Ghost", vec![task("boo", Priority::Low, None)])))
        .unwrap();
    assert_eq!(submission.wait().await.unwrap(), SubmissionOutcome::Discarded);
    assert!(h.organizer.documents().await.is_empty());
}

#[tokio::test]
async fn every_collection_change_is_persisted() {
    let h = harness();
    let reply = h.analysis.expect("persist.png");

    let submission = h.organizer.submit(upload("persist.png"), AnalysisMode::Fast).await;
    let id = submission.document_id;
    // The uploaded file, then the collection.
    assert_eq!(h.storage.writes(), 2);
    assert!(h.storage.raw(&id.source_key()).is_some());
    reply.send(Ok(result("Saved", vec![]))).unwrap();
    submission.wait().await.unwrap();
    assert_eq!(h.storage.writes(), 3);

    let reopened = harness_with(MemoryStorage::with(
        scando_core::store::DOCUMENTS_KEY,
        &h.storage.raw(scando_core::store::DOCUMENTS_KEY).unwrap(),
    ));
    assert_eq!(
        reopened.organizer.documents().await,
        h.organizer.documents().await
    );
}

#[tokio::test]
async fn deep_scans_keep_their_study_plan() {
    let h = harness_with(MemoryStorage::with(SUBSCRIPTION_KEY, "true"));
    assert!(h.organizer.can_use(AnalysisMode::Deep).await);
    let reply = h.analysis.expect("syllabus.pdf");

    let submission = h.organizer.submit(upload("syllabus.pdf"), AnalysisMode::Deep).await;
    let mut analysis = result("Syllabus", vec![]);
    analysis.study_plan = Some(StudyPlan {
        overview: "Seven days of review".into(),
        ..StudyPlan::default()
    });
    reply.send(Ok(analysis)).unwrap();
    submission.wait().await.unwrap();

    assert_eq!(h.analysis.calls(), vec![("syllabus.pdf".to_string(), AnalysisMode::Deep)]);
    let doc = h.organizer.documents().await.remove(0);
    assert_eq!(
        doc.study_plan.map(|plan| plan.overview),
        Some("Seven days of review".to_string())
    );
}

#[tokio::test]
async fn deep_mode_requires_subscription() {
    let h = harness();
    assert!(h.organizer.can_use(AnalysisMode::Fast).await);
    assert!(!h.organizer.can_use(AnalysisMode::Deep).await);

    assert!(!h.organizer.handle_checkout_return("?canceled=true").await);
    assert!(!h.organizer.is_subscribed().await);

    assert!(h.organizer.handle_checkout_return("?success=true").await);
    assert!(h.organizer.can_use(AnalysisMode::Deep).await);
    assert_eq!(h.storage.raw(SUBSCRIPTION_KEY).as_deref(), Some("true"));
}

#[tokio::test]
async fn corrupt_subscription_flag_reads_as_inactive() {
    let h = harness_with(MemoryStorage::with(SUBSCRIPTION_KEY, "yes please"));
    assert!(!h.organizer.is_subscribed().await);
}

#[tokio::test]
async fn due_today_reminder_respects_opt_in() {
    let h = harness();
    let reply = h.analysis.expect("agenda.png");
    let today = date(2025, 3, 14);

    let submission = h.organizer.submit(upload("agenda.png"), AnalysisMode::Fast).await;
    reply
        .send(Ok(result(
            "Agenda",
            vec![
                task("Submit essay", Priority::High, Some(today)),
                task("Email tutor", Priority::Low, Some(today)),
                task("Next week", Priority::Low, Some(date(2025, 3, 21))),
            ],
        )))
        .unwrap();
    submission.wait().await.unwrap();

    assert_eq!(h.organizer.notify_due_today(today).await.unwrap(), 2);
    assert!(h.notifier.sent().is_empty());

    h.organizer.set_notifications_enabled(true).await.unwrap();
    assert_eq!(h.organizer.notify_due_today(today).await.unwrap(), 2);
    assert_eq!(
        h.notifier.sent(),
        vec![
            (
                NOTIFICATIONS_ENABLED_TITLE.to_string(),
                "You will be reminded of tasks due today.".to_string()
            ),
            (
                DUE_TODAY_TITLE.to_string(),
                "You have 2 tasks due today.".to_string()
            ),
        ]
    );

    assert_eq!(h.organizer.notify_due_today(date(2025, 3, 15)).await.unwrap(), 0);
    assert_eq!(h.notifier.sent().len(), 2);
}

#[tokio::test]
async fn clearing_data_drops_everything() {
    let h = harness();
    let reply = h.analysis.expect("a.png");
    let submission = h.organizer.submit(upload("a.png"), AnalysisMode::Fast).await;
    let id = submission.document_id;
    reply.send(Ok(result("A", vec![]))).unwrap();
    submission.wait().await.unwrap();
    assert!(h.organizer.select(id).await);

    h.organizer.clear_all().await;
    assert!(h.organizer.documents().await.is_empty());
    assert_eq!(h.organizer.selected().await, None);
}

#[tokio::test]
async fn a_taken_id_is_refused_without_analysis() {
    let h = harness();
    let reply = h.analysis.expect("first.png");
    let id = DocumentId::new();

    let first = h.organizer.submit_as(id, upload("first.png"), AnalysisMode::Fast).await;
    let second = h.organizer.submit_as(id, upload("second.png"), AnalysisMode::Fast).await;
    assert_eq!(second.wait().await.unwrap(), SubmissionOutcome::Rejected);

    reply
        .send(Ok(result("First", vec![task("one", Priority::Low, None)])))
        .unwrap();
    assert_eq!(
        first.wait().await.unwrap(),
        SubmissionOutcome::Completed { task_count: 1 }
    );
    assert_eq!(h.analysis.calls().len(), 1);
    let documents = h.organizer.documents().await;
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].title, "First");

    let file = h.organizer.source_file(id).await.unwrap().unwrap();
    assert_eq!(file.bytes, upload("first.png").bytes);
}
