mod common;

use async_trait::async_trait;
use common::logged_in_backend;
use journal_client::autosave::{AutoSaver, DraftSink, JournalDraft};
use journal_client::error::{JournalError, Result};
use journal_client::models::EntryType;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

const IDLE: Duration = Duration::from_millis(50);

#[derive(Default)]
struct RecordingSink {
    saved: Mutex<Vec<String>>,
    failures_left: Mutex<u32>,
}

impl RecordingSink {
    fn failing(times: u32) -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            failures_left: Mutex::new(times),
        }
    }

    fn saved(&self) -> Vec<String> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl DraftSink for RecordingSink {
    async fn save(&self, draft: &str) -> Result<()> {
        {
            let mut failures_left = self.failures_left.lock().unwrap();
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err(JournalError::Other("disk full".to_string()));
            }
        }
        self.saved.lock().unwrap().push(draft.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_rapid_edits_are_saved_once() {
    let sink = Arc::new(RecordingSink::default());
    let saver = AutoSaver::spawn(sink.clone(), IDLE);

    saver.edit("Dear");
    saver.edit("Dear diary");
    saver.edit("Dear diary, today");
    tokio::time::sleep(IDLE * 4).await;

    assert_eq!(sink.saved(), vec!["Dear diary, today".to_string()]);

    let report = saver.close().await.unwrap();
    assert_eq!(report.saves, 1);
    assert_eq!(report.failures, 0);
}

#[tokio::test]
async fn test_close_flushes_unsaved_draft() {
    let sink = Arc::new(RecordingSink::default());
    let saver = AutoSaver::spawn(sink.clone(), Duration::from_secs(60));

    saver.edit("first line");
    saver.edit("first line\nsecond line");
    let report = saver.close().await.unwrap();

    assert_eq!(sink.saved(), vec!["first line\nsecond line".to_string()]);
    assert_eq!(report.saves, 1);
}

#[tokio::test]
async fn test_close_without_edits_saves_nothing() {
    let sink = Arc::new(RecordingSink::default());
    let saver = AutoSaver::spawn(sink.clone(), IDLE);
    let report = saver.close().await.unwrap();
    assert!(sink.saved().is_empty());
    assert_eq!(report.saves, 0);
}

#[tokio::test]
async fn test_failed_save_is_retried() {
    let sink = Arc::new(RecordingSink::failing(1));
    let saver = AutoSaver::spawn(sink.clone(), IDLE);

    saver.edit("draft");
    tokio::time::sleep(IDLE * 5).await;
    let report = saver.close().await.unwrap();

    assert_eq!(sink.saved(), vec!["draft".to_string()]);
    assert_eq!(report.failures, 1);
    assert_eq!(report.saves, 1);
    assert_eq!(report.last_error.as_deref(), Some("disk full"));
}

#[tokio::test]
async fn test_journal_draft_creates_then_updates() {
    let backend = logged_in_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/journals"))
        .and(body_json(json!({
            "type": "daily",
            "date": "2024-01-03",
            "content": "Slept well",
            "templateId": "t1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": { "_id": "j1", "type": "daily", "date": "2024-01-03", "content": "Slept well" }
        })))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/journals/j1"))
        .and(body_json(json!({ "content": "Slept well. Ran 5k." })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "_id": "j1", "type": "daily", "date": "2024-01-03", "content": "Slept well. Ran 5k." }
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let draft = JournalDraft::new(
        backend.api.clone(),
        EntryType::Daily,
        "2024-01-03".to_string(),
        Some("t1".to_string()),
        None,
    );
    draft.save("Slept well").await.unwrap();
    assert_eq!(draft.entry_id().await.as_deref(), Some("j1"));
    draft.save("Slept well. Ran 5k.").await.unwrap();
}
