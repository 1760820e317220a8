use crate::api::ApiClient;
use crate::error::{JournalError, Result};
use crate::models::{CreateJournalRequest, EntryType, UpdateJournalRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

/// Where drafts are saved.
#[async_trait]
pub trait DraftSink: Send + Sync {
    async fn save(&self, draft: &str) -> Result<()>;
}

/// Totals reported when the saver is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoSaveReport {
    pub saves: usize,
    pub failures: usize,
    pub last_error: Option<String>,
}

/// Debounced draft saving: a draft is saved once no edit arrived for the
/// idle window. Closing saves whatever is still unsaved.
pub struct AutoSaver {
    edits: mpsc::UnboundedSender<String>,
    task: JoinHandle<AutoSaveReport>,
}

impl AutoSaver {
    pub fn spawn(sink: Arc<dyn DraftSink>, idle: Duration) -> Self {
        let (edits, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(sink, idle, rx));
        Self { edits, task }
    }

    /// Record the latest full draft text.
    pub fn edit(&self, draft: impl Into<String>) {
        // The task only stops after `close`, so the send cannot fail earlier
        let _ = self.edits.send(draft.into());
    }

    pub async fn close(self) -> Result<AutoSaveReport> {
        drop(self.edits);
        self.task
            .await
            .map_err(|e| JournalError::Other(format!("auto-save task failed: {}", e)))
    }
}

async fn run(
    sink: Arc<dyn DraftSink>,
    idle: Duration,
    mut rx: mpsc::UnboundedReceiver<String>,
) -> AutoSaveReport {
    let mut report = AutoSaveReport::default();
    let mut pending: Option<String> = None;

    loop {
        let next = if pending.is_some() {
            tokio::select! {
                edit = rx.recv() => edit,
                _ = sleep(idle) => {
                    if let Some(draft) = pending.take() {
                        if let Err(draft) = save(&sink, draft, &mut report).await {
                            // Retry after the next idle window
                            pending = Some(draft);
                        }
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match next {
            Some(draft) => pending = Some(draft),
            None => {
                if let Some(draft) = pending.take() {
                    let _ = save(&sink, draft, &mut report).await;
                }
                return report;
            }
        }
    }
}

async fn save(
    sink: &Arc<dyn DraftSink>,
    draft: String,
    report: &mut AutoSaveReport,
) -> std::result::Result<(), String> {
    match sink.save(&draft).await {
        Ok(()) => {
            report.saves += 1;
            Ok(())
        }
        Err(e) => {
            report.failures += 1;
            report.last_error = Some(e.to_string());
            Err(draft)
        }
    }
}

/// Saves drafts as a journal entry: created on the first save, updated
/// afterwards.
pub struct JournalDraft {
    api: ApiClient,
    entry_type: EntryType,
    date: String,
    template_id: Option<String>,
    entry_id: Mutex<Option<String>>,
}

impl JournalDraft {
    pub fn new(
        api: ApiClient,
        entry_type: EntryType,
        date: String,
        template_id: Option<String>,
        entry_id: Option<String>,
    ) -> Self {
        Self {
            api,
            entry_type,
            date,
            template_id,
            entry_id: Mutex::new(entry_id),
        }
    }

    pub async fn entry_id(&self) -> Option<String> {
        self.entry_id.lock().await.clone()
    }
}

#[async_trait]
impl DraftSink for JournalDraft {
    async fn save(&self, draft: &str) -> Result<()> {
        let mut entry_id = self.entry_id.lock().await;
        match entry_id.as_deref() {
            Some(id) => {
                let request = UpdateJournalRequest {
                    content: Some(draft.to_string()),
                    ..Default::default()
                };
                self.api.update_journal(id, &request).await?;
            }
            None => {
                let request = CreateJournalRequest {
                    entry_type: self.entry_type,
                    date: self.date.clone(),
                    title: None,
                    content: draft.to_string(),
                    mood: None,
                    template_id: self.template_id.clone(),
                    tags: Vec::new(),
                };
                let entry = self.api.create_journal(&request).await?;
                *entry_id = Some(entry.id);
            }
        }
        Ok(())
    }
}
