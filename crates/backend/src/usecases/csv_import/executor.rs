use std::path::{Path, PathBuf};
use std::sync::Arc;

use contracts::usecases::csv_import::{ImportEvent, ImportStatus, ImportTask, UploadResponse};
use tokio::sync::mpsc;

use super::error::ImportError;
use super::progress_tracker::{ProgressTracker, RowOutcome};
use super::row_parser::RowParser;
use crate::domain::product;
use crate::domain::product::UpsertOutcome;

#[derive(Debug, Default, Clone, Copy)]
struct ImportSummary {
    created: u64,
    updated: u64,
    failed: u64,
}

/// Drives the import pipeline: row parser -> upsert engine -> progress
/// tracker, as a background task detached from the upload request. On
/// reaching a terminal state the matching [`ImportEvent`] is pushed onto
/// the dispatch channel, after the state is already recorded.
#[derive(Clone)]
pub struct ImportExecutor {
    progress: Arc<ProgressTracker>,
    events: mpsc::Sender<ImportEvent>,
}

impl ImportExecutor {
    pub fn new(progress: Arc<ProgressTracker>, events: mpsc::Sender<ImportEvent>) -> Self {
        Self { progress, events }
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Register the task and spawn the pipeline. Returns immediately;
    /// the caller polls by task id.
    pub async fn start_import(
        &self,
        task_id: String,
        filename: &str,
        file_path: PathBuf,
    ) -> UploadResponse {
        self.progress.create(&task_id, filename);

        let executor = self.clone();
        let spawned_id = task_id.clone();
        tokio::spawn(async move {
            executor.execute(&spawned_id, &file_path).await;
        });

        UploadResponse {
            task_id,
            filename: filename.to_string(),
            message: "Upload started. Check progress at /api/upload/progress/{task_id}".to_string(),
        }
    }

    pub fn get_progress(&self, task_id: &str) -> Option<ImportTask> {
        self.progress.get(task_id)
    }

    /// Run the pipeline to its terminal state and emit the completion
    /// event. Fatal errors mark the task failed; the temp file is removed
    /// either way.
    pub(crate) async fn execute(&self, task_id: &str, path: &Path) {
        match self.run_import(task_id, path).await {
            Ok(summary) => {
                self.progress.finish(task_id, ImportStatus::Completed, None);
                let event = ImportEvent::Completed {
                    task_id: task_id.to_string(),
                    created: summary.created,
                    updated: summary.updated,
                    failed: summary.failed,
                };
                if let Err(e) = self.events.send(event).await {
                    tracing::warn!("Completion event for task {} not queued: {}", task_id, e);
                }
            }
            Err(e) => {
                tracing::error!("Import task {} failed: {}", task_id, e);
                self.progress
                    .finish(task_id, ImportStatus::Failed, Some(e.to_string()));
                let event = ImportEvent::Failed {
                    task_id: task_id.to_string(),
                    error_message: e.to_string(),
                };
                if let Err(send_err) = self.events.send(event).await {
                    tracing::warn!("Failure event for task {} not queued: {}", task_id, send_err);
                }
            }
        }

        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("Failed to delete temp file {}: {}", path.display(), e);
        }
    }

    async fn run_import(&self, task_id: &str, path: &Path) -> Result<ImportSummary, ImportError> {
        tracing::info!("Starting CSV import for task {}", task_id);

        // Header validation happens here; a missing required column fails
        // the task before any row is processed.
        let parser = RowParser::open(path)?;
        let total_rows = RowParser::count_data_rows(path)?;
        self.progress.begin(task_id, total_rows);

        let mut summary = ImportSummary::default();
        for item in parser {
            match item {
                Ok(row) => match product::service::upsert_row(&row).await {
                    Ok(UpsertOutcome::Created) => {
                        summary.created += 1;
                        self.progress.record(task_id, RowOutcome::Created);
                    }
                    Ok(UpsertOutcome::Updated) => {
                        summary.updated += 1;
                        self.progress.record(task_id, RowOutcome::Updated);
                    }
                    Err(e) => {
                        tracing::error!("Upsert failed for SKU '{}': {}", row.sku, e);
                        summary.failed += 1;
                        self.progress.record(task_id, RowOutcome::Failed);
                    }
                },
                Err(row_error) => {
                    tracing::warn!("Task {}: {}", task_id, row_error);
                    summary.failed += 1;
                    self.progress.record(task_id, RowOutcome::Failed);
                }
            }
        }

        tracing::info!(
            "CSV import finished for task {}: {} created, {} updated, {} failed of {} rows",
            task_id,
            summary.created,
            summary.updated,
            summary.failed,
            total_rows
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::setup_test_db;
    use std::io::Write;

    fn write_csv(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("import-{}.csv", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn executor_with_channel() -> (ImportExecutor, mpsc::Receiver<ImportEvent>) {
        let (tx, rx) = mpsc::channel(8);
        (ImportExecutor::new(Arc::new(ProgressTracker::new()), tx), rx)
    }

    #[tokio::test]
    async fn mixed_rows_produce_expected_counters_and_final_state() {
        setup_test_db().await;
        let (executor, mut events) = executor_with_channel();

        let sku = format!("EX-{}", uuid::Uuid::new_v4());
        let csv = format!(
            "sku,name,price,quantity,active\n\
             {sku},Widget,9.99,5,true\n\
             ,Bad,1,1,true\n\
             {sku},Widget2,10.99,3,true\n"
        );
        let path = write_csv(&csv);

        executor.tracker().create("task-mixed", "mixed.csv");
        executor.execute("task-mixed", &path).await;

        let task = executor.get_progress("task-mixed").unwrap();
        assert_eq!(task.status, ImportStatus::Completed);
        assert_eq!(task.total_rows, 3);
        assert_eq!(task.processed_rows, 3);
        assert_eq!(task.created_count, 1);
        assert_eq!(task.updated_count, 1);
        assert_eq!(task.failed_count, 1);
        assert!(task.finished_at.is_some());

        // Last occurrence wins
        let product = product::service::find_by_sku(&sku).await.unwrap().unwrap();
        assert_eq!(product.name, "Widget2");
        assert_eq!(product.price, Some(10.99));
        assert_eq!(product.quantity, 3);

        // Terminal state was recorded, then the event emitted
        match events.try_recv().unwrap() {
            ImportEvent::Completed {
                created,
                updated,
                failed,
                ..
            } => {
                assert_eq!((created, updated, failed), (1, 1, 1));
            }
            other => panic!("expected Completed event, got {:?}", other),
        }

        // Temp file is cleaned up after the run
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_sku_column_fails_task_without_touching_products() {
        setup_test_db().await;
        let (executor, mut events) = executor_with_channel();

        let marker = format!("MISSING-{}", uuid::Uuid::new_v4());
        let path = write_csv(&format!("name,price\n{marker},9.99\n"));

        executor.tracker().create("task-headers", "broken.csv");
        executor.execute("task-headers", &path).await;

        let task = executor.get_progress("task-headers").unwrap();
        assert_eq!(task.status, ImportStatus::Failed);
        assert_eq!(task.total_rows, 0);
        assert_eq!(task.processed_rows, 0);
        assert!(task.error_message.unwrap().contains("sku"));

        assert!(matches!(
            events.try_recv().unwrap(),
            ImportEvent::Failed { .. }
        ));

        // Nothing was written for the would-be row
        let page = product::service::list(Some(&marker), None, 1, 20)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn reimporting_the_same_file_is_idempotent() {
        setup_test_db().await;
        let (executor, _events) = executor_with_channel();

        let a = format!("IDEM-A-{}", uuid::Uuid::new_v4());
        let b = format!("IDEM-B-{}", uuid::Uuid::new_v4());
        let csv = format!("sku,name,quantity\n{a},First,1\n{b},Second,2\n");

        let path = write_csv(&csv);
        executor.tracker().create("idem-1", "same.csv");
        executor.execute("idem-1", &path).await;
        let first = executor.get_progress("idem-1").unwrap();
        assert_eq!(first.created_count, 2);
        assert_eq!(first.updated_count, 0);

        let path = write_csv(&csv);
        executor.tracker().create("idem-2", "same.csv");
        executor.execute("idem-2", &path).await;
        let second = executor.get_progress("idem-2").unwrap();
        assert_eq!(second.created_count, 0);
        assert_eq!(
            second.updated_count,
            first.created_count + first.updated_count
        );
        assert_eq!(second.status, ImportStatus::Completed);
    }

    #[tokio::test]
    async fn start_import_returns_immediately_and_reaches_terminal_state() {
        setup_test_db().await;
        let (executor, _events) = executor_with_channel();

        let sku = format!("BG-{}", uuid::Uuid::new_v4());
        let path = write_csv(&format!("sku,name\n{sku},Background\n"));

        let response = executor
            .start_import("task-bg".to_string(), "bg.csv", path)
            .await;
        assert_eq!(response.task_id, "task-bg");

        // The task exists as soon as the response is returned
        assert!(executor.get_progress("task-bg").is_some());

        // Poll until the detached pipeline finishes
        let mut task = executor.get_progress("task-bg").unwrap();
        for _ in 0..100 {
            if task.is_terminal() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            task = executor.get_progress("task-bg").unwrap();
        }
        assert_eq!(task.status, ImportStatus::Completed);
        assert_eq!(task.processed_rows, 1);
    }
}
