//! Post-transfer metadata patching.
//!
//! The transfer service cannot set SMB ownership or permission metadata on
//! the destination objects, so after a successful run this module works out
//! which objects the run touched (from the run's log stream) and rewrites
//! their user metadata in place.
//!
//! # Batching
//!
//! Targets are patched in batches of [`DEFAULT_PATCH_BATCH_SIZE`]. Every
//! patch in a batch is issued concurrently and the whole batch is joined
//! before the next one starts. If any patch in a batch fails, the remaining
//! batches are not attempted.
//!
//! # Failure reporting
//!
//! A failure after the run has been described is logged and reported by one
//! notification. The handler itself then returns `Ok`, so the dispatcher does
//! not retry a partially applied run.

use std::collections::HashMap;

use futures::future::join_all;
use smb_sync_common::{
    destination_prefix, PatcherConfig, RunId, DEFAULT_PATCH_BATCH_SIZE, TRANSFERRED_FILE_FILTER,
};
use tracing::{debug, error, info, warn};

use crate::error::{HandlerError, ServiceError};
use crate::log_scan::{collect_patch_targets, PatchTarget, TargetKind};
use crate::metadata::build_replacement;
use crate::notifier::format_start_time;
use crate::traits::{LogClient, Notifier, ObjectStore, TransferClient};
use crate::types::{Notification, ObjectMetadata, RunState, RunStatus};

/// Options for patch operations.
#[derive(Debug, Clone)]
pub struct PatchOptions {
    /// Maximum number of patches issued before joining.
    pub batch_size: usize,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_PATCH_BATCH_SIZE,
        }
    }
}

impl PatchOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Counts from a completed patch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    /// Objects whose metadata was rewritten.
    pub patched: usize,
    /// Folder targets absent from the bucket.
    pub missing: usize,
    /// Number of batches run.
    pub batches: usize,
}

/// What the patcher did for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The run did not succeed, nothing was touched.
    Skipped { state: RunState },
    /// Every target was handled.
    Patched(PatchSummary),
    /// Patching stopped on `error`; one failure notification was published.
    Failed { error: HandlerError },
}

enum ObjectPatch {
    Patched,
    Missing,
}

/// Rewrites destination metadata after a successful run.
pub struct MetadataPatcher<'a, T, L, S, N>
where
    T: TransferClient,
    L: LogClient,
    S: ObjectStore,
    N: Notifier,
{
    transfer: &'a T,
    logs: &'a L,
    store: &'a S,
    notifier: &'a N,
    config: &'a PatcherConfig,
    options: PatchOptions,
}

impl<'a, T, L, S, N> MetadataPatcher<'a, T, L, S, N>
where
    T: TransferClient,
    L: LogClient,
    S: ObjectStore,
    N: Notifier,
{
    /// Create a new metadata patcher.
    ///
    /// # Arguments
    /// * `transfer` - Transfer-job control client
    /// * `logs` - Log query client for the run's log stream
    /// * `store` - Destination object store
    /// * `notifier` - Channel for the failure notification
    /// * `config` - Patcher configuration
    pub fn new(
        transfer: &'a T,
        logs: &'a L,
        store: &'a S,
        notifier: &'a N,
        config: &'a PatcherConfig,
    ) -> Self {
        Self {
            transfer,
            logs,
            store,
            notifier,
            config,
            options: PatchOptions::default(),
        }
    }

    /// Set patch options.
    pub fn with_options(mut self, options: PatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Handle the successful completion of `run`.
    ///
    /// Waits the settling delay, then patches every object the run
    /// transferred. Errors while describing the run, or while publishing the
    /// failure notification, are returned. Errors while patching are reported
    /// and returned inside [`PatchOutcome::Failed`].
    pub async fn handle(&self, run: &RunId) -> Result<PatchOutcome, HandlerError> {
        debug!(delay = ?self.config.settle_delay, "waiting for run logs to settle");
        tokio::time::sleep(self.config.settle_delay).await;

        let status: RunStatus = self.transfer.describe_run(run).await?;
        if status.state != RunState::Success {
            warn!(run = %run, state = %status.state, "run did not succeed, skipping metadata patch");
            return Ok(PatchOutcome::Skipped {
                state: status.state,
            });
        }

        match self.patch_run(&status).await {
            Ok(summary) => {
                info!(
                    run = %run,
                    patched = summary.patched,
                    missing = summary.missing,
                    batches = summary.batches,
                    "metadata patch complete"
                );
                Ok(PatchOutcome::Patched(summary))
            }
            Err(err) => {
                error!(run = %run, error = %err, "metadata patch failed");
                self.notifier
                    .publish(&self.config.topic_arn, &self.failure_report(&status))
                    .await?;
                Ok(PatchOutcome::Failed { error: err })
            }
        }
    }

    /// Find the run's targets and patch them.
    async fn patch_run(&self, status: &RunStatus) -> Result<PatchSummary, HandlerError> {
        let location_uri: String = self
            .transfer
            .describe_location(&self.config.destination_location_arn)
            .await?;
        let prefix: String = destination_prefix(&location_uri, &self.config.bucket)?;

        let stream: String = status.run.log_stream_name();
        let lines: Vec<String> = self
            .logs
            .filter_lines(&self.config.log_group, &stream, TRANSFERRED_FILE_FILTER)
            .await?;

        let targets: Vec<PatchTarget> = collect_patch_targets(&prefix, &lines);
        info!(
            stream = %stream,
            lines = lines.len(),
            targets = targets.len(),
            prefix = %prefix,
            "collected patch targets"
        );

        Ok(self.patch_targets(&targets).await?)
    }

    /// Patch `targets` batch by batch.
    ///
    /// # Returns
    /// Counts of patched and missing objects.
    ///
    /// # Errors
    /// The first error of the first failing batch. Later batches are not run.
    /// A transferred object that is absent from the bucket is an error; an
    /// absent folder is counted as missing.
    pub async fn patch_targets(
        &self,
        targets: &[PatchTarget],
    ) -> Result<PatchSummary, ServiceError> {
        let batch_size: usize = self.options.batch_size.max(1);
        let mut summary = PatchSummary::default();

        for batch in targets.chunks(batch_size) {
            let results: Vec<Result<ObjectPatch, ServiceError>> =
                join_all(batch.iter().map(|target| self.patch_object(target))).await;

            summary.batches += 1;
            for result in results {
                match result? {
                    ObjectPatch::Patched => summary.patched += 1,
                    ObjectPatch::Missing => summary.missing += 1,
                }
            }
            debug!(batch = summary.batches, size = batch.len(), "batch complete");
        }

        Ok(summary)
    }

    async fn patch_object(&self, target: &PatchTarget) -> Result<ObjectPatch, ServiceError> {
        let bucket: &str = &self.config.bucket;
        let key: &str = &target.key;

        let existing: ObjectMetadata = match self.store.head_metadata(bucket, key).await? {
            Some(metadata) => metadata,
            None if target.kind == TargetKind::Folder => {
                warn!(bucket = %bucket, key = %key, "folder object not found, skipping");
                return Ok(ObjectPatch::Missing);
            }
            None => {
                return Err(ServiceError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
        };

        let replacement: HashMap<String, String> =
            build_replacement(&existing.user_metadata, &self.config.attributes);
        self.store
            .replace_metadata(bucket, key, &replacement, &self.config.storage_class)
            .await?;

        Ok(ObjectPatch::Patched)
    }

    fn failure_report(&self, status: &RunStatus) -> Notification {
        let logs = &self.config.handler_logs;
        let body: String = [
            format!(
                "Updating object metadata after DataSync task {} failed.",
                self.config.job_name
            ),
            format!(
                "Task execution start time: {}",
                format_start_time(status.start_time.as_ref())
            ),
            format!("Execution: {}", status.run),
            format!(
                "See log group {}, log stream {} for details.",
                logs.log_group.as_deref().unwrap_or("n/a"),
                logs.log_stream.as_deref().unwrap_or("n/a")
            ),
        ]
        .join("\n");

        Notification::new(
            format!("DataSync task {} metadata update FAILED", self.config.job_name),
            body,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use smb_sync_common::{
        HandlerLogLocation, IdentifierError, SmbAttributes, METADATA_KEY_FILE_CTIME,
        METADATA_KEY_FILE_MTIME, METADATA_KEY_FILE_OWNER,
    };

    use super::*;
    use crate::testing::{run_id, status, FakeLogs, FakeNotifier, FakeStore, FakeTransfer};

    fn config() -> PatcherConfig {
        PatcherConfig {
            job_name: "nightly-share".to_string(),
            topic_arn: "arn:aws:sns:eu-west-1:123456789012:sync".to_string(),
            bucket: "bkt".to_string(),
            destination_location_arn: "arn:aws:datasync:eu-west-1:123456789012:location/loc-1"
                .to_string(),
            log_group: "/aws/datasync".to_string(),
            attributes: SmbAttributes {
                owner: "1000".to_string(),
                group: "100".to_string(),
                permissions: "0775".to_string(),
                acl: "acl-blob".to_string(),
            },
            storage_class: "STANDARD_IA".to_string(),
            settle_delay: Duration::ZERO,
            handler_logs: HandlerLogLocation {
                log_group: Some("/aws/lambda/patcher".to_string()),
                log_stream: Some("2024/03/01/[$LATEST]0123".to_string()),
            },
        }
    }

    fn success() -> FakeTransfer {
        FakeTransfer::with_status(status(RunState::Success, 100))
    }

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p/{:04}.bin", i)).collect()
    }

    fn objects(keys: &[String]) -> Vec<PatchTarget> {
        keys.iter()
            .map(|k| PatchTarget::new(k.as_str(), TargetKind::Object))
            .collect()
    }

    #[tokio::test]
    async fn test_patches_transferred_objects_and_folders() {
        let transfer = success();
        let logs = FakeLogs::with_lines(&[
            "[INFO] Transferred file /a//b.txt, 120 bytes",
            "[INFO] Transferred file /c.txt, 5 bytes",
        ]);
        let store = FakeStore::with_keys(["p/", "p/a/", "p/c.txt"]);
        store.insert(
            "p/a/b.txt",
            &[
                (METADATA_KEY_FILE_CTIME, "1700000000000ns"),
                (METADATA_KEY_FILE_OWNER, "0"),
                ("user-agent", "aws-datasync"),
            ],
        );
        let notifier = FakeNotifier::default();
        let config = config();

        let outcome = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .handle(&run_id())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PatchOutcome::Patched(PatchSummary {
                patched: 4,
                missing: 0,
                batches: 1
            })
        );
        let patched = store.get("p/a/b.txt").unwrap();
        assert_eq!(patched.user_metadata[METADATA_KEY_FILE_OWNER], "1000");
        assert_eq!(patched.user_metadata[METADATA_KEY_FILE_CTIME], "1700000000000ns");
        assert!(!patched.user_metadata.contains_key(METADATA_KEY_FILE_MTIME));
        assert!(!patched.user_metadata.contains_key("user-agent"));
        assert_eq!(store.storage_class("p/a/b.txt").as_deref(), Some("STANDARD_IA"));
        assert!(notifier.published().is_empty());

        let queries = logs.queries.lock().unwrap().clone();
        assert_eq!(
            queries,
            vec![(
                "/aws/datasync".to_string(),
                "task-0abc-exec-0def".to_string(),
                TRANSFERRED_FILE_FILTER.to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_no_matching_lines_still_patches_prefix() {
        let transfer = success();
        let logs = FakeLogs::default();
        let store = FakeStore::with_keys(["p/"]);
        let notifier = FakeNotifier::default();
        let config = config();

        let outcome = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .handle(&run_id())
            .await
            .unwrap();

        assert!(matches!(outcome, PatchOutcome::Patched(s) if s.patched == 1));
        assert_eq!(*store.writes.lock().unwrap(), vec!["p/".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_transferred_object_is_reported() {
        let transfer = success();
        let logs = FakeLogs::with_lines(&["Transferred file /gone.txt, 1 bytes"]);
        let store = FakeStore::with_keys(["p/"]);
        let notifier = FakeNotifier::default();
        let config = config();

        let outcome = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .handle(&run_id())
            .await
            .unwrap();

        match outcome {
            PatchOutcome::Failed {
                error: HandlerError::Service(ServiceError::NotFound { bucket, key }),
            } => {
                assert_eq!(bucket, "bkt");
                assert_eq!(key, "p/gone.txt");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(notifier.published().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_folders_are_skipped() {
        let transfer = success();
        let logs = FakeLogs::with_lines(&["Transferred file /d/x.txt, 1 bytes"]);
        let store = FakeStore::with_keys(["p/d/x.txt"]);
        let notifier = FakeNotifier::default();
        let config = config();

        let outcome = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .handle(&run_id())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PatchOutcome::Patched(PatchSummary {
                patched: 1,
                missing: 2,
                batches: 1
            })
        );
        assert_eq!(*store.writes.lock().unwrap(), vec!["p/d/x.txt".to_string()]);
        assert!(notifier.published().is_empty());
    }

    #[tokio::test]
    async fn test_log_query_failure_is_reported() {
        let transfer = success();
        let logs = FakeLogs::failing(ServiceError::api("logs", "log group not found", false));
        let store = FakeStore::with_keys(["p/"]);
        let notifier = FakeNotifier::default();
        let config = config();

        let outcome = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .handle(&run_id())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            PatchOutcome::Failed {
                error: HandlerError::Service(ServiceError::Api { service: "logs", .. })
            }
        ));
        assert_eq!(notifier.published().len(), 1);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_patch_is_idempotent_across_runs() {
        let transfer = success();
        let logs = FakeLogs::with_lines(&["Transferred file /x.txt, 1 bytes"]);
        let store = FakeStore::with_keys(["p/"]);
        store.insert("p/x.txt", &[(METADATA_KEY_FILE_MTIME, "42ns"), ("junk", "1")]);
        let notifier = FakeNotifier::default();
        let config = config();
        let patcher = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config);

        patcher.handle(&run_id()).await.unwrap();
        let first = store.get("p/x.txt").unwrap();
        patcher.handle(&run_id()).await.unwrap();
        let second = store.get("p/x.txt").unwrap();

        assert_eq!(first, second);
        assert_eq!(second.user_metadata.len(), 5);
    }

    #[tokio::test]
    async fn test_batches_of_200_with_barrier() {
        let transfer = success();
        let logs = FakeLogs::default();
        let targets: Vec<String> = keys(450);
        let store = FakeStore::with_keys(targets.clone());
        let notifier = FakeNotifier::default();
        let config = config();
        let patcher = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config);

        let summary = patcher.patch_targets(&objects(&targets)).await.unwrap();

        assert_eq!(summary.batches, 3);
        assert_eq!(summary.patched, 450);
        assert!(store.max_in_flight() <= 200);
        assert!(store.max_in_flight() > 1);

        // No write of a later batch may complete before the earlier batch is done.
        let writes = store.writes.lock().unwrap().clone();
        for (start, end) in [(0, 200), (200, 400), (400, 450)] {
            let written: HashSet<&String> = writes[start..end].iter().collect();
            let expected: HashSet<&String> = targets[start..end].iter().collect();
            assert_eq!(written, expected);
        }
    }

    #[tokio::test]
    async fn test_custom_batch_size() {
        let transfer = success();
        let logs = FakeLogs::default();
        let targets: Vec<String> = keys(7);
        let store = FakeStore::with_keys(targets.clone());
        let notifier = FakeNotifier::default();
        let config = config();
        let patcher = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .with_options(PatchOptions::new().with_batch_size(3));

        let summary = patcher.patch_targets(&objects(&targets)).await.unwrap();

        assert_eq!(summary.batches, 3);
        assert!(store.max_in_flight() <= 3);
    }

    #[tokio::test]
    async fn test_failure_publishes_once_and_stops_later_batches() {
        let transfer = success();
        let lines: Vec<String> = (0..450)
            .map(|i| format!("Transferred file /{:04}.bin, 1 bytes", i))
            .collect();
        let logs = FakeLogs {
            lines,
            ..Default::default()
        };
        let mut store = FakeStore::with_keys(keys(450));
        store.insert("p/", &[]);
        // "p/" sorts first, so "p/0100.bin" is in the first batch.
        store.fail_key = Some("p/0100.bin".to_string());
        let notifier = FakeNotifier::default();
        let config = config();

        let outcome = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .handle(&run_id())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            PatchOutcome::Failed {
                error: HandlerError::Service(ServiceError::Api { .. })
            }
        ));
        assert_eq!(store.write_count(), 199);

        let published = notifier.published();
        assert_eq!(published.len(), 1);
        let (topic, report) = &published[0];
        assert_eq!(topic, &config.topic_arn);
        assert_eq!(report.subject, "DataSync task nightly-share metadata update FAILED");
        assert!(report.body.contains("nightly-share"));
        assert!(report.body.contains("2024-03-01T02:00:00Z"));
        assert!(report.body.contains("/aws/lambda/patcher"));
        assert!(report.body.contains("2024/03/01/[$LATEST]0123"));
    }

    #[tokio::test]
    async fn test_bad_location_is_reported() {
        let mut transfer = success();
        transfer.location_uri = Ok("s3://some-other-bucket/p/".to_string());
        let logs = FakeLogs::default();
        let store = FakeStore::default();
        let notifier = FakeNotifier::default();
        let config = config();

        let outcome = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .handle(&run_id())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            PatchOutcome::Failed {
                error: HandlerError::Identifier(IdentifierError::LocationOutsideBucket { .. })
            }
        ));
        assert_eq!(notifier.published().len(), 1);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_notification_propagates() {
        let transfer = success();
        let logs = FakeLogs::default();
        let mut store = FakeStore::with_keys(["p/"]);
        store.fail_key = Some("p/".to_string());
        let notifier = FakeNotifier {
            fail: true,
            ..Default::default()
        };
        let config = config();

        let result = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .handle(&run_id())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unsuccessful_run_is_skipped() {
        let transfer = FakeTransfer::with_status(status(RunState::Error, 0));
        let logs = FakeLogs::default();
        let store = FakeStore::with_keys(["p/"]);
        let notifier = FakeNotifier::default();
        let config = config();

        let outcome = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .handle(&run_id())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PatchOutcome::Skipped {
                state: RunState::Error
            }
        );
        assert_eq!(store.write_count(), 0);
        assert!(logs.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_describe_failure_propagates() {
        let mut transfer = success();
        transfer.status = Err(ServiceError::api("datasync", "boom", true));
        let logs = FakeLogs::default();
        let store = FakeStore::default();
        let notifier = FakeNotifier::default();
        let config = config();

        let err = MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .handle(&run_id())
            .await
            .unwrap_err();

        assert!(matches!(err, HandlerError::Service(_)));
        assert!(notifier.published().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_settle_delay_before_reading_logs() {
        let transfer = success();
        let logs = FakeLogs::default();
        let store = FakeStore::with_keys(["p/"]);
        let notifier = FakeNotifier::default();
        let mut config = config();
        config.settle_delay = Duration::from_secs(60);

        let started = tokio::time::Instant::now();
        MetadataPatcher::new(&transfer, &logs, &store, &notifier, &config)
            .handle(&run_id())
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_secs(60));
        assert_eq!(logs.queries.lock().unwrap().len(), 1);
    }
}
