//! In-memory fakes of the client traits, shared by the handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use smb_sync_common::{JobId, RunId};

use crate::error::ServiceError;
use crate::traits::{LogClient, Notifier, ObjectStore, TransferClient};
use crate::types::{Notification, ObjectMetadata, PathFilter, RunResult, RunState, RunStatus};

pub const JOB_ARN: &str = "arn:aws:datasync:eu-west-1:123456789012:task/task-0abc";
pub const RUN_ARN: &str =
    "arn:aws:datasync:eu-west-1:123456789012:task/task-0abc/execution/exec-0def";

pub fn run_id() -> RunId {
    RunId::parse(RUN_ARN).unwrap()
}

pub fn job_id() -> JobId {
    JobId::parse(JOB_ARN).unwrap()
}

pub fn status(state: RunState, bytes: u64) -> RunStatus {
    RunStatus {
        run: run_id(),
        state,
        start_time: Some(Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap()),
        files_transferred: if bytes > 0 { 3 } else { 0 },
        bytes_transferred: bytes,
        result: RunResult {
            total_duration_ms: Some(125_000),
            error_code: None,
            error_detail: None,
        },
    }
}

pub struct FakeTransfer {
    pub status: Result<RunStatus, ServiceError>,
    pub location_uri: Result<String, ServiceError>,
    pub start_error: Option<ServiceError>,
    pub started: Mutex<Vec<(JobId, Option<PathFilter>)>>,
}

impl FakeTransfer {
    pub fn with_status(status: RunStatus) -> Self {
        Self {
            status: Ok(status),
            location_uri: Ok("s3://bkt/p/".to_string()),
            start_error: None,
            started: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TransferClient for FakeTransfer {
    async fn start_run(
        &self,
        job: &JobId,
        filter: Option<&PathFilter>,
    ) -> Result<RunId, ServiceError> {
        if let Some(ref err) = self.start_error {
            return Err(err.clone());
        }
        self.started
            .lock()
            .unwrap()
            .push((job.clone(), filter.cloned()));
        Ok(run_id())
    }

    async fn describe_run(&self, _run: &RunId) -> Result<RunStatus, ServiceError> {
        self.status.clone()
    }

    async fn describe_location(&self, _location_arn: &str) -> Result<String, ServiceError> {
        self.location_uri.clone()
    }
}

#[derive(Default)]
pub struct FakeLogs {
    pub lines: Vec<String>,
    pub error: Option<ServiceError>,
    pub queries: Mutex<Vec<(String, String, String)>>,
}

impl FakeLogs {
    pub fn with_lines(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing(error: ServiceError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[async_trait]
impl LogClient for FakeLogs {
    async fn filter_lines(
        &self,
        group: &str,
        stream: &str,
        pattern: &str,
    ) -> Result<Vec<String>, ServiceError> {
        self.queries.lock().unwrap().push((
            group.to_string(),
            stream.to_string(),
            pattern.to_string(),
        ));
        match self.error {
            Some(ref err) => Err(err.clone()),
            None => Ok(self.lines.clone()),
        }
    }
}

/// Object store keeping metadata in a map and tracking write concurrency.
#[derive(Default)]
pub struct FakeStore {
    pub objects: Mutex<HashMap<String, ObjectMetadata>>,
    pub storage_classes: Mutex<HashMap<String, String>>,
    pub fail_key: Option<String>,
    pub writes: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeStore {
    pub fn with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let objects: HashMap<String, ObjectMetadata> = keys
            .into_iter()
            .map(|k| (k.into(), ObjectMetadata::default()))
            .collect();
        Self {
            objects: Mutex::new(objects),
            ..Default::default()
        }
    }

    pub fn insert(&self, key: &str, metadata: &[(&str, &str)]) {
        let user_metadata: HashMap<String, String> = metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.objects.lock().unwrap().insert(
            key.to_string(),
            ObjectMetadata { user_metadata },
        );
    }

    pub fn get(&self, key: &str) -> Option<ObjectMetadata> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn storage_class(&self, key: &str) -> Option<String> {
        self.storage_classes.lock().unwrap().get(key).cloned()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn head_metadata(
        &self,
        _bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectMetadata>, ServiceError> {
        Ok(self.get(key))
    }

    async fn replace_metadata(
        &self,
        _bucket: &str,
        key: &str,
        metadata: &HashMap<String, String>,
        storage_class: &str,
    ) -> Result<(), ServiceError> {
        let now: usize = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Let every sibling in the batch start before this one finishes.
        tokio::task::yield_now().await;

        let result = if self.fail_key.as_deref() == Some(key) {
            Err(ServiceError::api("s3", format!("copy of {} refused", key), false))
        } else {
            self.objects.lock().unwrap().insert(
                key.to_string(),
                ObjectMetadata {
                    user_metadata: metadata.clone(),
                },
            );
            self.storage_classes
                .lock()
                .unwrap()
                .insert(key.to_string(), storage_class.to_string());
            self.writes.lock().unwrap().push(key.to_string());
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub published: Mutex<Vec<(String, Notification)>>,
    pub fail: bool,
}

impl FakeNotifier {
    pub fn published(&self) -> Vec<(String, Notification)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn publish(
        &self,
        topic_arn: &str,
        notification: &Notification,
    ) -> Result<(), ServiceError> {
        if self.fail {
            return Err(ServiceError::api("sns", "throttled", true));
        }
        self.published
            .lock()
            .unwrap()
            .push((topic_arn.to_string(), notification.clone()));
        Ok(())
    }
}
