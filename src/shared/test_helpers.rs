//! In-memory collaborators for pipeline and HTTP tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::detections::models::{FireReport, NewFireReport};
use crate::features::detections::repositories::FireReportRepository;
use crate::features::volunteers::models::{NewVolunteerApplication, VolunteerApplication};
use crate::features::volunteers::repositories::VolunteerRepository;
use crate::modules::storage::{generate_filename, BlobStore, Folder, StoredBlob};
use crate::modules::vision::ImageClassifier;

/// Classifier returning a fixed verdict, or failing like an unreachable model
pub struct StubClassifier {
    verdict: Option<bool>,
    calls: AtomicUsize,
    questions: Mutex<Vec<String>>,
}

impl StubClassifier {
    pub fn answering(verdict: bool) -> Arc<Self> {
        Arc::new(Self {
            verdict: Some(verdict),
            calls: AtomicUsize::new(0),
            questions: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            verdict: None,
            calls: AtomicUsize::new(0),
            questions: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageClassifier for StubClassifier {
    async fn classify(&self, _image: &[u8], _mime_type: &str, question: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.questions.lock().unwrap().push(question.to_string());
        self.verdict.ok_or_else(|| {
            AppError::DependencyUnavailable("classifier could not process the image".to_string())
        })
    }
}

/// Blob store that keeps what it was given in memory
pub struct RecordingBlobStore {
    remote: bool,
    fail: bool,
    saved: Mutex<Vec<(Folder, String, usize)>>,
}

impl RecordingBlobStore {
    pub fn local() -> Arc<Self> {
        Arc::new(Self {
            remote: false,
            fail: false,
            saved: Mutex::new(Vec::new()),
        })
    }

    pub fn remote() -> Arc<Self> {
        Arc::new(Self {
            remote: true,
            fail: false,
            saved: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            remote: false,
            fail: true,
            saved: Mutex::new(Vec::new()),
        })
    }

    /// `(folder, filename, size)` of every successful save
    pub fn saved(&self) -> Vec<(Folder, String, usize)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn save(
        &self,
        folder: Folder,
        data: Vec<u8>,
        original_name: &str,
        _content_type: &str,
    ) -> Result<StoredBlob> {
        if self.fail {
            return Err(AppError::DependencyUnavailable(
                "blob storage is offline".to_string(),
            ));
        }

        let filename = generate_filename(original_name);
        let url = if self.remote {
            format!("https://blobs.example.test/{}/{}", folder, filename)
        } else {
            folder.default_url(&filename)
        };

        self.saved
            .lock()
            .unwrap()
            .push((folder, filename.clone(), data.len()));

        Ok(StoredBlob {
            filename,
            url,
            remote: self.remote,
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Strictly increasing timestamps so "newest first" ordering is deterministic
struct Clock {
    base: DateTime<Utc>,
    ticks: AtomicUsize,
}

impl Clock {
    fn new() -> Self {
        Self {
            base: Utc::now(),
            ticks: AtomicUsize::new(0),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) as i64;
        self.base + Duration::milliseconds(tick)
    }
}

fn persistence_failure() -> AppError {
    AppError::Database(sqlx::Error::PoolTimedOut)
}

pub struct InMemoryFireReportRepository {
    reports: Mutex<Vec<FireReport>>,
    clock: Clock,
    fail_create: bool,
}

impl InMemoryFireReportRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            reports: Mutex::new(Vec::new()),
            clock: Clock::new(),
            fail_create: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reports: Mutex::new(Vec::new()),
            clock: Clock::new(),
            fail_create: true,
        })
    }

    pub fn count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }
}

#[async_trait]
impl FireReportRepository for InMemoryFireReportRepository {
    async fn create(&self, report: NewFireReport) -> Result<FireReport> {
        if self.fail_create {
            return Err(persistence_failure());
        }

        let record = FireReport {
            id: Uuid::new_v4(),
            filename: report.filename,
            file_url: report.file_url,
            latitude: report.latitude,
            longitude: report.longitude,
            created_at: self.clock.now(),
        };
        self.reports.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<FireReport>> {
        let mut reports = self.reports.lock().unwrap().clone();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FireReport>> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }
}

pub struct InMemoryVolunteerRepository {
    volunteers: Mutex<Vec<VolunteerApplication>>,
    clock: Clock,
    fail_create: bool,
    expire_calls: AtomicUsize,
}

impl InMemoryVolunteerRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            volunteers: Mutex::new(Vec::new()),
            clock: Clock::new(),
            fail_create: false,
            expire_calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            volunteers: Mutex::new(Vec::new()),
            clock: Clock::new(),
            fail_create: true,
            expire_calls: AtomicUsize::new(0),
        })
    }

    pub fn count(&self) -> usize {
        self.volunteers.lock().unwrap().len()
    }

    /// How many times an expiry reached the repository
    pub fn expire_calls(&self) -> usize {
        self.expire_calls.load(Ordering::SeqCst)
    }

    /// Inserts a record as it would look after a previous process armed it
    pub fn insert(&self, volunteer: VolunteerApplication) {
        self.volunteers.lock().unwrap().push(volunteer);
    }

    fn update<F>(&self, id: Uuid, apply: F) -> Option<VolunteerApplication>
    where
        F: FnOnce(&mut VolunteerApplication),
    {
        let mut volunteers = self.volunteers.lock().unwrap();
        let volunteer = volunteers.iter_mut().find(|v| v.id == id)?;
        apply(volunteer);
        Some(volunteer.clone())
    }
}

#[async_trait]
impl VolunteerRepository for InMemoryVolunteerRepository {
    async fn create(&self, application: NewVolunteerApplication) -> Result<VolunteerApplication> {
        if self.fail_create {
            return Err(persistence_failure());
        }

        let created_at = self.clock.now();
        let record = VolunteerApplication {
            id: Uuid::new_v4(),
            filename: application.filename,
            file_url: application.file_url,
            first_name: application.first_name,
            last_name: application.last_name,
            email: application.email,
            phone_number: application.phone_number,
            city: application.city,
            send_sms: application.send_sms,
            send_sms_set_at: application.send_sms.then_some(created_at),
            created_at,
        };
        self.volunteers.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VolunteerApplication>> {
        Ok(self
            .volunteers
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id)
            .cloned())
    }

    async fn find_by_city(&self, city: &str) -> Result<Vec<VolunteerApplication>> {
        let city = city.to_lowercase();
        let mut matches: Vec<_> = self
            .volunteers
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.city.to_lowercase() == city && !v.send_sms)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn find_send_sms_enabled(&self) -> Result<Vec<VolunteerApplication>> {
        Ok(self
            .volunteers
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.send_sms)
            .cloned()
            .collect())
    }

    async fn set_send_sms_true(&self, id: Uuid) -> Result<Option<VolunteerApplication>> {
        let now = self.clock.now();
        Ok(self.update(id, |v| {
            v.send_sms = true;
            v.send_sms_set_at = Some(now);
        }))
    }

    async fn reset_send_sms(&self, id: Uuid) -> Result<Option<VolunteerApplication>> {
        Ok(self.update(id, |v| {
            v.send_sms = false;
            v.send_sms_set_at = None;
        }))
    }

    async fn expire_send_sms(&self, id: Uuid) -> Result<bool> {
        self.expire_calls.fetch_add(1, Ordering::SeqCst);
        let mut volunteers = self.volunteers.lock().unwrap();
        match volunteers.iter_mut().find(|v| v.id == id && v.send_sms) {
            Some(volunteer) => {
                volunteer.send_sms = false;
                volunteer.send_sms_set_at = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
