//! The conversion queue state machine.

use bytes::Bytes;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Instant;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::artifacts::{ArtifactStore, ConvertedArtifact};
use crate::converter::{ConversionJob, ConversionOutput, Converter, ConverterError};
use crate::estimator::{converted_name, SizeEstimator};
use crate::formats::{
    extension_of, info_for, is_known_format, is_supported, quality_option, QualitySetting,
};
use crate::metrics::{
    CONVERSIONS_TOTAL, CONVERSION_DURATION, FILES_ENQUEUED, FILES_REJECTED, RUNS_TOTAL,
};

use super::config::QueueConfig;
use super::error::QueueError;
use super::types::{
    EnqueueOutcome, FileStatus, QueueEvent, QueueStats, QueuedFile, RejectedFile, SubmittedFile,
    ValidationError,
};

/// Run id meaning "no run active".
const IDLE: u64 = 0;

/// Buffer size of the per-file progress channel.
const PROGRESS_BUFFER: usize = 64;

/// Message recorded on a file whose conversion failed.
const CONVERSION_FAILED: &str = "Conversion failed";

/// A queued file plus its content, kept until the file is converted.
struct QueueEntry {
    file: QueuedFile,
    content: Option<Bytes>,
}

/// Optional receiver of run events.
struct EventSink(Option<mpsc::UnboundedSender<QueueEvent>>);

impl EventSink {
    fn emit(&self, event: QueueEvent) {
        if let Some(tx) = &self.0 {
            // A dropped receiver only means nobody is watching
            let _ = tx.send(event);
        }
    }
}

/// What happened to one file during a run.
enum FileOutcome {
    Converted(ConvertedArtifact),
    Failed,
    Skipped,
    Abandoned,
}

/// Ordered collection of submitted files and the single active run.
///
/// Files are processed strictly one at a time, in enqueue order. At most one
/// run is active; the run flag holds the active run id and is claimed with a
/// single compare-exchange.
pub struct ConversionQueue<C: Converter> {
    config: QueueConfig,
    converter: C,
    store: Arc<ArtifactStore>,
    files: RwLock<Vec<QueueEntry>>,
    estimator: Mutex<SizeEstimator>,
    active_run: AtomicU64,
    next_run_id: AtomicU64,
    current_target: StdMutex<Option<(u64, String)>>,
}

impl<C: Converter> ConversionQueue<C> {
    /// Creates an empty queue with its own artifact store.
    pub fn new(config: QueueConfig, converter: C) -> Self {
        Self {
            config,
            converter,
            store: Arc::new(ArtifactStore::new()),
            files: RwLock::new(Vec::new()),
            estimator: Mutex::new(SizeEstimator::new()),
            active_run: AtomicU64::new(IDLE),
            next_run_id: AtomicU64::new(IDLE),
            current_target: StdMutex::new(None),
        }
    }

    /// Uses `store` for produced artifacts.
    pub fn with_store(mut self, store: Arc<ArtifactStore>) -> Self {
        self.store = store;
        self
    }

    /// Uses `estimator` for non-authoritative output sizes.
    pub fn with_estimator(mut self, estimator: SizeEstimator) -> Self {
        self.estimator = Mutex::new(estimator);
        self
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// The artifact store fed by this queue.
    pub fn artifacts(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    /// Validates each file and appends the valid ones as pending.
    pub async fn enqueue(&self, files: Vec<SubmittedFile>) -> EnqueueOutcome {
        let mut outcome = EnqueueOutcome::default();
        let mut entries = Vec::new();

        for submitted in files {
            let size = submitted.size();
            let errors = self.validate(&submitted);
            if !errors.is_empty() {
                FILES_REJECTED.inc();
                warn!(
                    name = %submitted.name,
                    size,
                    reasons = ?errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
                    "Rejected file"
                );
                outcome.rejected.push(RejectedFile {
                    name: submitted.name,
                    size,
                    errors,
                });
                continue;
            }

            let extension = extension_of(&submitted.name);
            let file = QueuedFile {
                id: Uuid::new_v4().to_string(),
                name: submitted.name,
                size,
                format: info_for(&extension),
                extension,
                status: FileStatus::Pending,
                added_at: Utc::now(),
            };
            debug!(id = %file.id, name = %file.name, size, "Queued file");
            outcome.accepted.push(file.clone());
            entries.push(QueueEntry {
                file,
                content: Some(submitted.content),
            });
        }

        if !entries.is_empty() {
            FILES_ENQUEUED.inc_by(entries.len() as u64);
            self.files.write().await.extend(entries);
        }

        info!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "Enqueued files"
        );
        outcome
    }

    fn validate(&self, file: &SubmittedFile) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let size = file.size();
        if size == 0 {
            errors.push(ValidationError::Empty);
        }
        if size > self.config.max_file_size_bytes {
            errors.push(ValidationError::TooLarge {
                size,
                limit: self.config.max_file_size_bytes,
            });
        }
        if extension_of(&file.name).is_empty() {
            errors.push(ValidationError::MissingExtension);
        }
        errors
    }

    /// Removes a file.
    ///
    /// A file being converted by the active run cannot be removed.
    pub async fn remove(&self, id: &str) -> Result<QueuedFile, QueueError> {
        let mut files = self.files.write().await;
        let idx = files
            .iter()
            .position(|e| e.file.id == id)
            .ok_or_else(|| QueueError::FileNotFound(id.to_string()))?;

        if files[idx].file.status.is_converting() && self.is_running() {
            return Err(QueueError::FileBusy(id.to_string()));
        }

        let entry = files.remove(idx);
        debug!(id, name = %entry.file.name, "Removed file");
        Ok(entry.file)
    }

    /// Discards every file, releases every artifact and resets the run flag.
    ///
    /// A run in flight notices on its next step and stops without touching
    /// any state.
    pub async fn clear(&self) {
        let abandoned = self.active_run.swap(IDLE, Ordering::SeqCst);
        let removed = {
            let mut files = self.files.write().await;
            let count = files.len();
            files.clear();
            count
        };
        self.store.release_all().await;

        if abandoned != IDLE {
            info!(run_id = abandoned, removed, "Cleared queue, abandoning active run");
        } else {
            info!(removed, "Cleared queue");
        }
    }

    /// Claims the run flag for a run converting pending files to `target`.
    ///
    /// Fails immediately when another run is active or `target` is not a
    /// catalog extension.
    pub fn begin_run(self: &Arc<Self>, target: &str) -> Result<ActiveRun<C>, QueueError> {
        self.begin_run_with_quality(target, None)
    }

    /// Like [`begin_run`](Self::begin_run), encoding at the named quality
    /// level of the target format.
    pub fn begin_run_with_quality(
        self: &Arc<Self>,
        target: &str,
        quality: Option<&str>,
    ) -> Result<ActiveRun<C>, QueueError> {
        let target = target.trim().trim_start_matches('.').to_lowercase();
        if !is_known_format(&target) {
            return Err(QueueError::UnknownTargetFormat(target));
        }
        let quality = match quality.map(|q| q.trim().to_lowercase()) {
            None => None,
            Some(value) => match quality_option(&target, &value) {
                Some(option) => Some(option.setting),
                None => return Err(QueueError::UnknownQuality { target, quality: value }),
            },
        };

        let run_id = self.next_run_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.active_run
            .compare_exchange(IDLE, run_id, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| QueueError::RunInProgress)?;

        // From here on the guard owns the flag
        let run = ActiveRun {
            queue: Arc::clone(self),
            run_id,
            target,
            quality,
        };
        *self
            .current_target
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some((run_id, run.target.clone()));
        RUNS_TOTAL.inc();
        Ok(run)
    }

    /// Converts every pending file to `target` and returns the artifacts
    /// produced by this run.
    pub async fn start_run(
        self: &Arc<Self>,
        target: &str,
        events: Option<mpsc::UnboundedSender<QueueEvent>>,
    ) -> Result<Vec<ConvertedArtifact>, QueueError> {
        let run = self.begin_run(target)?;
        Ok(run.execute(events).await)
    }

    /// Whether a run is active.
    pub fn is_running(&self) -> bool {
        self.active_run.load(Ordering::SeqCst) != IDLE
    }

    /// Target format of the active run.
    pub fn current_target(&self) -> Option<String> {
        let active = self.active_run.load(Ordering::SeqCst);
        let current = self
            .current_target
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match current.as_ref() {
            Some((run_id, target)) if *run_id == active => Some(target.clone()),
            _ => None,
        }
    }

    fn is_current(&self, run_id: u64) -> bool {
        self.active_run.load(Ordering::SeqCst) == run_id
    }

    /// Snapshot of every file in enqueue order.
    pub async fn files(&self) -> Vec<QueuedFile> {
        self.files
            .read()
            .await
            .iter()
            .map(|e| e.file.clone())
            .collect()
    }

    /// Snapshot of one file.
    pub async fn file(&self, id: &str) -> Option<QueuedFile> {
        self.files
            .read()
            .await
            .iter()
            .find(|e| e.file.id == id)
            .map(|e| e.file.clone())
    }

    /// Aggregate counts over the current files.
    pub async fn stats(&self) -> QueueStats {
        let files = self.files.read().await;
        QueueStats::from_files(files.iter().map(|e| &e.file))
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

/// A claimed run. Dropping it releases the run flag unless `clear()`
/// already did.
pub struct ActiveRun<C: Converter> {
    queue: Arc<ConversionQueue<C>>,
    run_id: u64,
    target: String,
    quality: Option<QualitySetting>,
}

impl<C: Converter> std::fmt::Debug for ActiveRun<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRun")
            .field("run_id", &self.run_id)
            .field("target", &self.target)
            .field("quality", &self.quality)
            .finish()
    }
}

impl<C: Converter> ActiveRun<C> {
    pub fn id(&self) -> u64 {
        self.run_id
    }

    /// Normalized target extension.
    pub fn target_format(&self) -> &str {
        &self.target
    }

    /// Encoder setting chosen for this run.
    pub fn quality(&self) -> Option<QualitySetting> {
        self.quality
    }

    /// Processes every file that was pending when the run started.
    pub async fn execute(
        self,
        events: Option<mpsc::UnboundedSender<QueueEvent>>,
    ) -> Vec<ConvertedArtifact> {
        let events = EventSink(events);
        let pending: Vec<String> = self
            .queue
            .files
            .read()
            .await
            .iter()
            .filter(|e| e.file.status.is_pending())
            .map(|e| e.file.id.clone())
            .collect();
        let total = pending.len();

        info!(
            run_id = self.run_id,
            target = %self.target,
            quality = ?self.quality,
            converter = self.queue.converter.name(),
            total,
            "Starting conversion run"
        );
        events.emit(QueueEvent::RunStarted {
            run_id: self.run_id,
            target_format: self.target.clone(),
            total,
        });

        let mut produced = Vec::new();
        let mut failed = 0;

        for (index, file_id) in pending.iter().enumerate() {
            match self.process_file(file_id, index, total, &events).await {
                FileOutcome::Converted(artifact) => produced.push(artifact),
                FileOutcome::Failed => failed += 1,
                FileOutcome::Skipped => {}
                FileOutcome::Abandoned => {
                    info!(
                        run_id = self.run_id,
                        converted = produced.len(),
                        "Run abandoned by clear"
                    );
                    return produced;
                }
            }
        }

        info!(
            run_id = self.run_id,
            converted = produced.len(),
            failed,
            "Conversion run finished"
        );
        events.emit(QueueEvent::RunFinished {
            run_id: self.run_id,
            converted: produced.len(),
            failed,
        });

        produced
    }

    async fn process_file(
        &self,
        file_id: &str,
        index: usize,
        total: usize,
        events: &EventSink,
    ) -> FileOutcome {
        let queue = &self.queue;

        let job = {
            let mut files = queue.files.write().await;
            if !queue.is_current(self.run_id) {
                return FileOutcome::Abandoned;
            }
            let Some(entry) = files.iter_mut().find(|e| e.file.id == file_id) else {
                debug!(file_id, "File removed before its turn");
                return FileOutcome::Skipped;
            };
            if !entry.file.status.is_pending() {
                return FileOutcome::Skipped;
            }

            if !is_supported(&entry.file.extension, &self.target) {
                let message = format!(
                    "Conversion from {} to {} is not supported",
                    entry.file.extension.to_uppercase(),
                    self.target.to_uppercase()
                );
                warn!(file_id, name = %entry.file.name, "{}", message);
                entry.file.fail(message);
                entry.content = None;
                CONVERSIONS_TOTAL.with_label_values(&["unsupported"]).inc();
                events.emit(QueueEvent::FileFailed {
                    file: entry.file.clone(),
                    index,
                    total,
                });
                return FileOutcome::Failed;
            }

            entry.file.begin_converting();
            events.emit(QueueEvent::Progress {
                file: entry.file.clone(),
                index,
                total,
            });

            ConversionJob {
                file_id: entry.file.id.clone(),
                file_name: entry.file.name.clone(),
                source_format: entry.file.extension.clone(),
                target_format: self.target.clone(),
                quality: self.quality,
                content: entry.content.take().unwrap_or_default(),
            }
        };

        let original_name = job.file_name.clone();
        let source_format = job.source_format.clone();
        let original_size = job.size_bytes();

        debug!(file_id, name = %original_name, target = %self.target, "Converting file");
        let started = Instant::now();
        let result = self.convert_with_progress(job, index, total, events).await;
        CONVERSION_DURATION
            .with_label_values(&[queue.converter.name()])
            .observe(started.elapsed().as_secs_f64());

        let output = match result {
            Ok(output) if output.is_usable() => output,
            Ok(_) => {
                warn!(file_id, name = %original_name, "Converter returned empty output");
                return self.mark_failed(file_id, index, total, events).await;
            }
            Err(e) => {
                warn!(file_id, name = %original_name, error = %e, "Conversion failed");
                return self.mark_failed(file_id, index, total, events).await;
            }
        };

        let (converted_size, size_estimated) = if output.authoritative {
            (output.content.len() as u64, false)
        } else {
            let estimate = queue.estimator.lock().await.estimate(
                original_size,
                &source_format,
                &self.target,
            );
            (estimate, true)
        };

        let ConversionOutput {
            content, mime_type, ..
        } = output;
        let artifact = ConvertedArtifact {
            id: file_id.to_string(),
            converted_name: converted_name(&original_name, &self.target),
            original_name,
            source_format,
            target_format: self.target.clone(),
            original_size,
            converted_size,
            size_estimated,
            mime_type,
            converted_at: Utc::now(),
            content,
        };

        let mut files = queue.files.write().await;
        if !queue.is_current(self.run_id) {
            debug!(file_id, "Discarding result of abandoned run");
            return FileOutcome::Abandoned;
        }
        let Some(entry) = files.iter_mut().find(|e| e.file.id == file_id) else {
            return FileOutcome::Skipped;
        };

        if let Err(e) = queue.store.record(artifact.clone()).await {
            warn!(file_id, error = %e, "Failed to record artifact");
            entry.file.fail(CONVERSION_FAILED);
            CONVERSIONS_TOTAL.with_label_values(&["failed"]).inc();
            events.emit(QueueEvent::FileFailed {
                file: entry.file.clone(),
                index,
                total,
            });
            return FileOutcome::Failed;
        }

        entry.file.complete(artifact.id.clone());
        CONVERSIONS_TOTAL.with_label_values(&["success"]).inc();
        info!(
            file_id,
            name = %artifact.converted_name,
            size = artifact.converted_size,
            estimated = artifact.size_estimated,
            "File converted"
        );
        events.emit(QueueEvent::FileCompleted {
            artifact: artifact.clone(),
        });
        events.emit(QueueEvent::Progress {
            file: entry.file.clone(),
            index,
            total,
        });

        FileOutcome::Converted(artifact)
    }

    /// Runs the converter while forwarding its progress to the file.
    async fn convert_with_progress(
        &self,
        job: ConversionJob,
        index: usize,
        total: usize,
        events: &EventSink,
    ) -> Result<ConversionOutput, ConverterError> {
        let file_id = job.file_id.clone();
        let (progress_tx, mut progress_rx) = mpsc::channel(PROGRESS_BUFFER);
        let conversion = self.queue.converter.convert(job, progress_tx);
        tokio::pin!(conversion);

        let result = loop {
            tokio::select! {
                biased;
                Some(update) = progress_rx.recv() => {
                    self.apply_progress(&file_id, update.percent, index, total, events).await;
                }
                result = &mut conversion => break result,
            }
        };

        while let Ok(update) = progress_rx.try_recv() {
            self.apply_progress(&file_id, update.percent, index, total, events)
                .await;
        }

        result
    }

    async fn apply_progress(
        &self,
        file_id: &str,
        percent: f32,
        index: usize,
        total: usize,
        events: &EventSink,
    ) {
        let mut files = self.queue.files.write().await;
        if !self.queue.is_current(self.run_id) {
            return;
        }
        if let Some(entry) = files.iter_mut().find(|e| e.file.id == file_id) {
            if entry.file.advance(percent) {
                events.emit(QueueEvent::Progress {
                    file: entry.file.clone(),
                    index,
                    total,
                });
            }
        }
    }

    async fn mark_failed(
        &self,
        file_id: &str,
        index: usize,
        total: usize,
        events: &EventSink,
    ) -> FileOutcome {
        CONVERSIONS_TOTAL.with_label_values(&["failed"]).inc();

        let mut files = self.queue.files.write().await;
        if !self.queue.is_current(self.run_id) {
            return FileOutcome::Abandoned;
        }
        match files.iter_mut().find(|e| e.file.id == file_id) {
            Some(entry) => {
                entry.file.fail(CONVERSION_FAILED);
                events.emit(QueueEvent::FileFailed {
                    file: entry.file.clone(),
                    index,
                    total,
                });
                FileOutcome::Failed
            }
            None => FileOutcome::Skipped,
        }
    }
}

impl<C: Converter> Drop for ActiveRun<C> {
    fn drop(&mut self) {
        // Only clears the flag if it still belongs to this run
        if self
            .queue
            .active_run
            .compare_exchange(self.run_id, IDLE, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            debug!(run_id = self.run_id, "Released run flag");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockConverter};
    use std::time::Duration;

    fn queue() -> Arc<ConversionQueue<MockConverter>> {
        Arc::new(
            ConversionQueue::new(QueueConfig::default(), MockConverter::new())
                .with_estimator(SizeEstimator::exact()),
        )
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<QueueEvent>) -> Vec<QueueEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_enqueue_accepts_valid_files() {
        let queue = queue();
        let outcome = queue
            .enqueue(vec![
                fixtures::source_file("photo.JPG", 2048),
                fixtures::source_file("notes.txt", 10),
            ])
            .await;

        assert_eq!(outcome.accepted.len(), 2);
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.accepted[0].extension, "jpg");
        assert_eq!(outcome.accepted[0].status, FileStatus::Pending);
        assert_ne!(outcome.accepted[0].id, outcome.accepted[1].id);

        let names: Vec<String> = queue.files().await.into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["photo.JPG", "notes.txt"]);
    }

    #[tokio::test]
    async fn test_enqueue_collects_all_rejection_reasons() {
        let queue = Arc::new(ConversionQueue::new(
            QueueConfig::default().with_max_file_size(100),
            MockConverter::new(),
        ));
        let outcome = queue
            .enqueue(vec![
                fixtures::source_file("empty", 0),
                fixtures::source_file("big.png", 101),
                fixtures::source_file("ok.png", 100),
            ])
            .await;

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.rejected.len(), 2);
        assert_eq!(outcome.rejected[0].name, "empty");
        assert_eq!(
            outcome.rejected[0].errors,
            vec![ValidationError::Empty, ValidationError::MissingExtension]
        );
        assert!(matches!(
            outcome.rejected[1].errors.as_slice(),
            [ValidationError::TooLarge { size: 101, limit: 100 }]
        ));
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_run_converts_in_order() {
        let queue = queue();
        queue
            .enqueue(vec![
                fixtures::source_file("a.jpg", 2048),
                fixtures::source_file("b.jpg", 4096),
            ])
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let artifacts = queue.start_run("png", Some(tx)).await.unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].converted_name, "a.png");
        assert_eq!(artifacts[1].converted_name, "b.png");
        assert_eq!(
            queue.converter().converted_names().await,
            vec!["a.jpg", "b.jpg"]
        );
        assert!(!queue.is_running());
        assert!(queue.current_target().is_none());

        let stats = queue.stats().await;
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.progress_percent, 100.0);
        assert_eq!(queue.artifacts().len().await, 2);

        let events = drain(&mut rx);
        assert!(matches!(events.first(), Some(QueueEvent::RunStarted { total: 2, .. })));
        assert!(matches!(
            events.last(),
            Some(QueueEvent::RunFinished { converted: 2, failed: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_progress_events_are_monotonic_per_file() {
        let queue = queue();
        queue.converter().set_progress_steps(5).await;
        queue
            .enqueue(vec![fixtures::source_file("a.jpg", 2048)])
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        queue.start_run("png", Some(tx)).await.unwrap();

        let progress: Vec<f32> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                QueueEvent::Progress { file, .. } => Some(file.progress()),
                _ => None,
            })
            .collect();
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.first(), Some(&0.0));
        assert_eq!(progress.last(), Some(&100.0));
    }

    #[tokio::test]
    async fn test_completed_event_precedes_final_progress() {
        let queue = queue();
        queue
            .enqueue(vec![fixtures::source_file("a.jpg", 2048)])
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        queue.start_run("png", Some(tx)).await.unwrap();

        let events = drain(&mut rx);
        let n = events.len();
        assert!(matches!(events[n - 3], QueueEvent::FileCompleted { .. }));
        assert!(matches!(&events[n - 2], QueueEvent::Progress { file, .. } if file.status.is_completed()));
    }

    #[tokio::test]
    async fn test_unsupported_pair_fails_without_invoking_converter() {
        let queue = queue();
        queue
            .enqueue(vec![fixtures::source_file("song.mp3", 2048)])
            .await;

        let artifacts = queue.start_run("png", None).await.unwrap();

        assert!(artifacts.is_empty());
        let file = &queue.files().await[0];
        assert_eq!(
            file.error(),
            Some("Conversion from MP3 to PNG is not supported")
        );
        assert_eq!(queue.converter().conversion_count().await, 0);
    }

    #[tokio::test]
    async fn test_converter_failure_marks_file_failed() {
        let queue = queue();
        queue.converter().fail_for("bad.jpg").await;
        queue
            .enqueue(vec![
                fixtures::source_file("bad.jpg", 2048),
                fixtures::source_file("good.jpg", 2048),
            ])
            .await;

        let artifacts = queue.start_run("png", None).await.unwrap();

        assert_eq!(artifacts.len(), 1);
        let files = queue.files().await;
        assert_eq!(files[0].error(), Some("Conversion failed"));
        assert_eq!(files[0].progress(), 0.0);
        assert!(files[1].status.is_completed());
    }

    #[tokio::test]
    async fn test_empty_output_is_a_failure() {
        let queue = queue();
        queue.converter().set_empty_output(true).await;
        queue
            .enqueue(vec![fixtures::source_file("a.jpg", 2048)])
            .await;

        let artifacts = queue.start_run("png", None).await.unwrap();

        assert!(artifacts.is_empty());
        assert!(queue.files().await[0].status.is_failed());
        assert!(queue.artifacts().is_empty().await);
    }

    #[tokio::test]
    async fn test_non_authoritative_size_is_estimated() {
        let queue = queue();
        queue.converter().set_authoritative(false).await;
        queue
            .enqueue(vec![fixtures::source_file("a.jpg", 10_000)])
            .await;

        let artifacts = queue.start_run("png", None).await.unwrap();

        // jpg -> png multiplier is 2.5, no jitter
        assert_eq!(artifacts[0].converted_size, 25_000);
        assert!(artifacts[0].size_estimated);
    }

    #[tokio::test]
    async fn test_authoritative_size_is_content_length() {
        let queue = queue();
        queue
            .enqueue(vec![fixtures::source_file("a.jpg", 10_000)])
            .await;

        let artifacts = queue.start_run("png", None).await.unwrap();

        assert_eq!(
            artifacts[0].converted_size,
            artifacts[0].content.len() as u64
        );
        assert!(!artifacts[0].size_estimated);
    }

    #[tokio::test]
    async fn test_unknown_target_is_rejected() {
        let queue = queue();
        let result = queue.start_run("xyz", None).await;
        assert_eq!(
            result.unwrap_err(),
            QueueError::UnknownTargetFormat("xyz".to_string())
        );
        assert!(!queue.is_running());
    }

    #[tokio::test]
    async fn test_target_is_normalized() {
        let queue = queue();
        let run = queue.begin_run(" .PNG ").unwrap();
        assert_eq!(run.target_format(), "png");
        assert_eq!(queue.current_target(), Some("png".to_string()));
    }

    #[tokio::test]
    async fn test_second_run_is_rejected_while_active() {
        let queue = queue();
        let run = queue.begin_run("png").unwrap();
        assert!(queue.is_running());

        assert_eq!(
            queue.begin_run("jpg").unwrap_err(),
            QueueError::RunInProgress
        );

        drop(run);
        assert!(!queue.is_running());
        assert!(queue.begin_run("jpg").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_second_run_leaves_files_untouched() {
        let queue = queue();
        queue
            .converter()
            .set_conversion_duration(Duration::from_millis(500))
            .await;
        queue
            .enqueue(vec![
                fixtures::source_file("a.jpg", 2048),
                fixtures::source_file("b.jpg", 2048),
            ])
            .await;

        let run = queue.begin_run("png").unwrap();
        let handle = tokio::spawn(run.execute(None));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let before = queue.files().await;
        assert!(before[0].status.is_converting());
        assert!(before[1].status.is_pending());

        assert_eq!(
            queue.start_run("gif", None).await.unwrap_err(),
            QueueError::RunInProgress
        );
        assert_eq!(queue.files().await, before);
        assert_eq!(queue.current_target(), Some("png".to_string()));

        let artifacts = handle.await.unwrap();
        assert_eq!(artifacts.len(), 2);
        assert!(artifacts.iter().all(|a| a.target_format == "png"));
    }

    #[tokio::test]
    async fn test_quality_reaches_converter() {
        let queue = queue();
        queue
            .enqueue(vec![fixtures::source_file("a.png", 2048)])
            .await;

        let run = queue.begin_run_with_quality("jpg", Some(" Low ")).unwrap();
        assert_eq!(run.quality(), Some(QualitySetting::Quality(60)));
        run.execute(None).await;

        let recorded = queue.converter().recorded_conversions().await;
        assert_eq!(recorded[0].job.quality, Some(QualitySetting::Quality(60)));
    }

    #[tokio::test]
    async fn test_unknown_quality_is_rejected() {
        let queue = queue();
        assert_eq!(
            queue.begin_run_with_quality("gif", Some("high")).unwrap_err(),
            QueueError::UnknownQuality {
                target: "gif".to_string(),
                quality: "high".to_string(),
            }
        );
        assert!(!queue.is_running());
        assert!(queue.begin_run("gif").unwrap().quality().is_none());
    }

    #[tokio::test]
    async fn test_only_pending_files_are_visited() {
        let queue = queue();
        queue
            .enqueue(vec![fixtures::source_file("a.jpg", 2048)])
            .await;
        queue.start_run("png", None).await.unwrap();

        queue
            .enqueue(vec![fixtures::source_file("b.jpg", 2048)])
            .await;
        let artifacts = queue.start_run("png", None).await.unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].original_name, "b.jpg");
        assert_eq!(queue.converter().conversion_count().await, 2);
        assert_eq!(queue.artifacts().len().await, 2);
    }

    #[tokio::test]
    async fn test_remove_unknown_file() {
        let queue = queue();
        assert_eq!(
            queue.remove("nope").await.unwrap_err(),
            QueueError::FileNotFound("nope".to_string())
        );
    }

    #[tokio::test]
    async fn test_remove_pending_file() {
        let queue = queue();
        let outcome = queue
            .enqueue(vec![fixtures::source_file("a.jpg", 2048)])
            .await;
        let removed = queue.remove(&outcome.accepted[0].id).await.unwrap();
        assert_eq!(removed.name, "a.jpg");
        assert!(queue.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_converting_file_is_busy() {
        let queue = queue();
        queue
            .converter()
            .set_conversion_duration(Duration::from_secs(10))
            .await;
        let outcome = queue
            .enqueue(vec![
                fixtures::source_file("a.jpg", 2048),
                fixtures::source_file("b.jpg", 2048),
            ])
            .await;
        let first = outcome.accepted[0].id.clone();
        let second = outcome.accepted[1].id.clone();

        let run = queue.begin_run("png").unwrap();
        let handle = tokio::spawn(run.execute(None));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(queue.file(&first).await.unwrap().status.is_converting());
        assert_eq!(
            queue.remove(&first).await.unwrap_err(),
            QueueError::FileBusy(first.clone())
        );
        // Pending files may be removed mid-run and are skipped
        queue.remove(&second).await.unwrap();

        let artifacts = handle.await.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(queue.converter().conversion_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_abandons_active_run() {
        let queue = queue();
        queue
            .converter()
            .set_conversion_duration(Duration::from_secs(10))
            .await;
        queue
            .enqueue(vec![
                fixtures::source_file("a.jpg", 2048),
                fixtures::source_file("b.jpg", 2048),
            ])
            .await;

        let run = queue.begin_run("png").unwrap();
        let handle = tokio::spawn(run.execute(None));
        tokio::time::sleep(Duration::from_secs(1)).await;

        queue.clear().await;
        assert!(!queue.is_running());
        assert!(queue.is_empty().await);

        let artifacts = handle.await.unwrap();
        assert!(artifacts.is_empty());
        assert!(queue.is_empty().await);
        assert!(queue.artifacts().is_empty().await);
        assert_eq!(queue.converter().conversion_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_run_does_not_release_new_run_flag() {
        let queue = queue();
        queue
            .converter()
            .set_conversion_duration(Duration::from_secs(10))
            .await;
        queue
            .enqueue(vec![fixtures::source_file("a.jpg", 2048)])
            .await;

        let first = queue.begin_run("png").unwrap();
        let handle = tokio::spawn(first.execute(None));
        tokio::time::sleep(Duration::from_secs(1)).await;
        queue.clear().await;

        let second = queue.begin_run("jpg").unwrap();
        handle.await.unwrap();

        assert!(queue.is_running());
        assert_eq!(queue.current_target(), Some("jpg".to_string()));
        drop(second);
        assert!(!queue.is_running());
    }

    #[tokio::test]
    async fn test_clear_releases_artifacts() {
        let queue = queue();
        queue
            .enqueue(vec![fixtures::source_file("a.jpg", 2048)])
            .await;
        queue.start_run("png", None).await.unwrap();
        assert_eq!(queue.artifacts().len().await, 1);

        queue.clear().await;
        assert!(queue.artifacts().is_empty().await);
        assert_eq!(queue.stats().await, QueueStats::default());
    }
}
