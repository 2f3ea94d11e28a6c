use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::analyzer::{Document, DocumentAnalyzer};
use crate::extraction::ExtractionResult;
use crate::sanitize::display_name;
use crate::store::{InvoiceRecord, NewInvoice, Owner, RecordStore, StoreError};

use super::error::IntakeError;
use super::job::BatchJob;
use super::progress::{ProgressEvent, ProgressReporter};
use super::report::{BatchReport, FailureStage, FileFailure, ReportAccumulator, ReportEntry};

type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Analyze, persist, report: the intake flow for single files and batches.
///
/// Files in a batch are processed strictly one after another. A failure on
/// one file never stops the batch.
pub struct IntakePipeline<A, S> {
    analyzer: A,
    store: S,
    owner: Owner,
    currency: String,
    today: Today,
}

impl<A: DocumentAnalyzer, S: RecordStore> IntakePipeline<A, S> {
    pub fn new(analyzer: A, store: S, owner: Owner, currency: impl Into<String>) -> Self {
        Self {
            analyzer,
            store,
            owner,
            currency: currency.into(),
            today: Arc::new(|| Utc::now().date_naive()),
        }
    }

    /// Overrides the date used for missing invoice and due dates.
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Creates a job for `files` and runs it to completion.
    pub async fn run_documents(
        &self,
        files: Vec<Document>,
        progress: &dyn ProgressReporter,
    ) -> BatchReport {
        let mut job = BatchJob::new(files);
        self.run_batch(&mut job, progress).await
    }

    /// Runs an idle job. An empty selection returns an empty report without
    /// touching the analyzer or the store.
    pub async fn run_batch(&self, job: &mut BatchJob, progress: &dyn ProgressReporter) -> BatchReport {
        let total = job.total();
        if !job.start() {
            debug!(batch_id = %job.id(), "Batch has nothing to process");
            return ReportAccumulator::new().into_report(job.id(), job.status(), total);
        }

        let span = info_span!("batch", batch_id = %job.id(), total);
        self.drive(job, progress).instrument(span).await
    }

    async fn drive(&self, job: &mut BatchJob, progress: &dyn ProgressReporter) -> BatchReport {
        let total = job.total();
        let mut report = ReportAccumulator::new();

        info!("Batch started");
        progress.report(ProgressEvent::Started { total });

        while let Some(document) = job.current() {
            let index = job.current_index() + 1;
            let file_name = display_name(&document.file_name);
            let step = info_span!("file", file = %file_name, index, total);
            self.process_file(document, index, &file_name, &mut report, progress)
                .instrument(step)
                .await;
            job.advance();
        }

        let analyzed = report.len();
        let failed = report.failures().len();
        info!(analyzed, failed, "Batch finished");
        progress.report(ProgressEvent::Finished { analyzed, failed });

        report.into_report(job.id(), job.status(), total)
    }

    async fn process_file(
        &self,
        document: &Document,
        index: usize,
        file_name: &str,
        report: &mut ReportAccumulator,
        progress: &dyn ProgressReporter,
    ) {
        progress.report(ProgressEvent::Analyzing {
            index,
            file_name: file_name.to_string(),
        });

        let raw = match self.analyzer.analyze(document).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Analysis failed, skipping file");
                let message = e.to_string();
                progress.report(ProgressEvent::FileFailed {
                    index,
                    file_name: file_name.to_string(),
                    stage: FailureStage::Analyze,
                    error: message.clone(),
                });
                report.record_failure(FileFailure {
                    file_name: file_name.to_string(),
                    stage: FailureStage::Analyze,
                    message,
                });
                return;
            }
        };

        let extraction = ExtractionResult::from_raw(&raw, (self.today)());

        progress.report(ProgressEvent::Saving {
            index,
            file_name: file_name.to_string(),
        });

        let entry = match self.save(extraction.clone(), file_name).await {
            Ok(record) => {
                debug!(record_id = %record.id, risk = %record.risk_level, "Record saved");
                ReportEntry::from_record(&record, file_name)
            }
            Err(e) => {
                error!(error = %e, "Saving failed, keeping unsaved entry");
                report.record_failure(FileFailure {
                    file_name: file_name.to_string(),
                    stage: FailureStage::Store,
                    message: e.to_string(),
                });
                ReportEntry::unsaved(&extraction, file_name)
            }
        };

        progress.report(ProgressEvent::FileCompleted {
            index,
            file_name: file_name.to_string(),
            entry_id: entry.id.clone(),
            persisted: entry.persisted,
            risk_level: entry.risk_level,
        });
        report.push(entry);
    }

    async fn save(
        &self,
        extraction: ExtractionResult,
        file_name: &str,
    ) -> Result<InvoiceRecord, StoreError> {
        let invoice = NewInvoice::new(extraction, self.currency.clone()).with_source_file(file_name);
        self.store.create(&self.owner, invoice).await
    }

    /// Single-file flow. Unlike a batch, a save failure is returned to the
    /// caller.
    pub async fn analyze_and_save(&self, document: &Document) -> Result<InvoiceRecord, IntakeError> {
        let file_name = display_name(&document.file_name);
        let span = info_span!("analyze_and_save", file = %file_name);

        async {
            let raw = self
                .analyzer
                .analyze(document)
                .await
                .map_err(|source| IntakeError::Analyze {
                    file_name: file_name.clone(),
                    source,
                })?;

            let extraction = ExtractionResult::from_raw(&raw, (self.today)());
            let record = self
                .save(extraction, &file_name)
                .await
                .map_err(|source| IntakeError::Store {
                    file_name: file_name.clone(),
                    source,
                })?;

            info!(record_id = %record.id, risk = %record.risk_level, "Invoice saved");
            Ok(record)
        }
        .instrument(span)
        .await
    }
}
