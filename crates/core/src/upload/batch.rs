//! Document-level commands: attach new files, upload every local embed,
//! download every remote embed.
//!
//! Jobs are dispatched together and awaited as a set. A failed job is
//! recorded in its [`JobReport`] and never cancels its siblings.

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, info, warn};

use notedrop_shared::DestinationSettings;

use super::adapters::{AssetManager, LocalTree, ObjectStore, RemoteFetcher};
use super::document::{
    DocumentBuffer, Staged, error_marker, local_references, placeholder_for, remote_references,
    stage,
};
use super::error::{DocumentError, UploadError};
use super::pipeline::UploadPipeline;
use super::types::{Route, SkipReason, UploadNotice, UploadOutcome};
use crate::attachment::{Attachment, AttachmentOrigin};
use crate::backend::Backend;
use crate::embed::{ContentCategory, Embed};
use crate::naming::candidate_name;

/// An attachment whose placeholder is already in the note.
#[derive(Debug, Clone)]
pub struct UploadJob {
    /// Payload.
    pub attachment: Attachment,
    /// Placeholder to substitute.
    pub placeholder: String,
}

/// Final state of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Placeholder replaced with embed markup.
    Embedded,
    /// Registered with the asset manager only; the original reference was
    /// kept because the file already lives in the local tree.
    Registered,
    /// Stored locally only at the given tree-relative path; placeholder
    /// left in place.
    LocalOnly(String),
    /// Nothing was done.
    Skipped(SkipReason),
    /// The original reference was put back.
    Restored,
    /// The job failed.
    Failed(String),
}

/// Outcome of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// File the job was about.
    pub file: String,
    /// Final state.
    pub status: JobStatus,
    /// Recovered and terminal failures, in order.
    pub notices: Vec<UploadNotice>,
}

impl JobReport {
    fn new(file: impl Into<String>, status: JobStatus) -> Self {
        Self {
            file: file.into(),
            status,
            notices: Vec::new(),
        }
    }

    fn with_notices(mut self, notices: Vec<UploadNotice>) -> Self {
        self.notices = notices;
        self
    }

    /// Returns true if the job did what it was asked to.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            JobStatus::Embedded | JobStatus::Registered | JobStatus::LocalOnly(_)
        )
    }
}

/// Outcome of a document-level command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// One report per job, in document order.
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    /// Number of successful jobs.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.jobs.iter().filter(|job| job.is_success()).count()
    }

    /// Number of jobs that did not succeed and were not skipped.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.jobs
            .iter()
            .filter(|job| matches!(job.status, JobStatus::Failed(_) | JobStatus::Restored))
            .count()
    }

    /// All notices across jobs.
    pub fn notices(&self) -> impl Iterator<Item = (&str, &UploadNotice)> {
        self.jobs
            .iter()
            .flat_map(|job| job.notices.iter().map(move |n| (job.file.as_str(), n)))
    }
}

impl<S, V, E> UploadPipeline<S, V, E>
where
    S: ObjectStore,
    V: LocalTree,
    E: AssetManager,
{
    /// Run one staged job and substitute its placeholder.
    ///
    /// On total failure the placeholder becomes an error marker.
    pub async fn attach<D: DocumentBuffer>(
        &self,
        doc: &D,
        job: &UploadJob,
        settings: &DestinationSettings,
        today: NaiveDate,
    ) -> JobReport {
        let file = job.attachment.original_name();

        match self.upload(&job.attachment, settings, today).await {
            Ok(UploadOutcome::Embedded {
                markup, notices, ..
            }) => {
                let status = substitute(doc, &job.placeholder, &markup).await;
                JobReport::new(file, status).with_notices(notices)
            }
            Ok(UploadOutcome::LocalOnly(result)) => {
                let path = result.local_path.unwrap_or_default();
                JobReport::new(file, JobStatus::LocalOnly(path))
            }
            Ok(UploadOutcome::Skipped(reason)) => JobReport::new(file, JobStatus::Skipped(reason)),
            Err(err) => {
                warn!(file, error = %err, "upload failed");
                let notices = err.notices().to_vec();
                let marker = error_marker(file);
                if let Err(doc_err) = doc.replace_first(&job.placeholder, &marker).await {
                    warn!(file, error = %doc_err, "could not write error marker");
                }
                JobReport::new(file, JobStatus::Failed(err.to_string())).with_notices(notices)
            }
        }
    }

    /// Run staged jobs concurrently.
    pub async fn attach_all<D: DocumentBuffer>(
        &self,
        doc: &D,
        jobs: &[UploadJob],
        settings: &DestinationSettings,
        today: NaiveDate,
    ) -> BatchReport {
        let reports = join_all(
            jobs.iter()
                .map(|job| self.attach(doc, job, settings, today)),
        )
        .await;
        BatchReport { jobs: reports }
    }

    /// Append a placeholder for every routable attachment, then upload them all.
    ///
    /// Attachments that route to [`Route::Skip`] never touch the note.
    ///
    /// # Errors
    ///
    /// Returns an error if the note cannot be read or written.
    pub async fn attach_files<D: DocumentBuffer>(
        &self,
        doc: &D,
        attachments: Vec<Attachment>,
        settings: &DestinationSettings,
        today: NaiveDate,
    ) -> Result<BatchReport, UploadError> {
        let mut skipped = Vec::new();
        let mut jobs = Vec::new();

        for attachment in attachments {
            if let Route::Skip(reason) = self.route(&attachment, settings) {
                debug!(file = attachment.original_name(), ?reason, "attachment skipped");
                skipped.push(JobReport::new(
                    attachment.original_name(),
                    JobStatus::Skipped(reason),
                ));
                continue;
            }
            let placeholder = placeholder_for(attachment.original_name());
            jobs.push(UploadJob {
                attachment,
                placeholder,
            });
        }

        if !jobs.is_empty() {
            let mut text = doc.read().await?;
            for job in &jobs {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&job.placeholder);
                text.push('\n');
            }
            doc.write(text).await?;
        }

        let mut report = self.attach_all(doc, &jobs, settings, today).await;
        report.jobs.extend(skipped);
        Ok(report)
    }

    /// Upload every local embed in the note to the remote backends.
    ///
    /// The files already live in the local tree, so the local-tree backend
    /// is only used to read them and the asset manager ingests them in
    /// place. A reference that cannot be uploaded is put back unchanged.
    /// A note in local-only mode is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if no local tree is configured or the note cannot
    /// be read.
    pub async fn upload_references<D: DocumentBuffer>(
        &self,
        doc: &D,
        settings: &DestinationSettings,
        today: NaiveDate,
    ) -> Result<BatchReport, UploadError> {
        let vault = self
            .local_tree
            .as_ref()
            .ok_or_else(|| UploadError::configuration("bulk upload requires the local tree"))?;

        let mut remote = settings.backends;
        remote.local_tree = false;
        if settings.local_only || !remote.any() {
            info!("no remote backend applies to this note; nothing to upload");
            return Ok(BatchReport::default());
        }

        let references = local_references(&doc.read().await?);
        let staged = stage(doc, references).await?;
        info!(count = staged.len(), "uploading local embeds");

        let reports = join_all(staged.iter().map(|entry| async {
            let file = entry.reference.file_name();
            match vault.read(&entry.reference.target).await {
                Ok(bytes) => {
                    let content_type = mime_guess::from_path(file)
                        .first_raw()
                        .unwrap_or("application/octet-stream");
                    let attachment = Attachment::new(bytes, content_type, file)
                        .with_origin(AttachmentOrigin::Scan);
                    let uploaded = self
                        .upload_stored(&attachment, &entry.reference.target, settings, today)
                        .await;
                    settle_stored(doc, entry, uploaded).await
                }
                Err(err) => {
                    warn!(file, error = %err, "could not read embedded file");
                    restore(doc, entry).await.with_notices(vec![UploadNotice::failed(
                        Backend::LocalTree,
                        &err,
                    )])
                }
            }
        }))
        .await;

        Ok(BatchReport { jobs: reports })
    }

    /// Download every remote image embed into the local tree.
    ///
    /// Images already served from the object store are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if no local tree is configured or the note cannot
    /// be read.
    pub async fn download_references<D, F>(
        &self,
        doc: &D,
        fetcher: &F,
        settings: &DestinationSettings,
        today: NaiveDate,
    ) -> Result<BatchReport, UploadError>
    where
        D: DocumentBuffer,
        F: RemoteFetcher,
    {
        let vault = self
            .local_tree
            .as_ref()
            .ok_or_else(|| UploadError::configuration("bulk download requires the local tree"))?;

        let references: Vec<_> = remote_references(&doc.read().await?)
            .into_iter()
            .filter(|reference| {
                let owned = self
                    .object_store
                    .as_ref()
                    .is_some_and(|store| store.owns(&reference.target));
                if owned {
                    debug!(url = %reference.target, "already in the object store; skipping");
                }
                !owned
            })
            .collect();
        let staged = stage(doc, references).await?;
        info!(count = staged.len(), "downloading remote embeds");

        let folder = settings.local_folder.render(today);
        let reports = join_all(staged.iter().map(|entry| async {
            let url = &entry.reference.target;
            let file = entry.reference.file_name();

            let fetched = match fetcher.fetch(url).await {
                Ok(fetched) => fetched,
                Err(err) => {
                    warn!(url = %url, error = %err, "download failed");
                    return restore(doc, entry)
                        .await
                        .with_notices(vec![UploadNotice::new(None, format!("{url}: {err}"))]);
                }
            };

            let attachment = Attachment::new(fetched.bytes, fetched.content_type, file)
                .with_origin(AttachmentOrigin::Scan);
            let name = candidate_name(&attachment, &settings.naming);

            match vault
                .store(&attachment, &folder, &name, settings.naming.digest_seed())
                .await
            {
                Ok(stored) => {
                    let category =
                        ContentCategory::classify(attachment.content_type(), &stored.path);
                    let markup = Embed::new(&stored.path, category, Backend::LocalTree)
                        .with_label(&name)
                        .render(&settings.viewers);
                    let status = substitute(doc, &entry.placeholder, &markup).await;
                    JobReport::new(file, status)
                }
                Err(err) => {
                    warn!(url = %url, error = %err, "could not store download");
                    restore(doc, entry)
                        .await
                        .with_notices(vec![UploadNotice::failed(Backend::LocalTree, &err)])
                }
            }
        }))
        .await;

        Ok(BatchReport { jobs: reports })
    }
}

async fn substitute<D: DocumentBuffer>(doc: &D, placeholder: &str, markup: &str) -> JobStatus {
    match doc.replace_first(placeholder, markup).await {
        Ok(true) => JobStatus::Embedded,
        Ok(false) => {
            warn!(placeholder, "placeholder no longer in the note");
            JobStatus::Failed("placeholder was removed from the note".to_string())
        }
        Err(err) => JobStatus::Failed(err.to_string()),
    }
}

/// Write the outcome of a bulk-upload job back into the note.
///
/// Only an object-store URL replaces the reference. Anything else puts
/// the original reference back, since the file is still in the tree.
async fn settle_stored<D: DocumentBuffer>(
    doc: &D,
    entry: &Staged,
    uploaded: Result<UploadOutcome, UploadError>,
) -> JobReport {
    let file = entry.reference.file_name();
    let (kept, notices) = match uploaded {
        Ok(UploadOutcome::Embedded {
            result,
            markup,
            notices,
        }) if result.object_store_url.is_some() => {
            let status = substitute(doc, &entry.placeholder, &markup).await;
            return JobReport::new(file, status).with_notices(notices);
        }
        Ok(UploadOutcome::Embedded { notices, .. }) => (JobStatus::Registered, notices),
        Ok(UploadOutcome::Skipped(reason)) => (JobStatus::Skipped(reason), Vec::new()),
        Ok(UploadOutcome::LocalOnly(_)) => (JobStatus::Restored, Vec::new()),
        Err(err) => {
            warn!(file, error = %err, "upload failed; keeping the original reference");
            let mut notices = err.notices().to_vec();
            if notices.is_empty() {
                notices.push(UploadNotice::new(None, err.to_string()));
            }
            (JobStatus::Restored, notices)
        }
    };

    let mut report = restore(doc, entry).await.with_notices(notices);
    if report.status == JobStatus::Restored {
        report.status = kept;
    }
    report
}

async fn restore<D: DocumentBuffer>(doc: &D, entry: &Staged) -> JobReport {
    let file = entry.reference.file_name();
    match doc
        .replace_first(&entry.placeholder, &entry.reference.text)
        .await
    {
        Ok(_) => JobReport::new(file, JobStatus::Restored),
        Err(err) => JobReport::new(file, JobStatus::Failed(restore_failed(&err))),
    }
}

fn restore_failed(err: &DocumentError) -> String {
    format!("could not restore the original reference: {err}")
}
