use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use tracing::info;

use notedrop_client::{EagleClient, HttpFetcher};
use notedrop_core::eagle::EagleService;
use notedrop_core::storage::ObjectStoreService;
use notedrop_core::upload::{BatchReport, DocumentBuffer, JobReport, JobStatus, UploadPipeline};
use notedrop_core::vault::VaultService;
use notedrop_core::{Attachment, AttachmentOrigin};
use notedrop_shared::{AppConfig, AppError, DestinationSettings, NamingSettings, NoteOverride};

use crate::cli::{AttachArgs, Command, NoteArgs};
use crate::document::FileDocument;

type Pipeline = UploadPipeline<ObjectStoreService, VaultService, EagleService<EagleClient>>;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run_command(command: Command) -> anyhow::Result<()> {
    let report = match command {
        Command::NewSeed => {
            println!("{}", NamingSettings::fresh_seed());
            eprintln!(
                "set destinations.naming.seed to this value; existing hash names stop deduplicating"
            );
            return Ok(());
        }
        Command::Attach(args) => {
            let session = Session::load()?;
            attach(&session, args).await?
        }
        Command::UploadAll(NoteArgs { note }) => {
            let session = Session::load()?;
            let (doc, settings) = open_note(&note, &session.config).await?;
            session
                .pipeline
                .upload_references(&doc, &settings, session.today)
                .await?
        }
        Command::DownloadAll(NoteArgs { note }) => {
            let session = Session::load()?;
            let (doc, settings) = open_note(&note, &session.config).await?;
            let fetcher = HttpFetcher::new(DOWNLOAD_TIMEOUT)?;
            session
                .pipeline
                .download_references(&doc, &fetcher, &settings, session.today)
                .await?
        }
    };

    print_report(&report)
}

/// Validated configuration and the pipeline built from it.
struct Session {
    config: AppConfig,
    pipeline: Pipeline,
    today: NaiveDate,
}

impl Session {
    fn load() -> anyhow::Result<Self> {
        let config = AppConfig::load().map_err(AppError::from)?;
        config.validate()?;
        let pipeline = build_pipeline(&config)?;
        info!(backends = ?config.destinations.backends, "configuration loaded");

        Ok(Self {
            config,
            pipeline,
            today: Local::now().date_naive(),
        })
    }
}

fn build_pipeline(config: &AppConfig) -> anyhow::Result<Pipeline> {
    let mut pipeline = Pipeline::new();

    if let Some(store) = &config.object_store {
        pipeline = pipeline.with_object_store(ObjectStoreService::from_config(store)?);
    }
    if let Some(vault) = &config.vault {
        pipeline = pipeline.with_local_tree(VaultService::from_config(vault)?);
    }
    if let Some(eagle) = &config.eagle {
        let client = EagleClient::new(eagle)?;
        pipeline = pipeline.with_asset_manager(EagleService::new(client, eagle));
    }

    Ok(pipeline)
}

/// Open a note and merge its front-matter override into the configured settings.
async fn open_note(
    path: &Path,
    config: &AppConfig,
) -> anyhow::Result<(FileDocument, DestinationSettings)> {
    let doc = match FileDocument::open(path).await {
        Ok(doc) => doc,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(path.display().to_string()).into());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to open note {}", path.display()));
        }
    };
    let text = doc.read().await?;
    let settings = config
        .destinations
        .merged(&NoteOverride::from_front_matter(&text));
    Ok((doc, settings))
}

async fn attach(session: &Session, args: AttachArgs) -> anyhow::Result<BatchReport> {
    let (doc, settings) = open_note(&args.target.note, &session.config).await?;
    let origin = if args.dropped {
        AttachmentOrigin::Drop
    } else {
        AttachmentOrigin::Paste
    };

    let mut attachments = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        attachments.push(Attachment::new(data, content_type, name).with_origin(origin));
    }

    Ok(session
        .pipeline
        .attach_files(&doc, attachments, &settings, session.today)
        .await?)
}

fn status_line(job: &JobReport) -> String {
    let file = &job.file;
    match &job.status {
        JobStatus::Embedded => format!("embedded  {file}"),
        JobStatus::Registered => format!("registered {file}"),
        JobStatus::LocalOnly(path) => format!("local     {file} -> {path}"),
        JobStatus::Skipped(reason) => format!("skipped   {file} ({reason:?})"),
        JobStatus::Restored => format!("unchanged {file}"),
        JobStatus::Failed(err) => format!("failed    {file}: {err}"),
    }
}

fn print_report(report: &BatchReport) -> anyhow::Result<()> {
    for (file, notice) in report.notices() {
        eprintln!("warning: {file}: {notice}");
    }
    for job in &report.jobs {
        println!("{}", status_line(job));
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "done"
    );
    if report.failed() > 0 {
        return Err(AppError::UploadFailed(format!(
            "{} of {} attachments",
            report.failed(),
            report.jobs.len()
        ))
        .into());
    }
    Ok(())
}
