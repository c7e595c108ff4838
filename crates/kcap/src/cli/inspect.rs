use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kcap_estream::Outcome;
use kcap_fetch::{AnySource, BoxStream, CaptureSource, ProgressStream, Target, tee_validate};
use tracing::{info, warn};

use crate::cli::App;
use crate::config::Config;
use crate::output::{InspectMessage, Validation};
use crate::ui::tracker::ProgressTracker;

const TEMP_PREFIX: &str = "kcap-inspect-";

#[derive(Args, Clone, Debug)]
pub struct InspectArg {
    /// Directory for the downloaded file [default: download.dir from config]
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// ALIAS/BUCKET/PREFIX, the prefix may contain wildcards
    #[arg(value_name = "TARGET")]
    pub target: Target,
}

#[derive(Debug, Clone)]
pub struct InspectOptions {
    pub dir:      PathBuf,
    pub temp_dir: Option<PathBuf>,
    pub progress: bool,
}

pub async fn inspect_with_config(arg: &InspectArg, app: &App, config: &Config) -> Result<InspectMessage> {
    let alias = config.alias(&arg.target.alias)?;
    let source = AnySource::from_url(&alias.url, alias.token.clone())
        .with_context(|| format!("unable to initialize client for alias '{}'", arg.target.alias))?;

    let opts = InspectOptions {
        dir:      arg.dir.clone().unwrap_or_else(|| config.download.dir.clone()),
        temp_dir: config.download.temp_dir.clone(),
        progress: config.download.progress && !app.no_progress && !app.json,
    };
    inspect(&source, &arg.target, &opts).await
}

/// Download the capture for `target`, validate it on the way and install it
/// under its final name in `opts.dir`.
pub async fn inspect<C: CaptureSource>(source: &C, target: &Target, opts: &InspectOptions) -> Result<InspectMessage> {
    let capture = source
        .open(target)
        .await
        .with_context(|| format!("unable to inspect file {target}"))?;

    fs::create_dir_all(&opts.dir)
        .with_context(|| format!("unable to create directory {}", opts.dir.display()))?;
    let temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(opts.temp_dir.as_ref().unwrap_or(&opts.dir))
        .context("unable to download file data")?;
    let mut file = tokio::fs::File::from_std(
        temp.as_file()
            .try_clone()
            .context("unable to download file data")?,
    );

    let body: BoxStream<'static, _> = if opts.progress {
        Box::pin(ProgressStream::new(
            capture.body,
            capture.total,
            ProgressTracker::new("Downloading"),
        ))
    } else {
        capture.body
    };
    let report = tee_validate(body, &mut file)
        .await
        .context("unable to download file data")?;
    drop(file);

    match &report.validation {
        Ok(Outcome::Valid(container)) => {
            info!(streams = container.streams.len(), bytes = report.bytes, "capture validated")
        }
        Ok(Outcome::Unrecognized { .. }) => info!(bytes = report.bytes, "capture is not a container"),
        Err(err) => warn!(%err, "capture failed validation; keeping downloaded data"),
    }

    let fallback = kcap_fs::fallback_file_name(&target.parts());
    let finalized = kcap_fs::finalize(temp, &opts.dir, capture.key.as_deref(), &fallback)
        .context("unable to save inspect data")?;

    Ok(InspectMessage {
        status:     "success",
        target:     target.to_string(),
        file:       finalized.path.display().to_string(),
        key:        finalized.identifier,
        backup:     finalized.backup.map(|path| path.display().to_string()),
        validation: Validation::from(&report.validation),
    })
}

/// Wildcards reach the server unexpanded only when the shell leaves them alone.
#[cfg(not(windows))]
pub fn wildcard_notice(target: &Target) -> Option<String> {
    if !target.has_wildcard() {
        return None;
    }
    let shell = query_shell::get_shell().ok()?;
    if matches!(shell, query_shell::Shell::Bash) {
        return None;
    }
    let name = format!("{shell:?}").to_lowercase();
    Some(format!(
        "Your shell is auto determined as '{name}', wildcard patterns are only supported with 'bash' SHELL."
    ))
}

#[cfg(windows)]
pub fn wildcard_notice(_target: &Target) -> Option<String> { None }
