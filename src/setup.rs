//! Setup pipeline - fetch, extract, decode, ingest, persist / 郵便データのセットアップ
//!
//! Steps / 手順：
//! 1. Download the KEN_ALL archive (or read a local .zip / .csv)
//! 2. Take the CSV entry out of the archive
//! 3. Decode the legacy encoding (Shift_JIS by default)
//! 4. Normalize rows into the compact artifact
//! 5. Write the artifact atomically
//!
//! Nothing is written unless every step before 5 succeeds.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use encoding_rs::Encoding;
use thiserror::Error;

use crate::postal::codec::save_artifact;
use crate::postal::error::ArtifactError;
use crate::postal::ingest::{ingest, IngestOutput};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);
/// Upper bound on up-front buffer reservation per archive entry
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("download failed: HTTP {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("no CSV entry found in archive")]
    NoCsvEntry,

    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    #[error("source is not valid {0}")]
    Transcoding(&'static str),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Where the raw postal master comes from / 元データの取得先
#[derive(Debug, Clone)]
pub enum SourceLocation {
    Url(String),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub source: SourceLocation,
    pub encoding: String,
    pub output: PathBuf,
}

/// Download the archive into memory / アーカイブをダウンロード
pub async fn fetch_archive(url: &str) -> Result<Vec<u8>, SetupError> {
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?;

    tracing::info!("Downloading postal master: {}", url);
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(SetupError::HttpStatus(response.status()));
    }
    let bytes = response.bytes().await?;
    tracing::info!("Download complete ({} bytes)", bytes.len());
    Ok(bytes.to_vec())
}

/// Pull the CSV out of a zip archive; the last `.csv` entry wins / CSV を取り出す
pub fn extract_csv(archive_bytes: &[u8]) -> Result<Vec<u8>, SetupError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes))?;
    let mut csv = None;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || !entry.name().to_lowercase().ends_with(".csv") {
            continue;
        }
        let name = entry.name().to_string();
        tracing::debug!("Found CSV entry: {}", name);
        let mut buf = Vec::with_capacity(prealloc_hint(entry.size()));
        entry.read_to_end(&mut buf).map_err(|source| SetupError::Read {
            path: PathBuf::from(name),
            source,
        })?;
        csv = Some(buf);
    }

    csv.ok_or(SetupError::NoCsvEntry)
}

/// Capacity to reserve for an entry; the declared size comes from the archive and is not trusted
fn prealloc_hint(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}

/// Decode raw CSV bytes; malformed sequences abort the run / 文字コード変換
pub fn decode_source(bytes: &[u8], label: &str) -> Result<String, SetupError> {
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| SetupError::UnknownEncoding(label.to_string()))?;

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or(SetupError::Transcoding(encoding.name()))
}

/// Raw CSV bytes from a local file: `.zip` is extracted, anything else is read as-is
fn read_local_source(path: &Path) -> Result<Vec<u8>, SetupError> {
    let bytes = std::fs::read(path).map_err(|source| SetupError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_zip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);
    if is_zip {
        extract_csv(&bytes)
    } else {
        Ok(bytes)
    }
}

/// Run the whole pipeline and write the artifact / セットアップを実行
pub async fn run_setup(options: &SetupOptions) -> Result<IngestOutput, SetupError> {
    let csv_bytes = match &options.source {
        SourceLocation::Url(url) => {
            let archive = fetch_archive(url).await?;
            tracing::info!("Extracting archive...");
            extract_csv(&archive)?
        }
        SourceLocation::File(path) => {
            tracing::info!("Reading local source: {:?}", path);
            read_local_source(path)?
        }
    };

    let text = decode_source(&csv_bytes, &options.encoding)?;

    tracing::info!("Parsing postal rows...");
    let output = ingest(&text);
    save_artifact(&options.output, &output.artifact)?;

    tracing::info!("Setup complete: {} records -> {:?}", output.count, options.output);
    Ok(output)
}
