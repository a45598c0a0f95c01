//! Cache-or-download access to structure files on the RCSB file server.

use crate::config::DownloadSettings;
use crate::error::Result;
use flate2::read::GzDecoder;
use futures_util::StreamExt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use zincscan::engine::source::{DownloadError, StructureSource, validate_identifier};

pub const FILE_SERVER_URL: &str = "https://files.rcsb.org/download";

const RETRY_BACKOFF: Duration = Duration::from_millis(500);
const PARTIAL_SUFFIX: &str = "part";

/// Why a single download attempt failed.
enum AttemptError {
    Timeout,
    /// Worth another attempt (connection problems, 5xx, 429).
    Transient(String),
    /// Retrying cannot help (e.g. 404).
    Permanent(String),
    Io(io::Error),
}

/// Fetches `{id}.cif.gz` from the file server into a cache directory and unpacks it
/// to `{id}.cif`, with the identifier lower-cased.
///
/// Network I/O runs on the tokio runtime behind `runtime`; [`StructureSource::fetch`]
/// blocks the calling thread until the file is in place, so it must not be called from
/// inside an asynchronous task.
pub struct RcsbFetcher {
    client: reqwest::Client,
    base_url: String,
    cache_dir: PathBuf,
    timeout: Duration,
    retries: u32,
    runtime: Handle,
}

impl RcsbFetcher {
    pub fn new(settings: &DownloadSettings, runtime: Handle) -> Result<Self> {
        fs::create_dir_all(&settings.cache_dir)?;
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: FILE_SERVER_URL.to_string(),
            cache_dir: settings.cache_dir.clone(),
            timeout: settings.timeout,
            retries: settings.retries,
            runtime,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    async fn download(
        &self,
        identifier: &str,
        stem: &str,
        dest: &Path,
    ) -> std::result::Result<(), DownloadError> {
        let url = format!("{}/{}.cif.gz", self.base_url, stem);
        let attempts = self.retries + 1;

        for attempt in 1..=attempts {
            debug!(%url, attempt, "Downloading structure file.");
            let error = match self.download_once(&url, dest).await {
                Ok(bytes) => {
                    info!(identifier, bytes, "Downloaded structure file.");
                    return Ok(());
                }
                Err(e) => e,
            };

            let reason = match error {
                AttemptError::Permanent(reason) => {
                    return Err(DownloadError::Unavailable {
                        identifier: identifier.to_string(),
                        reason,
                    });
                }
                AttemptError::Io(source) => {
                    return Err(DownloadError::Cache {
                        identifier: identifier.to_string(),
                        source,
                    });
                }
                AttemptError::Timeout if attempt == attempts => {
                    return Err(DownloadError::Timeout {
                        identifier: identifier.to_string(),
                        seconds: self.timeout.as_secs(),
                    });
                }
                AttemptError::Transient(reason) if attempt == attempts => {
                    return Err(DownloadError::Unavailable {
                        identifier: identifier.to_string(),
                        reason,
                    });
                }
                AttemptError::Timeout => "request timed out".to_string(),
                AttemptError::Transient(reason) => reason,
            };

            warn!(identifier, attempt, %reason, "Download attempt failed; retrying.");
            tokio::time::sleep(RETRY_BACKOFF * attempt).await;
        }

        Err(DownloadError::Unavailable {
            identifier: identifier.to_string(),
            reason: "no download attempt was made".to_string(),
        })
    }

    /// Streams the response body into a `.part` file and renames it into place.
    async fn download_once(
        &self,
        url: &str,
        dest: &Path,
    ) -> std::result::Result<u64, AttemptError> {
        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            let reason = format!("server answered {status}");
            return Err(if status.is_server_error() || status.as_u16() == 429 {
                AttemptError::Transient(reason)
            } else {
                AttemptError::Permanent(reason)
            });
        }

        let partial = partial_path(dest);
        let mut file = tokio::fs::File::create(&partial)
            .await
            .map_err(AttemptError::Io)?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(item) = stream.next().await {
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(&partial).await;
                    return Err(classify(e));
                }
            };
            file.write_all(&chunk).await.map_err(AttemptError::Io)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(AttemptError::Io)?;
        drop(file);

        tokio::fs::rename(&partial, dest)
            .await
            .map_err(AttemptError::Io)?;
        Ok(written)
    }
}

impl StructureSource for RcsbFetcher {
    fn fetch(&self, identifier: &str) -> std::result::Result<PathBuf, DownloadError> {
        validate_identifier(identifier)?;
        let stem = identifier.to_ascii_lowercase();
        let cif_path = self.cache_dir.join(format!("{stem}.cif"));
        let gz_path = self.cache_dir.join(format!("{stem}.cif.gz"));

        if cif_path.is_file() {
            debug!(identifier, "Structure file already cached.");
            return Ok(cif_path);
        }

        if !gz_path.is_file() {
            self.runtime
                .block_on(self.download(identifier, &stem, &gz_path))?;
        }

        decompress(&gz_path, &cif_path).map_err(|source| {
            // A corrupt archive would otherwise be reused on every later run.
            if matches!(
                source.kind(),
                io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof
            ) {
                let _ = fs::remove_file(&gz_path);
            }
            DownloadError::Cache {
                identifier: identifier.to_string(),
                source,
            }
        })?;
        Ok(cif_path)
    }
}

fn classify(error: reqwest::Error) -> AttemptError {
    if error.is_timeout() {
        AttemptError::Timeout
    } else {
        AttemptError::Transient(error.to_string())
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    dest.with_file_name(name)
}

/// Gunzips `source` into `dest` through a `.part` file.
fn decompress(source: &Path, dest: &Path) -> io::Result<()> {
    let partial = partial_path(dest);
    match gunzip(source, &partial) {
        Ok(()) => fs::rename(&partial, dest),
        Err(e) => {
            let _ = fs::remove_file(&partial);
            Err(e)
        }
    }
}

fn gunzip(source: &Path, dest: &Path) -> io::Result<()> {
    let mut decoder = GzDecoder::new(File::open(source)?);
    let mut writer = BufWriter::new(File::create(dest)?);
    io::copy(&mut decoder, &mut writer)?;
    writer.flush()
}

/// Removes cached structure files (`.cif`, `.cif.gz` and leftover `.part` files),
/// returning how many were deleted. A missing directory counts as empty.
pub fn clear_cache(cache_dir: &Path) -> io::Result<usize> {
    let entries = match fs::read_dir(cache_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let is_cache_file = name.ends_with(".cif")
            || name.ends_with(".cif.gz")
            || name.ends_with(&format!(".{PARTIAL_SUFFIX}"));
        if path.is_file() && is_cache_file {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Identifiers of every unpacked structure file in the cache, upper-cased and sorted.
pub fn cached_identifiers(cache_dir: &Path) -> io::Result<Vec<String>> {
    let mut ids = Vec::new();
    for entry in fs::read_dir(cache_dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "cif") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            ids.push(stem.to_ascii_uppercase());
        }
    }
    ids.sort();
    Ok(ids)
}
