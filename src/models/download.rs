//! Model download and installation.
//!
//! Downloads stream into a `.part` file next to the destination while the
//! SHA-1 is computed; the file is only renamed into place once the checksum
//! matches.

use crate::error::{Result, SmartSpeakError};
use crate::models::catalog::{ModelInfo, get_model, list_models};
use futures_util::{Stream, StreamExt};
use sha1::{Digest, Sha1};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Get the directory where models are stored.
///
/// Uses `~/.cache/smartspeak/models/` on Linux/Unix.
pub fn models_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("smartspeak")
        .join("models")
}

/// Path of the ggml file for a model name.
///
/// Names that already look like a file path (a `.bin` suffix or a path
/// separator) are used as given.
pub fn model_path(name: &str) -> PathBuf {
    if name.ends_with(".bin") || name.contains(std::path::MAIN_SEPARATOR) {
        return PathBuf::from(name);
    }
    models_dir().join(format!("ggml-{name}.bin"))
}

pub fn is_model_installed(name: &str) -> bool {
    model_path(name).is_file()
}

fn download_error(message: impl Into<String>) -> SmartSpeakError {
    SmartSpeakError::ModelDownload {
        message: message.into(),
    }
}

async fn download_to_path(info: &ModelInfo, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| download_error(format!("Failed to create models directory: {e}")))?;
    }

    let url = info.url();
    tracing::info!(model = info.name, size_mb = info.size_mb, %url, "Downloading model");

    let response = reqwest::get(&url)
        .await
        .map_err(|e| download_error(format!("Failed to start download: {e}")))?;
    if !response.status().is_success() {
        return Err(download_error(format!(
            "Download failed with status: {}",
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);
    let partial_path = output_path.with_extension("bin.part");
    let calculated_hash =
        write_partial(response.bytes_stream(), &partial_path, total_size, info.name).await?;

    if calculated_hash != info.sha1 {
        if let Err(e) = fs::remove_file(&partial_path) {
            tracing::warn!(error = %e, "Failed to remove corrupted download");
        }
        return Err(download_error(format!(
            "SHA-1 checksum mismatch. Expected: {}, got: {calculated_hash}",
            info.sha1
        )));
    }

    fs::rename(&partial_path, output_path)?;
    tracing::info!(path = %output_path.display(), "Model installed");
    Ok(())
}

/// Stream a download into `partial_path` and return its SHA-1 hex digest.
///
/// The partial file is removed if a chunk cannot be read or written.
async fn write_partial<S, B, E>(
    stream: S,
    partial_path: &Path,
    total_size: u64,
    model: &str,
) -> Result<String>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let result = stream_to_file(stream, partial_path, total_size, model).await;
    if result.is_err()
        && partial_path.exists()
        && let Err(e) = fs::remove_file(partial_path)
    {
        tracing::warn!(error = %e, "Failed to remove partial download");
    }
    result
}

async fn stream_to_file<S, B, E>(
    stream: S,
    partial_path: &Path,
    total_size: u64,
    model: &str,
) -> Result<String>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut file = fs::File::create(partial_path)
        .map_err(|e| download_error(format!("Failed to create output file: {e}")))?;

    let mut hasher = Sha1::new();
    let mut stream = std::pin::pin!(stream);
    let mut downloaded: u64 = 0;
    let mut last_logged_decile = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| download_error(format!("Failed to read download chunk: {e}")))?;
        let chunk = chunk.as_ref();
        file.write_all(chunk)
            .map_err(|e| download_error(format!("Failed to write to file: {e}")))?;
        hasher.update(chunk);

        downloaded += chunk.len() as u64;
        if total_size > 0 {
            let decile = downloaded * 10 / total_size;
            if decile > last_logged_decile {
                last_logged_decile = decile;
                tracing::info!(model, percent = decile * 10, "Download progress");
            }
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Download a catalog model unless it is already installed.
///
/// # Errors
///
/// Returns an error if the model is not in the catalog, the download fails,
/// the checksum does not match or the file cannot be written.
pub async fn download_model(name: &str) -> Result<PathBuf> {
    let path = model_path(name);
    if path.is_file() {
        tracing::info!(model = name, path = %path.display(), "Model already installed");
        return Ok(path);
    }

    let info = get_model(name).ok_or_else(|| {
        download_error(format!(
            "Model '{name}' not found in catalog. Run 'smartspeak models list' to see available models."
        ))
    })?;
    download_to_path(info, &path).await?;
    Ok(path)
}

/// List installed model names by scanning the models directory.
///
/// Discovers every `ggml-*.bin` file, not just catalog models.
pub fn list_installed_models() -> Vec<String> {
    let Ok(entries) = fs::read_dir(models_dir()) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let name = entry.file_name();
            let model = name.to_str()?.strip_prefix("ggml-")?.strip_suffix(".bin")?;
            entry.path().is_file().then(|| model.to_string())
        })
        .collect();

    names.sort();
    names
}

/// One display line per catalog model.
pub fn format_model_info(model: &ModelInfo) -> String {
    let status = if is_model_installed(model.name) {
        "[installed]"
    } else {
        "[not installed]"
    };
    format!("{:12} {:5} MB   {}", model.name, model.size_mb, status)
}

/// Catalog listing, one formatted line per model.
pub fn format_catalog() -> Vec<String> {
    list_models().iter().map(format_model_info).collect()
}
