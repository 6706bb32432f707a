// File upload and download.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::ApiClient;
use crate::error::ApiError;
use crate::model::{FileAttachment, UploadResponse};
use crate::upload::{content_type_for, UploadTarget};

/// Build one multipart part from a file on disk.
pub(crate) async fn file_part(path: &Path) -> Result<Part, ApiError> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let mime = content_type_for(path).unwrap_or("application/octet-stream");
    Part::bytes(bytes)
        .file_name(name)
        .mime_str(mime)
        .map_err(ApiError::Transport)
}

impl ApiClient {
    /// Upload files and attach them to a job, bid or chat.
    pub async fn upload_files(
        &self,
        target: UploadTarget,
        id: &str,
        files: &[PathBuf],
    ) -> Result<Vec<FileAttachment>, ApiError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let path = format!("upload/{target}/{id}");
        let mut form = Form::new();
        for file in files {
            form = form.part("files", file_part(file).await?);
        }
        let builder = self.authed(Method::POST, &path)?.multipart(form);
        let resp: UploadResponse = self.send_json(&path, builder).await?;
        info!(%target, count = resp.files.len(), "uploaded files");
        Ok(resp.files)
    }

    /// Stream a file to `dest`. Returns the number of bytes written.
    pub async fn download_file(
        &self,
        target: UploadTarget,
        file_id: &str,
        dest: &Path,
    ) -> Result<u64, ApiError> {
        let path = format!("download/{target}/{file_id}");
        let builder = self.authed(Method::GET, &path)?;
        let resp = self.execute(&path, builder).await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut out = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        out.flush().await?;
        info!(dest = %dest.display(), bytes = written, "downloaded file");
        Ok(written)
    }
}
