//! Upload payloads and progress-reporting request bodies.
//!
//! The body of an upload is streamed to the transport in fixed-size chunks; every chunk
//! handed to the transport is reported through the caller's [`ProgressCallback`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use fileshare_core::constants::UPLOAD_FIELD_NAME;
use fileshare_core::ClientError;
use futures::{Stream, TryStreamExt};
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

/// Size of the chunks the upload body is streamed in.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Bytes handed to the transport so far, out of the total body size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

impl UploadProgress {
    /// Percentage in `[0, 100]`. An empty body counts as complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.sent as f64 / self.total as f64 * 100.0).clamp(0.0, 100.0)
    }
}

pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// Where the bytes of an upload come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadData {
    Memory(Bytes),
    /// Read from disk only while the request body is sent.
    File { path: PathBuf, size: u64 },
}

/// One file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSource {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: UploadData,
}

impl UploadSource {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: UploadData::Memory(data.into()),
        }
    }

    /// Describe a local file without reading it; the content type is guessed from the
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            ClientError::InvalidInput(format!("Failed to read file {}: {}", path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(ClientError::InvalidInput(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        let content_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string());

        Ok(Self {
            file_name,
            content_type,
            data: UploadData::File {
                path: path.to_path_buf(),
                size: metadata.len(),
            },
        })
    }

    pub fn size(&self) -> u64 {
        match &self.data {
            UploadData::Memory(bytes) => bytes.len() as u64,
            UploadData::File { size, .. } => *size,
        }
    }

    /// Multipart form with this file under the upload field, reporting progress as the
    /// body is streamed.
    pub(crate) fn into_form(self, progress: ProgressCallback) -> Result<Form, ClientError> {
        let total = self.size();
        let body = match self.data {
            UploadData::Memory(bytes) => {
                let chunks = chunk(&bytes).into_iter().map(Ok::<Bytes, std::io::Error>);
                progress_body(futures::stream::iter(chunks), total, progress)
            }
            UploadData::File { path, .. } => {
                let chunks = futures::stream::once(tokio::fs::File::open(path))
                    .map_ok(|file| ReaderStream::with_capacity(file, UPLOAD_CHUNK_SIZE))
                    .try_flatten();
                progress_body(chunks, total, progress)
            }
        };

        let mut part = Part::stream_with_length(body, total).file_name(self.file_name);
        if let Some(content_type) = self.content_type.as_deref() {
            part = part.mime_str(content_type).map_err(|e| {
                ClientError::InvalidInput(format!("Invalid content type {}: {}", content_type, e))
            })?;
        }
        Ok(Form::new().part(UPLOAD_FIELD_NAME, part))
    }
}

fn chunk(data: &Bytes) -> Vec<Bytes> {
    (0..data.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| data.slice(start..(start + UPLOAD_CHUNK_SIZE).min(data.len())))
        .collect()
}

fn progress_body<S>(chunks: S, total: u64, progress: ProgressCallback) -> reqwest::Body
where
    S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
{
    let mut sent = 0u64;
    let tracked = chunks.map_ok(move |piece| {
        sent += piece.len() as u64;
        progress(UploadProgress { sent, total });
        piece
    });
    reqwest::Body::wrap_stream(tracked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn percent_is_proportional_and_clamped() {
        assert_eq!(UploadProgress { sent: 0, total: 200 }.percent(), 0.0);
        assert_eq!(UploadProgress { sent: 50, total: 200 }.percent(), 25.0);
        assert_eq!(UploadProgress { sent: 300, total: 200 }.percent(), 100.0);
        assert_eq!(UploadProgress { sent: 0, total: 0 }.percent(), 100.0);
    }

    #[test]
    fn chunks_cover_the_whole_payload() {
        let data = Bytes::from(vec![7u8; UPLOAD_CHUNK_SIZE * 2 + 10]);
        let pieces = chunk(&data);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[2].len(), 10);
        assert_eq!(
            pieces.iter().map(|p| p.len()).sum::<usize>(),
            data.len()
        );
        assert!(chunk(&Bytes::new()).is_empty());
    }

    #[test]
    fn from_path_reads_name_size_and_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[1, 2, 3, 4]).unwrap();

        let source = UploadSource::from_path(&path).unwrap();
        assert_eq!(source.file_name, "photo.png");
        assert_eq!(source.size(), 4);
        assert_eq!(source.content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn from_path_does_not_load_large_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.img");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(600 * 1024 * 1024).unwrap();

        let source = UploadSource::from_path(&path).unwrap();
        assert_eq!(source.size(), 629_145_600);
        assert_eq!(
            source.data,
            UploadData::File {
                path: path.clone(),
                size: 629_145_600
            }
        );
    }

    #[test]
    fn from_path_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = UploadSource::from_path(dir.path()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[test]
    fn from_path_missing_file_is_invalid_input() {
        let err = UploadSource::from_path(Path::new("/definitely/not/here.bin")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }
}
