//! Writing content to disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::data::{DownloadedContent, TraversalContent, TraversalKind, TraversalResult, TraverseContext};
use crate::effects::FileSink;
use crate::enhance::ResultEnhancer;
use crate::error::TraverseError;

/// What happened when content was written to disk.
///
/// A byte-count mismatch or an IO failure is recorded here rather than
/// turning the traversal unsuccessful; check [`is_successful`](Self::is_successful).
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub destination:        PathBuf,
    /// Declared `Content-Length`, else the size of a body already read into
    /// memory.
    pub should_write_bytes: Option<u64>,
    pub wrote_bytes:        Option<u64>,
    pub error:              Option<Arc<TraverseError>>,
}

impl DownloadOutcome {
    pub fn is_successful(&self) -> bool {
        matches!(
            (self.should_write_bytes, self.wrote_bytes),
            (Some(should), Some(wrote)) if should == wrote
        )
    }
}

/// Terminal content stage writing each content body into `dest_dir`.
#[derive(Debug, Clone)]
pub struct DownloadContent {
    dest_dir: PathBuf,
}

impl DownloadContent {
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
        }
    }

    pub fn dest_dir(&self) -> &Path { &self.dest_dir }

    async fn write(&self, content: &TraversalContent) -> DownloadOutcome {
        let destination = self.dest_dir.join(file_name(content));
        let should_write_bytes = content.expected_size();

        let written: crate::error::Result<u64> = async {
            tokio::fs::create_dir_all(&self.dest_dir).await?;
            let mut sink = FileSink::create(&destination).await?;
            content.write_content(&mut sink).await
        }
        .await;

        let (wrote_bytes, error) = match written {
            Ok(wrote) => (Some(wrote), None),
            Err(error) => (None, Some(Arc::new(error))),
        };
        DownloadOutcome {
            destination,
            should_write_bytes,
            wrote_bytes,
            error,
        }
    }
}

#[async_trait]
impl ResultEnhancer for DownloadContent {
    fn name(&self) -> &'static str { "download_content" }

    async fn enhance(&self, _ctx: &TraverseContext, result: TraversalResult) -> TraversalResult {
        let TraversalKind::Content(content) = &result.kind else {
            return result;
        };

        let outcome = self.write(content).await;
        if outcome.is_successful() {
            debug!(
                destination = %outcome.destination.display(),
                bytes = outcome.wrote_bytes,
                "download complete"
            );
        } else {
            warn!(
                destination = %outcome.destination.display(),
                should_write_bytes = outcome.should_write_bytes,
                wrote_bytes = outcome.wrote_bytes,
                error = ?outcome.error,
                "download incomplete"
            );
        }

        let kind = TraversalKind::Download(DownloadedContent {
            content: content.clone(),
            outcome,
        });
        result.transform(kind, Some("downloaded"))
    }
}

/// Final path component of the `Content-Disposition` filename, else a
/// random name with an extension derived from the content type.
fn file_name(content: &TraversalContent) -> String {
    content
        .content_disposition
        .as_ref()
        .and_then(|disposition| disposition.filename())
        .and_then(|name| Path::new(name.trim()).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}.{}", Uuid::new_v4(), extension(&content.content_type)))
}

fn extension(content_type: &str) -> String {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "text/plain" => return "txt".to_string(),
        "image/jpeg" => return "jpg".to_string(),
        "image/svg+xml" => return "svg".to_string(),
        _ => {}
    }

    essence
        .split_once('/')
        .map(|(_, subtype)| subtype.rsplit('+').next().unwrap_or(subtype))
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_string)
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ContentDisposition;
    use crate::data::ContentDetail;
    use crate::effects::{HttpResponse, ResponseBody};

    fn content(content_type: &str, disposition: Option<&str>, length: Option<u64>) -> TraversalContent {
        TraversalContent {
            response:            HttpResponse {
                status:  200,
                url:     "https://files.test/a".to_string(),
                headers: http::HeaderMap::new(),
                body:    ResponseBody::from_bytes("hello"),
            },
            terminal_url:        "https://files.test/a".to_string(),
            http_status:         200,
            content_type:        content_type.to_string(),
            content_disposition: disposition.map(ContentDisposition::parse),
            content_length:      length,
            detail:              ContentDetail::Bytes,
        }
    }

    #[test]
    fn outcome_requires_both_counts_to_match() {
        let outcome = |should, wrote| DownloadOutcome {
            destination: PathBuf::from("x"),
            should_write_bytes: should,
            wrote_bytes: wrote,
            error: None,
        };
        assert!(outcome(Some(5), Some(5)).is_successful());
        assert!(!outcome(Some(5), Some(4)).is_successful());
        assert!(!outcome(None, Some(5)).is_successful());
        assert!(!outcome(Some(5), None).is_successful());
    }

    #[test]
    fn disposition_filename_is_reduced_to_its_last_component() {
        let named = content("application/pdf", Some(r#"attachment; filename="../../etc/a b.pdf""#), None);
        assert_eq!(file_name(&named), "a b.pdf");
    }

    #[test]
    fn generated_names_carry_an_extension() {
        assert!(file_name(&content("text/plain; charset=utf-8", None, None)).ends_with(".txt"));
        assert!(file_name(&content("application/ld+json", None, None)).ends_with(".json"));
        assert!(file_name(&content("application/octet-stream", None, None)).ends_with(".bin"));
        assert!(file_name(&content("", Some("inline"), None)).ends_with(".bin"));
        assert_eq!(extension("text/html"), "html");
    }

    #[tokio::test]
    async fn writes_into_the_destination_directory() {
        let dir = tempfile::tempdir().unwrap();
        let stage = DownloadContent::new(dir.path().join("nested"));

        let outcome = stage.write(&content("text/plain", Some("attachment; filename=a.txt"), Some(5))).await;
        assert!(outcome.is_successful());
        assert_eq!(outcome.destination, dir.path().join("nested").join("a.txt"));
        assert_eq!(std::fs::read(&outcome.destination).unwrap(), b"hello");
    }
}
