//! Byte sinks that response content can be written into.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

/// Destination for streamed content.
///
/// `write` returns how many bytes the sink accepted; the total is what a
/// download records as written.
#[async_trait]
pub trait ByteSink: Send {
    async fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Flush buffered data once the stream is exhausted.
    async fn finish(&mut self) -> io::Result<()> { Ok(()) }
}

#[async_trait]
impl ByteSink for Vec<u8> {
    async fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(bytes);
        Ok(bytes.len())
    }
}

/// Sink writing into a file on disk.
pub struct FileSink {
    path: PathBuf,
    file: tokio::fs::File,
}

impl FileSink {
    /// Create (or truncate) the file at `path`.
    pub async fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = tokio::fs::File::create(&path).await?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path { &self.path }
}

#[async_trait]
impl ByteSink for FileSink {
    async fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.file.write_all(bytes).await?;
        Ok(bytes.len())
    }

    async fn finish(&mut self) -> io::Result<()> {
        self.file.flush().await?;
        self.file.sync_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_sink_writes_to_disk() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.bin");

        let mut sink = FileSink::create(&path).await?;
        assert_eq!(sink.write(b"data").await?, 4);
        sink.finish().await?;

        assert_eq!(sink.path(), path.as_path());
        assert_eq!(std::fs::read(&path)?, b"data");
        Ok(())
    }
}
