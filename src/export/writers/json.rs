//! JSON array writer
//!
//! Streams rows into a single JSON array: `[\n`, rows separated by `,\n`,
//! then `\n]\n`. The opening bracket is only written together with the first
//! row, so an export that never sees a row leaves a zero-byte file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::source::Row;

use super::{FormatWriter, create_writer};

const ARRAY_OPEN: &[u8] = b"[\n";
const ROW_SEPARATOR: &[u8] = b",\n";
const ARRAY_CLOSE: &[u8] = b"\n]\n";

/// Position of the writer in the output array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayState {
    /// Nothing written yet
    NotStarted,
    /// `[` written, at least one row emitted
    InArray,
    /// File flushed and closed
    Closed,
}

/// Writer for a streamed JSON array
pub struct JsonArrayWriter {
    /// Buffered file writer, `None` once closed
    writer: Option<BufWriter<File>>,
    /// Path to the output file
    path: PathBuf,
    /// Array state
    state: ArrayState,
    /// Number of rows written
    written: u64,
}

impl JsonArrayWriter {
    /// Create the output file, truncating any existing content
    ///
    /// # Arguments
    /// * `path` - Output file path
    ///
    /// # Returns
    /// * `Result<Self>` - New writer or `ExportError::FileOpen`
    pub async fn create(path: &Path) -> Result<Self> {
        let writer = create_writer(path).await?;
        debug!("Created JSON array writer for: {}", path.display());

        Ok(Self {
            writer: Some(writer),
            path: path.to_path_buf(),
            state: ArrayState::NotStarted,
            written: 0,
        })
    }

    /// Current array state
    pub fn state(&self) -> ArrayState {
        self.state
    }

    /// Rows written so far
    pub fn rows_written(&self) -> u64 {
        self.written
    }

    fn writer_mut(&mut self) -> Result<&mut BufWriter<File>> {
        self.writer.as_mut().ok_or_else(|| {
            ExportError::Write(std::io::Error::other("output file already closed"))
        })
    }

    async fn write_row(&mut self, row: &Row) -> Result<()> {
        let json = serde_json::to_vec(row).map_err(std::io::Error::from)?;
        let prefix = match self.state {
            ArrayState::NotStarted => ARRAY_OPEN,
            ArrayState::InArray => ROW_SEPARATOR,
            ArrayState::Closed => {
                return Err(ExportError::Write(std::io::Error::other(
                    "write after output file was closed",
                )));
            }
        };

        let writer = self.writer_mut()?;
        writer.write_all(prefix).await?;
        writer.write_all(&json).await?;

        self.state = ArrayState::InArray;
        self.written += 1;
        Ok(())
    }

    /// Flush and release the file handle; idempotent.
    async fn close_file(&mut self) -> Result<()> {
        self.state = ArrayState::Closed;
        if let Some(mut writer) = self.writer.take() {
            writer.shutdown().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl FormatWriter for JsonArrayWriter {
    async fn write_batch(&mut self, rows: &[Row]) -> Result<usize> {
        for row in rows {
            self.write_row(row).await?;
        }

        debug!(
            "Wrote {} rows to JSON array (total: {})",
            rows.len(),
            self.written
        );
        Ok(rows.len())
    }

    async fn finalize(&mut self) -> Result<()> {
        let footer = if self.state == ArrayState::InArray {
            self.writer_mut()?.write_all(ARRAY_CLOSE).await
        } else {
            Ok(())
        };
        // The handle is released even when the footer could not be written.
        let closed = self.close_file().await;
        footer?;
        closed?;

        debug!(
            "Finalized JSON array file: {} ({} rows)",
            self.path.display(),
            self.written
        );
        Ok(())
    }

    async fn abort(&mut self) -> Result<()> {
        self.close_file().await?;
        debug!(
            "Closed unterminated JSON array file: {} ({} rows)",
            self.path.display(),
            self.written
        );
        Ok(())
    }

    async fn file_size(&self) -> Result<u64> {
        let metadata = tokio::fs::metadata(&self.path).await?;
        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::numbered_rows;
    use serde_json::json;
    use tokio::fs;

    fn output_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("out.json")
    }

    #[tokio::test]
    async fn test_empty_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(&dir);
        let mut writer = JsonArrayWriter::create(&path).await.unwrap();

        writer.write_batch(&[]).await.unwrap();
        writer.finalize().await.unwrap();

        assert_eq!(writer.state(), ArrayState::Closed);
        assert_eq!(fs::read(&path).await.unwrap().len(), 0);
        assert_eq!(writer.file_size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_single_row_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(&dir);
        let mut writer = JsonArrayWriter::create(&path).await.unwrap();

        writer.write_batch(&numbered_rows(1)).await.unwrap();
        assert_eq!(writer.state(), ArrayState::InArray);
        writer.finalize().await.unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "[\n{\"id\":1,\"name\":\"row-1\"}\n]\n");
    }

    #[tokio::test]
    async fn test_separators_span_batches() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(&dir);
        let mut writer = JsonArrayWriter::create(&path).await.unwrap();

        let rows = numbered_rows(3);
        writer.write_batch(&rows[..2]).await.unwrap();
        writer.write_batch(&rows[2..]).await.unwrap();
        writer.finalize().await.unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            content,
            "[\n{\"id\":1,\"name\":\"row-1\"},\n{\"id\":2,\"name\":\"row-2\"},\n{\"id\":3,\"name\":\"row-3\"}\n]\n"
        );
        assert_eq!(writer.rows_written(), 3);
    }

    #[tokio::test]
    async fn test_column_order_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(&dir);
        let mut writer = JsonArrayWriter::create(&path).await.unwrap();

        let mut row = Row::new();
        row.insert("zeta".to_string(), json!(null));
        row.insert("alpha".to_string(), json!(true));
        row.insert("mid".to_string(), json!(2.5));
        writer.write_batch(&[row]).await.unwrap();
        writer.finalize().await.unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "[\n{\"zeta\":null,\"alpha\":true,\"mid\":2.5}\n]\n");
    }

    #[tokio::test]
    async fn test_abort_leaves_array_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(&dir);
        let mut writer = JsonArrayWriter::create(&path).await.unwrap();

        writer.write_batch(&numbered_rows(2)).await.unwrap();
        writer.abort().await.unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            content,
            "[\n{\"id\":1,\"name\":\"row-1\"},\n{\"id\":2,\"name\":\"row-2\"}"
        );
        assert!(serde_json::from_str::<serde_json::Value>(&content).is_err());
    }

    #[tokio::test]
    async fn test_write_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(&dir);
        let mut writer = JsonArrayWriter::create(&path).await.unwrap();
        writer.finalize().await.unwrap();

        assert!(writer.write_batch(&numbered_rows(1)).await.is_err());
        // Closing again is a no-op
        writer.abort().await.unwrap();
    }

    #[tokio::test]
    async fn test_existing_file_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(&dir);
        fs::write(&path, b"stale content").await.unwrap();

        let mut writer = JsonArrayWriter::create(&path).await.unwrap();
        writer.finalize().await.unwrap();
        assert_eq!(fs::read(&path).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_invalid_directory() {
        let result = JsonArrayWriter::create(Path::new("/nonexistent/directory/out.json")).await;
        assert!(matches!(result, Err(ExportError::FileOpen { .. })));
    }
}
