//! Inference driver.
//!
//! Drives a text-mode reader over a prefix (sample mode) or the whole
//! stream (full mode), feeding one analyzer per visible column. Progress is
//! reported against *compressed* source bytes so it stays meaningful for
//! gzipped input, monotonically and at 1% granularity.

use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use csvload_reader::{CancelToken, CsvConfig, CsvReader, Error, Result, SqlValue};

use crate::analyzer::{ColumnTypeAnalyzer, InferredColumn};

/// Configurable schema-inference run.
pub struct SchemaInference {
    config: CsvConfig,
    sample_rows: Option<u64>,
    cancel: Option<CancelToken>,
}

impl SchemaInference {
    /// Create an inference run over the given reader configuration.
    ///
    /// Declared column types and static columns are ignored for the scan:
    /// inference always reads raw text.
    #[must_use]
    pub fn new(config: CsvConfig) -> Self {
        Self {
            config,
            sample_rows: None,
            cancel: None,
        }
    }

    /// Analyse only the first `rows` data rows.
    #[must_use]
    pub fn sample_rows(mut self, rows: u64) -> Self {
        self.sample_rows = Some(rows);
        self
    }

    /// Install a cancellation token, checked between rows.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run over a file; the file length anchors progress reporting.
    pub fn run_path(
        &self,
        path: impl AsRef<Path>,
        progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<Vec<InferredColumn>> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(Error::from)?;
        let total = file.metadata().map(|m| m.len()).ok();
        tracing::debug!(path = %path.display(), total_bytes = ?total, "schema inference started");
        self.run_reader(file, total, progress)
    }

    /// Run over an arbitrary byte source. Progress is reported only when
    /// `total_len` is known.
    pub fn run_reader(
        &self,
        input: impl Read + Send + 'static,
        total_len: Option<u64>,
        mut progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<Vec<InferredColumn>> {
        let consumed = Arc::new(AtomicU64::new(0));
        let counted = CountingReader {
            inner: input,
            consumed: consumed.clone(),
        };

        let mut reader = CsvReader::from_reader(counted, self.scan_config())?;
        if let Some(token) = &self.cancel {
            reader.set_cancel_token(token.clone());
        }

        let mut analyzers: Vec<ColumnTypeAnalyzer> = reader
            .schema()?
            .iter()
            .map(|column| {
                ColumnTypeAnalyzer::new(
                    column.name.clone(),
                    column.ordinal,
                    self.effective_registry(),
                    self.config.culture.clone(),
                )
            })
            .collect();

        let mut rows: u64 = 0;
        let mut last_percent: u8 = 0;
        while self.sample_rows.is_none_or(|limit| rows < limit) && reader.read()? {
            for analyzer in &mut analyzers {
                match reader.value(analyzer.ordinal())? {
                    SqlValue::String(text) => analyzer.add(text),
                    _ => analyzer.add(""),
                }
            }
            rows += 1;
            if let (Some(total), Some(callback)) = (total_len, progress.as_deref_mut()) {
                let percent = ((consumed.load(Ordering::Relaxed) * 100) / total.max(1)).min(100);
                let percent = percent as u8;
                if percent > last_percent {
                    last_percent = percent;
                    callback(percent);
                }
            }
        }
        let sampled_out = self.sample_rows.is_some_and(|limit| rows >= limit);
        if !sampled_out && total_len.is_some() && last_percent < 100 {
            if let Some(callback) = progress.as_deref_mut() {
                callback(100);
            }
        }
        tracing::debug!(rows, columns = analyzers.len(), "schema inference finished");
        Ok(analyzers.iter().map(ColumnTypeAnalyzer::finalize).collect())
    }

    /// Reader configuration for the scan: everything reads as text and no
    /// synthetic columns take part.
    fn scan_config(&self) -> CsvConfig {
        let mut config = self.config.clone();
        config.column_types.clear();
        config.column_defaults.clear();
        config.static_columns.clear();
        config
    }

    fn effective_registry(&self) -> csvload_types::ConverterRegistry {
        if self.config.datetime_formats.is_empty() {
            self.config.registry.clone()
        } else {
            self.config
                .registry
                .clone()
                .with_datetime_formats(self.config.datetime_formats.clone())
        }
    }
}

/// Analyse the first `rows` data rows of a stream.
pub fn infer_sample(
    input: impl Read + Send + 'static,
    config: CsvConfig,
    rows: u64,
) -> Result<Vec<InferredColumn>> {
    SchemaInference::new(config)
        .sample_rows(rows)
        .run_reader(input, None, None)
}

/// Analyse an entire stream, with optional progress and cancellation.
pub fn infer_full(
    input: impl Read + Send + 'static,
    config: CsvConfig,
    progress: Option<&mut dyn FnMut(u8)>,
    cancel: Option<CancelToken>,
) -> Result<Vec<InferredColumn>> {
    let mut inference = SchemaInference::new(config);
    if let Some(token) = cancel {
        inference = inference.cancel_token(token);
    }
    inference.run_reader(input, None, progress)
}

/// Byte source that counts what the downstream layers consume.
struct CountingReader<R> {
    inner: R,
    consumed: Arc<AtomicU64>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}
