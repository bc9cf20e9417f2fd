/// Batch tag scanning over an explicit list of files
use crate::error::DecodeFailure;
use crate::reader::{NativeTagReader, ReaderConfig, StandardTags};
use rawtag_core::{sort_tag_maps, TagMap, TagReader};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, warn};

/// Scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Use parallel processing (default: true)
    pub parallel: bool,

    /// Number of worker threads (default: num_cpus)
    pub num_threads: usize,

    /// File extensions to decode, matched case-sensitively
    pub extensions: Vec<String>,

    /// Settings handed to the underlying reader
    pub reader: ReaderConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            num_threads: num_cpus::get(),
            extensions: vec!["flac".to_string(), "mp3".to_string(), "m4a".to_string()],
            reader: ReaderConfig::default(),
        }
    }
}

/// Scan progress updates
#[derive(Debug, Clone)]
pub enum ScanProgress {
    /// Scanning started
    Started { total_files: usize },

    /// File scanned
    FileScanned {
        path: PathBuf,
        success: bool,
        error: Option<String>,
    },

    /// Scanning completed
    Completed { stats: ScanStats },
}

/// Scan statistics
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// Number of files with a configured extension
    pub files_discovered: usize,

    /// Number of files passed over for their extension
    pub files_skipped: usize,

    /// Number of files scanned
    pub files_scanned: usize,

    /// Number of files decoded without error
    pub files_decoded: usize,

    /// Errors encountered
    pub errors: Vec<(PathBuf, String)>,

    /// Decoded files that normalization could not complete
    pub missing_fields: Vec<(PathBuf, String)>,
}

/// Result of a batch scan
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Normalized tags of every decoded file, in presentation order
    pub tags: Vec<TagMap>,

    pub stats: ScanStats,
}

/// Outcome for one file; `None` when its worker died before reporting
type FileOutcome = (PathBuf, Option<Result<StandardTags, DecodeFailure>>);

/// Decodes many files, skipping the ones that fail
pub struct TagScanner {
    reader: NativeTagReader,
    config: ScanConfig,
}

impl TagScanner {
    /// Create a new tag scanner
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    /// Create a scanner with custom configuration
    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            reader: NativeTagReader::with_config(config.reader.clone()),
            config,
        }
    }

    /// Decode every supported file in `paths`
    ///
    /// A file that fails to decode is logged, recorded in the stats and left
    /// out of the returned tags; it never stops the scan.
    ///
    /// # Arguments
    /// * `paths` - Files to decode (directory walking is up to the caller)
    /// * `progress_tx` - Optional channel for progress updates
    pub fn scan(
        &self,
        paths: &[PathBuf],
        progress_tx: Option<mpsc::Sender<ScanProgress>>,
    ) -> ScanReport {
        let mut report = ScanReport::default();

        let files: Vec<&Path> = paths
            .iter()
            .map(PathBuf::as_path)
            .filter(|path| self.should_scan(path))
            .collect();
        report.stats.files_discovered = files.len();
        report.stats.files_skipped = paths.len() - files.len();

        if let Some(ref tx) = progress_tx {
            let _ = tx.send(ScanProgress::Started {
                total_files: files.len(),
            });
        }

        let results = if self.config.parallel && self.config.num_threads > 1 && files.len() > 1 {
            self.decode_parallel(&files)
        } else {
            files
                .iter()
                .map(|path| {
                    let outcome = self.reader.standard_tags_detailed(path);
                    (path.to_path_buf(), Some(outcome))
                })
                .collect()
        };

        for (path, outcome) in results {
            let error = Self::record(&mut report, &path, outcome);
            if let Some(ref tx) = progress_tx {
                let _ = tx.send(ScanProgress::FileScanned {
                    path,
                    success: error.is_none(),
                    error,
                });
            }
        }

        sort_tag_maps(&mut report.tags);

        if let Some(ref tx) = progress_tx {
            let _ = tx.send(ScanProgress::Completed {
                stats: report.stats.clone(),
            });
        }

        report
    }

    fn should_scan(&self, path: &Path) -> bool {
        let listed = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.config.extensions.iter().any(|e| e == ext));
        if !listed || !self.reader.supports(path) {
            debug!("Skipping {}", path.display());
            return false;
        }
        true
    }

    /// Fold one file's outcome into the report, returning its error message
    fn record(
        report: &mut ScanReport,
        path: &Path,
        outcome: Option<Result<StandardTags, DecodeFailure>>,
    ) -> Option<String> {
        report.stats.files_scanned += 1;
        let message = match outcome {
            Some(Ok(standard)) => {
                report.stats.files_decoded += 1;
                if let Some(gap) = standard.missing {
                    report
                        .stats
                        .missing_fields
                        .push((path.to_path_buf(), gap.to_string()));
                }
                report.tags.push(standard.tags);
                return None;
            }
            Some(Err(failure)) => {
                warn!("Failed to decode {}: {}", path.display(), failure);
                failure.to_string()
            }
            None => {
                warn!("Scan worker panicked while decoding {}", path.display());
                "Scan worker panicked".to_string()
            }
        };
        report.stats.errors.push((path.to_path_buf(), message.clone()));
        Some(message)
    }

    // Workers pull one file at a time from a shared index and send each
    // outcome back as soon as it is ready. Files a panicking worker never
    // reported come back as `None`.
    fn decode_parallel(&self, files: &[&Path]) -> Vec<FileOutcome> {
        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();
        let workers = self.config.num_threads.min(files.len());

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let tx = tx.clone();
                    let next = &next;
                    scope.spawn(move || loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(path) = files.get(index) else {
                            break;
                        };
                        let _ = tx.send((index, self.reader.standard_tags_detailed(path)));
                    })
                })
                .collect();

            // Joined explicitly; the scope re-raises panics of unjoined threads
            for handle in handles {
                if handle.join().is_err() {
                    warn!("Scan worker panicked");
                }
            }
        });
        drop(tx);

        let mut outcomes: Vec<_> = files.iter().map(|path| (path.to_path_buf(), None)).collect();
        for (index, outcome) in rx {
            outcomes[index].1 = Some(outcome);
        }
        outcomes
    }
}

impl Default for TagScanner {
    fn default() -> Self {
        Self::new()
    }
}
