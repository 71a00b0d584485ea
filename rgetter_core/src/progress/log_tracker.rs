use super::reader::{ProgressReader, ReadEvent};
use super::tracker::ProgressTracker;
use crate::types::types::DownloadStream;

/// Log a line every this many bytes when the total size is unknown.
const DEFAULT_STEP_BYTES: u64 = 8 * 1024 * 1024;

/// Log a line every this many percent when the total size is known.
const PERCENT_STEP: u64 = 10;

/// Reports download progress through the `log` facade.
///
/// Each download gets its own counters inside the wrapping closure, so the
/// tracker itself is stateless and can serve concurrent downloads.
#[derive(Debug, Clone)]
pub struct LogProgressTracker {
    step_bytes: u64,
}

impl LogProgressTracker {
    pub fn new() -> Self {
        Self {
            step_bytes: DEFAULT_STEP_BYTES,
        }
    }

    /// Interval between log lines for downloads of unknown size.
    pub fn with_step_bytes(mut self, step_bytes: u64) -> Self {
        self.step_bytes = step_bytes.max(1);
        self
    }
}

impl Default for LogProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker for LogProgressTracker {
    fn track_progress(
        &self,
        source: &str,
        size: Option<u64>,
        stream: DownloadStream,
    ) -> DownloadStream {
        let source = source.to_string();
        match size {
            Some(total) => log::info!(
                "[LogProgressTracker] {}: starting, {} expected",
                source,
                format_bytes(total)
            ),
            None => log::info!("[LogProgressTracker] {}: starting, size unknown", source),
        }

        // Zero-length hints get no percentage, only byte steps.
        let known = size.filter(|&s| s > 0);
        let step_bytes = self.step_bytes;
        let mut next_percent = PERCENT_STEP;
        let mut next_bytes = step_bytes;

        let reader = ProgressReader::new(stream, move |event| match event {
            ReadEvent::Advanced { total, .. } => match known {
                Some(expected) => {
                    let percent = total.saturating_mul(100) / expected;
                    if percent >= next_percent {
                        log::info!(
                            "[LogProgressTracker] {}: {}% ({}/{})",
                            source,
                            percent.min(100),
                            format_bytes(total),
                            format_bytes(expected)
                        );
                        next_percent = (percent / PERCENT_STEP + 1) * PERCENT_STEP;
                    }
                }
                None => {
                    if total >= next_bytes {
                        log::info!("[LogProgressTracker] {}: {} so far", source, format_bytes(total));
                        next_bytes = (total / step_bytes + 1) * step_bytes;
                    }
                }
            },
            ReadEvent::Finished { total } => {
                log::info!("[LogProgressTracker] {}: done, {}", source, format_bytes(total));
            }
            ReadEvent::Abandoned { total } => {
                log::warn!(
                    "[LogProgressTracker] {}: stopped after {}",
                    source,
                    format_bytes(total)
                );
            }
        });
        Box::new(reader)
    }
}

/// Human-readable byte formatting.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}
