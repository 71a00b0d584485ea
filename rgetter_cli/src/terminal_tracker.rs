use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use rgetter_core::getter::file_name_of;
use rgetter_core::progress::{ProgressReader, ProgressTracker, ReadEvent};
use rgetter_core::types::types::DownloadStream;

const BAR_TEMPLATE: &str =
    "[{bar:30.cyan/blue}] {bytes}/{total_bytes} ({binary_bytes_per_sec}) ETA {eta} — {msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {bytes} ({binary_bytes_per_sec}) — {msg}";

/// Renders one indicatif bar per download.
///
/// All bars live under a shared `MultiProgress`, which synchronises drawing
/// internally, so concurrent downloads can share one tracker. Drawing errors
/// are swallowed by indicatif and never reach the read path.
pub struct TerminalProgressTracker {
    multi: MultiProgress,
}

impl TerminalProgressTracker {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// Draws somewhere other than stderr (`ProgressDrawTarget::hidden()` in tests).
    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
        }
    }

    fn new_bar(&self, size: Option<u64>) -> ProgressBar {
        match size.filter(|&total| total > 0) {
            Some(total) => {
                let pb = self.multi.add(ProgressBar::new(total));
                if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                    pb.set_style(style.progress_chars("=>-"));
                }
                pb
            }
            // Unknown size: indeterminate spinner.
            None => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
                    pb.set_style(style);
                }
                pb.enable_steady_tick(Duration::from_millis(120));
                pb
            }
        }
    }
}

impl Default for TerminalProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker for TerminalProgressTracker {
    fn track_progress(
        &self,
        source: &str,
        size: Option<u64>,
        stream: DownloadStream,
    ) -> DownloadStream {
        let label = file_name_of(source).unwrap_or(source).to_string();
        let pb = self.new_bar(size);
        pb.set_message(label.clone());

        let reader = ProgressReader::new(stream, move |event| match event {
            ReadEvent::Advanced { delta, .. } => pb.inc(delta),
            ReadEvent::Finished { .. } => pb.finish_with_message(format!("{} done", label)),
            ReadEvent::Abandoned { .. } => pb.abandon_with_message(format!("{} failed", label)),
        });
        Box::new(reader)
    }
}
