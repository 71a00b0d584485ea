use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::getter::{FileGetter, Getter, HttpGetter, FILE_SCHEME};
use crate::progress::tracker::{noop_progress_tracker, ProgressTracker};
use crate::types::types::{AuthenticationInfo, DownloadError, HeaderData};

/// A unit of deferred configuration, applied once while a `Client` is built.
///
/// Options run in the order they were supplied; the first one to fail aborts
/// construction with its error.
pub type ClientOption = Box<dyn FnOnce(&mut ClientConfig) -> Result<(), DownloadError> + Send>;

/// Build-time state of a `Client`. Read-only once the client exists.
pub struct ClientConfig {
    progress_tracker: Option<Arc<dyn ProgressTracker>>,
    getters: HashMap<String, Arc<dyn Getter>>,
    header_data: HeaderData,
    insecure: bool,
    cancel_token: CancellationToken,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            progress_tracker: None,
            getters: HashMap::new(),
            header_data: HeaderData::default(),
            insecure: false,
            cancel_token: CancellationToken::new(),
        }
    }
}

impl ClientConfig {
    /// Installs `tracker`, replacing whatever was installed before.
    pub fn set_progress_tracker(&mut self, tracker: Arc<dyn ProgressTracker>) {
        self.progress_tracker = Some(tracker);
    }

    /// The active tracker, or the shared passthrough when none was installed.
    pub fn progress_tracker(&self) -> &dyn ProgressTracker {
        match &self.progress_tracker {
            Some(tracker) => tracker.as_ref(),
            None => noop_progress_tracker().as_ref(),
        }
    }

    pub fn has_progress_tracker(&self) -> bool {
        self.progress_tracker.is_some()
    }

    /// Registers `getter` for `scheme` (case-insensitive), replacing any
    /// getter already registered for it.
    pub fn set_getter(
        &mut self,
        scheme: &str,
        getter: Arc<dyn Getter>,
    ) -> Result<(), DownloadError> {
        let scheme = scheme.trim();
        if scheme.is_empty() || scheme.contains(':') || scheme.contains('/') {
            return Err(DownloadError::InvalidOption(format!(
                "'{}' is not a valid getter scheme",
                scheme
            )));
        }
        self.getters.insert(scheme.to_ascii_lowercase(), getter);
        Ok(())
    }

    pub fn getter(&self, scheme: &str) -> Option<&Arc<dyn Getter>> {
        self.getters.get(scheme)
    }

    pub fn add_header(&mut self, name: String, value: String) {
        self.header_data.headers.entry(name).or_default().push(value);
    }

    pub fn set_authentication(&mut self, authentication: AuthenticationInfo) {
        self.header_data.authentication = Some(authentication);
    }

    pub fn header_data(&self) -> &HeaderData {
        &self.header_data
    }

    pub fn set_insecure(&mut self, insecure: bool) {
        self.insecure = insecure;
    }

    pub fn insecure(&self) -> bool {
        self.insecure
    }

    pub fn set_cancel_token(&mut self, token: CancellationToken) {
        self.cancel_token = token;
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    /// Fills in the built-in getters for schemes no option claimed.
    /// Runs after all options, so it sees the final headers and TLS settings.
    pub(crate) fn install_default_getters(&mut self) -> Result<(), DownloadError> {
        if !self.getters.contains_key("http") || !self.getters.contains_key("https") {
            let http: Arc<dyn Getter> =
                Arc::new(HttpGetter::new(self.header_data().clone(), self.insecure())?);
            self.getters
                .entry("http".to_string())
                .or_insert_with(|| http.clone());
            self.getters.entry("https".to_string()).or_insert(http);
        }
        self.getters
            .entry(FILE_SCHEME.to_string())
            .or_insert_with(|| Arc::new(FileGetter::new()));
        Ok(())
    }
}
