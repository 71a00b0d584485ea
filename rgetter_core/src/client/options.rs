use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::config::ClientOption;
use crate::getter::Getter;
use crate::progress::tracker::ProgressTracker;
use crate::types::types::AuthenticationInfo;

/// Lets the caller track the progress of every download made by the client,
/// for example by drawing a progress bar.
///
/// Applying it replaces any tracker set by an earlier option. It never fails.
pub fn with_progress<T: ProgressTracker>(tracker: T) -> ClientOption {
    Box::new(move |config| {
        config.set_progress_tracker(Arc::new(tracker));
        Ok(())
    })
}

/// Registers a getter for `scheme`, overriding the built-in one if any.
/// Fails when `scheme` is empty or contains `:` or `/`.
pub fn with_getter<G: Getter + 'static>(scheme: impl Into<String>, getter: G) -> ClientOption {
    let scheme = scheme.into();
    Box::new(move |config| config.set_getter(&scheme, Arc::new(getter)))
}

/// Adds a header to every HTTP request. Repeating a name sends it more than once.
pub fn with_header(name: impl Into<String>, value: impl Into<String>) -> ClientOption {
    let (name, value) = (name.into(), value.into());
    Box::new(move |config| {
        config.add_header(name, value);
        Ok(())
    })
}

pub fn with_basic_auth(username: impl Into<String>, password: impl Into<String>) -> ClientOption {
    let authentication = AuthenticationInfo {
        username: username.into(),
        password: password.into(),
    };
    Box::new(move |config| {
        config.set_authentication(authentication);
        Ok(())
    })
}

/// Skips TLS certificate validation for the built-in HTTP getter.
pub fn with_insecure() -> ClientOption {
    Box::new(|config| {
        config.set_insecure(true);
        Ok(())
    })
}

/// Ties the client's downloads to an external cancellation token.
pub fn with_cancellation(token: CancellationToken) -> ClientOption {
    Box::new(move |config| {
        config.set_cancel_token(token);
        Ok(())
    })
}
