//! The hook through which an unrecoverable session is sent back to login.
//!
//! The embedding application decides what "go to login" means. The token
//! store is already cleared when the hook runs, and it runs once per failed
//! refresh cycle.

/// Receives the login entry point when the session cannot be recovered.
pub trait LoginNavigator: Send + Sync {
    fn navigate_to_login(&self, login_path: &str);
}

impl<F> LoginNavigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate_to_login(&self, login_path: &str) {
        self(login_path)
    }
}

/// Navigator for headless callers: records the event in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl LoginNavigator for LogNavigator {
    fn navigate_to_login(&self, login_path: &str) {
        tracing::warn!(login_path, "Session ended, login required");
    }
}
