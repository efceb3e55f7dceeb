use serde::{Deserialize, Serialize};

/// Outcome of a notification permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

/// Platform notification capability.
///
/// Injected into [`StudyTimer`](super::StudyTimer) instead of reaching for
/// an ambient platform API.
pub trait NotificationBackend {
    /// Show the platform permission prompt.
    fn request_permission(&mut self) -> Result<Permission, Box<dyn std::error::Error>>;

    /// Deliver one notification.
    fn notify(&mut self, title: &str, body: &str) -> Result<(), Box<dyn std::error::Error>>;
}

impl<N: NotificationBackend + ?Sized> NotificationBackend for Box<N> {
    fn request_permission(&mut self) -> Result<Permission, Box<dyn std::error::Error>> {
        (**self).request_permission()
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), Box<dyn std::error::Error>> {
        (**self).notify(title, body)
    }
}
