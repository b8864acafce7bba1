//! The credential slot shared by a service's tool calls.

use tokio::sync::RwLock;

/// Holds a variant's credential-backed client for the lifetime of the
/// process. Configured once at startup or at runtime through the
/// `setup_auth` tool; never persisted. The lock exists only because the
/// MCP runtime requires the service to be shareable; contention is nil.
#[derive(Debug)]
pub struct Session<C> {
    slot: RwLock<Option<C>>,
}

impl<C: Clone> Session<C> {
    #[must_use]
    pub fn new(initial: Option<C>) -> Self {
        Self {
            slot: RwLock::new(initial),
        }
    }

    /// Replace the configured client.
    pub async fn configure(&self, client: C) {
        *self.slot.write().await = Some(client);
    }

    /// The configured client, if any.
    pub async fn get(&self) -> Option<C> {
        self.slot.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_start_with_their_initial_value() {
        let session: Session<String> = Session::new(None);
        assert!(session.get().await.is_none());

        let session = Session::new(Some("token-1".to_string()));
        assert_eq!(session.get().await.as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn configure_replaces_the_client() {
        let session = Session::new(Some("old".to_string()));
        session.configure("new".to_string()).await;
        assert_eq!(session.get().await.as_deref(), Some("new"));
    }
}
