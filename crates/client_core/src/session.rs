use std::sync::{PoisonError, RwLock};

use shared::domain::Identity;
use tracing::info;

use crate::SessionContext;

/// In-memory wallet connection state, toggled by the front end.
#[derive(Debug, Default)]
pub struct WalletSession {
    identity: RwLock<Option<Identity>>,
}

impl WalletSession {
    pub fn connected(identity: Identity) -> Self {
        Self {
            identity: RwLock::new(Some(identity)),
        }
    }

    pub fn connect(&self, identity: Identity) {
        info!(identity = %identity, "wallet connected");
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = Some(identity);
    }

    pub fn disconnect(&self) -> Option<Identity> {
        let previous = self
            .identity
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(identity) = &previous {
            info!(identity = %identity, "wallet disconnected");
        }
        previous
    }
}

impl SessionContext for WalletSession {
    fn current_identity(&self) -> Option<Identity> {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_and_disconnect_toggle_identity() {
        let session = WalletSession::default();
        assert_eq!(session.current_identity(), None);

        session.connect(Identity::new("0xa11ce"));
        assert_eq!(session.current_identity(), Some(Identity::new("0xa11ce")));

        assert_eq!(session.disconnect(), Some(Identity::new("0xa11ce")));
        assert_eq!(session.current_identity(), None);
        assert_eq!(session.disconnect(), None);
    }
}
