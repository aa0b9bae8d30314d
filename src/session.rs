use std::sync::{Arc, Mutex};

use crate::token::Token;

/// In-memory store for the current bearer token.
///
/// Clones share the same underlying slot, so the auth handshake, the event
/// channel and the command dispatcher all observe the same credential. The
/// store deliberately does not persist anything: the host loads a previously
/// saved token with [`set_token`](Self::set_token) and reads it back after
/// authentication to save it externally.
#[derive(Clone, Debug, Default)]
pub struct Session {
    token: Arc<Mutex<Option<Token>>>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_token(&self, token: Token) {
        *self.token.lock().expect("token lock poisoned") = Some(token);
    }

    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.token.lock().expect("token lock poisoned").clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.lock().expect("token lock poisoned").is_some()
    }
}
