//! Unified error type for the Parlor service crate.

use std::time::Duration;

use parlor_lobby::LobbyError;

/// Top-level error for the gateway and the server loop.
///
/// Lobby rejections convert automatically via `#[from]`, so handlers can use
/// `?` across the core boundary. The timeout variant exists only at this
/// boundary: it means "outcome unknown" — the underlying operation was not
/// retracted and may still have completed.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// A typed rejection from the lobby core.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// The bounded wait for a reply elapsed. Outcome unknown.
    #[error("no reply within {0:?}, outcome unknown")]
    RequestTimedOut(Duration),

    /// An I/O error from binding or serving the HTTP listener.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_protocol::RoomId;

    #[test]
    fn test_from_lobby_error() {
        let err: ParlorError = LobbyError::UnknownRoom(RoomId::from("9")).into();
        assert!(matches!(err, ParlorError::Lobby(_)));
        assert!(err.to_string().contains("room 9"));
    }

    #[test]
    fn test_timeout_message_says_outcome_unknown() {
        let err = ParlorError::RequestTimedOut(Duration::from_secs(10));
        assert!(err.to_string().contains("outcome unknown"));
    }
}
