//! The caller handle: a one-shot capability for answering a request.
//!
//! The directory captures one of these the moment a request enters it.
//! For directory-only operations it replies on the handle itself; for
//! join/leave it threads the handle through the room actor, which answers
//! the original caller directly — the final reply never routes back through
//! the directory.

use tokio::sync::oneshot;

/// Delivers the final outcome of one request to whoever is awaiting it,
/// independent of which entity computed that outcome.
///
/// Consuming `deliver` enforces the "exactly one outcome per request" rule
/// at the type level.
#[derive(Debug)]
pub struct CallerHandle<T> {
    reply: oneshot::Sender<T>,
}

impl<T> CallerHandle<T> {
    /// Creates a handle together with the receiving end the caller awaits.
    pub fn channel() -> (Self, oneshot::Receiver<T>) {
        let (reply, rx) = oneshot::channel();
        (Self { reply }, rx)
    }

    /// Sends the outcome to the caller.
    ///
    /// A caller that hit its gateway timeout has dropped the receiving end;
    /// the outcome is then discarded. The operation itself already took
    /// effect — there is no cancellation.
    pub fn deliver(self, outcome: T) {
        if self.reply.send(outcome).is_err() {
            tracing::debug!("caller gone before reply, outcome dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deliver_reaches_waiting_caller() {
        let (handle, rx) = CallerHandle::channel();
        handle.deliver(7u32);
        assert_eq!(rx.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_deliver_to_departed_caller_is_silent() {
        let (handle, rx) = CallerHandle::<u32>::channel();
        drop(rx);
        // Must not panic — the timed-out caller simply never sees this.
        handle.deliver(7);
    }
}
