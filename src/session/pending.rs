use tokio::sync::oneshot;

use crate::errors::Error;
use crate::request::{RequestDescriptor, Response};

/// A request parked while renewal is in flight, with the handle its caller awaits.
pub(crate) struct PendingRequest {
    pub(crate) descriptor: RequestDescriptor,
    pub(crate) completion: oneshot::Sender<Result<Response, Error>>,
}

impl PendingRequest {
    pub(crate) fn new(
        descriptor: RequestDescriptor,
    ) -> (Self, oneshot::Receiver<Result<Response, Error>>) {
        let (completion, receiver) = oneshot::channel();
        (
            Self {
                descriptor,
                completion,
            },
            receiver,
        )
    }

    /// Settles the caller. A caller that already went away is ignored.
    pub(crate) fn settle(self, outcome: Result<Response, Error>) {
        let _ = self.completion.send(outcome);
    }
}
