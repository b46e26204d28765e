use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::debug;

use crate::errors::Error;
use crate::request::{RequestDescriptor, Response};
use crate::telemetry::renewal::RenewalTelemetry;
use crate::transport::Transport;

use super::PendingRequest;

/// Invoked once per failed renewal cycle to send the application to a public entry point.
pub type UnauthenticatedHandler = Arc<dyn Fn() + Send + Sync>;

enum RenewalState {
    Idle,
    Refreshing {
        telemetry: RenewalTelemetry,
        queue: Vec<PendingRequest>,
    },
}

enum Role {
    Leader(RequestDescriptor, RenewalTelemetry),
    Queued(oneshot::Receiver<Result<Response, Error>>),
}

/// Single-flight session renewal shared by every request of one client.
///
/// The first 401 seen while idle owns the cycle and issues the renewal call;
/// every 401 that arrives before the cycle settles is parked in the queue and
/// settled from the cycle's outcome. The state lock is never held across an
/// await point.
pub struct SessionCoordinator {
    state: Mutex<RenewalState>,
    refresh_path: String,
    on_unauthenticated: Mutex<Option<UnauthenticatedHandler>>,
}

impl SessionCoordinator {
    pub fn new(
        refresh_path: impl Into<String>,
        on_unauthenticated: Option<UnauthenticatedHandler>,
    ) -> Self {
        Self {
            state: Mutex::new(RenewalState::Idle),
            refresh_path: refresh_path.into(),
            on_unauthenticated: Mutex::new(on_unauthenticated),
        }
    }

    /// Replaces the handler run after a failed renewal. Every client sharing
    /// this coordinator sees the new handler from the next cycle on.
    pub fn set_unauthenticated_handler(&self, handler: UnauthenticatedHandler) {
        *self
            .on_unauthenticated
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock_state(), RenewalState::Refreshing { .. })
    }

    /// Number of requests parked behind the renewal call in flight.
    pub fn pending_len(&self) -> usize {
        match &*self.lock_state() {
            RenewalState::Idle => 0,
            RenewalState::Refreshing { queue, .. } => queue.len(),
        }
    }

    /// Handles a first 401 for `descriptor`: renews the session (or waits for the
    /// renewal already in flight) and returns the outcome of re-sending it.
    pub async fn on_auth_expiry<T: Transport>(
        &self,
        transport: &Arc<T>,
        mut descriptor: RequestDescriptor,
    ) -> Result<Response, Error> {
        descriptor.mark_retried();
        match self.enlist(descriptor) {
            Role::Queued(receiver) => receiver.await.unwrap_or(Err(Error::RenewalAbandoned)),
            Role::Leader(descriptor, telemetry) => {
                self.lead(transport, descriptor, telemetry).await
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RenewalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enlist(&self, descriptor: RequestDescriptor) -> Role {
        let mut state = self.lock_state();
        if let RenewalState::Refreshing { telemetry, queue } = &mut *state {
            telemetry.emit_queued(descriptor.path(), queue.len() + 1);
            let (pending, receiver) = PendingRequest::new(descriptor);
            queue.push(pending);
            return Role::Queued(receiver);
        }
        let telemetry = RenewalTelemetry::new(descriptor.path());
        *state = RenewalState::Refreshing {
            telemetry: telemetry.clone(),
            queue: Vec::new(),
        };
        Role::Leader(descriptor, telemetry)
    }

    /// Returns to idle and hands back everything queued during the cycle.
    fn settle(&self) -> Vec<PendingRequest> {
        let mut state = self.lock_state();
        match std::mem::replace(&mut *state, RenewalState::Idle) {
            RenewalState::Idle => Vec::new(),
            RenewalState::Refreshing { queue, .. } => queue,
        }
    }

    async fn lead<T: Transport>(
        &self,
        transport: &Arc<T>,
        descriptor: RequestDescriptor,
        telemetry: RenewalTelemetry,
    ) -> Result<Response, Error> {
        let mut guard = CycleGuard {
            coordinator: self,
            telemetry: &telemetry,
            armed: true,
        };
        telemetry.emit_start();
        let mut renewal = RequestDescriptor::post(self.refresh_path.as_str());
        renewal.mark_retried();
        let renewed = transport.send(&renewal).await;
        guard.armed = false;
        let queue = self.settle();

        match renewed {
            Ok(_) => {
                telemetry.emit_success(queue.len());
                for pending in queue {
                    let transport = Arc::clone(transport);
                    tokio::spawn(async move {
                        let outcome = transport.send(&pending.descriptor).await;
                        pending.settle(outcome);
                    });
                }
                let outcome = transport.send(&descriptor).await;
                if let Err(err) = &outcome {
                    debug!(
                        path = descriptor.path(),
                        request_id = %descriptor.request_id(),
                        error = %err,
                        "request.replay_failed"
                    );
                }
                outcome
            }
            Err(err) => {
                telemetry.emit_failure(&err, queue.len());
                let reason = Arc::new(err);
                for pending in queue {
                    pending.settle(Err(Error::SessionRenewal(Arc::clone(&reason))));
                }
                let handler = self
                    .on_unauthenticated
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                if let Some(handler) = handler {
                    handler();
                }
                Err(Error::SessionRenewal(reason))
            }
        }
    }
}

/// Resets the coordinator if the leading request is dropped mid-renewal.
struct CycleGuard<'a> {
    coordinator: &'a SessionCoordinator,
    telemetry: &'a RenewalTelemetry,
    armed: bool,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let queue = self.coordinator.settle();
        self.telemetry.emit_abandoned(queue.len());
        for pending in queue {
            pending.settle(Err(Error::RenewalAbandoned));
        }
    }
}
