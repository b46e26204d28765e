mod coordinator;
mod pending;

pub use coordinator::{SessionCoordinator, UnauthenticatedHandler};
pub(crate) use pending::PendingRequest;
