pub mod poller;
pub mod reconciler;
pub mod supervisor;

pub use poller::EventPoller;
pub use reconciler::{HandleError, Reconciler};
pub use supervisor::{ContractAddresses, ListenerSettings, Supervisor};
