pub mod checkout;
pub mod planning;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use checkout::{CheckoutError, CheckoutService, Confirmation};
pub use planning::{PlanningError, PlanningFlow};
pub use session::TripSession;
pub use store::{StoreOptions, TripStore, TripStoreError, TripStoreEvent};
