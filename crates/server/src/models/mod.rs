//! Domain types, separate from database row types.

pub mod basket;
pub mod customer;
pub mod feedback;

pub use basket::BasketEntry;
pub use customer::{Customer, CustomerPatch, ImportCustomer, NewCustomer};
pub use feedback::{Feedback, NewFeedback};
