//! View models
//!
//! Screen-level orchestrators. Each owns one snapshot, talks to storage
//! through the repository traits and reports outcomes through a
//! [`NotificationSink`](crate::notifications::NotificationSink).

mod cart;
mod list;

pub use cart::CartViewModel;
pub use list::{CartListState, CartListViewModel, StatusFilter};
