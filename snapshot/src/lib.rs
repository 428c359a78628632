pub mod account;
pub mod order;
pub mod quote;
pub mod reconciler;
pub mod store;
pub mod trade;

pub use account::{Account, Position};
pub use order::{Direction, Order, OrderStatus};
pub use quote::{DepthLevel, Quote};
pub use reconciler::Reconciler;
pub use store::SnapshotStore;
pub use trade::Trade;
