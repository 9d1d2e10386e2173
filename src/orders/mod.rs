//! The orders resource: data model, store, request guards and handlers.

pub mod handlers;
pub mod model;
pub mod store;
pub mod validate;

pub use handlers::Reply;
pub use model::{Dish, Order, OrderBody, OrderData, OrderStatus};
pub use store::{IdGenerator, OrderStore, UuidIdGenerator};
