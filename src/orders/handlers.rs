//! The five order operations.
//!
//! Each handler runs its guard chain from [`super::validate`] first and only
//! touches the store once every guard has passed.

use http::StatusCode;
use serde_json::{json, Value};

use super::{
    validate::{
        id_match, optional_status, order_exists, order_is_pending, required_fields,
        status_is_valid,
    },
    Order, OrderBody, OrderStore,
};
use crate::core::{OrderError, OrderResult};

/// Successful outcome of a handler, before it is turned into HTTP.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `{ "data": ... }` with the given status.
    Data(StatusCode, Value),
    /// 204 with an empty body.
    NoContent,
}

impl Reply {
    fn data<T: serde::Serialize>(status: StatusCode, data: &T) -> OrderResult<Self> {
        Ok(Reply::Data(status, json!({ "data": serde_json::to_value(data)? })))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Data(status, _) => *status,
            Reply::NoContent => StatusCode::NO_CONTENT,
        }
    }
}

/// `GET /orders`
///
/// Returns every order in insertion order. The collection route has no
/// parameter to filter on, so nothing is filtered.
pub fn list(store: &OrderStore) -> OrderResult<Reply> {
    log::debug!("Listing {} orders", store.len());
    Reply::data(StatusCode::OK, &store.orders())
}

/// `POST /orders`
pub fn create(store: &mut OrderStore, body: &[u8]) -> OrderResult<Reply> {
    let OrderBody { data } = OrderBody::from_slice(body)?;
    let fields = required_fields(&data)?;
    let status = optional_status(&data)?;

    let order = Order {
        id: store.next_id(),
        deliver_to: fields.deliver_to,
        mobile_number: fields.mobile_number,
        status,
        dishes: fields.dishes,
    };
    log::info!("Created order {} with {} dishes", order.id, order.dishes.len());

    let reply = Reply::data(StatusCode::CREATED, &order)?;
    store.push(order);
    Ok(reply)
}

/// `GET /orders/{order_id}`
pub fn read(store: &OrderStore, order_id: &str) -> OrderResult<Reply> {
    let order = order_exists(store, order_id)?;
    Reply::data(StatusCode::OK, order)
}

/// `PUT /orders/{order_id}`
///
/// Replaces every mutable field; there is no merge with the stored order.
pub fn update(store: &mut OrderStore, order_id: &str, body: &[u8]) -> OrderResult<Reply> {
    order_exists(store, order_id)?;
    let OrderBody { data } = OrderBody::from_slice(body)?;
    let fields = required_fields(&data)?;
    let status = status_is_valid(&data)?;
    id_match(&data, order_id)?;

    let order = store
        .find_mut(order_id)
        .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
    order.deliver_to = fields.deliver_to;
    order.mobile_number = fields.mobile_number;
    order.status = Some(status);
    order.dishes = fields.dishes;
    log::info!("Updated order {order_id}, status now {status}");

    Reply::data(StatusCode::OK, &*order)
}

/// `DELETE /orders/{order_id}`
///
/// Only pending orders can be removed. Answers 204 even if the order
/// vanished between lookup and removal.
pub fn destroy(store: &mut OrderStore, order_id: &str, body: &[u8]) -> OrderResult<Reply> {
    order_is_pending(order_exists(store, order_id)?)?;
    let OrderBody { data } = OrderBody::from_slice(body)?;
    id_match(&data, order_id)?;

    match store.position(order_id).and_then(|index| store.remove(index)) {
        Some(order) => log::info!("Deleted order {}", order.id),
        None => log::debug!("Order {order_id} already gone, nothing to delete"),
    }
    Ok(Reply::NoContent)
}
