//! Request guards run ahead of the order handlers.
//!
//! Each guard checks one thing and returns the checked value, so a handler
//! chains them with `?` and stops at the first failure.

use serde_json::Value;

use super::{Dish, Order, OrderData, OrderStatus, OrderStore};
use crate::core::{OrderError, OrderResult};

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

pub fn has_deliver_to(data: &OrderData) -> OrderResult<String> {
    non_empty_str(data.deliver_to.as_ref())
        .map(str::to_string)
        .ok_or(OrderError::MissingField("deliverTo"))
}

pub fn has_mobile_number(data: &OrderData) -> OrderResult<String> {
    non_empty_str(data.mobile_number.as_ref())
        .map(str::to_string)
        .ok_or(OrderError::MissingField("mobileNumber"))
}

pub fn has_dishes(data: &OrderData) -> OrderResult<&[Value]> {
    match &data.dishes {
        Some(Value::Array(dishes)) if !dishes.is_empty() => Ok(dishes),
        _ => Err(OrderError::MissingDishes),
    }
}

/// Convert raw dishes, stopping at the first one without a positive integer
/// quantity.
pub fn dish_quantities(dishes: &[Value]) -> OrderResult<Vec<Dish>> {
    dishes
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            parse_dish(raw).ok_or_else(|| OrderError::InvalidDishQuantity {
                index,
                dish_id: raw.get("id").and_then(|id| match id {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                }),
            })
        })
        .collect()
}

fn parse_dish(raw: &Value) -> Option<Dish> {
    let mut attributes = raw.as_object()?.clone();
    let quantity = attributes
        .remove("quantity")?
        .as_u64()
        .filter(|quantity| *quantity > 0)?;
    Some(Dish::new(quantity, attributes))
}

pub fn status_is_valid(data: &OrderData) -> OrderResult<OrderStatus> {
    match &data.status {
        Some(Value::String(s)) => s.parse().map_err(OrderError::InvalidStatus),
        Some(other) => Err(OrderError::InvalidStatus(other.to_string())),
        None => Err(OrderError::InvalidStatus("undefined".to_string())),
    }
}

/// Status is optional on create but must be valid when given.
pub fn optional_status(data: &OrderData) -> OrderResult<Option<OrderStatus>> {
    match &data.status {
        None | Some(Value::Null) => Ok(None),
        Some(_) => status_is_valid(data).map(Some),
    }
}

/// A payload `id`, when present and non-empty, must equal the route id.
pub fn id_match(data: &OrderData, order_id: &str) -> OrderResult<()> {
    let body_id = match &data.id {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::String(s)) if s.is_empty() => return Ok(()),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if body_id == order_id {
        Ok(())
    } else {
        Err(OrderError::IdMismatch {
            body: body_id,
            route: order_id.to_string(),
        })
    }
}

pub fn order_exists<'a>(store: &'a OrderStore, order_id: &str) -> OrderResult<&'a Order> {
    store
        .find(order_id)
        .ok_or_else(|| OrderError::NotFound(order_id.to_string()))
}

pub fn order_is_pending(order: &Order) -> OrderResult<()> {
    if order.is_pending() {
        Ok(())
    } else {
        Err(OrderError::NotPending(order.status))
    }
}

/// The fields every write must carry, checked in the order a client would
/// fix them.
#[derive(Debug)]
pub struct ValidFields {
    pub deliver_to: String,
    pub mobile_number: String,
    pub dishes: Vec<Dish>,
}

pub fn required_fields(data: &OrderData) -> OrderResult<ValidFields> {
    let deliver_to = has_deliver_to(data)?;
    let mobile_number = has_mobile_number(data)?;
    let dishes = dish_quantities(has_dishes(data)?)?;
    Ok(ValidFields {
        deliver_to,
        mobile_number,
        dishes,
    })
}
