//! Error types for the orders pipeline.
//!
//! Every error is scoped to the request that produced it and is returned to
//! the client verbatim as `{ "status": <code>, "message": <text> }`.

use std::fmt;

use http::StatusCode;

use crate::orders::OrderStatus;

/// Coarse classification of pipeline failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed field, status value, or body.
    Validation,
    /// Unknown order id.
    NotFound,
    /// Operation not allowed in the order's current status.
    StateConflict,
    /// Payload id disagrees with the route id.
    IdMismatch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderError {
    /// A required string field is absent or empty.
    MissingField(&'static str),

    /// `dishes` is absent, not an array, or empty.
    MissingDishes,

    /// The first dish whose quantity is missing, non-integer, or not positive.
    InvalidDishQuantity {
        index: usize,
        dish_id: Option<String>,
    },

    /// `status` is absent or outside the accepted values.
    InvalidStatus(String),

    /// Body is not a JSON object of the expected shape.
    MalformedBody(String),

    /// Request carries the wrong content type.
    UnsupportedContentType,

    NotFound(String),

    NotPending(Option<OrderStatus>),

    IdMismatch { body: String, route: String },
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::MissingField(_)
            | OrderError::MissingDishes
            | OrderError::InvalidDishQuantity { .. }
            | OrderError::InvalidStatus(_)
            | OrderError::MalformedBody(_)
            | OrderError::UnsupportedContentType => ErrorKind::Validation,
            OrderError::NotFound(_) => ErrorKind::NotFound,
            OrderError::NotPending(_) => ErrorKind::StateConflict,
            OrderError::IdMismatch { .. } => ErrorKind::IdMismatch,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation | ErrorKind::StateConflict | ErrorKind::IdMismatch => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderError::MissingField(field) => write!(f, "Order must include a {field}"),
            OrderError::MissingDishes => write!(f, "Order must include at least one dish"),
            OrderError::InvalidDishQuantity { index, dish_id } => {
                write!(f, "Dish {index}")?;
                if let Some(id) = dish_id {
                    write!(f, " ({id})")?;
                }
                write!(f, " must have a quantity that is an integer greater than 0")
            }
            OrderError::InvalidStatus(received) => write!(
                f,
                "Value of the 'status' property must be one of {}. Received: {received}",
                OrderStatus::accepted_values()
            ),
            OrderError::MalformedBody(detail) => {
                write!(f, "Request body is not valid JSON: {detail}")
            }
            OrderError::UnsupportedContentType => {
                write!(f, "Content-Type must be application/json")
            }
            OrderError::NotFound(id) => write!(f, "Order id not found: {id}"),
            OrderError::NotPending(status) => write!(
                f,
                "An order cannot be deleted unless it is pending. Order status: {}",
                status.map_or("none", |s| s.as_str())
            ),
            OrderError::IdMismatch { body, route } => write!(
                f,
                "Order id does not match route id. Order: {body}, Route: {route}"
            ),
        }
    }
}

impl std::error::Error for OrderError {}

impl From<serde_json::Error> for OrderError {
    fn from(err: serde_json::Error) -> Self {
        OrderError::MalformedBody(err.to_string())
    }
}

/// Result type alias for pipeline operations
pub type OrderResult<T> = std::result::Result<T, OrderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            OrderError::MissingField("deliverTo").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OrderError::NotFound("42".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            OrderError::NotPending(Some(OrderStatus::Delivered)).kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            OrderError::IdMismatch {
                body: "a".into(),
                route: "b".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_messages_name_the_problem() {
        assert_eq!(
            OrderError::MissingField("mobileNumber").to_string(),
            "Order must include a mobileNumber"
        );
        assert_eq!(
            OrderError::InvalidDishQuantity {
                index: 2,
                dish_id: None
            }
            .to_string(),
            "Dish 2 must have a quantity that is an integer greater than 0"
        );
        assert_eq!(
            OrderError::InvalidDishQuantity {
                index: 0,
                dish_id: Some("d7".into())
            }
            .to_string(),
            "Dish 0 (d7) must have a quantity that is an integer greater than 0"
        );
        assert!(OrderError::NotPending(Some(OrderStatus::Delivered))
            .to_string()
            .contains("cannot be deleted"));
        assert_eq!(
            OrderError::IdMismatch {
                body: "a".into(),
                route: "b".into()
            }
            .to_string(),
            "Order id does not match route id. Order: a, Route: b"
        );
    }
}
