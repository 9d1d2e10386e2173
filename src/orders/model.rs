use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Delivery status of an order.
///
/// Any status can move to any other through an update; only `Pending`
/// orders may be deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    OutForDelivery,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out-for-delivery",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// Comma separated list of every accepted value, used in error messages.
    pub fn accepted_values() -> String {
        Self::ALL
            .iter()
            .map(OrderStatus::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// A line item of an order.
///
/// Only `quantity` is interpreted; `id`, `name`, `price` and anything else
/// the client sends is kept as-is and echoed back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Dish {
    #[validate(range(min = 1))]
    pub quantity: u64,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Dish {
    pub fn new(quantity: u64, attributes: Map<String, Value>) -> Self {
        Self {
            quantity,
            attributes,
        }
    }

    /// The dish identifier, if the client supplied one.
    pub fn id(&self) -> Option<String> {
        match self.attributes.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[validate(length(min = 1))]
    pub id: String,

    #[validate(length(min = 1))]
    pub deliver_to: String,

    #[validate(length(min = 1))]
    pub mobile_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,

    #[validate(length(min = 1))]
    #[validate(nested)]
    pub dishes: Vec<Dish>,
}

impl Order {
    pub fn is_pending(&self) -> bool {
        self.status == Some(OrderStatus::Pending)
    }
}

/// Request envelope: every write carries its fields under `data`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderBody {
    #[serde(default)]
    pub data: OrderData,
}

/// Loosely typed order payload.
///
/// Fields stay as raw JSON so each validator can report exactly which field
/// is missing or malformed instead of failing on the first serde error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub deliver_to: Option<Value>,
    #[serde(default)]
    pub mobile_number: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub dishes: Option<Value>,
}

impl OrderBody {
    /// Parse a request body. An empty body is an empty envelope.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}
