//! In-memory order collection.
//!
//! Orders live in a `Vec` in insertion order; lookups are linear scans and
//! removal splices by index.

use uuid::Uuid;

use super::Order;

/// Source of fresh order identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// 32 lowercase hex characters from a random v4 UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

pub struct OrderStore {
    orders: Vec<Order>,
    ids: Box<dyn IdGenerator>,
}

impl OrderStore {
    pub fn new(ids: Box<dyn IdGenerator>) -> Self {
        Self::with_orders(Vec::new(), ids)
    }

    pub fn with_orders(orders: Vec<Order>, ids: Box<dyn IdGenerator>) -> Self {
        Self { orders, ids }
    }

    /// Draw an id that no stored order uses yet.
    pub fn next_id(&self) -> String {
        loop {
            let id = self.ids.next_id();
            if self.position(&id).is_none() {
                return id;
            }
            log::debug!("Generated order id {id} already in use, drawing again");
        }
    }

    pub fn push(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn find(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|order| order.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.orders.iter().position(|order| order.id == id)
    }

    /// Remove the order at `index`. Out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<Order> {
        (index < self.orders.len()).then(|| self.orders.remove(index))
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore")
            .field("orders", &self.orders)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use serde_json::Map;

    use super::*;
    use crate::orders::{Dish, OrderStatus};

    /// Hands out `order_1`, `order_2`, ...
    #[derive(Default)]
    pub(crate) struct SequentialIds(AtomicUsize);

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            format!("order_{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    /// Replays a fixed list of ids.
    struct ScriptedIds(Mutex<Vec<&'static str>>);

    impl IdGenerator for ScriptedIds {
        fn next_id(&self) -> String {
            self.0.lock().unwrap().remove(0).to_string()
        }
    }

    pub(crate) fn order(id: &str, status: Option<OrderStatus>) -> Order {
        Order {
            id: id.to_string(),
            deliver_to: "Rick Sanchez (C-132)".to_string(),
            mobile_number: "(202) 456-1111".to_string(),
            status,
            dishes: vec![Dish::new(1, Map::new())],
        }
    }

    #[test]
    fn test_uuid_ids_are_hex() {
        let id = UuidIdGenerator.next_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, UuidIdGenerator.next_id());
    }

    #[test]
    fn test_next_id_skips_ids_in_use() {
        let ids = ScriptedIds(Mutex::new(vec!["a", "b", "c"]));
        let store = OrderStore::with_orders(
            vec![order("a", None), order("b", None)],
            Box::new(ids),
        );
        assert_eq!(store.next_id(), "c");
    }

    #[test]
    fn test_push_find_remove() {
        let mut store = OrderStore::new(Box::<SequentialIds>::default());
        assert!(store.is_empty());

        store.push(order("x", Some(OrderStatus::Pending)));
        store.push(order("y", None));
        assert_eq!(store.len(), 2);
        assert_eq!(store.position("y"), Some(1));
        assert!(store.find("z").is_none());

        store.find_mut("x").unwrap().deliver_to = "Elsewhere".into();
        assert_eq!(store.find("x").unwrap().deliver_to, "Elsewhere");

        let removed = store.remove(0).unwrap();
        assert_eq!(removed.id, "x");
        assert_eq!(store.orders()[0].id, "y");
        assert!(store.remove(5).is_none());
        assert_eq!(store.len(), 1);
    }
}
