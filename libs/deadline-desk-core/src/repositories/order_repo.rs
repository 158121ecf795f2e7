use crate::models::order::{ClientId, Order};
use std::collections::HashMap;

/// Storage for in-flight orders and the operator's pricing cursor.
///
/// Callers serialize access; implementations need no internal locking.
pub trait OrderStore: Send {
    fn get(&self, client: ClientId) -> Option<Order>;
    fn set(&mut self, order: Order);
    fn remove(&mut self, client: ClientId) -> Option<Order>;

    /// Client whose order the operator is currently expected to price.
    fn pricing_cursor(&self) -> Option<ClientId>;
    fn set_pricing_cursor(&mut self, client: Option<ClientId>);
}

/// Volatile store; everything is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: HashMap<ClientId, Order>,
    cursor: Option<ClientId>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl OrderStore for MemoryOrderStore {
    fn get(&self, client: ClientId) -> Option<Order> {
        self.orders.get(&client).cloned()
    }

    fn set(&mut self, order: Order) {
        self.orders.insert(order.client, order);
    }

    fn remove(&mut self, client: ClientId) -> Option<Order> {
        self.orders.remove(&client)
    }

    fn pricing_cursor(&self) -> Option<ClientId> {
        self.cursor
    }

    fn set_pricing_cursor(&mut self, client: Option<ClientId>) {
        self.cursor = client;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_previous_order_for_client() {
        let mut store = MemoryOrderStore::new();
        let first = Order::new(ClientId(1), None);
        let second = Order::new(ClientId(1), None);
        let second_ref = second.reference.clone();

        store.set(first);
        store.set(second);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(ClientId(1)).unwrap().reference, second_ref);
    }

    #[test]
    fn remove_makes_get_absent() {
        let mut store = MemoryOrderStore::new();
        store.set(Order::new(ClientId(5), None));
        assert!(store.remove(ClientId(5)).is_some());
        assert!(store.get(ClientId(5)).is_none());
        assert!(store.remove(ClientId(5)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn cursor_is_a_single_slot() {
        let mut store = MemoryOrderStore::new();
        assert_eq!(store.pricing_cursor(), None);
        store.set_pricing_cursor(Some(ClientId(1)));
        store.set_pricing_cursor(Some(ClientId(2)));
        assert_eq!(store.pricing_cursor(), Some(ClientId(2)));
        store.set_pricing_cursor(None);
        assert_eq!(store.pricing_cursor(), None);
    }
}
