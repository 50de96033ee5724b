//! In-memory store backed by `DashMap`.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::models::{Business, MenuItem};
use crate::store::BusinessRepository;

/// Concurrent in-memory business and menu storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    businesses: DashMap<String, Business>,
    menu_items: DashMap<String, Vec<MenuItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with a handful of demo businesses and menus.
    pub fn seeded() -> Self {
        let store = Self::new();
        let now = Utc::now();
        let demo = [
            ("f21c2579-b95e-4a5b-aead-a3cf9d60d43b", "Corner Cafe", vec![7, 15]),
            ("a4e1b6d3-7a41-4c7e-9a1c-0fcb9b3f8c11", "Harbour Grill", vec![11, 23]),
            ("5b8e2f30-2d0f-4f6b-8d5e-93d1f1c0a7e2", "Night Owl Diner", vec![18, 24, 0, 4]),
        ];

        for (i, (id, name, hours)) in demo.into_iter().enumerate() {
            let created_at = now - Duration::days(30 * (i as i64 + 1));
            store.insert(Business {
                id: id.to_string(),
                name: name.to_string(),
                hours,
                updated_at: now,
                created_at,
            });
            store.insert_menu_item(demo_menu_item(id, "House Coffee", "0.45", "2.50", now));
            store.insert_menu_item(demo_menu_item(id, "Daily Special", "3.10", "11.00", now));
        }

        store
    }

    pub fn insert(&self, business: Business) {
        self.businesses.insert(business.id.clone(), business);
    }

    pub fn insert_menu_item(&self, item: MenuItem) {
        self.menu_items.entry(item.business_id.clone()).or_default().push(item);
    }

    pub fn menu_items(&self, business_id: &str) -> Vec<MenuItem> {
        self.menu_items
            .get(business_id)
            .map(|items| items.value().clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.businesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }
}

fn demo_menu_item(business_id: &str, name: &str, cost: &str, price: &str, now: DateTime<Utc>) -> MenuItem {
    MenuItem {
        id: uuid::Uuid::new_v4().to_string(),
        business_id: business_id.to_string(),
        name: name.to_string(),
        cost: cost.to_string(),
        price: price.to_string(),
        updated_at: now,
        created_at: now,
    }
}

impl BusinessRepository for MemoryStore {
    fn get_by_id(&self, id: &str) -> Option<Business> {
        self.businesses.get(id).map(|entry| entry.value().clone())
    }

    fn list(&self, limit: usize, offset: usize) -> Vec<Business> {
        let mut all: Vec<Business> = self.businesses.iter().map(|entry| entry.value().clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all.into_iter().skip(offset).take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn business(id: &str) -> Business {
        let now = Utc::now();
        Business {
            id: id.to_string(),
            name: format!("Business {}", id),
            hours: Vec::new(),
            updated_at: now,
            created_at: now,
        }
    }

    #[test]
    fn test_get_by_id() {
        let store = MemoryStore::new();
        store.insert(business("b1"));

        assert_eq!(store.get_by_id("b1").unwrap().name, "Business b1");
        assert!(store.get_by_id("b2").is_none());
    }

    #[test]
    fn test_list_pages_in_id_order() {
        let store = MemoryStore::new();
        for id in ["c", "a", "d", "b"] {
            store.insert(business(id));
        }

        let ids = |v: Vec<Business>| v.into_iter().map(|b| b.id).collect::<Vec<_>>();
        assert_eq!(ids(store.list(2, 0)), vec!["a", "b"]);
        assert_eq!(ids(store.list(2, 2)), vec!["c", "d"]);
        assert!(store.list(10, 4).is_empty());
    }

    #[test]
    fn test_seeded_store_has_menus() {
        let store = MemoryStore::seeded();
        assert_eq!(store.len(), 3);
        let first = store.list(1, 0).remove(0);
        assert_eq!(store.menu_items(&first.id).len(), 2);
        assert!(store.menu_items("unknown").is_empty());
    }
}
