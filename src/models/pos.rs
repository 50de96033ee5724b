//! Remaining POS provider records.
//!
//! Money amounts are kept as decimal strings (e.g. `"12.50"`) so values
//! survive the JSON round trip without floating point rounding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A guest check (an open or closed bill).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub id: String,
    pub business_id: String,
    pub employee_id: String,
    pub name: String,
    pub closed: bool,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A menu item rung up on a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub id: String,
    pub business_id: String,
    pub employee_id: String,
    pub check_id: String,
    pub item_id: String,
    pub name: String,
    pub cost: String,
    pub price: String,
    pub voided: bool,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub cost: String,
    pub price: String,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub business_id: String,
    pub first_name: String,
    pub last_name: String,
    pub pay_rate: String,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A clock-in/clock-out shift worked by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborEntry {
    pub id: String,
    pub business_id: String,
    pub employee_id: String,
    pub name: String,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub pay_rate: String,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Request body of the upstream `/menuItems` route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemsRequest {
    #[serde(default)]
    pub business_id: String,
}

/// Number of menu items a business has.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemsResponse {
    pub v: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_keeps_decimal_precision() {
        let json = r#"{
            "id": "m1",
            "business_id": "b1",
            "name": "Flat White",
            "cost": "0.85",
            "price": "3.10",
            "updated_at": "2024-03-01T10:00:00Z",
            "created_at": "2024-03-01T10:00:00Z"
        }"#;
        let item: MenuItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.price, "3.10");
        assert_eq!(serde_json::to_value(&item).unwrap()["cost"], "0.85");
    }

    #[test]
    fn test_open_check_has_no_close_time() {
        let json = r#"{
            "id": "c1",
            "business_id": "b1",
            "employee_id": "e1",
            "name": "Table 4",
            "closed": false,
            "closed_at": null,
            "updated_at": "2024-03-01T10:00:00Z",
            "created_at": "2024-03-01T09:00:00Z"
        }"#;
        let check: Check = serde_json::from_str(json).unwrap();
        assert!(!check.closed);
        assert!(check.closed_at.is_none());
    }
}
