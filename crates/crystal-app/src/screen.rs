// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::{ColumnSpec, Record, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Screen {
    Users,
    Categories,
    Orders,
}

impl Screen {
    pub const ALL: [Self; 3] = [Self::Users, Self::Categories, Self::Orders];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Categories => "categories",
            Self::Orders => "orders",
        }
    }

    /// REST collection path segment on the storefront backend.
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Categories => "categories",
            Self::Orders => "orders",
        }
    }

    /// Singular noun for status messages.
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Users => "user",
            Self::Categories => "category",
            Self::Orders => "order",
        }
    }

    pub fn columns(self) -> Vec<ColumnSpec> {
        match self {
            Self::Users => vec![
                ColumnSpec::text("Name", "name"),
                ColumnSpec::text("Email", "email"),
                ColumnSpec::text("Phone", "phone"),
                ColumnSpec::text("Role", "role"),
                ColumnSpec::date("Joined", "createdAt"),
            ],
            Self::Categories => vec![
                ColumnSpec::text("Name", "name"),
                ColumnSpec::text("Description", "description"),
                ColumnSpec::number("Products", "productCount"),
                ColumnSpec::date("Created", "createdAt"),
            ],
            Self::Orders => vec![
                ColumnSpec::text("Order", "orderNumber"),
                ColumnSpec::computed("Customer", order_customer).searchable(true),
                ColumnSpec::number("Total", "totalAmount"),
                ColumnSpec::text("Status", "status"),
                ColumnSpec::date("Placed", "createdAt"),
            ],
        }
    }

    pub fn rotate(self, delta: isize) -> Self {
        let current = Self::ALL
            .iter()
            .position(|screen| *screen == self)
            .unwrap_or(0) as isize;
        let len = Self::ALL.len() as isize;
        Self::ALL[(current + delta).rem_euclid(len) as usize]
    }
}

/// Orders carry either a denormalized `customerName` or only the buyer's
/// email.
fn order_customer(record: &Record) -> SortKey {
    let name = ["customerName", "customerEmail"]
        .iter()
        .filter_map(|field| record.get(field))
        .map(|value| value.display())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_default();
    SortKey::text(&name)
}

#[cfg(test)]
mod tests {
    use super::Screen;
    use crate::{Record, SortKey};

    #[test]
    fn rotation_wraps_both_ways() {
        assert_eq!(Screen::Orders.rotate(1), Screen::Users);
        assert_eq!(Screen::Users.rotate(-1), Screen::Orders);
        assert_eq!(Screen::Users.rotate(1), Screen::Categories);
    }

    #[test]
    fn every_screen_has_columns() {
        for screen in Screen::ALL {
            assert!(!screen.columns().is_empty(), "{}", screen.label());
        }
    }

    #[test]
    fn order_customer_falls_back_to_email() {
        let columns = Screen::Orders.columns();
        let customer = &columns[1];
        let named = Record::new("o1")
            .with_field("customerName", "Mara Quinn")
            .with_field("customerEmail", "mara@example.com");
        let anonymous = Record::new("o2")
            .with_field("customerName", "")
            .with_field("customerEmail", "Buyer@Example.com");
        assert_eq!(customer.key(&named), SortKey::text("Mara Quinn"));
        assert_eq!(customer.key(&anonymous), SortKey::text("Buyer@Example.com"));
        assert_eq!(customer.cell_text(&anonymous), "Buyer@Example.com");
    }
}
