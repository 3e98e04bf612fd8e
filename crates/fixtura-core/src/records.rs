use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{Gender, OrderStatus, PaymentMethod};

/// Synthetic person entry. Field order matches the persisted column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub id: String,
    /// CPF, unique within a registry set; join key for orders.
    pub national_id: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub number: i32,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub gender: Gender,
    pub profession: String,
    pub registration_date: NaiveDate,
}

impl RegistryRecord {
    /// Single-line address in the `street, number - neighborhood` form.
    pub fn composed_address(&self) -> String {
        compose_address(&self.street, self.number, &self.neighborhood)
    }

    /// Completed years of age on `date`.
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        let mut years = date.year() - self.birth_date.year();
        if (date.month(), date.day()) < (self.birth_date.month(), self.birth_date.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }

    /// Snapshot of the address fields copied onto orders.
    pub fn delivery_address(&self) -> DeliveryAddress {
        DeliveryAddress {
            address: self.composed_address(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
        }
    }
}

/// Address fields denormalized from a registry record onto an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Synthetic sale referencing one registry record by national id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_national_id: String,
    pub order_value: f64,
    pub shipping_value: f64,
    pub discount_value: f64,
    /// Present if and only if `discount_value > 0`.
    pub coupon: Option<String>,
    pub payment_method: PaymentMethod,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_state: String,
    pub delivery_country: String,
    pub order_status: OrderStatus,
    pub order_date: NaiveDate,
}

pub fn compose_address(street: &str, number: i32, neighborhood: &str) -> String {
    format!("{street}, {number} - {neighborhood}")
}

/// Round to two decimal places.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
