//! Core contracts for Fixtura.
//!
//! This crate defines the registry and order record types, the categorical
//! value sets with their sampling weights, and the numeric bounds shared by
//! the generator and the evaluator.

pub mod error;
pub mod records;
pub mod types;

pub use error::{Error, Result};
pub use records::{
    DeliveryAddress, OrderRecord, RegistryRecord, compose_address, round_currency,
};
pub use types::{Gender, OrderStatus, PaymentMethod, WeightedValue};

/// Dataset (and directory) name of the registry record set.
pub const REGISTRY_DATASET: &str = "cadastros";
/// Dataset (and directory) name of the order record set.
pub const ORDERS_DATASET: &str = "pedidos";

/// Inclusive bounds of `OrderRecord::order_value`.
pub const ORDER_VALUE_RANGE: (f64, f64) = (30.0, 5000.0);
/// Inclusive bounds of `OrderRecord::shipping_value`.
pub const SHIPPING_VALUE_RANGE: (f64, f64) = (10.0, 150.0);
/// Inclusive bounds of a non-zero `OrderRecord::discount_value`.
pub const DISCOUNT_VALUE_RANGE: (f64, f64) = (10.0, 20.0);
/// Inclusive age bounds of a registry person at the reference date.
pub const AGE_RANGE: (u32, u32) = (18, 85);
/// Inclusive bounds of `RegistryRecord::number`.
pub const HOUSE_NUMBER_RANGE: (i32, i32) = (1, 9999);
/// Width of the trailing window for registration and order dates.
pub const HISTORY_MONTHS: u32 = 24;
