use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Categorical value with a fixed sampling weight.
pub trait WeightedValue: Copy + Sized + 'static {
    /// Field name used in errors and reports.
    const FIELD: &'static str;
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    fn weight(self) -> u32;

    /// Weight of this variant relative to the table total.
    fn share(self) -> f64 {
        let total: u32 = Self::ALL.iter().map(|value| value.weight()).sum();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.weight()) / f64::from(total)
    }
}

/// Gender of a registry person. Sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "M" => Ok(Self::Male),
            "F" => Ok(Self::Female),
            other => Err(Error::InvalidValue {
                field: "gender",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Cartão de crédito")]
    CreditCard,
    #[serde(rename = "Boleto")]
    Boleto,
    #[serde(rename = "Cartão de débito")]
    DebitCard,
    #[serde(rename = "Pix")]
    Pix,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "Cartão de crédito",
            Self::Boleto => "Boleto",
            Self::DebitCard => "Cartão de débito",
            Self::Pix => "Pix",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|method| method.as_str() == value)
            .ok_or_else(|| Error::InvalidValue {
                field: Self::FIELD,
                value: value.to_string(),
            })
    }
}

impl WeightedValue for PaymentMethod {
    const FIELD: &'static str = "payment_method";
    const ALL: &'static [Self] = &[
        PaymentMethod::CreditCard,
        PaymentMethod::Boleto,
        PaymentMethod::DebitCard,
        PaymentMethod::Pix,
    ];

    fn weight(self) -> u32 {
        match self {
            Self::CreditCard => 50,
            Self::Boleto => 20,
            Self::DebitCard => 10,
            Self::Pix => 20,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Entregue")]
    Delivered,
    #[serde(rename = "Aguardando envio")]
    AwaitingShipment,
    #[serde(rename = "Aguardando pagamento")]
    AwaitingPayment,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "Entregue",
            Self::AwaitingShipment => "Aguardando envio",
            Self::AwaitingPayment => "Aguardando pagamento",
            Self::Cancelled => "Cancelado",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| Error::InvalidValue {
                field: Self::FIELD,
                value: value.to_string(),
            })
    }
}

impl WeightedValue for OrderStatus {
    const FIELD: &'static str = "order_status";
    const ALL: &'static [Self] = &[
        OrderStatus::Delivered,
        OrderStatus::AwaitingShipment,
        OrderStatus::AwaitingPayment,
        OrderStatus::Cancelled,
    ];

    fn weight(self) -> u32 {
        match self {
            Self::Delivered => 80,
            Self::AwaitingShipment => 10,
            Self::AwaitingPayment => 7,
            Self::Cancelled => 3,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
