use std::collections::HashMap;

use rand::{Rng, RngCore};

use fixtura_core::{DeliveryAddress, RegistryRecord};

/// Parent-side view the order generator joins against.
pub trait ForeignContext {
    fn customer_count(&self) -> usize;

    /// Uniform pick, with replacement. `None` when there are no customers.
    fn pick_customer(&self, rng: &mut dyn RngCore) -> Option<&str>;

    fn delivery_for(&self, national_id: &str) -> Option<&DeliveryAddress>;
}

/// National id → delivery address snapshot, built once from a registry set.
#[derive(Debug, Default)]
pub struct CustomerIndex {
    national_ids: Vec<String>,
    deliveries: HashMap<String, DeliveryAddress>,
}

impl CustomerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registry(records: &[RegistryRecord]) -> Self {
        let mut index = Self::new();
        index.ingest_registry(records);
        index
    }

    /// Snapshot the address fields of `records`. A repeated national id keeps
    /// its first snapshot.
    pub fn ingest_registry(&mut self, records: &[RegistryRecord]) {
        self.national_ids.reserve(records.len());
        self.deliveries.reserve(records.len());
        for record in records {
            if self.deliveries.contains_key(&record.national_id) {
                continue;
            }
            self.national_ids.push(record.national_id.clone());
            self.deliveries
                .insert(record.national_id.clone(), record.delivery_address());
        }
    }
}

impl ForeignContext for CustomerIndex {
    fn customer_count(&self) -> usize {
        self.national_ids.len()
    }

    fn pick_customer(&self, rng: &mut dyn RngCore) -> Option<&str> {
        if self.national_ids.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.national_ids.len());
        self.national_ids.get(idx).map(String::as_str)
    }

    fn delivery_for(&self, national_id: &str) -> Option<&DeliveryAddress> {
        self.deliveries.get(national_id)
    }
}
