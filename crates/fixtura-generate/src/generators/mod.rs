use chrono::{Days, Months, NaiveDate};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use fixtura_core::{AGE_RANGE, HISTORY_MONTHS, WeightedValue, round_currency};

use crate::errors::{GenerationError, SourceError};
use crate::faker_rs::FieldSource;

pub mod domain;
pub mod semantic;

pub use domain::orders::{generate_orders, generate_orders_with};
pub use domain::registry::{RegistryOutcome, generate_registry};
pub use semantic::NationalIdGenerator;

/// Shared inputs of the record generators. The RNG is passed alongside.
#[derive(Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub source: &'a dyn FieldSource,
    /// "Generation time"; every date window is anchored here.
    pub reference_date: NaiveDate,
    pub max_attempts_national_id: u32,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(source: &'a dyn FieldSource, reference_date: NaiveDate) -> Self {
        Self {
            source,
            reference_date,
            max_attempts_national_id: 1_000,
        }
    }
}

/// Inclusive date range sampled uniformly by day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Trailing window of registration and order dates.
    pub fn history(reference: NaiveDate) -> Result<Self, GenerationError> {
        let start = reference
            .checked_sub_months(Months::new(HISTORY_MONTHS))
            .ok_or_else(|| out_of_range(reference))?;
        Ok(Self {
            start,
            end: reference,
        })
    }

    /// Birth dates of people aged within `AGE_RANGE` on `reference`.
    pub fn birth_dates(reference: NaiveDate) -> Result<Self, GenerationError> {
        let (min_age, max_age) = AGE_RANGE;
        let end = reference
            .checked_sub_months(Months::new(min_age * 12))
            .ok_or_else(|| out_of_range(reference))?;
        let start = reference
            .checked_sub_months(Months::new((max_age + 1) * 12))
            .and_then(|date| date.checked_add_days(Days::new(1)))
            .ok_or_else(|| out_of_range(reference))?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> NaiveDate {
        let span = (self.end - self.start).num_days().max(0);
        let offset = rng.random_range(0..=span) as u64;
        self.start
            .checked_add_days(Days::new(offset))
            .unwrap_or(self.end)
    }
}

/// Reserve room for `count` rows up front. An impossible allocation is a
/// configuration error instead of an abort.
pub(crate) fn reserve_rows<T>(
    rows: &mut Vec<T>,
    count: u64,
    dataset: &str,
) -> Result<(), GenerationError> {
    let wanted = usize::try_from(count).map_err(|_| too_many_rows(count, dataset))?;
    rows.try_reserve_exact(wanted)
        .map_err(|_| too_many_rows(count, dataset))
}

pub(crate) fn too_many_rows(count: u64, dataset: &str) -> GenerationError {
    GenerationError::InvalidConfig(format!(
        "cannot allocate {count} {dataset} row(s)"
    ))
}

fn out_of_range(reference: NaiveDate) -> GenerationError {
    GenerationError::InvalidConfig(format!("reference date {reference} is out of range"))
}

pub fn random_uuid(rng: &mut dyn RngCore) -> String {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

/// Uniform value in the inclusive range, rounded to cents.
pub fn currency_between(range: (f64, f64), rng: &mut dyn RngCore) -> f64 {
    let (min, max) = range;
    round_currency(rng.random_range(min..=max))
}

/// Draw from a categorical weight table.
pub fn pick_weighted<T: WeightedValue>(rng: &mut dyn RngCore) -> Result<T, SourceError> {
    T::ALL
        .choose_weighted(rng, |value| value.weight())
        .copied()
        .map_err(|err| SourceError::new(T::FIELD, err.to_string()))
}
