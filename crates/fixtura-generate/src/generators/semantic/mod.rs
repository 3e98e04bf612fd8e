use std::collections::HashSet;

use rand::{Rng, RngCore};
use tracing::debug;

use crate::errors::GenerationError;
use crate::generators::too_many_rows;

/// Distinct nine-digit CPF bases.
pub const NATIONAL_ID_SPACE: u64 = 1_000_000_000;

/// Largest registry that may be requested from one [`NationalIdGenerator`].
/// Past half the domain the rejection loop degrades quickly.
pub const MAX_NATIONAL_IDS: u64 = NATIONAL_ID_SPACE / 2;

/// Issues CPFs that are unique within one run.
#[derive(Debug)]
pub struct NationalIdGenerator {
    issued: HashSet<String>,
    max_attempts: u32,
    retries: u64,
}

impl NationalIdGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            issued: HashSet::new(),
            max_attempts: max_attempts.max(1),
            retries: 0,
        }
    }

    /// Pre-sizes the issued set and rejects counts the domain cannot serve.
    pub fn with_capacity(max_attempts: u32, count: u64) -> Result<Self, GenerationError> {
        if count > MAX_NATIONAL_IDS {
            return Err(GenerationError::InvalidConfig(format!(
                "{count} national ids requested; at most {MAX_NATIONAL_IDS} can be issued uniquely"
            )));
        }
        let mut generator = Self::new(max_attempts);
        let wanted = usize::try_from(count).map_err(|_| too_many_rows(count, "national id"))?;
        generator
            .issued
            .try_reserve(wanted)
            .map_err(|_| too_many_rows(count, "national id"))?;
        Ok(generator)
    }

    pub fn next(&mut self, rng: &mut dyn RngCore) -> Result<String, GenerationError> {
        for _ in 0..self.max_attempts {
            let candidate = random_cpf(rng);
            if self.issued.insert(candidate.clone()) {
                return Ok(candidate);
            }
            self.retries += 1;
            debug!(national_id = %candidate, "national id collision, redrawing");
        }
        Err(GenerationError::NationalIdsExhausted {
            attempts: self.max_attempts,
            issued: self.issued.len(),
        })
    }

    /// Draws rejected because the value was already issued.
    pub fn retries(&self) -> u64 {
        self.retries
    }

    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

/// Random CPF with valid check digits, formatted `000.000.000-00`.
pub fn random_cpf(rng: &mut dyn RngCore) -> String {
    let mut digits = [0_u8; 11];
    loop {
        for digit in digits.iter_mut().take(9) {
            *digit = rng.random_range(0..=9);
        }
        if digits[..9].iter().any(|digit| *digit != digits[0]) {
            break;
        }
    }
    digits[9] = cpf_check_digit(&digits[..9]);
    digits[10] = cpf_check_digit(&digits[..10]);
    format_cpf(&digits)
}

/// Check a formatted or bare CPF for length and check digits.
pub fn is_valid_cpf(value: &str) -> bool {
    let digits: Vec<u8> = value
        .chars()
        .filter(|ch| ch.is_ascii_digit())
        .map(|ch| ch as u8 - b'0')
        .collect();
    if digits.len() != 11 || digits.iter().all(|digit| *digit == digits[0]) {
        return false;
    }
    digits[9] == cpf_check_digit(&digits[..9]) && digits[10] == cpf_check_digit(&digits[..10])
}

fn format_cpf(digits: &[u8; 11]) -> String {
    let text: String = digits.iter().map(|d| char::from(b'0' + *d)).collect();
    format!(
        "{}.{}.{}-{}",
        &text[0..3],
        &text[3..6],
        &text[6..9],
        &text[9..11]
    )
}

fn cpf_check_digit(digits: &[u8]) -> u8 {
    let mut sum = 0_u32;
    let mut weight = digits.len() as u32 + 1;
    for digit in digits {
        sum += (*digit as u32) * weight;
        weight = weight.saturating_sub(1);
    }
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        (11 - remainder) as u8
    }
}
