use std::collections::HashSet;

use chrono::NaiveDate;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use fixtura_core::{AGE_RANGE, Gender, HOUSE_NUMBER_RANGE};
use fixtura_generate::generators::semantic::is_valid_cpf;
use fixtura_generate::generators::{DateWindow, GeneratorContext, generate_registry};
use fixtura_generate::{
    FakeField, FakerSource, FieldSource, GenerationError, LocaleKey, SourceError, Stage,
};

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

#[test]
fn registry_has_requested_rows_and_unique_national_ids() {
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let outcome = generate_registry(2_000, &ctx, &mut rng).expect("registry");
    assert_eq!(outcome.records.len(), 2_000);

    let national_ids: HashSet<&str> = outcome
        .records
        .iter()
        .map(|record| record.national_id.as_str())
        .collect();
    assert_eq!(national_ids.len(), 2_000);
    assert!(outcome.records.iter().all(|r| is_valid_cpf(&r.national_id)));

    let ids: HashSet<&str> = outcome.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), 2_000);
}

#[test]
fn registry_fields_respect_windows_and_bounds() {
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let outcome = generate_registry(1_000, &ctx, &mut rng).expect("registry");
    let history = DateWindow::history(reference_date()).expect("history");
    let (min_age, max_age) = AGE_RANGE;
    let (min_number, max_number) = HOUSE_NUMBER_RANGE;

    for record in &outcome.records {
        let age = record.age_on(reference_date());
        assert!(
            (min_age..=max_age).contains(&age),
            "age {age} out of range for {}",
            record.birth_date
        );
        assert!(history.contains(record.registration_date));
        assert!((min_number..=max_number).contains(&record.number));
        assert_eq!(record.country, "Brasil");
        assert!(!record.name.trim().is_empty());
        assert!(!record.email.is_empty());
        assert!(!record.street.is_empty());
        assert!(!record.neighborhood.is_empty());
    }

    let males = outcome
        .records
        .iter()
        .filter(|record| record.gender == Gender::Male)
        .count();
    assert!((400..=600).contains(&males), "males = {males}");
}

#[test]
fn same_seed_produces_same_registry() {
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());

    let first = generate_registry(50, &ctx, &mut ChaCha8Rng::seed_from_u64(9)).expect("first");
    let second = generate_registry(50, &ctx, &mut ChaCha8Rng::seed_from_u64(9)).expect("second");
    assert_eq!(first.records, second.records);
}

#[test]
fn zero_count_yields_empty_registry() {
    let source = FakerSource::new(LocaleKey::EnUs);
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let outcome = generate_registry(0, &ctx, &mut rng).expect("registry");
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.national_id_retries, 0);
}

struct FailingSource {
    failing: FakeField,
}

impl FieldSource for FailingSource {
    fn locale(&self) -> LocaleKey {
        LocaleKey::PtBr
    }

    fn value(&self, field: FakeField, _rng: &mut dyn RngCore) -> Result<String, SourceError> {
        if field == self.failing {
            return Err(SourceError::new(field.id(), "source unavailable"));
        }
        Ok("valor".to_string())
    }
}

#[test]
fn field_failure_aborts_registry_generation() {
    let source = FailingSource {
        failing: FakeField::Profession,
    };
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let err = generate_registry(5, &ctx, &mut rng).expect_err("must fail");
    match err {
        GenerationError::Generation { stage, row, source } => {
            assert_eq!(stage, Stage::Registry);
            assert_eq!(row, 0);
            assert_eq!(source.field, "job.title");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn oversized_registry_is_rejected_upfront() {
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let err = generate_registry(u64::MAX, &ctx, &mut rng).expect_err("must fail");
    assert!(matches!(err, GenerationError::InvalidConfig(_)));
}

#[test]
fn exhausted_national_id_retries_fail_in_registry_stage() {
    let source = FakerSource::new(LocaleKey::PtBr);
    let mut ctx = GeneratorContext::new(&source, reference_date());
    ctx.max_attempts_national_id = 0;
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let err = generate_registry(1, &ctx, &mut rng).expect_err("must fail");
    assert!(matches!(err, GenerationError::NationalIdsExhausted { .. }));
    assert_eq!(err.stage(), Some(Stage::Registry));
}
