use rand::{Rng, RngCore};
use tracing::debug;

use fixtura_core::{Gender, HOUSE_NUMBER_RANGE, REGISTRY_DATASET, RegistryRecord};

use crate::errors::{GenerationError, Stage};
use crate::faker_rs::FakeField;
use crate::generators::{
    DateWindow, GeneratorContext, NationalIdGenerator, random_uuid, reserve_rows,
};

/// Registry records plus bookkeeping from the uniqueness loop.
#[derive(Debug, Clone)]
pub struct RegistryOutcome {
    pub records: Vec<RegistryRecord>,
    pub national_id_retries: u64,
}

/// Generate exactly `count` registry records with pairwise-distinct national
/// ids. Any field failure aborts the whole batch.
pub fn generate_registry(
    count: u64,
    ctx: &GeneratorContext<'_>,
    rng: &mut dyn RngCore,
) -> Result<RegistryOutcome, GenerationError> {
    let birth_dates = DateWindow::birth_dates(ctx.reference_date)?;
    let history = DateWindow::history(ctx.reference_date)?;
    let mut national_ids =
        NationalIdGenerator::with_capacity(ctx.max_attempts_national_id, count)?;

    let mut records = Vec::new();
    reserve_rows(&mut records, count, REGISTRY_DATASET)?;
    for row in 0..count {
        let record = generate_person(
            ctx,
            row,
            &birth_dates,
            &history,
            &mut national_ids,
            rng,
        )?;
        records.push(record);
    }

    debug!(
        rows = records.len(),
        retries = national_ids.retries(),
        "registry batch complete"
    );

    Ok(RegistryOutcome {
        records,
        national_id_retries: national_ids.retries(),
    })
}

fn generate_person(
    ctx: &GeneratorContext<'_>,
    row: u64,
    birth_dates: &DateWindow,
    history: &DateWindow,
    national_ids: &mut NationalIdGenerator,
    rng: &mut dyn RngCore,
) -> Result<RegistryRecord, GenerationError> {
    let id = random_uuid(rng);
    let gender = if rng.random_bool(0.5) {
        Gender::Male
    } else {
        Gender::Female
    };
    let first_name = field(ctx, FakeField::FirstName(gender), row, rng)?;
    let last_name = field(ctx, FakeField::LastName, row, rng)?;
    let national_id = national_ids.next(rng)?;
    let birth_date = birth_dates.sample(rng);
    let email = field(ctx, FakeField::Email, row, rng)?;
    let phone = field(ctx, FakeField::Phone, row, rng)?;
    let street = field(ctx, FakeField::Street, row, rng)?;
    let (min_number, max_number) = HOUSE_NUMBER_RANGE;
    let number = rng.random_range(min_number..=max_number);
    let neighborhood = field(ctx, FakeField::Neighborhood, row, rng)?;
    let city = field(ctx, FakeField::City, row, rng)?;
    let state = field(ctx, FakeField::State, row, rng)?;
    let postal_code = field(ctx, FakeField::PostalCode, row, rng)?;
    let profession = field(ctx, FakeField::Profession, row, rng)?;
    let registration_date = history.sample(rng);

    Ok(RegistryRecord {
        id,
        national_id,
        name: format!("{first_name} {last_name}"),
        birth_date,
        email,
        phone,
        street,
        number,
        neighborhood,
        city,
        state,
        country: ctx.source.locale().country_name().to_string(),
        postal_code,
        gender,
        profession,
        registration_date,
    })
}

fn field(
    ctx: &GeneratorContext<'_>,
    field: FakeField,
    row: u64,
    rng: &mut dyn RngCore,
) -> Result<String, GenerationError> {
    ctx.source
        .value(field, rng)
        .map_err(|source| GenerationError::Generation {
            stage: Stage::Registry,
            row,
            source,
        })
}
