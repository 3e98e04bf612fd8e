use fake::Fake;
use rand::{Rng, RngCore};

use fixtura_core::Gender;

use crate::errors::SourceError;
use crate::faker_rs::locales::LocaleKey;

/// Free-text field a [`FieldSource`] can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakeField {
    FirstName(Gender),
    LastName,
    Email,
    Phone,
    Street,
    Neighborhood,
    City,
    State,
    PostalCode,
    Profession,
    Word,
}

impl FakeField {
    pub fn id(self) -> &'static str {
        match self {
            Self::FirstName(Gender::Female) => "name.first_name.female",
            Self::FirstName(Gender::Male) => "name.first_name.male",
            Self::LastName => "name.last_name",
            Self::Email => "internet.free_email",
            Self::Phone => "phone_number.phone_number",
            Self::Street => "address.street_name",
            Self::Neighborhood => "address.neighborhood",
            Self::City => "address.city_name",
            Self::State => "address.state_name",
            Self::PostalCode => "address.zip_code",
            Self::Profession => "job.title",
            Self::Word => "lorem.word",
        }
    }
}

/// Locale-aware source of free-text field values.
///
/// Generators receive the source explicitly so tests can swap the locale or
/// substitute a stub.
pub trait FieldSource {
    fn locale(&self) -> LocaleKey;

    fn value(&self, field: FakeField, rng: &mut dyn RngCore) -> Result<String, SourceError>;
}

/// [`FieldSource`] backed by the `fake` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakerSource {
    locale: LocaleKey,
}

impl FakerSource {
    pub fn new(locale: LocaleKey) -> Self {
        Self { locale }
    }
}

impl FieldSource for FakerSource {
    fn locale(&self) -> LocaleKey {
        self.locale
    }

    fn value(&self, field: FakeField, rng: &mut dyn RngCore) -> Result<String, SourceError> {
        let value: String = match (field, self.locale) {
            (FakeField::FirstName(gender), locale) => {
                pick(first_names(gender, locale), field, rng)?.to_string()
            }
            (FakeField::Neighborhood, LocaleKey::PtBr) => {
                pick(PT_BR_NEIGHBORHOODS, field, rng)?.to_string()
            }
            (FakeField::Neighborhood, LocaleKey::EnUs) => {
                pick(EN_US_NEIGHBORHOODS, field, rng)?.to_string()
            }
            (FakeField::LastName, LocaleKey::PtBr) => {
                fake::faker::name::pt_br::LastName().fake_with_rng(rng)
            }
            (FakeField::LastName, LocaleKey::EnUs) => {
                fake::faker::name::en::LastName().fake_with_rng(rng)
            }
            (FakeField::Email, LocaleKey::PtBr) => {
                fake::faker::internet::pt_br::FreeEmail().fake_with_rng(rng)
            }
            (FakeField::Email, LocaleKey::EnUs) => {
                fake::faker::internet::en::FreeEmail().fake_with_rng(rng)
            }
            (FakeField::Phone, LocaleKey::PtBr) => {
                fake::faker::phone_number::pt_br::PhoneNumber().fake_with_rng(rng)
            }
            (FakeField::Phone, LocaleKey::EnUs) => {
                fake::faker::phone_number::en::PhoneNumber().fake_with_rng(rng)
            }
            (FakeField::Street, LocaleKey::PtBr) => {
                fake::faker::address::pt_br::StreetName().fake_with_rng(rng)
            }
            (FakeField::Street, LocaleKey::EnUs) => {
                fake::faker::address::en::StreetName().fake_with_rng(rng)
            }
            (FakeField::City, LocaleKey::PtBr) => {
                fake::faker::address::pt_br::CityName().fake_with_rng(rng)
            }
            (FakeField::City, LocaleKey::EnUs) => {
                fake::faker::address::en::CityName().fake_with_rng(rng)
            }
            (FakeField::State, LocaleKey::PtBr) => {
                fake::faker::address::pt_br::StateName().fake_with_rng(rng)
            }
            (FakeField::State, LocaleKey::EnUs) => {
                fake::faker::address::en::StateName().fake_with_rng(rng)
            }
            (FakeField::PostalCode, LocaleKey::PtBr) => {
                fake::faker::address::pt_br::ZipCode().fake_with_rng(rng)
            }
            (FakeField::PostalCode, LocaleKey::EnUs) => {
                fake::faker::address::en::ZipCode().fake_with_rng(rng)
            }
            (FakeField::Profession, LocaleKey::PtBr) => {
                fake::faker::job::pt_br::Title().fake_with_rng(rng)
            }
            (FakeField::Profession, LocaleKey::EnUs) => {
                fake::faker::job::en::Title().fake_with_rng(rng)
            }
            (FakeField::Word, LocaleKey::PtBr) => {
                fake::faker::lorem::pt_br::Word().fake_with_rng(rng)
            }
            (FakeField::Word, LocaleKey::EnUs) => {
                fake::faker::lorem::en::Word().fake_with_rng(rng)
            }
        };

        if value.trim().is_empty() {
            return Err(SourceError::new(
                field.id(),
                format!("empty value for locale '{}'", self.locale),
            ));
        }
        Ok(value)
    }
}

fn first_names(gender: Gender, locale: LocaleKey) -> &'static [&'static str] {
    match (gender, locale) {
        (Gender::Female, LocaleKey::PtBr) => PT_BR_FEMALE_NAMES,
        (Gender::Male, LocaleKey::PtBr) => PT_BR_MALE_NAMES,
        (Gender::Female, LocaleKey::EnUs) => EN_US_FEMALE_NAMES,
        (Gender::Male, LocaleKey::EnUs) => EN_US_MALE_NAMES,
    }
}

fn pick(
    values: &'static [&'static str],
    field: FakeField,
    rng: &mut dyn RngCore,
) -> Result<&'static str, SourceError> {
    if values.is_empty() {
        return Err(SourceError::new(field.id(), "no values available"));
    }
    Ok(values[rng.random_range(0..values.len())])
}

const PT_BR_FEMALE_NAMES: &[&str] = &[
    "Ana", "Beatriz", "Camila", "Carolina", "Daniela", "Fernanda", "Gabriela", "Helena",
    "Isabela", "Juliana", "Larissa", "Letícia", "Luana", "Mariana", "Natália", "Patrícia",
    "Rafaela", "Sofia", "Valentina", "Vitória",
];

const PT_BR_MALE_NAMES: &[&str] = &[
    "André", "Bruno", "Carlos", "Daniel", "Eduardo", "Felipe", "Gabriel", "Gustavo", "Henrique",
    "João", "Leonardo", "Lucas", "Marcelo", "Matheus", "Paulo", "Pedro", "Rafael", "Rodrigo",
    "Thiago", "Vinícius",
];

const EN_US_FEMALE_NAMES: &[&str] = &[
    "Abigail", "Charlotte", "Emily", "Emma", "Grace", "Hannah", "Isabella", "Madison", "Olivia",
    "Sophia",
];

const EN_US_MALE_NAMES: &[&str] = &[
    "Benjamin", "Daniel", "Ethan", "Henry", "James", "Jacob", "Michael", "Noah", "Samuel",
    "William",
];

const PT_BR_NEIGHBORHOODS: &[&str] = &[
    "Aldeota",
    "Barra",
    "Batel",
    "Bela Vista",
    "Boa Viagem",
    "Boa Vista",
    "Centro",
    "Copacabana",
    "Jardim América",
    "Jardim Botânico",
    "Liberdade",
    "Moinhos de Vento",
    "Pinheiros",
    "Santa Cecília",
    "Savassi",
    "Vila Nova",
];

const EN_US_NEIGHBORHOODS: &[&str] = &[
    "Downtown",
    "Hillcrest",
    "Lakeview",
    "Midtown",
    "Oak Park",
    "Old Town",
    "Riverside",
    "Westside",
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn first_names_follow_gender() {
        let source = FakerSource::new(LocaleKey::PtBr);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let female = source
                .value(FakeField::FirstName(Gender::Female), &mut rng)
                .expect("female name");
            assert!(PT_BR_FEMALE_NAMES.contains(&female.as_str()));
            let male = source
                .value(FakeField::FirstName(Gender::Male), &mut rng)
                .expect("male name");
            assert!(PT_BR_MALE_NAMES.contains(&male.as_str()));
        }
    }

    #[test]
    fn every_field_yields_a_value_in_both_locales() {
        let fields = [
            FakeField::LastName,
            FakeField::Email,
            FakeField::Phone,
            FakeField::Street,
            FakeField::Neighborhood,
            FakeField::City,
            FakeField::State,
            FakeField::PostalCode,
            FakeField::Profession,
            FakeField::Word,
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for locale in [LocaleKey::PtBr, LocaleKey::EnUs] {
            let source = FakerSource::new(locale);
            for field in fields {
                let value = source.value(field, &mut rng).expect("field value");
                assert!(!value.is_empty(), "{} empty for {locale}", field.id());
            }
        }
    }
}
