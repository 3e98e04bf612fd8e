use std::collections::HashMap;

use chrono::NaiveDate;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use fixtura_core::{
    DeliveryAddress, DISCOUNT_VALUE_RANGE, ORDER_VALUE_RANGE, OrderStatus, PaymentMethod,
    RegistryRecord, SHIPPING_VALUE_RANGE, WeightedValue,
};
use fixtura_generate::foreign::ForeignContext;
use fixtura_generate::generators::{
    DateWindow, GeneratorContext, generate_orders, generate_orders_with, generate_registry,
};
use fixtura_generate::{
    FakeField, FakerSource, FieldSource, GenerationError, LocaleKey, SourceError, Stage,
};

/// 99.9th percentile of the chi-square distribution with 3 degrees of freedom.
const CHI_SQUARE_DF3_P999: f64 = 16.27;

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

fn registry(count: u64, seed: u64) -> Vec<RegistryRecord> {
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());
    generate_registry(count, &ctx, &mut ChaCha8Rng::seed_from_u64(seed))
        .expect("registry")
        .records
}

fn chi_square<T: WeightedValue + Eq + std::hash::Hash>(observed: &HashMap<T, u64>, total: u64) -> f64 {
    T::ALL
        .iter()
        .map(|value| {
            let expected = value.share() * total as f64;
            let seen = observed.get(value).copied().unwrap_or(0) as f64;
            (seen - expected).powi(2) / expected
        })
        .sum()
}

#[test]
fn small_run_denormalizes_delivery_fields() {
    let customers = registry(3, 11);
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(12);

    let orders = generate_orders(&customers, 10, &ctx, &mut rng).expect("orders");
    assert_eq!(orders.len(), 10);

    let by_id: HashMap<&str, &RegistryRecord> = customers
        .iter()
        .map(|record| (record.national_id.as_str(), record))
        .collect();
    for order in &orders {
        let customer = by_id
            .get(order.customer_national_id.as_str())
            .expect("order references a known customer");
        assert_eq!(order.delivery_city, customer.city);
        assert_eq!(order.delivery_state, customer.state);
        assert_eq!(order.delivery_country, customer.country);
        assert_eq!(order.delivery_address, customer.composed_address());
    }
}

#[test]
fn order_values_stay_in_range_and_coupon_follows_discount() {
    let customers = registry(200, 21);
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(22);

    let orders = generate_orders(&customers, 5_000, &ctx, &mut rng).expect("orders");
    let history = DateWindow::history(reference_date()).expect("history");
    let within = |range: (f64, f64), value: f64| range.0 <= value && value <= range.1;

    let mut discounted = 0_u64;
    for order in &orders {
        assert!(within(ORDER_VALUE_RANGE, order.order_value));
        assert!(within(SHIPPING_VALUE_RANGE, order.shipping_value));
        assert!(order.discount_value == 0.0 || within(DISCOUNT_VALUE_RANGE, order.discount_value));
        assert_eq!(order.coupon.is_some(), order.discount_value > 0.0);
        assert!(history.contains(order.order_date));
        assert_eq!(
            (order.order_value * 100.0).round() / 100.0,
            order.order_value
        );
        if order.discount_value > 0.0 {
            discounted += 1;
        }
    }
    assert!((2_200..=2_800).contains(&discounted), "discounted = {discounted}");
}

#[test]
fn categorical_frequencies_match_weights() {
    let customers = registry(100, 31);
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(32);

    let orders = generate_orders(&customers, 50_000, &ctx, &mut rng).expect("orders");

    let mut payments: HashMap<PaymentMethod, u64> = HashMap::new();
    let mut statuses: HashMap<OrderStatus, u64> = HashMap::new();
    for order in &orders {
        *payments.entry(order.payment_method).or_default() += 1;
        *statuses.entry(order.order_status).or_default() += 1;
    }

    let total = orders.len() as u64;
    let payment_stat = chi_square(&payments, total);
    let status_stat = chi_square(&statuses, total);
    assert!(payment_stat < CHI_SQUARE_DF3_P999, "payment chi2 = {payment_stat}");
    assert!(status_stat < CHI_SQUARE_DF3_P999, "status chi2 = {status_stat}");
}

#[test]
fn orders_require_a_non_empty_registry() {
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let err = generate_orders(&[], 5, &ctx, &mut rng).expect_err("must fail");
    assert!(matches!(err, GenerationError::EmptyRegistry { requested: 5 }));
    assert_eq!(err.stage(), Some(Stage::Orders));

    let orders = generate_orders(&[], 0, &ctx, &mut rng).expect("zero orders");
    assert!(orders.is_empty());
}

struct DanglingCustomers;

impl ForeignContext for DanglingCustomers {
    fn customer_count(&self) -> usize {
        1
    }

    fn pick_customer(&self, _rng: &mut dyn RngCore) -> Option<&str> {
        Some("000.000.001-91")
    }

    fn delivery_for(&self, _national_id: &str) -> Option<&DeliveryAddress> {
        None
    }
}

#[test]
fn unresolved_customer_is_a_referential_error() {
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    let err = generate_orders_with(&DanglingCustomers, 1, &ctx, &mut rng).expect_err("must fail");
    match err {
        GenerationError::Referential { national_id } => assert_eq!(national_id, "000.000.001-91"),
        other => panic!("unexpected error: {other}"),
    }
}

struct NoWords;

impl FieldSource for NoWords {
    fn locale(&self) -> LocaleKey {
        LocaleKey::PtBr
    }

    fn value(&self, field: FakeField, rng: &mut dyn RngCore) -> Result<String, SourceError> {
        if field == FakeField::Word {
            return Err(SourceError::new(field.id(), "no words left"));
        }
        FakerSource::new(LocaleKey::PtBr).value(field, rng)
    }
}

#[test]
fn coupon_source_failure_is_tagged_with_orders_stage() {
    let customers = registry(5, 41);
    let ctx = GeneratorContext::new(&NoWords, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let err = generate_orders(&customers, 100, &ctx, &mut rng).expect_err("must fail");
    match err {
        GenerationError::Generation { stage, source, .. } => {
            assert_eq!(stage, Stage::Orders);
            assert_eq!(source.field, "lorem.word");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn oversized_order_count_is_a_configuration_error() {
    let customers = registry(1, 51);
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(52);

    let err = generate_orders(&customers, u64::MAX, &ctx, &mut rng).expect_err("must fail");
    assert!(matches!(err, GenerationError::InvalidConfig(_)), "{err}");
}
