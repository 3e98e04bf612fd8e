use rand::{Rng, RngCore};
use tracing::debug;

use fixtura_core::{
    DISCOUNT_VALUE_RANGE, ORDER_VALUE_RANGE, ORDERS_DATASET, OrderRecord, OrderStatus, PaymentMethod,
    RegistryRecord, SHIPPING_VALUE_RANGE,
};

use crate::errors::{GenerationError, SourceError, Stage};
use crate::faker_rs::FakeField;
use crate::foreign::{CustomerIndex, ForeignContext};
use crate::generators::{
    DateWindow, GeneratorContext, currency_between, pick_weighted, random_uuid, reserve_rows,
};

/// Generate exactly `count` orders referencing customers of `registry`.
pub fn generate_orders(
    registry: &[RegistryRecord],
    count: u64,
    ctx: &GeneratorContext<'_>,
    rng: &mut dyn RngCore,
) -> Result<Vec<OrderRecord>, GenerationError> {
    let customers = CustomerIndex::from_registry(registry);
    generate_orders_with(&customers, count, ctx, rng)
}

/// Generate orders against an arbitrary [`ForeignContext`].
pub fn generate_orders_with(
    customers: &dyn ForeignContext,
    count: u64,
    ctx: &GeneratorContext<'_>,
    rng: &mut dyn RngCore,
) -> Result<Vec<OrderRecord>, GenerationError> {
    if count > 0 && customers.customer_count() == 0 {
        return Err(GenerationError::EmptyRegistry { requested: count });
    }
    let history = DateWindow::history(ctx.reference_date)?;

    let mut orders = Vec::new();
    reserve_rows(&mut orders, count, ORDERS_DATASET)?;
    for row in 0..count {
        orders.push(generate_order(customers, ctx, row, &history, rng)?);
    }

    debug!(
        rows = orders.len(),
        customers = customers.customer_count(),
        "order batch complete"
    );
    Ok(orders)
}

fn generate_order(
    customers: &dyn ForeignContext,
    ctx: &GeneratorContext<'_>,
    row: u64,
    history: &DateWindow,
    rng: &mut dyn RngCore,
) -> Result<OrderRecord, GenerationError> {
    let order_id = random_uuid(rng);
    let national_id = customers
        .pick_customer(rng)
        .ok_or(GenerationError::EmptyRegistry { requested: 1 })?
        .to_string();

    let order_value = currency_between(ORDER_VALUE_RANGE, rng);
    let shipping_value = currency_between(SHIPPING_VALUE_RANGE, rng);
    let discount_value = if rng.random_bool(0.5) {
        0.0
    } else {
        currency_between(DISCOUNT_VALUE_RANGE, rng)
    };
    let coupon = if discount_value > 0.0 {
        Some(
            ctx.source
                .value(FakeField::Word, rng)
                .map_err(|source| in_orders(row, source))?,
        )
    } else {
        None
    };
    let payment_method =
        pick_weighted::<PaymentMethod>(rng).map_err(|source| in_orders(row, source))?;

    let delivery = customers
        .delivery_for(&national_id)
        .ok_or_else(|| GenerationError::Referential {
            national_id: national_id.clone(),
        })?
        .clone();

    let order_status =
        pick_weighted::<OrderStatus>(rng).map_err(|source| in_orders(row, source))?;
    let order_date = history.sample(rng);

    Ok(OrderRecord {
        order_id,
        customer_national_id: national_id,
        order_value,
        shipping_value,
        discount_value,
        coupon,
        payment_method,
        delivery_address: delivery.address,
        delivery_city: delivery.city,
        delivery_state: delivery.state,
        delivery_country: delivery.country,
        order_status,
        order_date,
    })
}

fn in_orders(row: u64, source: SourceError) -> GenerationError {
    GenerationError::Generation {
        stage: Stage::Orders,
        row,
        source,
    }
}
