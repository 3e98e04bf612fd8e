//! Parquet writer and reader for the registry and order datasets
//!
//! Records are converted to a single Arrow RecordBatch per dataset, in the
//! persisted column order, and written with `ArrowWriter`. No row index
//! column is stored.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Date32Array, Float64Array, Int32Array, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::properties::WriterProperties;

use fixtura_core::{Gender, OrderRecord, OrderStatus, PaymentMethod, RegistryRecord};

use crate::errors::GenerationError;
use crate::model::Compression;

/// Days between 0001-01-01 and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

// =============================================================================
// Registry Schema
// =============================================================================

/// Create the Arrow schema for registry records
pub fn registry_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("national_id", DataType::Utf8, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("birth_date", DataType::Date32, false),
        Field::new("email", DataType::Utf8, false),
        Field::new("phone", DataType::Utf8, false),
        Field::new("street", DataType::Utf8, false),
        Field::new("number", DataType::Int32, false),
        Field::new("neighborhood", DataType::Utf8, false),
        Field::new("city", DataType::Utf8, false),
        Field::new("state", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("postal_code", DataType::Utf8, false),
        Field::new("gender", DataType::Utf8, false),
        Field::new("profession", DataType::Utf8, false),
        Field::new("registration_date", DataType::Date32, false),
    ]))
}

/// Convert registry records to an Arrow RecordBatch
pub fn registry_to_record_batch(
    rows: &[RegistryRecord],
    schema: Arc<Schema>,
) -> Result<RecordBatch, arrow::error::ArrowError> {
    let columns: Vec<ArrayRef> = vec![
        strings(rows, |r| r.id.as_str()),
        strings(rows, |r| r.national_id.as_str()),
        strings(rows, |r| r.name.as_str()),
        dates(rows, |r| r.birth_date),
        strings(rows, |r| r.email.as_str()),
        strings(rows, |r| r.phone.as_str()),
        strings(rows, |r| r.street.as_str()),
        Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.number))),
        strings(rows, |r| r.neighborhood.as_str()),
        strings(rows, |r| r.city.as_str()),
        strings(rows, |r| r.state.as_str()),
        strings(rows, |r| r.country.as_str()),
        strings(rows, |r| r.postal_code.as_str()),
        strings(rows, |r| r.gender.as_str()),
        strings(rows, |r| r.profession.as_str()),
        dates(rows, |r| r.registration_date),
    ];

    RecordBatch::try_new(schema, columns)
}

// =============================================================================
// Order Schema
// =============================================================================

/// Create the Arrow schema for order records
pub fn orders_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("order_id", DataType::Utf8, false),
        Field::new("customer_national_id", DataType::Utf8, false),
        Field::new("order_value", DataType::Float64, false),
        Field::new("shipping_value", DataType::Float64, false),
        Field::new("discount_value", DataType::Float64, false),
        Field::new("coupon", DataType::Utf8, true),
        Field::new("payment_method", DataType::Utf8, false),
        Field::new("delivery_address", DataType::Utf8, false),
        Field::new("delivery_city", DataType::Utf8, false),
        Field::new("delivery_state", DataType::Utf8, false),
        Field::new("delivery_country", DataType::Utf8, false),
        Field::new("order_status", DataType::Utf8, false),
        Field::new("order_date", DataType::Date32, false),
    ]))
}

/// Convert order records to an Arrow RecordBatch
pub fn orders_to_record_batch(
    rows: &[OrderRecord],
    schema: Arc<Schema>,
) -> Result<RecordBatch, arrow::error::ArrowError> {
    let coupons: StringArray = rows.iter().map(|r| r.coupon.as_deref()).collect();

    let columns: Vec<ArrayRef> = vec![
        strings(rows, |r| r.order_id.as_str()),
        strings(rows, |r| r.customer_national_id.as_str()),
        floats(rows, |r| r.order_value),
        floats(rows, |r| r.shipping_value),
        floats(rows, |r| r.discount_value),
        Arc::new(coupons),
        strings(rows, |r| r.payment_method.as_str()),
        strings(rows, |r| r.delivery_address.as_str()),
        strings(rows, |r| r.delivery_city.as_str()),
        strings(rows, |r| r.delivery_state.as_str()),
        strings(rows, |r| r.delivery_country.as_str()),
        strings(rows, |r| r.order_status.as_str()),
        dates(rows, |r| r.order_date),
    ];

    RecordBatch::try_new(schema, columns)
}

fn strings<T>(rows: &[T], value: impl Fn(&T) -> &str) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(rows.iter().map(value)))
}

fn floats<T>(rows: &[T], value: impl Fn(&T) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(rows.iter().map(value)))
}

fn dates<T>(rows: &[T], value: impl Fn(&T) -> NaiveDate) -> ArrayRef {
    Arc::new(Date32Array::from_iter_values(
        rows.iter().map(|row| date_to_days(value(row))),
    ))
}

fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

// =============================================================================
// Writer
// =============================================================================

/// Write registry records to a Parquet file
///
/// Creates or overwrites the file at the given path. An empty slice still
/// produces a valid zero-row file. Returns the file size in bytes.
pub fn write_registry_parquet(
    path: &Path,
    rows: &[RegistryRecord],
    compression: Compression,
) -> Result<u64, GenerationError> {
    let schema = registry_schema();
    let batch = registry_to_record_batch(rows, Arc::clone(&schema))?;
    write_batch(path, schema, &batch, compression)
}

/// Write order records to a Parquet file
pub fn write_orders_parquet(
    path: &Path,
    rows: &[OrderRecord],
    compression: Compression,
) -> Result<u64, GenerationError> {
    let schema = orders_schema();
    let batch = orders_to_record_batch(rows, Arc::clone(&schema))?;
    write_batch(path, schema, &batch, compression)
}

fn write_batch(
    path: &Path,
    schema: Arc<Schema>,
    batch: &RecordBatch,
    compression: Compression,
) -> Result<u64, GenerationError> {
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(compression.to_parquet())
        .build();

    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    if batch.num_rows() > 0 {
        writer.write(batch)?;
    }
    writer.close()?;

    Ok(std::fs::metadata(path)?.len())
}

// =============================================================================
// Reader
// =============================================================================

/// Read registry records back from a Parquet file written by this module.
pub fn read_registry_parquet(path: &Path) -> Result<Vec<RegistryRecord>, GenerationError> {
    let mut records = Vec::new();
    for batch in read_batches(path)? {
        let id = string_column(&batch, "id")?;
        let national_id = string_column(&batch, "national_id")?;
        let name = string_column(&batch, "name")?;
        let birth_date = date_column(&batch, "birth_date")?;
        let email = string_column(&batch, "email")?;
        let phone = string_column(&batch, "phone")?;
        let street = string_column(&batch, "street")?;
        let number = int_column(&batch, "number")?;
        let neighborhood = string_column(&batch, "neighborhood")?;
        let city = string_column(&batch, "city")?;
        let state = string_column(&batch, "state")?;
        let country = string_column(&batch, "country")?;
        let postal_code = string_column(&batch, "postal_code")?;
        let gender = string_column(&batch, "gender")?;
        let profession = string_column(&batch, "profession")?;
        let registration_date = date_column(&batch, "registration_date")?;

        for row in 0..batch.num_rows() {
            records.push(RegistryRecord {
                id: required_str(id, "id", row)?,
                national_id: required_str(national_id, "national_id", row)?,
                name: required_str(name, "name", row)?,
                birth_date: required_date(birth_date, "birth_date", row)?,
                email: required_str(email, "email", row)?,
                phone: required_str(phone, "phone", row)?,
                street: required_str(street, "street", row)?,
                number: required_int(number, "number", row)?,
                neighborhood: required_str(neighborhood, "neighborhood", row)?,
                city: required_str(city, "city", row)?,
                state: required_str(state, "state", row)?,
                country: required_str(country, "country", row)?,
                postal_code: required_str(postal_code, "postal_code", row)?,
                gender: Gender::parse(&required_str(gender, "gender", row)?)
                    .map_err(invalid_label)?,
                profession: required_str(profession, "profession", row)?,
                registration_date: required_date(registration_date, "registration_date", row)?,
            });
        }
    }
    Ok(records)
}

/// Read order records back from a Parquet file written by this module.
pub fn read_orders_parquet(path: &Path) -> Result<Vec<OrderRecord>, GenerationError> {
    let mut records = Vec::new();
    for batch in read_batches(path)? {
        let order_id = string_column(&batch, "order_id")?;
        let customer = string_column(&batch, "customer_national_id")?;
        let order_value = float_column(&batch, "order_value")?;
        let shipping_value = float_column(&batch, "shipping_value")?;
        let discount_value = float_column(&batch, "discount_value")?;
        let coupon = string_column(&batch, "coupon")?;
        let payment_method = string_column(&batch, "payment_method")?;
        let delivery_address = string_column(&batch, "delivery_address")?;
        let delivery_city = string_column(&batch, "delivery_city")?;
        let delivery_state = string_column(&batch, "delivery_state")?;
        let delivery_country = string_column(&batch, "delivery_country")?;
        let order_status = string_column(&batch, "order_status")?;
        let order_date = date_column(&batch, "order_date")?;

        for row in 0..batch.num_rows() {
            let coupon = if coupon.is_null(row) {
                None
            } else {
                Some(coupon.value(row).to_string())
            };
            records.push(OrderRecord {
                order_id: required_str(order_id, "order_id", row)?,
                customer_national_id: required_str(customer, "customer_national_id", row)?,
                order_value: required_float(order_value, "order_value", row)?,
                shipping_value: required_float(shipping_value, "shipping_value", row)?,
                discount_value: required_float(discount_value, "discount_value", row)?,
                coupon,
                payment_method: PaymentMethod::parse(&required_str(
                    payment_method,
                    "payment_method",
                    row,
                )?)
                .map_err(invalid_label)?,
                delivery_address: required_str(delivery_address, "delivery_address", row)?,
                delivery_city: required_str(delivery_city, "delivery_city", row)?,
                delivery_state: required_str(delivery_state, "delivery_state", row)?,
                delivery_country: required_str(delivery_country, "delivery_country", row)?,
                order_status: OrderStatus::parse(&required_str(
                    order_status,
                    "order_status",
                    row,
                )?)
                .map_err(invalid_label)?,
                order_date: required_date(order_date, "order_date", row)?,
            });
        }
    }
    Ok(records)
}

fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, GenerationError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(batches)
}

fn column<'a, A: Array + 'static>(
    batch: &'a RecordBatch,
    name: &str,
    expected: &str,
) -> Result<&'a A, GenerationError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| GenerationError::InvalidDataset(format!("missing column '{name}'")))?
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| {
            GenerationError::InvalidDataset(format!("column '{name}' is not {expected}"))
        })
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, GenerationError> {
    column(batch, name, "utf8")
}

fn date_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Date32Array, GenerationError> {
    column(batch, name, "date32")
}

fn int_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int32Array, GenerationError> {
    column(batch, name, "int32")
}

fn float_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a Float64Array, GenerationError> {
    column(batch, name, "float64")
}

fn invalid_label(err: fixtura_core::Error) -> GenerationError {
    GenerationError::InvalidDataset(err.to_string())
}

fn null_error(name: &str, row: usize) -> GenerationError {
    GenerationError::InvalidDataset(format!("unexpected null in '{name}' at row {row}"))
}

fn required_str(array: &StringArray, name: &str, row: usize) -> Result<String, GenerationError> {
    if array.is_null(row) {
        return Err(null_error(name, row));
    }
    Ok(array.value(row).to_string())
}

fn required_int(array: &Int32Array, name: &str, row: usize) -> Result<i32, GenerationError> {
    if array.is_null(row) {
        return Err(null_error(name, row));
    }
    Ok(array.value(row))
}

fn required_float(array: &Float64Array, name: &str, row: usize) -> Result<f64, GenerationError> {
    if array.is_null(row) {
        return Err(null_error(name, row));
    }
    Ok(array.value(row))
}

fn required_date(array: &Date32Array, name: &str, row: usize) -> Result<NaiveDate, GenerationError> {
    if array.is_null(row) {
        return Err(null_error(name, row));
    }
    let days = array.value(row);
    days_to_date(days).ok_or_else(|| {
        GenerationError::InvalidDataset(format!("date out of range in '{name}' at row {row}"))
    })
}
