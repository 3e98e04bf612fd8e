use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;

use fixtura_core::{OrderRecord, RegistryRecord};

const REGISTRY_HEADER: [&str; 16] = [
    "id",
    "national_id",
    "name",
    "birth_date",
    "email",
    "phone",
    "street",
    "number",
    "neighborhood",
    "city",
    "state",
    "country",
    "postal_code",
    "gender",
    "profession",
    "registration_date",
];

const ORDERS_HEADER: [&str; 13] = [
    "order_id",
    "customer_national_id",
    "order_value",
    "shipping_value",
    "discount_value",
    "coupon",
    "payment_method",
    "delivery_address",
    "delivery_city",
    "delivery_state",
    "delivery_country",
    "order_status",
    "order_date",
];

/// Write registry records as CSV in persisted column order.
pub fn write_registry_csv(path: &Path, rows: &[RegistryRecord]) -> Result<u64, csv::Error> {
    write_rows(path, &REGISTRY_HEADER, rows, |row| {
        vec![
            row.id.clone(),
            row.national_id.clone(),
            row.name.clone(),
            format_date(row.birth_date),
            row.email.clone(),
            row.phone.clone(),
            row.street.clone(),
            row.number.to_string(),
            row.neighborhood.clone(),
            row.city.clone(),
            row.state.clone(),
            row.country.clone(),
            row.postal_code.clone(),
            row.gender.as_str().to_string(),
            row.profession.clone(),
            format_date(row.registration_date),
        ]
    })
}

/// Write order records as CSV. A missing coupon is an empty field.
pub fn write_orders_csv(path: &Path, rows: &[OrderRecord]) -> Result<u64, csv::Error> {
    write_rows(path, &ORDERS_HEADER, rows, |row| {
        vec![
            row.order_id.clone(),
            row.customer_national_id.clone(),
            format_money(row.order_value),
            format_money(row.shipping_value),
            format_money(row.discount_value),
            row.coupon.clone().unwrap_or_default(),
            row.payment_method.as_str().to_string(),
            row.delivery_address.clone(),
            row.delivery_city.clone(),
            row.delivery_state.clone(),
            row.delivery_country.clone(),
            row.order_status.as_str().to_string(),
            format_date(row.order_date),
        ]
    })
}

fn write_rows<T>(
    path: &Path,
    header: &[&str],
    rows: &[T],
    to_record: impl Fn(&T) -> Vec<String>,
) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&to_record(row))?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_money(value: f64) -> String {
    format!("{value:.2}")
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
