pub mod adapter;
pub mod locales;

pub use adapter::{FakeField, FakerSource, FieldSource};
pub use locales::LocaleKey;
