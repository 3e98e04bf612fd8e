pub mod orders;
pub mod registry;
