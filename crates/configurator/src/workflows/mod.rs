pub mod builder;
pub mod careers;
pub mod leads;
pub mod quiz;
mod validation;

#[cfg(test)]
pub(crate) mod erp_stub;

pub use validation::FieldErrors;
