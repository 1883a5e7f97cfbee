pub mod thai;
pub mod validation;
