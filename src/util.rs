pub mod basic;
pub mod date;
pub mod decimal;
pub mod json;
pub mod rw;
