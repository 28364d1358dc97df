pub mod broker;
pub mod memory;
pub mod postgres;
pub mod store;
