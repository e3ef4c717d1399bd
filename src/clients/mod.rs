pub mod delay;
pub mod stock;
pub mod webhook;
