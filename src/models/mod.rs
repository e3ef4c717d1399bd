pub mod dispatch;
pub mod embed;
pub mod rate_limit;
pub mod retry;
pub mod status;
pub mod stock;
pub mod upstream;
