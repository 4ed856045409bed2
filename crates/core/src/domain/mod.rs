pub mod car;
pub mod filter;
