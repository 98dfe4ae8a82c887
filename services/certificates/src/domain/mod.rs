pub mod number;
pub mod repository;
pub mod types;
