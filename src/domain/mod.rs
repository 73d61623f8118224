pub mod context;
pub mod error;
pub mod repository;
pub mod todo;
