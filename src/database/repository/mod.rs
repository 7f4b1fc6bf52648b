//! Repository module - Mongo-backed store implementations.

mod call_repository;
mod report_repository;
mod user_repository;

pub use call_repository::CallRepository;
pub use report_repository::ReportRepository;
pub use user_repository::UserRepository;
