//! Query functions, one repository per table.

pub mod human_repo;

pub use human_repo::HumanRepo;
