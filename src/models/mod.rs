pub mod report;
pub mod user;

pub use report::{EstimateQuery, NewReport, Report};
pub use user::{User, UserRole};
