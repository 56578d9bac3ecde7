pub mod common;
pub mod grades;
pub mod resolutions;
pub mod staff;

pub use common::pagination::PaginationInfo;
