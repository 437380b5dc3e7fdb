pub mod month;

pub use month::{parse_month, validate_date};
