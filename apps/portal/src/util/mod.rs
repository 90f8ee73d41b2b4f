pub mod csv;
pub mod dates;
