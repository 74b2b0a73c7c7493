pub mod doener;
pub mod import;
