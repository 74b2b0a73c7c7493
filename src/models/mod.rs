pub mod doener;
