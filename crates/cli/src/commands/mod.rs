pub mod forecast;
pub mod predict;
pub mod train;
