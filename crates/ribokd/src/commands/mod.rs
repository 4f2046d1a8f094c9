pub mod compile;
pub mod plot;
pub mod predict;
