pub mod check;
pub mod input;
pub mod predict;
pub mod schema;
