pub mod amount;
pub mod plan;
