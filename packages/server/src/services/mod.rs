pub mod aggregation;
pub mod constraints;
pub mod lookup;
