pub mod prioritization;
pub mod tabular;
