pub mod chart;
pub mod grid;
pub mod panels;
