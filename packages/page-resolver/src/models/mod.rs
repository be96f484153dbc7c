pub mod rows;

pub use rows::*;
