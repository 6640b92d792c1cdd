pub mod cards;
pub mod collections;
