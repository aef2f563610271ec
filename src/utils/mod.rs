pub mod pagination;
pub mod token;
