pub mod errors;
pub mod db;
pub mod product;

pub use errors::ModelError;
pub use product::Product;
