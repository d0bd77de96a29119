pub mod column;
pub mod models;
pub mod parser;
pub mod services;
pub mod errors;

pub use column::*;
pub use models::*;
pub use parser::*;
pub use services::*;
pub use errors::*;
