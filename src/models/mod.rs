pub mod request;
pub mod series;

pub use request::*;
pub use series::*;
