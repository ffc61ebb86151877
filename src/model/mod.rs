mod entities;
mod error;
mod outcome;
mod rate_limit;
mod request;
mod response;

pub use entities::*;
pub use error::*;
pub use outcome::*;
pub use rate_limit::*;
pub use request::*;
pub use response::*;
