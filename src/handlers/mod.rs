pub mod credits;
pub mod health;
pub mod payment;

pub use credits::*;
pub use health::*;
pub use payment::*;
