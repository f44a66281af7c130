pub mod data;

pub use data::agent::*;
pub use data::conditions::*;
pub use data::event::*;
pub use data::governance::*;
