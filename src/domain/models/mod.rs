pub mod cat;
pub mod user;

pub use cat::Cat;
pub use user::User;
