pub mod auth;
pub mod comment;
pub mod follow;
pub mod post;
pub mod user;
pub mod vote;

pub use auth::*;
