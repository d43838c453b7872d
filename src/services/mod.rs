pub mod auth;
pub mod comment;
pub mod follow;
pub mod ownership;
pub mod post;
pub mod user;
pub mod vote;
