pub mod favorites;
pub mod notes;
pub mod questions;
pub mod ratings;
pub mod titles;
pub mod users;
