pub mod auth;
pub mod blueprints;
pub mod comments;
pub mod health;
pub mod likes;
pub mod users;
