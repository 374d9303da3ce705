//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod blueprint_repo;
pub mod commentary_repo;
pub mod like_repo;
pub mod tag_repo;
pub mod user_repo;

pub use blueprint_repo::BlueprintRepo;
pub use commentary_repo::CommentaryRepo;
pub use like_repo::LikeRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
