//! Database repositories
//!
//! One repository per entity. Each trait has a single SQLx implementation
//! that dispatches on the configured backend.

pub mod article;
pub mod comment;
pub mod session;
pub mod user;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{is_unique_violation, SqlxUserRepository, UserRepository};
