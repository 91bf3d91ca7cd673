//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories. They own
//! validation and turn repository results into domain errors.

pub mod article;
pub mod comment;
pub mod password;
pub mod session;
pub mod user;

pub use article::{ArticlePage, ArticleService, ArticleServiceError};
pub use comment::{CommentService, CommentServiceError, ANONYMOUS_AUTHOR};
pub use password::{hash_password, verify_password};
pub use session::SessionStore;
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
