//! Data models
//!
//! Database entities (Article, Comment, User, Session), the inputs used to
//! create them, and the view models handed to templates.

mod article;
mod comment;
mod pagination;
mod session;
mod user;

pub use article::{Article, ArticleInput, ArticleSummary, ArticleWithComments};
pub use comment::{Comment, CreateCommentInput};
pub use pagination::{parse_page, Pagination, PAGE_SIZE};
pub use session::Session;
pub use user::{CreateUserInput, User};
