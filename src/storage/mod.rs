mod articles;
mod db;

pub use articles::StoredArticle;
pub use db::{Database, DatabaseError};
