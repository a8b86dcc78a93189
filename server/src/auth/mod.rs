mod crypto;
mod db;
mod extractor;

pub use crypto::{hash_password, verify_password};
pub use db::{create_session, find_user_by_email};
pub use extractor::{AuthUser, MaybeUser};
