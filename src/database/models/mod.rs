pub mod collection;
pub mod user;

pub use collection::{Collection, CollectionFilter, CollectionPatch, Image, NewCollection};
pub use user::{NewUser, User, UserFilter, UserPatch};
