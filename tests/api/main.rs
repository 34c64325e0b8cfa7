mod author;
mod chapter;
mod cover;
mod fake;
mod group;
mod home;
mod list;
mod relation;
mod report;
mod tag;
mod user;

pub use helper::*;
