mod diary;
mod quest;
mod user;

pub use diary::*;
pub use quest::*;
pub use user::*;
