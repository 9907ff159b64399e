pub mod characters;
pub mod daily;
pub(crate) mod health;
pub mod quests;

pub use health::health_check;
