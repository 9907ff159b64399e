mod character;
mod diary;
mod quest;
pub mod quest_refresh;
mod workspaces;

pub use character::{CharacterPatch, CharacterService, CreatedCharacter};
pub use diary::{DiaryService, Insight, Reflection, WrapUp};
pub use quest::{GeneratedQuests, QuestCompletion, QuestService};
pub use quest_refresh::QuestRefreshManager;
pub use workspaces::{UserWorkspace, Workspaces};
