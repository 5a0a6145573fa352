pub mod chat;
pub mod knowledge;
pub mod settings;

pub use chat::{chat_panel, ChatAction};
pub use knowledge::{knowledge_panel, KnowledgeAction};
pub use settings::{settings_panel, SaveFeedback, SettingsAction};
