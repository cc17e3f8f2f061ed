/// User intents collected while a frame renders and applied once it is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    NewChat,
    NewChatWithModels(Vec<String>),
    SelectSession(String),
    ToggleModel(String),
    SelectTab(String),
    Send(String),
    BeginEdit { message_id: String, pane: String },
    CancelEdit,
    CommitEdit { message_id: String, content: String },
    CopyToClipboard(String),
}
