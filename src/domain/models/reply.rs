use std::path::PathBuf;

use crate::domain::value_objects::ObjectKey;

/// A message handed to the chat sink in answer to a command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Plain text answer (errors, "nothing found")
    Text(String),

    /// A downloaded image waiting on local disk
    ///
    /// The file only exists for the duration of the emit call.
    Image { key: ObjectKey, path: PathBuf },
}

impl Reply {
    pub fn text(message: impl Into<String>) -> Self {
        Reply::Text(message.into())
    }
}
