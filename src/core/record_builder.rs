use crate::domain::models::{ConversationRecord, Message, Role};
use std::path::{Component, Path};

/// Path of `path` relative to `root`, joined with forward slashes on every platform.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub fn build_record(
    path: &Path,
    root: &Path,
    content: String,
    system_prompt: &str,
) -> ConversationRecord {
    let file_type = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let instruction = format!(
        "Please write the code of this {} file: {}",
        file_type,
        relative_path(path, root)
    );

    ConversationRecord {
        messages: vec![
            Message {
                role: Role::System,
                content: system_prompt.to_string(),
            },
            Message {
                role: Role::User,
                content: instruction,
            },
            Message {
                role: Role::Assistant,
                content,
            },
        ],
    }
}
