use crate::types::ChatMessage;

/// Rebuild messages with only the fields a backend should ever see.
///
/// Keeps `role` always, `content` only when it is non-empty and non-blank,
/// `tool_calls` only when non-empty, and `tool_call_id` whenever present.
/// Several backends reject an explicit empty `content` next to tool calls,
/// so blank content is dropped rather than forwarded. Order and count are
/// preserved, and the operation is idempotent.
pub fn sanitize_messages(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|msg| ChatMessage {
            role: msg.role,
            content: msg
                .content
                .as_deref()
                .filter(|content| !content.trim().is_empty())
                .map(str::to_owned),
            tool_calls: msg
                .tool_calls
                .as_ref()
                .filter(|calls| !calls.is_empty())
                .cloned(),
            tool_call_id: msg.tool_call_id.clone(),
        })
        .collect()
}
