use tracing::info;

use crate::types::{ChatMessage, Role};

/// Rough token estimate: a quarter of the byte length. Good enough for
/// budgeting which messages to keep; never used for billing.
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / 4
}

fn message_tokens(msg: &ChatMessage) -> usize {
    msg.content.as_deref().map(estimate_tokens).unwrap_or(0)
}

/// A message the trimmer must never evict: the system prompt, an assistant
/// turn carrying tool calls, or a tool response. Removing any of these
/// leaves a conversation most backends reject outright.
fn is_essential(msg: &ChatMessage) -> bool {
    matches!(msg.role, Role::System) || msg.has_tool_calls() || msg.tool_call_id.is_some()
}

/// Evict old optional messages until the estimated token total fits
/// `max_tokens`.
///
/// Essential messages are always kept. Optional messages are re-admitted
/// newest first, each one only if it still fits the remaining budget; a
/// message that does not fit is skipped, so a short older turn can still
/// make it in after a long one was dropped. The output preserves the
/// original conversational order regardless of admission order.
pub fn trim_to_budget(messages: Vec<ChatMessage>, max_tokens: usize) -> Vec<ChatMessage> {
    if messages.is_empty() {
        return messages;
    }

    // Only content counts toward the estimate; tool_calls travel with their
    // message either way.
    let total: usize = messages.iter().map(message_tokens).sum();
    if total <= max_tokens {
        return messages;
    }

    let mut keep: Vec<bool> = messages.iter().map(is_essential).collect();
    let mut used: usize = messages
        .iter()
        .zip(&keep)
        .filter(|(_, kept)| **kept)
        .map(|(msg, _)| message_tokens(msg))
        .sum();

    for (idx, msg) in messages.iter().enumerate().rev() {
        if keep[idx] {
            continue;
        }
        let cost = message_tokens(msg);
        if used + cost <= max_tokens {
            keep[idx] = true;
            used += cost;
        }
    }

    let kept: Vec<ChatMessage> = messages
        .into_iter()
        .zip(keep)
        .filter_map(|(msg, kept)| kept.then_some(msg))
        .collect();

    info!(
        kept = kept.len(),
        estimated_tokens = used,
        budget = max_tokens,
        "trimmed conversation to fit token budget"
    );

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tool::{FunctionCall, ToolCall};
    use crate::types::Role;

    fn tool_call_message() -> ChatMessage {
        ChatMessage::assistant_tool_calls(vec![ToolCall {
            id: "a1".to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: "lookup".to_string(),
                arguments: "{}".to_string(),
            },
        }])
    }

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("x"),
            ChatMessage::user("hi"),
            tool_call_message(),
            ChatMessage::tool("a1", "r"),
            ChatMessage::user("old1"),
            ChatMessage::user("old2"),
        ]
    }

    #[test]
    fn estimate_is_quarter_length() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("hi"), 0);
        assert_eq!(estimate_tokens("old1"), 1);
        assert_eq!(estimate_tokens("a".repeat(40).as_str()), 10);
    }

    #[test]
    fn under_budget_returns_input_unchanged() {
        let messages = conversation();
        let trimmed = trim_to_budget(messages.clone(), 1000);
        assert_eq!(trimmed, messages);
    }

    #[test]
    fn keeps_essentials_and_most_recent_optional() {
        // Budget fits the four structural messages plus one four-byte turn.
        let trimmed = trim_to_budget(conversation(), 1);
        let contents: Vec<Option<&str>> =
            trimmed.iter().map(|m| m.content.as_deref()).collect();
        assert_eq!(
            contents,
            vec![Some("x"), Some("hi"), None, Some("r"), Some("old2")],
        );
        assert_eq!(trimmed[2].role, Role::Assistant);
        assert!(trimmed[2].has_tool_calls());
        assert_eq!(trimmed[3].tool_call_id.as_deref(), Some("a1"));
    }

    #[test]
    fn essentials_survive_a_zero_budget() {
        let trimmed = trim_to_budget(conversation(), 0);
        assert_eq!(trimmed.len(), 4);
        assert!(trimmed
            .iter()
            .all(|m| is_essential(m) || m.content.as_deref() == Some("hi")));
        // "hi" estimates to zero tokens, so it still fits.
        assert_eq!(trimmed[1].content.as_deref(), Some("hi"));
    }

    #[test]
    fn long_system_prompt_is_never_evicted() {
        let messages = vec![
            ChatMessage::system("s".repeat(400)),
            ChatMessage::user("m".repeat(400)),
        ];
        let trimmed = trim_to_budget(messages, 10);
        assert_eq!(trimmed.len(), 1);
        assert_eq!(trimmed[0].role, Role::System);
    }

    #[test]
    fn newer_turns_win_over_older_ones() {
        let messages = vec![
            ChatMessage::user("a".repeat(40)),
            ChatMessage::user("b".repeat(40)),
            ChatMessage::user("c".repeat(40)),
        ];
        // Each message is 10 tokens; budget fits two.
        let trimmed = trim_to_budget(messages, 20);
        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed[0].content.as_deref().unwrap().chars().next(), Some('b'));
        assert_eq!(trimmed[1].content.as_deref().unwrap().chars().next(), Some('c'));
    }

    #[test]
    fn order_is_preserved_after_backward_selection() {
        let mut messages = vec![ChatMessage::system("rules are rules here")];
        for i in 0..10 {
            messages.push(ChatMessage::user(format!("turn number {i:02} padded out")));
        }
        let trimmed = trim_to_budget(messages, 30);
        let turns: Vec<&str> = trimmed[1..]
            .iter()
            .map(|m| m.content.as_deref().unwrap())
            .collect();
        let mut sorted = turns.clone();
        sorted.sort();
        assert_eq!(turns, sorted);
    }

    #[test]
    fn empty_input_passes_through() {
        assert!(trim_to_budget(Vec::new(), 0).is_empty());
    }
}
