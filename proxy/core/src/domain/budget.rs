// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Token Budget
//!
//! Character-based token estimation and the output-token ceiling derived
//! from a model's context window.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Sizes `max_tokens` for each upstream call and rejects
//!   chat requests that would not leave room for a reply

use super::llm::ChatMessage;

/// Formatting overhead charged per message
pub const MESSAGE_OVERHEAD: usize = 4;
/// Overhead charged once per request
pub const REQUEST_OVERHEAD: usize = 10;
/// Tokens held back between input estimate and context window
pub const SAFETY_BUFFER: usize = 100;
pub const MIN_OUTPUT_TOKENS: usize = 100;
pub const MAX_OUTPUT_TOKENS: usize = 4000;
/// Windows at or below this size reserve a quarter for output, larger ones half
pub const SMALL_WINDOW: u32 = 8192;

/// Request estimated to exceed the model's input allowance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "request too long: estimated {estimated} tokens exceeds model limit of {limit} tokens \
     (max input: {max_input} tokens). Please reduce the length of your messages"
)]
pub struct TooLong {
    pub estimated: usize,
    pub limit: u32,
    pub max_input: usize,
}

/// Roughly four characters per token, rounded up; blank text costs nothing
pub fn estimate_tokens(text: &str) -> usize {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }
    (trimmed.len() + 3) / 4
}

pub fn estimate_message_tokens(messages: &[ChatMessage]) -> usize {
    messages
        .iter()
        .map(|m| estimate_tokens(&m.role) + estimate_tokens(&m.content) + MESSAGE_OVERHEAD)
        .sum::<usize>()
        + REQUEST_OVERHEAD
}

/// Output ceiling for one request, clamped to `[MIN_OUTPUT_TOKENS, MAX_OUTPUT_TOKENS]`.
///
/// The floor wins for windows too small to fit the input.
pub fn compute_max_output_tokens(context_window: u32, messages: &[ChatMessage]) -> u32 {
    let estimated = estimate_message_tokens(messages);
    let available = (context_window as usize)
        .saturating_sub(estimated)
        .saturating_sub(SAFETY_BUFFER);
    available.clamp(MIN_OUTPUT_TOKENS, MAX_OUTPUT_TOKENS) as u32
}

/// Largest input estimate accepted for a context window
pub fn max_input_tokens(context_window: u32) -> usize {
    let window = context_window as usize;
    if context_window <= SMALL_WINDOW {
        window * 3 / 4
    } else {
        window / 2
    }
}

pub fn validate_within_limits(context_window: u32, messages: &[ChatMessage]) -> Result<(), TooLong> {
    let estimated = estimate_message_tokens(messages);
    let max_input = max_input_tokens(context_window);

    if estimated > max_input {
        return Err(TooLong {
            estimated,
            limit: context_window,
            max_input,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(content: &str) -> ChatMessage {
        ChatMessage::new("user", content)
    }

    // A single user message whose total estimate is exactly `target`.
    fn message_list_estimated_at(target: usize) -> Vec<ChatMessage> {
        let content_tokens = target - REQUEST_OVERHEAD - MESSAGE_OVERHEAD - estimate_tokens("user");
        vec![user(&"a".repeat(content_tokens * 4))]
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("   "), 0);
        assert_eq!(estimate_tokens("\n\t"), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("  abcd  "), 1);
    }

    #[test]
    fn test_message_overheads() {
        assert_eq!(estimate_message_tokens(&[]), REQUEST_OVERHEAD);
        // role "user" = 1, content "hello" = 2, overhead 4, request 10
        assert_eq!(estimate_message_tokens(&[user("hello")]), 17);
        assert_eq!(estimate_message_tokens(&[user("hello"), user("hello")]), 24);
    }

    #[test]
    fn test_max_output_clamped() {
        assert_eq!(compute_max_output_tokens(200_000, &[user("hi")]), 4000);
        assert_eq!(compute_max_output_tokens(0, &[user("hi")]), 100);
        assert_eq!(compute_max_output_tokens(50, &[]), 100);
        // 1000 - 16 - 100
        assert_eq!(compute_max_output_tokens(1000, &[user("hi")]), 884);
    }

    #[test]
    fn test_max_output_monotonic() {
        let mut previous = u32::MAX;
        for size in (0..40_000).step_by(997) {
            let budget = compute_max_output_tokens(8192, &[user(&"x".repeat(size))]);
            assert!(budget <= previous);
            assert!((100..=4000).contains(&budget));
            previous = budget;
        }
    }

    #[test]
    fn test_validation_boundary_small_window() {
        let at_limit = message_list_estimated_at(6144);
        assert_eq!(estimate_message_tokens(&at_limit), 6144);
        assert!(validate_within_limits(8192, &at_limit).is_ok());

        let over = message_list_estimated_at(6145);
        let err = validate_within_limits(8192, &over).unwrap_err();
        assert_eq!(
            err,
            TooLong {
                estimated: 6145,
                limit: 8192,
                max_input: 6144,
            }
        );
        assert!(err.to_string().starts_with("request too long"));
    }

    #[test]
    fn test_validation_large_window_reserves_half() {
        assert_eq!(max_input_tokens(8193), 4096);
        assert_eq!(max_input_tokens(200_000), 100_000);
        assert!(validate_within_limits(16_384, &message_list_estimated_at(8192)).is_ok());
        assert!(validate_within_limits(16_384, &message_list_estimated_at(8193)).is_err());
    }
}
