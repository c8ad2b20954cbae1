// ABOUTME: Coaching prompt assembler - deterministic block layout from pipeline inputs
// ABOUTME: Pure function; optional blocks are omitted entirely, never left as dangling headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use crate::models::{DailyPrompt, MessageRecord, UserContext};
use std::fmt::Write;

/// Trailing history messages included in the prompt
const RECENT_MESSAGE_WINDOW: usize = 4;

/// Build the system prompt for one coaching turn
///
/// Block order is fixed: persona preamble, USER CONTEXT, TODAY'S LEADERSHIP
/// PROMPT (omitted when `daily_prompt` is `None`), RELEVANT LEADERSHIP
/// CONTENT (omitted when empty), RECENT CONVERSATION (last four messages,
/// omitted when empty), RESPONSE GUIDELINES, then the literal user message.
#[must_use]
pub fn build_coaching_prompt(
    user_message: &str,
    context: &UserContext,
    history: &[MessageRecord],
    daily_prompt: Option<&DailyPrompt>,
    knowledge: &[String],
    journey_length_days: u32,
) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are Summit, an AI leadership development coach for business owners."
    );
    let _ = writeln!(
        prompt,
        "You help entrepreneurs develop their leadership skills through a structured {journey_length_days}-day personal development journey."
    );
    prompt.push('\n');

    let _ = writeln!(prompt, "USER CONTEXT:");
    let _ = writeln!(prompt, "- Name: {}", context.first_name);
    let _ = writeln!(prompt, "- Business: {}", context.business_name);
    let _ = writeln!(
        prompt,
        "- Leadership Journey Day: {} of {journey_length_days}",
        context.current_day
    );
    let _ = writeln!(
        prompt,
        "- Communication Style: {}",
        context.communication_style.as_str()
    );
    let _ = writeln!(
        prompt,
        "- Preferred Response Length: {}",
        context.preferred_response_length.as_str()
    );
    prompt.push('\n');

    if let Some(daily) = daily_prompt {
        let _ = writeln!(
            prompt,
            "TODAY'S LEADERSHIP PROMPT (Day {}):",
            context.current_day
        );
        let _ = writeln!(prompt, "Title: {}", daily.title);
        let _ = writeln!(prompt, "Content: {}", daily.body);
        if !daily.fill_in_blanks.is_empty() {
            let _ = writeln!(
                prompt,
                "Reflection Exercise: {}",
                daily.fill_in_blanks.join(", ")
            );
        }
        prompt.push('\n');
    }

    if !knowledge.is_empty() {
        let _ = writeln!(prompt, "RELEVANT LEADERSHIP CONTENT:");
        for snippet in knowledge {
            let _ = writeln!(prompt, "- {snippet}");
        }
        prompt.push('\n');
    }

    if !history.is_empty() {
        let _ = writeln!(prompt, "RECENT CONVERSATION:");
        let start = history.len().saturating_sub(RECENT_MESSAGE_WINDOW);
        for msg in &history[start..] {
            let _ = writeln!(prompt, "{}: {}", msg.sender, msg.content);
        }
        prompt.push('\n');
    }

    let _ = writeln!(prompt, "RESPONSE GUIDELINES:");
    let _ = writeln!(prompt, "- Focus on leadership development and personal growth");
    let _ = writeln!(
        prompt,
        "- Provide actionable advice for business owners and entrepreneurs"
    );
    let _ = writeln!(
        prompt,
        "- Keep responses {} length",
        context.preferred_response_length.as_str()
    );
    let _ = writeln!(prompt, "- Ask follow-up questions to deepen reflection");
    let _ = writeln!(
        prompt,
        "- Encourage progress in their {journey_length_days}-day leadership journey"
    );
    prompt.push('\n');

    let _ = writeln!(prompt, "USER MESSAGE: {user_message}");

    prompt
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::Utc;

    fn message(sender: &str, content: &str) -> MessageRecord {
        MessageRecord {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: "c1".to_owned(),
            sender: sender.to_owned(),
            content: content.to_owned(),
            created_at: Utc::now(),
        }
    }

    fn sample_prompt() -> DailyPrompt {
        DailyPrompt {
            day_number: 12,
            title: "Delegation".to_owned(),
            body: "Identify one task to hand off this week.".to_owned(),
            fill_in_blanks: vec!["I will delegate ___".to_owned()],
            follow_up_questions: vec!["What is stopping you from delegating it today?".to_owned()],
            version: 2,
        }
    }

    #[test]
    fn test_blocks_appear_in_fixed_order() {
        let ctx = UserContext::default();
        let history = vec![message("user", "hello"), message("assistant", "hi")];
        let knowledge = vec!["Trust is built in drops.".to_owned()];
        let prompt = build_coaching_prompt(
            "How do I delegate?",
            &ctx,
            &history,
            Some(&sample_prompt()),
            &knowledge,
            180,
        );

        let positions: Vec<usize> = [
            "USER CONTEXT:",
            "TODAY'S LEADERSHIP PROMPT (Day 1):",
            "RELEVANT LEADERSHIP CONTENT:",
            "RECENT CONVERSATION:",
            "RESPONSE GUIDELINES:",
            "USER MESSAGE: How do I delegate?",
        ]
        .iter()
        .map(|header| prompt.find(header).unwrap())
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_optional_blocks_are_omitted_without_dangling_headers() {
        let ctx = UserContext::default();
        let prompt = build_coaching_prompt("Hi", &ctx, &[], None, &[], 180);

        assert!(!prompt.contains("TODAY'S LEADERSHIP PROMPT"));
        assert!(!prompt.contains("RELEVANT LEADERSHIP CONTENT:"));
        assert!(!prompt.contains("RECENT CONVERSATION:"));
        assert!(prompt.contains("USER CONTEXT:"));
        assert!(prompt.contains("RESPONSE GUIDELINES:"));
        assert!(prompt.trim_end().ends_with("USER MESSAGE: Hi"));
    }

    #[test]
    fn test_history_window_keeps_last_four() {
        let ctx = UserContext::default();
        let history: Vec<MessageRecord> = (1..=6)
            .map(|i| message("user", &format!("msg-{i}")))
            .collect();
        let prompt = build_coaching_prompt("Hi", &ctx, &history, None, &[], 180);

        assert!(!prompt.contains("msg-1"));
        assert!(!prompt.contains("msg-2"));
        for i in 3..=6 {
            assert!(prompt.contains(&format!("msg-{i}")));
        }
    }

    #[test]
    fn test_empty_fill_in_blanks_omits_exercise_line() {
        let ctx = UserContext::default();
        let daily = DailyPrompt {
            fill_in_blanks: Vec::new(),
            ..sample_prompt()
        };
        let prompt = build_coaching_prompt("Hi", &ctx, &[], Some(&daily), &[], 180);

        assert!(prompt.contains("Title: Delegation"));
        assert!(!prompt.contains("Reflection Exercise:"));
    }

    #[test]
    fn test_context_fields_are_rendered() {
        let ctx = UserContext {
            first_name: "Dana".to_owned(),
            business_name: "Summit Gym".to_owned(),
            current_day: 42,
            ..UserContext::default()
        };
        let prompt = build_coaching_prompt("Hi", &ctx, &[], None, &[], 180);

        assert!(prompt.contains("- Name: Dana"));
        assert!(prompt.contains("- Business: Summit Gym"));
        assert!(prompt.contains("- Leadership Journey Day: 42 of 180"));
    }
}
