//! Anthropic mapping helpers

use super::types::AnthropicToolChoice;
use crate::types::{FinishReason, FunctionCallMode};

/// `None` means "send no tools at all": Anthropic has no `none` choice.
pub fn convert_tool_choice(mode: &FunctionCallMode) -> Option<AnthropicToolChoice> {
    match mode {
        FunctionCallMode::Auto => Some(AnthropicToolChoice::Auto),
        FunctionCallMode::Required => Some(AnthropicToolChoice::Any),
        FunctionCallMode::None => None,
        FunctionCallMode::Function { name } => Some(AnthropicToolChoice::Tool { name: name.clone() }),
    }
}

pub fn parse_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
    match reason {
        Some("end_turn") | Some("stop_sequence") => Some(FinishReason::Stop),
        Some("max_tokens") => Some(FinishReason::Length),
        Some("tool_use") => Some(FinishReason::FunctionCall),
        Some("refusal") => Some(FinishReason::ContentFilter),
        Some(other) => {
            tracing::debug!(target: "unillm::http", stop_reason = other, "unknown anthropic stop_reason");
            Some(FinishReason::Stop)
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_choice_mapping() {
        assert_eq!(
            convert_tool_choice(&FunctionCallMode::Required),
            Some(AnthropicToolChoice::Any)
        );
        assert_eq!(convert_tool_choice(&FunctionCallMode::None), None);
        assert_eq!(
            convert_tool_choice(&FunctionCallMode::function("lookup")),
            Some(AnthropicToolChoice::Tool {
                name: "lookup".into()
            })
        );
    }

    #[test]
    fn stop_reasons_map_into_closed_set() {
        assert_eq!(parse_finish_reason(Some("stop_sequence")), Some(FinishReason::Stop));
        assert_eq!(parse_finish_reason(Some("tool_use")), Some(FinishReason::FunctionCall));
        assert_eq!(parse_finish_reason(Some("refusal")), Some(FinishReason::ContentFilter));
        assert_eq!(parse_finish_reason(Some("pause_turn")), Some(FinishReason::Stop));
        assert_eq!(parse_finish_reason(None), None);
    }
}
