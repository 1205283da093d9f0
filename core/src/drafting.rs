//! External content-drafting interface.
//!
//! The real drafting backend is an external text-generation service;
//! this core only owns the call signature, input validation, and the
//! typed failure taxonomy. Callers decide retry policy.

use crate::error::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};

/// Minimum prompt length accepted by the drafting service.
pub const MIN_PROMPT_CHARS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub title: String,
    pub content: String,
}

/// The external drafting collaborator. Implementations may call out
/// to a hosted model; tests substitute a mock.
pub trait DraftService {
    fn draft(&self, prompt: &str) -> DeskResult<Draft>;
}

/// Validate the prompt, delegate, and reject malformed responses.
/// A draft missing its title or content fails loudly — downstream
/// form fields are populated from this result.
pub fn request_draft(service: &dyn DraftService, prompt: &str) -> DeskResult<Draft> {
    let got = prompt.chars().count();
    if got < MIN_PROMPT_CHARS {
        return Err(DeskError::PromptTooShort {
            min: MIN_PROMPT_CHARS,
            got,
        });
    }

    let draft = service.draft(prompt)?;
    if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
        return Err(DeskError::MalformedResponse(
            "draft is missing title or content".into(),
        ));
    }
    Ok(draft)
}

/// Offline drafter used by the demo runner: formats a serviceable
/// announcement from the prompt without any network call.
pub struct CannedDrafter;

impl DraftService for CannedDrafter {
    fn draft(&self, prompt: &str) -> DeskResult<Draft> {
        let topic: String = prompt.chars().take(20).collect();
        Ok(Draft {
            title: format!("【連絡】{topic}について"),
            content: format!(
                "各位\n\n{prompt}\n\n詳細は担当支社までお問い合わせください。"
            ),
        })
    }
}
