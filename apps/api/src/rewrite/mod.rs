//! AI rewrite of a profile description: one rewrite in English, then German,
//! Italian and French translations of the rewritten text.
//!
//! The translations only depend on the rewritten English, so they are issued
//! concurrently. The first failure aborts the whole operation; no partial
//! result is ever returned.

pub mod prompts;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::llm_client::prompts::PLAIN_TEXT_ONLY;
use crate::llm_client::{Completion, LlmError};
use prompts::{REWRITE_PROMPT, REWRITE_SYSTEM, TRANSLATE_PROMPT, TRANSLATE_SYSTEM};

/// The four description texts produced by one rewrite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewrittenDescriptions {
    pub english: String,
    pub german: String,
    pub italian: String,
    pub french: String,
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("rewrite failed: {0}")]
    Rewrite(LlmError),

    #[error("{language} translation failed: {source}")]
    Translate {
        language: &'static str,
        source: LlmError,
    },
}

#[async_trait]
pub trait TextRewriter: Send + Sync {
    async fn rewrite_and_translate(
        &self,
        original: &str,
    ) -> Result<RewrittenDescriptions, RewriteError>;
}

/// `TextRewriter` backed by a hosted language model.
pub struct LlmRewriter<C> {
    llm: C,
}

impl<C: Completion> LlmRewriter<C> {
    pub fn new(llm: C) -> Self {
        Self { llm }
    }

    async fn translate(&self, language: &'static str, english: &str) -> Result<String, RewriteError> {
        let prompt = TRANSLATE_PROMPT
            .replace("{language}", language)
            .replace("{text}", english);
        let system = format!("{TRANSLATE_SYSTEM} {PLAIN_TEXT_ONLY}");

        let text = self
            .llm
            .complete(&prompt, &system)
            .await
            .map_err(|source| RewriteError::Translate { language, source })?;
        debug!("Translated description into {language} ({} chars)", text.len());
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl<C: Completion> TextRewriter for LlmRewriter<C> {
    async fn rewrite_and_translate(
        &self,
        original: &str,
    ) -> Result<RewrittenDescriptions, RewriteError> {
        let prompt = REWRITE_PROMPT.replace("{text}", original);
        let system = format!("{REWRITE_SYSTEM} {PLAIN_TEXT_ONLY}");

        let english = self
            .llm
            .complete(&prompt, &system)
            .await
            .map_err(RewriteError::Rewrite)?
            .trim()
            .to_string();
        debug!("Rewrote description ({} chars)", english.len());

        let (german, italian, french) = tokio::try_join!(
            self.translate("German", &english),
            self.translate("Italian", &english),
            self.translate("French", &english),
        )?;

        info!("Description rewritten and translated");
        Ok(RewrittenDescriptions {
            english,
            german,
            italian,
            french,
        })
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Answers rewrite prompts with a fixed text and translation prompts with
    /// the target language, recording every prompt it sees.
    #[derive(Default)]
    struct ScriptedCompletion {
        prompts: Mutex<Vec<String>>,
        fail_language: Option<&'static str>,
    }

    #[async_trait]
    impl Completion for ScriptedCompletion {
        async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            for language in ["German", "Italian", "French"] {
                if prompt.contains(&format!("into {language}")) {
                    if self.fail_language == Some(language) {
                        return Err(LlmError::EmptyContent);
                    }
                    return Ok(format!("  [{language}]\n"));
                }
            }
            Ok("  Shiny new copy.  ".to_string())
        }
    }

    #[tokio::test]
    async fn test_rewrite_then_translate_rewritten_text() {
        let rewriter = LlmRewriter::new(ScriptedCompletion::default());
        let result = rewriter
            .rewrite_and_translate("plain old text")
            .await
            .unwrap();

        assert_eq!(
            result,
            RewrittenDescriptions {
                english: "Shiny new copy.".into(),
                german: "[German]".into(),
                italian: "[Italian]".into(),
                french: "[French]".into(),
            }
        );

        let prompts = rewriter.llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[0].contains("plain old text"));
        for translation in &prompts[1..] {
            assert!(translation.contains("Shiny new copy."));
            assert!(!translation.contains("plain old text"));
        }
    }

    #[tokio::test]
    async fn test_translation_failure_fails_whole_rewrite() {
        let rewriter = LlmRewriter::new(ScriptedCompletion {
            fail_language: Some("Italian"),
            ..Default::default()
        });
        let err = rewriter.rewrite_and_translate("text").await.unwrap_err();
        assert!(matches!(
            err,
            RewriteError::Translate {
                language: "Italian",
                ..
            }
        ));
    }

    #[test]
    fn test_translate_prompt_names_language_twice() {
        let prompt = TRANSLATE_PROMPT
            .replace("{language}", "French")
            .replace("{text}", "Hello");
        assert!(prompt.contains("into French"));
        assert!(prompt.contains("French TRANSLATION:"));
        assert!(prompt.contains("Hello"));
    }
}
