use crate::codec::{AiModel, Prompt, AI_MODELS};
use std::collections::BTreeSet;

/// Gallery view criteria. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Case-insensitive substring of the title, prompt text or any tag
    pub search: String,
    pub model: Option<AiModel>,
    pub category: Option<String>,
}

impl Filter {
    pub fn matches(&self, prompt: &Prompt) -> bool {
        self.matches_search(prompt)
            && self.model.as_ref().map_or(true, |m| &prompt.model == m)
            && self
                .category
                .as_deref()
                .map_or(true, |c| prompt.category == c)
    }

    fn matches_search(&self, prompt: &Prompt) -> bool {
        let needle = self.search.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        prompt.title.to_lowercase().contains(&needle)
            || prompt.prompt.to_lowercase().contains(&needle)
            || prompt
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }

    pub fn apply<'a>(&self, prompts: &'a [Prompt]) -> Vec<&'a Prompt> {
        prompts.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct categories in use, sorted.
pub fn categories(prompts: &[Prompt]) -> Vec<String> {
    prompts
        .iter()
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Gallery header counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub models: usize,
    pub categories: usize,
}

impl Stats {
    pub fn of(prompts: &[Prompt]) -> Self {
        Self {
            total: prompts.len(),
            models: AI_MODELS.len(),
            categories: categories(prompts).len(),
        }
    }
}
