//! Local prompt screening and enhancement applied before any provider call.

/// Returned for prompts too short to be useful.
pub const DEFAULT_THUMBNAIL_PROMPT: &str =
    "A bright, colorful YouTube thumbnail with bold text and clear design";

const THUMBNAIL_PREFIX: &str = "YouTube thumbnail: ";
const REFERENCE_IMAGE_NOTE: &str = "based on the provided reference image, ";
const FULL_GUIDELINES: &str =
    "professional, bright colors, bold text, clean design, family-friendly";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCategory {
    Violence,
    Sexual,
    Hate,
}

const BLOCKED_TERMS: &[(&str, ContentCategory)] = &[
    ("kill", ContentCategory::Violence),
    ("murder", ContentCategory::Violence),
    ("violence", ContentCategory::Violence),
    ("weapon", ContentCategory::Violence),
    ("gun", ContentCategory::Violence),
    ("knife", ContentCategory::Violence),
    ("nude", ContentCategory::Sexual),
    ("naked", ContentCategory::Sexual),
    ("sex", ContentCategory::Sexual),
    ("porn", ContentCategory::Sexual),
    ("hate", ContentCategory::Hate),
    ("racist", ContentCategory::Hate),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSafety {
    Safe,
    Blocked {
        term: &'static str,
        category: ContentCategory,
    },
}

/// Case-insensitive substring match against the denylist.
pub fn check_prompt_safety(prompt: &str) -> PromptSafety {
    let lower = prompt.to_lowercase();
    BLOCKED_TERMS
        .iter()
        .find(|(term, _)| lower.contains(term))
        .map(|(term, category)| PromptSafety::Blocked {
            term: *term,
            category: *category,
        })
        .unwrap_or(PromptSafety::Safe)
}

/// Adapt a user prompt for thumbnail generation.
///
/// Minimal mode only adds the thumbnail context, which keeps provider safety
/// rejections rare. The full mode appends style guidelines instead.
pub fn enhance_prompt(prompt: &str, minimal: bool, has_reference_image: bool) -> String {
    let cleaned = prompt.trim();
    if cleaned.chars().count() < 2 {
        return DEFAULT_THUMBNAIL_PROMPT.to_string();
    }

    let reference = if has_reference_image {
        REFERENCE_IMAGE_NOTE
    } else {
        ""
    };

    if minimal {
        format!("{THUMBNAIL_PREFIX}{reference}{cleaned}")
    } else {
        format!("{reference}{cleaned}, {FULL_GUIDELINES}")
    }
}
