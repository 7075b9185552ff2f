use std::path::PathBuf;
use tracing::warn;

use crate::cms::ContentRecord;
use crate::error::{AppError, Result};

pub const LANGUAGE_PLACEHOLDER: &str = "{targetLanguage}";
pub const PAGES_PLACEHOLDER: &str = "{pagesJSON}";
pub const BLOGS_PLACEHOLDER: &str = "{blogsJSON}";

/// Built-in system prompt, used whenever no template file exists or the
/// file is empty.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"ROLE:
You are the website's AI assistant. Your goal is to help visitors find the right pages and articles on this site.

INPUTS:
- {targetLanguage}
- pagesJSON = {pagesJSON} (site pages with name, slug, language and title)
- blogsJSON = {blogsJSON} (blog posts with name, slug, language, title and publish date)

OBJECTIVES:
1. Welcome visitors warmly and reply strictly in {targetLanguage}.
2. Recommend only pages and posts present in the provided data. Do NOT invent links.
3. If the visitor asks for something not covered by the data, say so politely and ask for their name and email so the team can follow up. In that case set "detailsRequired": true.
4. When recommending links, include them invisibly in JSON using the output format below.

LINKING:
- Prefer pages matching the visitor's language ({targetLanguage}); fall back to another language only when no match exists.
- Maximum 3 links per response.

OUTPUT FORMAT:
<JSON_OUTPUT>{"detailsRequired":false,"links":[{"title":"string","url":"string","description":"string"}],"categorized":false}</JSON_OUTPUT>

STYLE:
- Professional, friendly and concise.
- Always in {targetLanguage}."#;

/// Reads and writes the externally editable prompt template.
#[derive(Clone)]
pub struct PromptStore {
    path: PathBuf,
}

impl PromptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Current template file content, for the admin endpoint.
    pub async fn read(&self) -> Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::PromptNotFound)
            }
            Err(err) => Err(AppError::PromptRead(err)),
        }
    }

    /// Overwrite the template file, creating its directory if needed.
    pub async fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(AppError::PromptWrite)?;
            }
        }
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(AppError::PromptWrite)
    }

    /// Template used for chat turns: the file when present and non-empty,
    /// else the built-in default. Read failures also fall back.
    pub async fn load_or_default(&self) -> String {
        match self.read().await {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    warn!("prompt file {} is empty, using default prompt", self.path.display());
                    DEFAULT_SYSTEM_PROMPT.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            Err(AppError::PromptNotFound) => {
                warn!("prompt file {} not found, using default prompt", self.path.display());
                DEFAULT_SYSTEM_PROMPT.to_string()
            }
            Err(err) => {
                warn!("failed to load prompt file: {}", err);
                DEFAULT_SYSTEM_PROMPT.to_string()
            }
        }
    }
}

/// Substitute the dynamic values into a template: every language
/// placeholder, and the first pages/blogs placeholder each, with the cache
/// collections serialized as JSON ("[]" when empty).
pub fn render_system_prompt(
    template: &str,
    target_language: &str,
    pages: &[ContentRecord],
    posts: &[ContentRecord],
) -> String {
    let pages_json = serde_json::to_string(pages).unwrap_or_else(|_| "[]".to_string());
    let blogs_json = serde_json::to_string(posts).unwrap_or_else(|_| "[]".to_string());

    template
        .replace(LANGUAGE_PLACEHOLDER, target_language)
        .replacen(PAGES_PLACEHOLDER, &pages_json, 1)
        .replacen(BLOGS_PLACEHOLDER, &blogs_json, 1)
}

/// Reduce a BCP 47-ish tag to the two-letter code the templates expect:
/// first segment before `-` or `_`, lowercased. Absent input means English.
pub fn resolve_target_language(language: Option<&str>) -> String {
    language
        .filter(|language| !language.is_empty())
        .unwrap_or("en")
        .split(['-', '_'])
        .next()
        .unwrap_or("en")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(slug: &str) -> ContentRecord {
        ContentRecord {
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn render_replaces_every_language_placeholder() {
        let rendered = render_system_prompt(
            "Reply in {targetLanguage}. Always {targetLanguage}.",
            "de",
            &[],
            &[],
        );
        assert_eq!(rendered, "Reply in de. Always de.");
        assert!(!rendered.contains(LANGUAGE_PLACEHOLDER));
    }

    #[test]
    fn render_replaces_only_first_pages_and_blogs_placeholders() {
        let rendered = render_system_prompt(
            "{pagesJSON} | {pagesJSON} | {blogsJSON}",
            "en",
            &[page("home")],
            &[],
        );
        let parts: Vec<&str> = rendered.split(" | ").collect();
        assert!(parts[0].contains("\"slug\":\"home\""));
        assert_eq!(parts[1], PAGES_PLACEHOLDER);
        assert_eq!(parts[2], "[]");
    }

    #[test]
    fn render_serializes_empty_cache_as_empty_arrays() {
        let rendered = render_system_prompt("{pagesJSON}/{blogsJSON}", "en", &[], &[]);
        assert_eq!(rendered, "[]/[]");
    }

    #[test]
    fn default_prompt_resolves_completely() {
        let rendered = render_system_prompt(DEFAULT_SYSTEM_PROMPT, "de", &[], &[]);
        assert!(!rendered.contains(LANGUAGE_PLACEHOLDER));
        assert!(!rendered.contains(PAGES_PLACEHOLDER));
        assert!(!rendered.contains(BLOGS_PLACEHOLDER));
        // The JSON output example is instruction text, not a placeholder.
        assert!(rendered.contains("<JSON_OUTPUT>"));
    }

    #[test]
    fn target_language_takes_primary_subtag() {
        assert_eq!(resolve_target_language(Some("de-DE")), "de");
        assert_eq!(resolve_target_language(Some("en_US")), "en");
        assert_eq!(resolve_target_language(Some("FR")), "fr");
        assert_eq!(resolve_target_language(Some("")), "en");
        assert_eq!(resolve_target_language(None), "en");
    }

    #[tokio::test]
    async fn missing_file_reads_as_not_found_but_defaults_for_chat() {
        let store = PromptStore::new("/nonexistent/prompt.txt");
        assert!(matches!(store.read().await, Err(AppError::PromptNotFound)));
        assert_eq!(store.load_or_default().await, DEFAULT_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = std::env::temp_dir().join("chat-widget-api-prompt-test");
        let store = PromptStore::new(dir.join("system_prompt.txt"));

        store.write("You are a test assistant.").await.unwrap();
        assert_eq!(store.read().await.unwrap(), "You are a test assistant.");
        assert_eq!(store.load_or_default().await, "You are a test assistant.");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn empty_file_falls_back_to_default() {
        let dir = std::env::temp_dir().join("chat-widget-api-empty-prompt-test");
        let store = PromptStore::new(dir.join("system_prompt.txt"));

        store.write("   \n").await.unwrap();
        assert_eq!(store.load_or_default().await, DEFAULT_SYSTEM_PROMPT);

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
