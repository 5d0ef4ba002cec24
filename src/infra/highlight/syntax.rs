use super::{Highlighter, Token, TokenLines};
use crate::domain::HighlightError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::Arc;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

const MAX_LINE_LENGTH: usize = 2000;
const FALLBACK_COLOR: &str = "#c0c5ce";

/// Syntax name for a file path, from its extension.
pub fn detect_language(file_path: &str) -> Option<String> {
    let path = std::path::Path::new(file_path);
    let ext = path.extension().and_then(|e| e.to_str())?;
    SYNTAX_SET
        .find_syntax_by_extension(ext)
        .map(|s| s.name.to_string())
}

pub fn available_themes() -> Vec<String> {
    let mut names: Vec<String> = THEME_SET.themes.keys().cloned().collect();
    names.sort();
    names
}

fn css_color(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn theme_by_name(name: &str) -> Result<&'static Theme, HighlightError> {
    THEME_SET
        .themes
        .get(name)
        .ok_or_else(|| HighlightError::UnknownTheme(name.to_string()))
}

/// Tokenizes a whole text, one token line per `str::lines` line.
///
/// `language` is matched against syntax names and extensions; unknown
/// languages are tokenized as plain text. Overlong lines become a single
/// token so a minified file cannot stall the tokenizer.
pub fn tokenize(text: &str, language: &str, theme_name: &str) -> Result<TokenLines, HighlightError> {
    let theme = theme_by_name(theme_name)?;
    let syntax = SYNTAX_SET
        .find_syntax_by_token(language)
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let fallback = theme
        .settings
        .foreground
        .map(css_color)
        .unwrap_or_else(|| FALLBACK_COLOR.to_string());

    let mut h = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();

    for line in LinesWithEndings::from(text) {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.len() > MAX_LINE_LENGTH {
            lines.push(vec![Token {
                content: content.to_string(),
                color: fallback.clone(),
            }]);
            continue;
        }

        let ranges = h
            .highlight_line(line, &SYNTAX_SET)
            .map_err(|e| HighlightError::Tokenize(e.to_string()))?;

        let tokens = ranges
            .into_iter()
            .filter_map(|(style, piece)| {
                let piece = piece.trim_end_matches(['\n', '\r']);
                (!piece.is_empty()).then(|| Token {
                    content: piece.to_string(),
                    color: css_color(style.foreground),
                })
            })
            .collect();
        lines.push(tokens);
    }

    Ok(lines)
}

/// [`Highlighter`] backed by syntect's bundled syntaxes and themes.
/// Tokenizing runs on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct SyntectHighlighter {
    theme: String,
}

impl SyntectHighlighter {
    pub fn new(theme: &str) -> Result<Self, HighlightError> {
        theme_by_name(theme)?;
        Ok(Self {
            theme: theme.to_string(),
        })
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

#[async_trait]
impl Highlighter for SyntectHighlighter {
    fn theme(&self) -> &str {
        &self.theme
    }

    async fn highlight(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Option<Arc<TokenLines>>, HighlightError> {
        let text = text.to_string();
        let language = language.to_string();
        let theme = self.theme.clone();

        let lines = tokio::task::spawn_blocking(move || tokenize(&text, &language, &theme))
            .await
            .map_err(|e| HighlightError::Join(e.to_string()))??;

        Ok(Some(Arc::new(lines)))
    }
}
