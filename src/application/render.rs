//! Render pipeline: classify an input, then optionally decorate it with
//! syntax-highlight markup.
//!
//! Classification is synchronous. Highlighting goes through the async
//! [`Highlighter`] seam and is skipped for inputs above the size limit. A
//! [`DiffView`] keeps the rows currently on screen and drops highlight results
//! that arrive after its input has changed.

use crate::domain::{
    DiffError, DiffLine, DiffLineKind, DiffRow, DiffStats, HighlightError, LineContent,
};
use crate::infra::app_config::{DEFAULT_HIGHLIGHT_LIMIT, DiffViewConfig};
use crate::infra::diff::stats::stats_from_runs;
use crate::infra::diff::{
    change_runs, extract_sides, lines_from_runs, parse_unified_diff, stats_from_unified,
};
use crate::infra::hash::hash_parts;
use crate::infra::highlight::markup::{content_to_markup, tokens_to_markup};
use crate::infra::highlight::{
    CachedHighlighter, HighlightCache, Highlighter, SyntectHighlighter, Token, TokenLines,
};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::sync::Arc;

/// What to diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffInput {
    /// Pre-formed unified diff text.
    Unified { text: String, language: String },
    /// Two full versions of a text.
    Pair {
        before: String,
        after: String,
        language: String,
    },
}

impl DiffInput {
    pub fn unified(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self::Unified {
            text: text.into(),
            language: language.into(),
        }
    }

    pub fn pair(
        before: impl Into<String>,
        after: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self::Pair {
            before: before.into(),
            after: after.into(),
            language: language.into(),
        }
    }

    /// Picks the input mode from optional parts. A unified diff wins; a lone
    /// `before` or `after` is diffed against an empty text. Supplying nothing
    /// is a caller bug and fails with [`DiffError::MissingInput`].
    pub fn from_parts(
        unified: Option<String>,
        before: Option<String>,
        after: Option<String>,
        language: impl Into<String>,
    ) -> Result<Self, DiffError> {
        let language = language.into();
        if let Some(text) = unified {
            return Ok(Self::Unified { text, language });
        }
        match (before, after) {
            (None, None) => Err(DiffError::MissingInput),
            (before, after) => Ok(Self::Pair {
                before: before.unwrap_or_default(),
                after: after.unwrap_or_default(),
                language,
            }),
        }
    }

    pub fn language(&self) -> &str {
        match self {
            Self::Unified { language, .. } | Self::Pair { language, .. } => language,
        }
    }

    /// Byte size checked against the highlight limit.
    pub fn size(&self) -> usize {
        match self {
            Self::Unified { text, .. } => text.len(),
            Self::Pair { before, after, .. } => before.len() + after.len(),
        }
    }

    /// Identity used to recognise results computed for a previous input.
    pub fn identity(&self) -> u64 {
        match self {
            Self::Unified { text, language } => {
                hash_parts(&["unified", language.as_str(), text.as_str()])
            }
            Self::Pair {
                before,
                after,
                language,
            } => hash_parts(&["pair", language.as_str(), before.as_str(), after.as_str()]),
        }
    }

    /// Texts handed to the highlighter for the old and new side. Unified
    /// input is reconstructed from its context, removed and added lines.
    pub fn sides(&self) -> (Cow<'_, str>, Cow<'_, str>) {
        match self {
            Self::Unified { text, .. } => {
                let (before, after) = extract_sides(text);
                (Cow::Owned(before), Cow::Owned(after))
            }
            Self::Pair { before, after, .. } => (Cow::Borrowed(before), Cow::Borrowed(after)),
        }
    }

    /// Classified rows (literal text) and change totals.
    pub fn classify(&self) -> (Vec<DiffRow>, DiffStats) {
        match self {
            Self::Unified { text, .. } => (parse_unified_diff(text), stats_from_unified(text)),
            Self::Pair { before, after, .. } => {
                let runs = change_runs(before, after);
                let rows = lines_from_runs(&runs)
                    .into_iter()
                    .map(DiffRow::Line)
                    .collect();
                (rows, stats_from_runs(&runs))
            }
        }
    }
}

/// Positional zipper of highlighted token lines onto diff lines.
///
/// Delete lines draw from the old side, add and context lines from the new
/// side. The old cursor advances on delete and context lines, the new cursor
/// on add and context lines, so both input modes line up with their side
/// texts. Missing tokens fall back to the escaped raw text.
struct HighlightZipper<'a> {
    before: Option<&'a [Vec<Token>]>,
    after: Option<&'a [Vec<Token>]>,
    before_idx: usize,
    after_idx: usize,
}

impl<'a> HighlightZipper<'a> {
    fn new(before: Option<&'a [Vec<Token>]>, after: Option<&'a [Vec<Token>]>) -> Self {
        Self {
            before,
            after,
            before_idx: 0,
            after_idx: 0,
        }
    }

    fn zip_line(&mut self, line: &DiffLine) -> DiffLine {
        let tokens = match line.kind() {
            DiffLineKind::Delete => {
                let tokens = self.before.and_then(|side| side.get(self.before_idx));
                self.before_idx += 1;
                tokens
            }
            DiffLineKind::Add => {
                let tokens = self.after.and_then(|side| side.get(self.after_idx));
                self.after_idx += 1;
                tokens
            }
            DiffLineKind::Context => {
                let tokens = self.after.and_then(|side| side.get(self.after_idx));
                self.before_idx += 1;
                self.after_idx += 1;
                tokens
            }
        };

        let markup = match (tokens, line.content()) {
            (Some(tokens), LineContent::Text(_)) => tokens_to_markup(tokens),
            (_, content) => content_to_markup(content),
        };
        line.with_content(LineContent::Markup(markup))
    }
}

/// Zips per-side token lines onto diff lines. Pass `None` for a side whose
/// tokens are unavailable; every line still gets escaped content.
pub fn zip_highlight(
    lines: &[DiffLine],
    before: Option<&[Vec<Token>]>,
    after: Option<&[Vec<Token>]>,
) -> Vec<DiffLine> {
    let mut zipper = HighlightZipper::new(before, after);
    lines.iter().map(|line| zipper.zip_line(line)).collect()
}

/// [`zip_highlight`] over render rows; hunk separators pass through.
pub fn zip_highlight_rows(
    rows: &[DiffRow],
    before: Option<&[Vec<Token>]>,
    after: Option<&[Vec<Token>]>,
) -> Vec<DiffRow> {
    let mut zipper = HighlightZipper::new(before, after);
    rows.iter()
        .map(|row| match row {
            DiffRow::Hunk(hunk) => DiffRow::Hunk(*hunk),
            DiffRow::Line(line) => DiffRow::Line(zipper.zip_line(line)),
        })
        .collect()
}

/// Rows with escaped plain-text content.
pub fn escape_rows(rows: &[DiffRow]) -> Vec<DiffRow> {
    zip_highlight_rows(rows, None, None)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Inputs above this many bytes are rendered without highlighting.
    pub highlight_limit: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            highlight_limit: DEFAULT_HIGHLIGHT_LIMIT,
        }
    }
}

impl From<&DiffViewConfig> for RenderOptions {
    fn from(config: &DiffViewConfig) -> Self {
        Self {
            highlight_limit: config.highlight_limit,
        }
    }
}

/// Render-ready output for one input.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RenderedDiff {
    pub rows: Vec<DiffRow>,
    pub stats: DiffStats,
    /// True when at least one side was decorated with highlighter output.
    pub highlighted: bool,
}

impl RenderedDiff {
    pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.rows.iter().filter_map(DiffRow::as_line)
    }
}

pub struct DiffRenderer {
    highlighter: Arc<dyn Highlighter>,
    options: RenderOptions,
}

impl DiffRenderer {
    pub fn new(highlighter: Arc<dyn Highlighter>, options: RenderOptions) -> Self {
        Self {
            highlighter,
            options,
        }
    }

    /// Syntect highlighter with the configured theme behind a cache of the
    /// configured capacity.
    pub fn from_config(config: &DiffViewConfig) -> Result<Self, HighlightError> {
        let syntect = SyntectHighlighter::new(&config.theme)?;
        let cache = HighlightCache::with_capacity(config.cache_capacity);
        Ok(Self::new(
            Arc::new(CachedHighlighter::new(syntect, cache)),
            RenderOptions::from(config),
        ))
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    pub fn should_highlight(&self, input: &DiffInput) -> bool {
        input.size() <= self.options.highlight_limit
    }

    /// Classified rows with escaped plain text; never waits on the highlighter.
    pub fn render_plain(&self, input: &DiffInput) -> RenderedDiff {
        let (rows, stats) = input.classify();
        RenderedDiff {
            rows: escape_rows(&rows),
            stats,
            highlighted: false,
        }
    }

    /// Classified rows decorated with highlight markup where available.
    pub async fn render(&self, input: &DiffInput) -> RenderedDiff {
        if !self.should_highlight(input) {
            log::debug!(
                "skipping highlight: {} bytes over limit {}",
                input.size(),
                self.options.highlight_limit
            );
            return self.render_plain(input);
        }

        let (rows, stats) = input.classify();
        let (before, after) = input.sides();
        let language = input.language();

        let (before_tokens, after_tokens) = futures::join!(
            self.highlight_side(&before, language, "before"),
            self.highlight_side(&after, language, "after"),
        );

        RenderedDiff {
            rows: zip_highlight_rows(
                &rows,
                before_tokens.as_deref().map(Vec::as_slice),
                after_tokens.as_deref().map(Vec::as_slice),
            ),
            stats,
            highlighted: before_tokens.is_some() || after_tokens.is_some(),
        }
    }

    async fn highlight_side(
        &self,
        text: &str,
        language: &str,
        side: &str,
    ) -> Option<Arc<TokenLines>> {
        match self.highlighter.highlight(text, language).await {
            Ok(Some(lines)) => Some(lines),
            Ok(None) => {
                log::debug!("highlighter has no tokens yet for {side} side");
                None
            }
            Err(err) => {
                log::warn!("Highlighting {side} side failed, using plain text: {err}");
                None
            }
        }
    }

    /// Renders `input` into `view`: plain rows are installed at once, the
    /// highlighted rows only if `view` still shows `input` when they are ready.
    /// Returns whether the highlighted result was kept.
    pub async fn update_view(&self, view: &Mutex<DiffView>, input: &DiffInput) -> bool {
        let ticket = view.lock().load(self, input);
        let rendered = self.render(input).await;
        view.lock().accept(ticket, rendered)
    }
}

/// Proof of which input a render was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
    identity: u64,
}

/// The diff currently on screen.
#[derive(Debug, Default)]
pub struct DiffView {
    identity: Option<u64>,
    rendered: Option<RenderedDiff>,
}

impl DiffView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to `input`, showing escaped plain rows until a highlighted
    /// render is accepted.
    pub fn load(&mut self, renderer: &DiffRenderer, input: &DiffInput) -> RenderTicket {
        let identity = input.identity();
        self.identity = Some(identity);
        self.rendered = Some(renderer.render_plain(input));
        RenderTicket { identity }
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.identity == Some(ticket.identity)
    }

    /// Installs `rendered` if `ticket` still matches the current input;
    /// otherwise the result is stale and dropped.
    pub fn accept(&mut self, ticket: RenderTicket, rendered: RenderedDiff) -> bool {
        if !self.is_current(ticket) {
            log::debug!("discarding highlight result for a previous input");
            return false;
        }
        self.rendered = Some(rendered);
        true
    }

    pub fn rendered(&self) -> Option<&RenderedDiff> {
        self.rendered.as_ref()
    }

    pub fn clear(&mut self) {
        self.identity = None;
        self.rendered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Emits one uppercased token per line.
    struct EchoHighlighter;

    #[async_trait]
    impl Highlighter for EchoHighlighter {
        fn theme(&self) -> &str {
            "echo"
        }

        async fn highlight(
            &self,
            text: &str,
            _language: &str,
        ) -> Result<Option<Arc<TokenLines>>, HighlightError> {
            Ok(Some(Arc::new(
                text.lines()
                    .map(|l| {
                        vec![Token {
                            content: l.to_uppercase(),
                            color: "#123456".into(),
                        }]
                    })
                    .collect(),
            )))
        }
    }

    struct FailingHighlighter;

    #[async_trait]
    impl Highlighter for FailingHighlighter {
        fn theme(&self) -> &str {
            "broken"
        }

        async fn highlight(
            &self,
            _text: &str,
            _language: &str,
        ) -> Result<Option<Arc<TokenLines>>, HighlightError> {
            Err(HighlightError::Tokenize("boom".into()))
        }
    }

    fn span(text: &str) -> String {
        format!("<span style=\"color:#123456\">{text}</span>")
    }

    fn tok(text: &str) -> Vec<Token> {
        vec![Token {
            content: text.into(),
            color: "#123456".into(),
        }]
    }

    #[test]
    fn test_zip_draws_from_the_right_side() {
        let lines = vec![
            DiffLine::context("a", 1, 1),
            DiffLine::deleted("b", 2),
            DiffLine::added("x", 2),
            DiffLine::context("c", 3, 3),
        ];
        let before = vec![tok("A"), tok("B"), tok("C")];
        let after = vec![tok("A2"), tok("X"), tok("C2")];

        let zipped = zip_highlight(&lines, Some(before.as_slice()), Some(after.as_slice()));
        let content: Vec<_> = zipped.iter().map(|l| l.text().to_string()).collect();
        assert_eq!(content, vec![span("A2"), span("B"), span("X"), span("C2")]);
        assert_eq!(zipped[1].old_line_no(), Some(2));
        assert!(zipped.iter().all(|l| l.content().is_markup()));
    }

    #[test]
    fn test_zip_falls_back_to_escaped_text() {
        let lines = vec![DiffLine::deleted("a<b", 1), DiffLine::added("c&d", 1)];
        let after: Vec<Vec<Token>> = vec![];
        let zipped = zip_highlight(&lines, None, Some(after.as_slice()));
        assert_eq!(zipped[0].text(), "a&lt;b");
        assert_eq!(zipped[1].text(), "c&amp;d");
    }

    #[test]
    fn test_from_parts() {
        assert!(matches!(
            DiffInput::from_parts(None, None, None, "rust"),
            Err(DiffError::MissingInput)
        ));
        let input = DiffInput::from_parts(None, Some("a".into()), None, "rust").unwrap();
        assert_eq!(input, DiffInput::pair("a", "", "rust"));
        let input =
            DiffInput::from_parts(Some("@@".into()), Some("a".into()), None, "rust").unwrap();
        assert!(matches!(input, DiffInput::Unified { .. }));
    }

    #[test]
    fn test_identity_tracks_content_and_language() {
        let a = DiffInput::pair("x", "y", "rust");
        assert_eq!(a.identity(), DiffInput::pair("x", "y", "rust").identity());
        assert_ne!(a.identity(), DiffInput::pair("x", "y", "go").identity());
        assert_ne!(a.identity(), DiffInput::pair("xy", "", "rust").identity());
        assert_ne!(a.identity(), DiffInput::unified("x", "rust").identity());
    }

    #[tokio::test]
    async fn test_render_pair_highlighted() {
        let renderer = DiffRenderer::new(Arc::new(EchoHighlighter), RenderOptions::default());
        let rendered = renderer
            .render(&DiffInput::pair("a\nb", "a\nc", "text"))
            .await;

        assert!(rendered.highlighted);
        assert_eq!(rendered.stats, DiffStats::new(1, 1));
        let content: Vec<_> = rendered.lines().map(|l| l.text().to_string()).collect();
        assert_eq!(content, vec![span("A"), span("B"), span("C")]);
    }

    #[tokio::test]
    async fn test_render_unified_zips_reconstructed_sides() {
        let renderer = DiffRenderer::new(Arc::new(EchoHighlighter), RenderOptions::default());
        let rendered = renderer
            .render(&DiffInput::unified(
                "@@ -10,3 +10,3 @@\n keep\n-old\n+new\n tail",
                "text",
            ))
            .await;

        assert!(matches!(rendered.rows[0], DiffRow::Hunk(_)));
        let content: Vec<_> = rendered.lines().map(|l| l.text().to_string()).collect();
        assert_eq!(
            content,
            vec![span("KEEP"), span("OLD"), span("NEW"), span("TAIL")]
        );
        assert_eq!(rendered.stats, DiffStats::new(1, 1));
    }

    #[tokio::test]
    async fn test_oversized_input_is_not_highlighted() {
        let renderer = DiffRenderer::new(
            Arc::new(EchoHighlighter),
            RenderOptions { highlight_limit: 4 },
        );
        let rendered = renderer.render(&DiffInput::pair("<a>", "<b>", "text")).await;
        assert!(!rendered.highlighted);
        let content: Vec<_> = rendered.lines().map(|l| l.text().to_string()).collect();
        assert_eq!(content, vec!["&lt;a&gt;", "&lt;b&gt;"]);
    }

    #[tokio::test]
    async fn test_failing_highlighter_degrades_to_plain_text() {
        let renderer = DiffRenderer::new(Arc::new(FailingHighlighter), RenderOptions::default());
        let rendered = renderer.render(&DiffInput::pair("a", "a & b", "text")).await;
        assert!(!rendered.highlighted);
        let content: Vec<_> = rendered.lines().map(|l| l.text().to_string()).collect();
        assert_eq!(content, vec!["a", "a &amp; b"]);
    }

    #[test]
    fn test_view_discards_stale_results() {
        let renderer = DiffRenderer::new(Arc::new(EchoHighlighter), RenderOptions::default());
        let first = DiffInput::pair("a", "b", "text");
        let second = DiffInput::pair("c", "d", "text");

        let mut view = DiffView::new();
        let stale = view.load(&renderer, &first);
        let current = view.load(&renderer, &second);

        let late = RenderedDiff {
            rows: vec![],
            stats: DiffStats::new(9, 9),
            highlighted: true,
        };
        assert!(!view.accept(stale, late.clone()));
        assert_eq!(view.rendered().unwrap().stats, DiffStats::new(1, 1));
        assert!(!view.rendered().unwrap().highlighted);

        assert!(view.accept(current, late));
        assert!(view.rendered().unwrap().highlighted);
    }
}
