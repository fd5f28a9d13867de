//! Markdown → ratatui `Text` renderer for document bodies.
//!
//! Walks `pulldown_cmark` events and emits styled `Line`s: headings, emphasis,
//! inline and fenced code (syntect highlighted), lists with task markers,
//! block quotes, links, images, rules and pipe tables. [`reflow`] then wraps
//! the lines to the viewport so the scroll view knows its exact height.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Render a markdown document body.
pub fn render(content: &str) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_TABLES);

    let mut r = Renderer::default();
    for event in Parser::new_ext(content, opts) {
        r.handle(event);
    }
    Text::from(r.lines)
}

/// A pipe table being collected cell by cell.
#[derive(Default)]
struct TableBuf {
    rows: Vec<Vec<String>>,
    header_rows: usize,
    in_head: bool,
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    /// Inline styles; nested ones are patched over their parent.
    styles: Vec<Style>,
    /// Per-line prefixes (quote and code gutters).
    gutters: Vec<Span<'static>>,
    /// `None` = bullet list, `Some(n)` = ordered list at item n.
    lists: Vec<Option<u64>>,
    code: Option<Code>,
    link: Option<String>,
    image: Option<String>,
    table: Option<TableBuf>,
    /// A blank line is owed before the next block.
    gap: bool,
}

enum Code {
    Highlighted(HighlightLines<'static>),
    Plain,
}

impl Renderer {
    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn new_line(&mut self, line: Line<'static>) {
        let mut spans: Vec<Span<'static>> = self.gutters.clone();
        spans.extend(line.spans);
        self.lines.push(Line::from(spans));
    }

    fn append(&mut self, span: Span<'static>) {
        match self.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.new_line(Line::from(span)),
        }
    }

    fn block_start(&mut self) {
        if self.gap {
            self.new_line(Line::default());
            self.gap = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.inline_code(c),
            Event::SoftBreak => self.append(Span::raw(" ")),
            Event::HardBreak => self.new_line(Line::default()),
            Event::Rule => {
                self.block_start();
                self.new_line(Line::from(Span::styled("─".repeat(40), dim())));
                self.gap = true;
            }
            Event::TaskListMarker(done) => {
                let marker = if done { "☑ " } else { "☐ " };
                self.append(Span::raw(marker));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let raw = html.trim_end().to_string();
                if !raw.is_empty() {
                    self.append(Span::styled(raw, dim()));
                }
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        if let Some(table) = self.table.as_mut() {
            match tag {
                Tag::TableHead => table.in_head = true,
                Tag::TableRow => table.rows.push(Vec::new()),
                Tag::TableCell => {
                    if table.in_head && table.rows.is_empty() {
                        table.rows.push(Vec::new());
                    }
                    if let Some(row) = table.rows.last_mut() {
                        row.push(String::new());
                    }
                }
                _ => {}
            }
            return;
        }
        match tag {
            Tag::Paragraph => {
                self.block_start();
                self.new_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.block_start();
                let style = heading_style(level);
                self.new_line(Line::from(Span::styled(
                    format!("{} ", "#".repeat(level as usize)),
                    style,
                )));
                self.push_style(style);
            }
            Tag::BlockQuote(_) => {
                self.block_start();
                self.gutters.push(Span::styled("▎ ", dim()));
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.block_start();
                let lang = match &kind {
                    CodeBlockKind::Fenced(lang) => lang.split_whitespace().next().unwrap_or(""),
                    CodeBlockKind::Indented => "",
                };
                let label = if lang.is_empty() {
                    "╭──".to_string()
                } else {
                    format!("╭── {lang} ──")
                };
                self.new_line(Line::from(Span::styled(label, dim())));
                self.gutters.push(Span::styled("│ ", dim()));
                let highlighter = SYNTAX_SET
                    .find_syntax_by_token(lang)
                    .filter(|_| !lang.is_empty())
                    .zip(THEME_SET.themes.get(CODE_THEME))
                    .map(|(syntax, theme)| HighlightLines::new(syntax, theme));
                self.code = Some(match highlighter {
                    Some(h) => Code::Highlighted(h),
                    None => Code::Plain,
                });
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.block_start();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.new_line(Line::default());
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.append(Span::styled(marker, Style::default().fg(Color::Cyan)));
            }
            Tag::Table(_) => {
                self.block_start();
                self.table = Some(TableBuf::default());
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.push_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some(dest_url.to_string());
                self.append(Span::styled("[image: ", dim()));
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        if self.table.is_some() {
            match tag {
                TagEnd::TableHead => {
                    if let Some(table) = self.table.as_mut() {
                        table.in_head = false;
                        table.header_rows = table.rows.len();
                    }
                }
                TagEnd::Table => {
                    if let Some(table) = self.table.take() {
                        self.flush_table(table);
                    }
                    self.gap = true;
                }
                _ => {}
            }
            return;
        }
        match tag {
            TagEnd::Paragraph => self.gap = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.pop_style();
                self.gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.gutters.pop();
                self.new_line(Line::from(Span::styled("╰──", dim())));
                self.gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link.take() {
                    self.append(Span::styled(format!(" <{url}>"), dim()));
                }
            }
            TagEnd::Image => {
                if let Some(url) = self.image.take() {
                    self.append(Span::styled(format!("] <{url}>"), dim()));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        // ratatui renders \t as zero-width
        let text = cow.replace('\t', "    ");

        if let Some(table) = self.table.as_mut() {
            if let Some(cell) = table.rows.last_mut().and_then(|row| row.last_mut()) {
                cell.push_str(&text);
            }
            return;
        }

        match self.code.take() {
            Some(Code::Highlighted(mut h)) => {
                for line in LinesWithEndings::from(text.as_str()) {
                    let spans: Vec<Span<'static>> = match h.highlight_line(line, &SYNTAX_SET) {
                        Ok(ranges) => ranges
                            .into_iter()
                            .filter_map(|(style, frag)| {
                                let frag = frag.trim_end_matches('\n');
                                (!frag.is_empty()).then(|| {
                                    let fg = style.foreground;
                                    Span::styled(
                                        frag.to_string(),
                                        Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                                    )
                                })
                            })
                            .collect(),
                        Err(_) => vec![Span::raw(line.trim_end_matches('\n').to_string())],
                    };
                    self.new_line(Line::from(spans));
                }
                self.code = Some(Code::Highlighted(h));
            }
            Some(Code::Plain) => {
                for line in text.lines() {
                    self.new_line(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::White),
                    )));
                }
                self.code = Some(Code::Plain);
            }
            None => {
                let style = self.style();
                self.append(Span::styled(text, style));
            }
        }
    }

    fn inline_code(&mut self, cow: CowStr<'_>) {
        if let Some(cell) = self
            .table
            .as_mut()
            .and_then(|t| t.rows.last_mut())
            .and_then(|row| row.last_mut())
        {
            cell.push_str(&cow);
            return;
        }
        let style = Style::default().fg(Color::Yellow).bg(Color::Black);
        self.append(Span::styled(cow.to_string(), style));
    }

    fn flush_table(&mut self, table: TableBuf) {
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                table
                    .rows
                    .iter()
                    .filter_map(|row| row.get(c))
                    .map(|cell| cell.width())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        for (i, row) in table.rows.iter().enumerate() {
            let header = i < table.header_rows;
            let style = if header {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let mut spans = vec![Span::styled("│ ", dim())];
            for (c, width) in widths.iter().enumerate() {
                let cell = row.get(c).map(String::as_str).unwrap_or("");
                let pad = width.saturating_sub(cell.width());
                spans.push(Span::styled(format!("{cell}{}", " ".repeat(pad)), style));
                spans.push(Span::styled(" │ ", dim()));
            }
            self.new_line(Line::from(spans));
            if header && i + 1 == table.header_rows {
                let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
                self.new_line(Line::from(Span::styled(
                    format!("├─{}─┤", rule.join("─┼─")),
                    dim(),
                )));
            }
        }
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    let base = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => base.add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => base,
        _ => base.fg(Color::LightBlue),
    }
}

/// Wrap styled lines to `width` columns, breaking at spaces where possible
/// and inside words that are longer than a row.
pub fn reflow(lines: &[Line<'static>], width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if line.width() <= width {
            out.push(line.clone());
            continue;
        }
        let mut row: Vec<Span<'static>> = Vec::new();
        let mut used = 0;
        for span in &line.spans {
            for word in span.content.split_inclusive(' ') {
                let w = word.width();
                if used + w > width && used > 0 {
                    out.push(Line::from(std::mem::take(&mut row)));
                    used = 0;
                }
                if w <= width - used {
                    row.push(Span::styled(word.to_string(), span.style));
                    used += w;
                    continue;
                }
                // word longer than a row: split by characters
                let mut chunk = String::new();
                for c in word.chars() {
                    let cw = c.width().unwrap_or(0);
                    if used + cw > width {
                        row.push(Span::styled(std::mem::take(&mut chunk), span.style));
                        out.push(Line::from(std::mem::take(&mut row)));
                        used = 0;
                    }
                    chunk.push(c);
                    used += cw;
                }
                if !chunk.is_empty() {
                    row.push(Span::styled(chunk, span.style));
                }
            }
        }
        if !row.is_empty() {
            out.push(Line::from(row));
        }
    }
    out
}
