//! Output formatting for the catalog CLI.
//!
//! Products are rendered as fixed-width cards laid out in a grid of one to three
//! columns, depending on terminal width. Every function here returns a `String`; the
//! command handlers decide where it goes.

use super::styles::THEME;
use catalogapp::image::describe_data_uri;
use catalogapp::model::Product;
use catalogapp::outcome::{CmdMessage, MessageLevel};
use console::{Style, Term};
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Outer width of one card, borders included.
pub const CARD_WIDTH: usize = 34;
pub const GUTTER: usize = 2;
pub const MAX_COLUMNS: usize = 3;
const DESCRIPTION_LINES: usize = 3;
const FALLBACK_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub width: usize,
    pub color: bool,
}

impl RenderOptions {
    pub fn detect() -> Self {
        let term = Term::stdout();
        let width = term
            .size_checked()
            .map(|(_, cols)| cols as usize)
            .unwrap_or(FALLBACK_WIDTH);
        Self {
            width,
            color: console::colors_enabled(),
        }
    }
}

/// Narrow terminals get one column, medium two, wide three.
pub fn columns_for(width: usize) -> usize {
    ((width + GUTTER) / (CARD_WIDTH + GUTTER)).clamp(1, MAX_COLUMNS)
}

pub fn render_product_grid(products: &[&Product], opts: RenderOptions) -> String {
    if products.is_empty() {
        return format!("{}\n", paint(&THEME.muted, "No products found.", opts.color));
    }

    let columns = columns_for(opts.width);
    let cards: Vec<Vec<String>> = products
        .iter()
        .map(|p| card_lines(p, CARD_WIDTH, opts.color))
        .collect();

    let blank = " ".repeat(CARD_WIDTH);
    let gutter = " ".repeat(GUTTER);
    let mut output = String::new();

    for (row_index, row) in cards.chunks(columns).enumerate() {
        if row_index > 0 {
            output.push('\n');
        }
        let height = row.iter().map(Vec::len).max().unwrap_or(0);
        for line in 0..height {
            let cells: Vec<&str> = row
                .iter()
                .map(|card| card.get(line).map(String::as_str).unwrap_or(&blank))
                .collect();
            output.push_str(cells.join(&gutter).trim_end());
            output.push('\n');
        }
    }

    output
}

fn card_lines(product: &Product, width: usize, color: bool) -> Vec<String> {
    let inner = width.saturating_sub(4);
    let mut lines = Vec::new();

    lines.push(paint(
        &THEME.border,
        &format!("╭{}╮", "─".repeat(width - 2)),
        color,
    ));

    let image = match describe_data_uri(&product.image) {
        Some(summary) => format!("▣ {} · {}", summary.mime, format_bytes(summary.bytes)),
        None => "No image".to_string(),
    };
    lines.push(boxed(&image, &THEME.muted, inner, color));
    lines.push(boxed("", &THEME.muted, inner, color));

    let id = product
        .id
        .map(|id| format!("#{} ", id))
        .unwrap_or_default();
    let name = truncate_to_width(&product.name, inner.saturating_sub(id.width()));
    let title_pad = inner.saturating_sub(id.width() + name.width());
    lines.push(format!(
        "{} {}{}{} {}",
        paint(&THEME.border, "│", color),
        paint(&THEME.id, &id, color),
        paint(&THEME.name, &name, color),
        " ".repeat(title_pad),
        paint(&THEME.border, "│", color),
    ));

    lines.push(boxed(&product.price, &THEME.price, inner, color));
    lines.push(boxed(&product.category, &THEME.category, inner, color));
    for text in wrap_to_width(&product.description, inner, DESCRIPTION_LINES) {
        lines.push(boxed(&text, &Style::new(), inner, color));
    }

    lines.push(paint(
        &THEME.border,
        &format!("╰{}╯", "─".repeat(width - 2)),
        color,
    ));
    lines
}

fn boxed(text: &str, style: &Style, inner: usize, color: bool) -> String {
    let text = truncate_to_width(text, inner);
    let pad = inner.saturating_sub(text.width());
    format!(
        "{} {}{} {}",
        paint(&THEME.border, "│", color),
        paint(style, &text, color),
        " ".repeat(pad),
        paint(&THEME.border, "│", color),
    )
}

/// Every field of one product, for `show`.
pub fn render_product_detail(product: &Product, opts: RenderOptions) -> String {
    let label = |text: &str| paint(&THEME.label, &format!("{:<13}", text), opts.color);
    let mut output = String::new();

    let id = product
        .id
        .map(|id| format!("#{} ", id))
        .unwrap_or_default();
    output.push_str(&format!(
        "{}{}\n",
        paint(&THEME.id, &id, opts.color),
        paint(&THEME.name, &product.name, opts.color)
    ));
    output.push_str(&format!(
        "  {}{}\n",
        label("Price:"),
        paint(&THEME.price, &product.price, opts.color)
    ));
    output.push_str(&format!(
        "  {}{}\n",
        label("Category:"),
        paint(&THEME.category, &product.category, opts.color)
    ));
    let image = match describe_data_uri(&product.image) {
        Some(summary) => format!("{}, {}", summary.mime, format_bytes(summary.bytes)),
        None => paint(&THEME.muted, "No image", opts.color),
    };
    output.push_str(&format!("  {}{}\n", label("Image:"), image));
    output.push_str(&format!("  {}\n", label("Description:").trim_end()));

    let width = opts.width.saturating_sub(4).max(20);
    for line in wrap_to_width(&product.description, width, usize::MAX) {
        output.push_str(&format!("    {}\n", line));
    }

    output
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut output = serde_json::to_string_pretty(value)?;
    output.push('\n');
    Ok(output)
}

/// Errors go to stderr, everything else to stdout. Returns (stdout, stderr).
pub fn render_messages(messages: &[CmdMessage], color: bool) -> (String, String) {
    let mut out = String::new();
    let mut err = String::new();
    for message in messages {
        let (style, target) = match message.level {
            MessageLevel::Info => (&THEME.info, &mut out),
            MessageLevel::Success => (&THEME.success, &mut out),
            MessageLevel::Warning => (&THEME.warning, &mut out),
            MessageLevel::Error => (&THEME.error, &mut err),
        };
        target.push_str(&paint(style, &message.content, color));
        target.push('\n');
    }
    (out, err)
}

pub fn print_messages(messages: &[CmdMessage]) {
    let (out, err) = render_messages(messages, console::colors_enabled());
    print!("{}", out);
    eprint!("{}", err);
}

pub fn format_bytes(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    let size = bytes as f64;
    if size >= MIB {
        format!("{:.1} MiB", size / MIB)
    } else if size >= KIB {
        format!("{:.1} KiB", size / KIB)
    } else {
        format!("{} B", bytes)
    }
}

fn paint(style: &Style, text: &str, color: bool) -> String {
    style.apply_to(text).force_styling(color).to_string()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    if max_width > 0 {
        result.push('…');
    }
    result
}

/// Greedy word wrap. Words wider than `width` are cut; overflow past `max_lines`
/// ends the last line with an ellipsis.
fn wrap_to_width(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word = truncate_to_width(word, width);
        if current.is_empty() {
            current = word;
        } else if current.width() + 1 + word.width() <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let shortened = truncate_to_width(last, width.saturating_sub(1));
            *last = format!("{}…", shortened.trim_end_matches('…'));
        }
    }
    lines
}
