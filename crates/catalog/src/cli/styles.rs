//! Terminal styles for the catalog CLI.
//!
//! Code refers to semantic names (`price`, `category`, `muted`) rather than raw colors, so
//! the look can change in one place. Whether ANSI codes are emitted at all is decided per
//! render call, see `render::RenderOptions`.

use console::Style;
use once_cell::sync::Lazy;

pub struct CatalogTheme {
    pub id: Style,
    pub name: Style,
    pub price: Style,
    pub category: Style,
    pub muted: Style,
    pub border: Style,
    pub label: Style,
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,
}

pub static THEME: Lazy<CatalogTheme> = Lazy::new(|| CatalogTheme {
    id: Style::new().yellow(),
    name: Style::new().bold(),
    price: Style::new().green().bold(),
    category: Style::new().cyan(),
    muted: Style::new().color256(246).italic(),
    border: Style::new().color256(240),
    label: Style::new().color256(246),
    info: Style::new().color256(246),
    success: Style::new().green(),
    warning: Style::new().yellow(),
    error: Style::new().red().bold(),
});
