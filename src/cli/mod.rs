mod list;
mod pages;
mod root;

pub use list::ListCommand;
pub use pages::PagesCommand;
pub use root::Cli;

use unicode_width::UnicodeWidthStr;

use crate::gallery::PageMarker;

/// `‹ Previous  1 2 … [5] 8 9 10  Next ›`
pub fn marker_bar(markers: &[PageMarker], current: usize, total: usize) -> String {
    let previous = if current > 1 { "‹ Previous" } else { "  (first) " };
    let next = if current < total { "Next ›" } else { "(last)" };

    let pages: Vec<String> = markers
        .iter()
        .map(|marker| match marker {
            PageMarker::Page(page) if *page == current => format!("[{}]", page),
            other => other.to_string(),
        })
        .collect();

    format!("{}  {}  {}", previous, pages.join(" "), next)
}

/// Left-align `text` in a column of `width` terminal cells, truncating with an ellipsis
pub fn pad_cell(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        return format!("{}{}", text, " ".repeat(width - text_width));
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    format!("{}{}", out, " ".repeat(width.saturating_sub(used)))
}
