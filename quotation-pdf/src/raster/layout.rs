//! Lays a [`DocumentView`] out as positioned draw operations.

use ::image::Rgb;

use super::canvas::TextStyle;
use crate::document::DocumentView;

/// Logical page width the document is laid out at.
pub const LAYOUT_WIDTH: u32 = 800;
const PADDING: u32 = 32;
const INNER_WIDTH: u32 = LAYOUT_WIDTH - 2 * PADDING;
const RIGHT_EDGE: u32 = LAYOUT_WIDTH - PADDING;

pub const LOGO_SIZE: u32 = 60;
const HEADER_RIGHT_WIDTH: u32 = 260;
const CELL_PADDING: u32 = 16;
const MIN_ROW_HEIGHT: u32 = 40;
const TOTALS_WIDTH: u32 = 256;

pub const GRAY_800: Rgb<u8> = Rgb([31, 41, 55]);
pub const GRAY_700: Rgb<u8> = Rgb([55, 65, 81]);
pub const GRAY_600: Rgb<u8> = Rgb([75, 85, 99]);
pub const GRAY_500: Rgb<u8> = Rgb([107, 114, 128]);
pub const GRAY_300: Rgb<u8> = Rgb([209, 213, 219]);
pub const GRAY_200: Rgb<u8> = Rgb([229, 231, 235]);
pub const GRAY_100: Rgb<u8> = Rgb([243, 244, 246]);
pub const INDIGO_700: Rgb<u8> = Rgb([67, 56, 202]);
pub const MONOGRAM_GOLD: Rgb<u8> = Rgb([223, 166, 103]);
pub const MONOGRAM_INK: Rgb<u8> = Rgb([17, 17, 17]);

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        color: Rgb<u8>,
    },
    Text {
        x: u32,
        y: u32,
        text: String,
        style: TextStyle,
        color: Rgb<u8>,
    },
    Logo {
        x: u32,
        y: u32,
        size: u32,
    },
}

/// A laid out document: its logical size and what to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

struct Builder {
    ops: Vec<DrawOp>,
}

impl Builder {
    fn rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        self.ops.push(DrawOp::Rect { x, y, w, h, color });
    }

    fn text(&mut self, x: u32, y: u32, text: &str, style: TextStyle, color: Rgb<u8>) {
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            style,
            color,
        });
    }

    fn text_right(&mut self, right: u32, y: u32, text: &str, style: TextStyle, color: Rgb<u8>) {
        let x = right.saturating_sub(style.text_width(text));
        self.text(x, y, text, style, color);
    }

    fn text_centered(&mut self, y: u32, text: &str, style: TextStyle, color: Rgb<u8>) {
        let x = PADDING + INNER_WIDTH.saturating_sub(style.text_width(text)) / 2;
        self.text(x, y, text, style, color);
    }

    /// Wrapped paragraph; returns the y below its last line.
    fn paragraph(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        text: &str,
        style: TextStyle,
        color: Rgb<u8>,
        line_gap: u32,
    ) -> u32 {
        let mut y = y;
        for line in wrap_text(text, chars_that_fit(width, style)) {
            self.text(x, y, &line, style, color);
            y += style.line_height() + line_gap;
        }
        y
    }
}

fn chars_that_fit(width: u32, style: TextStyle) -> usize {
    (width / style.char_width()).max(1) as usize
}

/// Greedy word wrap. Words longer than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn layout_document(view: &DocumentView) -> Layout {
    let mut b = Builder { ops: Vec::new() };
    let mut y = PADDING;

    // Header: logo and business identity on the left, quote details on the right
    let left_x = PADDING + LOGO_SIZE + 12;
    let left_width = INNER_WIDTH - LOGO_SIZE - 12 - HEADER_RIGHT_WIDTH;
    b.ops.push(DrawOp::Logo {
        x: PADDING,
        y,
        size: LOGO_SIZE,
    });
    let name_bottom = b.paragraph(
        left_x,
        y + 4,
        left_width,
        &view.business.name,
        TextStyle::HEADING,
        GRAY_800,
        4,
    );
    let tagline_bottom = b.paragraph(
        left_x,
        name_bottom,
        left_width,
        &view.business.tagline,
        TextStyle::SMALL,
        GRAY_600,
        2,
    );
    let mut left_y = (y + LOGO_SIZE).max(tagline_bottom) + 12;
    let contact_width = INNER_WIDTH - HEADER_RIGHT_WIDTH;
    left_y = b.paragraph(
        PADDING,
        left_y,
        contact_width,
        &view.business.address,
        TextStyle::BODY,
        GRAY_700,
        4,
    );
    left_y = b.paragraph(
        PADDING,
        left_y,
        contact_width,
        &view.business.contact_line(),
        TextStyle::BODY,
        GRAY_700,
        4,
    );

    b.text_right(RIGHT_EDGE, y, "QUOTATION", TextStyle::TITLE, INDIGO_700);
    let mut right_y = y + TextStyle::TITLE.line_height() + 8;
    let date = format!("Date: {}", view.issue_date);
    b.text_right(RIGHT_EDGE, right_y, &date, TextStyle::BODY, GRAY_600);
    right_y += 20;
    let number = format!("Quote #: {}", view.quote_number);
    b.text_right(RIGHT_EDGE, right_y, &number, TextStyle::BODY, GRAY_600);
    right_y += 20;

    y = left_y.max(right_y) + 16;
    b.rect(PADDING, y, INNER_WIDTH, 1, GRAY_200);
    y += 24;

    if let Some(client) = &view.bill_to {
        b.text(PADDING, y, "Bill To:", TextStyle::HEADING, GRAY_800);
        y += TextStyle::HEADING.line_height() + 8;
        y = b.paragraph(PADDING, y, INNER_WIDTH, client, TextStyle::BODY, GRAY_700, 4);
        y += 24;
    }

    // Items table
    let name_x = PADDING + CELL_PADDING;
    let name_width = INNER_WIDTH * 40 / 100 - 2 * CELL_PADDING;
    let right_edges = [
        PADDING + INNER_WIDTH * 60 / 100 - CELL_PADDING,
        PADDING + INNER_WIDTH * 75 / 100 - CELL_PADDING,
        RIGHT_EDGE - CELL_PADDING,
    ];
    let text_offset = (MIN_ROW_HEIGHT - TextStyle::BODY.line_height()) / 2;

    b.rect(PADDING, y, INNER_WIDTH, MIN_ROW_HEIGHT, GRAY_100);
    b.text(name_x, y + text_offset, &view.columns[0], TextStyle::BODY, GRAY_700);
    for (header, right) in view.columns[1..].iter().zip(right_edges) {
        b.text_right(right, y + text_offset, header, TextStyle::BODY, GRAY_700);
    }
    y += MIN_ROW_HEIGHT;

    for row in &view.rows {
        let name_lines = wrap_text(&row.product_name, chars_that_fit(name_width, TextStyle::BODY));
        let line_step = TextStyle::BODY.line_height() + 4;
        let row_height =
            (name_lines.len() as u32 * line_step + 2 * text_offset - 4).max(MIN_ROW_HEIGHT);
        for (i, line) in name_lines.iter().enumerate() {
            let line_y = y + text_offset + i as u32 * line_step;
            b.text(name_x, line_y, line, TextStyle::BODY, GRAY_700);
        }
        let cells = [&row.unit_price, &row.quantity, &row.subtotal];
        for (cell, right) in cells.into_iter().zip(right_edges) {
            b.text_right(right, y + text_offset, cell, TextStyle::BODY, GRAY_700);
        }
        b.rect(PADDING, y + row_height - 1, INNER_WIDTH, 1, GRAY_200);
        y += row_height;
    }
    y += 32;

    // Totals
    let totals_x = RIGHT_EDGE - TOTALS_WIDTH;
    for (label, value) in [
        ("Subtotal:", view.totals.subtotal.as_str()),
        (view.totals.discount_label.as_str(), view.totals.discount_amount.as_str()),
    ] {
        b.text(totals_x, y + 8, label, TextStyle::BODY, GRAY_600);
        b.text_right(RIGHT_EDGE, y + 8, value, TextStyle::BODY, GRAY_800);
        y += 32;
    }
    b.rect(totals_x, y, TOTALS_WIDTH, 1, GRAY_300);
    b.text(totals_x, y + 12, "Total:", TextStyle::HEADING, GRAY_800);
    b.text_right(RIGHT_EDGE, y + 12, &view.totals.total, TextStyle::HEADING, INDIGO_700);
    y += 48;
    b.rect(totals_x, y, TOTALS_WIDTH, 1, GRAY_300);
    y += 32;

    // Closing note
    b.rect(PADDING, y, INNER_WIDTH, 1, GRAY_200);
    y += 24;
    b.text_centered(y, &view.thanks, TextStyle::BODY, GRAY_600);
    y += TextStyle::BODY.line_height() + 8;
    for line in wrap_text(&view.contact_note, chars_that_fit(INNER_WIDTH, TextStyle::SMALL)) {
        b.text_centered(y, &line, TextStyle::SMALL, GRAY_500);
        y += TextStyle::SMALL.line_height() + 4;
    }
    y += PADDING;

    Layout {
        width: LAYOUT_WIDTH,
        height: y,
        ops: b.ops,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusinessIdentity;
    use crate::document::{render_quotation_view, QuoteMeta};
    use crate::quotation::QuotationState;
    use crate::summary::FinancialSummary;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn view_with_items(names: &[&str], client: &str) -> DocumentView {
        let mut state = QuotationState::new();
        for name in names {
            state.add_item(name, "10", "1").unwrap();
        }
        state.set_client_name(client);
        let meta = QuoteMeta {
            quote_number: "Q-20250601-0000ABCD".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        };
        render_quotation_view(
            &state,
            &FinancialSummary::from_state(&state),
            &BusinessIdentity::default(),
            &meta,
        )
    }

    fn texts(layout: &Layout) -> Vec<&str> {
        layout
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("a bb ccc dddd", 6), vec!["a bb", "ccc", "dddd"]);
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("  spaced   out ", 20), vec!["spaced out"]);
    }

    #[test]
    fn test_layout_contains_all_sections() {
        let layout = layout_document(&view_with_items(&["Sofa", "Lamp"], "Acme Corp"));
        let texts = texts(&layout);
        for expected in [
            "Elevate Edge Interiors",
            "QUOTATION",
            "Date: June 1, 2025",
            "Quote #: Q-20250601-0000ABCD",
            "Bill To:",
            "Acme Corp",
            "Sofa",
            "Lamp",
            "Total:",
            "₹20.00",
            "Thank you for your business!",
        ] {
            assert!(texts.contains(&expected), "missing {expected:?}");
        }
        assert_eq!(layout.width, LAYOUT_WIDTH);
    }

    #[test]
    fn test_layout_grows_with_items_and_client() {
        let short = layout_document(&view_with_items(&["A"], ""));
        let with_client = layout_document(&view_with_items(&["A"], "Acme"));
        let long = layout_document(&view_with_items(&["A"; 30], ""));
        assert!(with_client.height > short.height);
        assert_eq!(long.height - short.height, 29 * MIN_ROW_HEIGHT);
    }

    #[test]
    fn test_long_names_wrap_inside_their_row() {
        let long_name = "Handcrafted solid teak wood dining table with six matching chairs";
        let single = layout_document(&view_with_items(&["A"], ""));
        let wrapped = layout_document(&view_with_items(&[long_name], ""));
        assert!(wrapped.height > single.height);
        assert!(!texts(&wrapped).contains(&long_name));
    }

    #[test]
    fn test_everything_stays_inside_the_page_width() {
        let layout = layout_document(&view_with_items(&["Sofa"], "Acme Corp"));
        for op in &layout.ops {
            if let DrawOp::Text { x, text, style, .. } = op {
                assert!(x + style.text_width(text) <= LAYOUT_WIDTH, "{text:?} overflows");
            }
        }
    }
}
