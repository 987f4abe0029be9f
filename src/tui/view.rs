//! Pure rendering: map App state to ratatui widgets.
//!
//! The plain screen is a list of lines (header chrome, body, cursor glyph)
//! trimmed to the tail that fits in the frame. Interludes either replace
//! it (matrix rain) or overlay it (network error). Nothing here mutates
//! the app.

use humansize::{BINARY, format_size};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Gauge, Paragraph, Widget};
use unicode_width::UnicodeWidthChar;

use super::state::{App, Interlude, NETWORK_ERRORS};
use super::theme;

/// Glyph appended after the body.
pub const CURSOR_GLYPH: &str = "_";

/// Prompt shown before the first keystroke and in the decrypt header.
pub const PROMPT: &str = "C:\\HACK>";

/// Tabs are expanded so column counting stays simple.
const TAB_WIDTH: usize = 4;

const BOOT_BANNER: &[&str] = &[
    "C:\\>HACK.EXE",
    "Microsoft(R) MS-DOS(R) Version 6.22",
    "(C)Copyright Microsoft Corp 1981-1994.",
    "",
    "Initializing system breach protocol...",
    "Establishing secure connection...",
    "",
];

/// Glyph pool for the rain: half-width katakana, digits and a few symbols.
const RAIN_GLYPHS: &[char] = &[
    'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ', 'ｹ', 'ｺ', 'ｻ', 'ｼ', 'ｽ', 'ｾ', 'ｿ', 'ﾀ', 'ﾁ', 'ﾂ', 'ﾃ',
    'ﾄ', 'ﾅ', 'ﾆ', 'ﾇ', 'ﾈ', 'ﾉ', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', '=', '*',
    '+', '<', '>', '|',
];

// ============================================================================
// DISPATCH
// ============================================================================

/// Render the current state to the terminal frame.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    if let Some(Interlude::MatrixRain { seed, frame: tick, .. }) = &app.interlude {
        frame.render_widget(MatrixRain::new(*seed, *tick), area);
        return;
    }

    let lines = screen_lines(app, usize::from(area.width));
    frame.render_widget(Paragraph::new(tail(lines, usize::from(area.height))), area);

    if let Some(interlude) = &app.interlude {
        if let Interlude::NetworkError { variant, .. } = interlude {
            render_network_error(*variant, interlude.progress(), frame, area);
        }
    }
}

// ============================================================================
// PLAIN SCREEN
// ============================================================================

/// All lines of the plain screen, wrapped to `width`.
pub fn screen_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    if app.is_booting() {
        let mut lines: Vec<Line<'static>> = BOOT_BANNER
            .iter()
            .map(|text| Line::styled(*text, theme::STYLE_CHROME))
            .collect();
        lines.push(prompt_line());
        return lines;
    }

    let mut lines = header_lines(app);
    lines.extend(body_lines(app.engine.revealed(), width));
    lines.push(Line::from(Span::styled(CURSOR_GLYPH, theme::STYLE_CURSOR)));
    lines
}

fn prompt_line() -> Line<'static> {
    Line::from(vec![
        Span::styled(PROMPT, theme::STYLE_CHROME),
        Span::styled(CURSOR_GLYPH, theme::STYLE_CURSOR),
    ])
}

fn header_lines(app: &App) -> Vec<Line<'static>> {
    vec![
        Line::styled(format!("{PROMPT}DECRYPT.EXE {}", app.payload.name), theme::STYLE_CHROME),
        Line::styled(
            format!(
                "SCANNING NETWORK... [{}]",
                format_size(app.payload.size_bytes, BINARY)
            ),
            theme::STYLE_CHROME,
        ),
        Line::default(),
    ]
}

/// Revealed text split into display lines.
///
/// Each line break in the text ends a line; a chunk that stops mid-line
/// simply leaves the last line partial. Long lines are hard-wrapped.
pub fn body_lines(text: &str, width: usize) -> Vec<Line<'static>> {
    text.lines()
        .flat_map(|line| wrap_line(&line.replace('\t', &" ".repeat(TAB_WIDTH)), width))
        .map(|segment| Line::styled(segment, theme::STYLE_BODY))
        .collect()
}

/// Split a line into segments at most `width` terminal columns wide.
///
/// Double-width glyphs count as two columns and are never split across
/// segments; zero-width marks stay with the glyph before them. An empty
/// line stays one empty segment.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut used = 0;

    for c in line.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width && !current.is_empty() {
            segments.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(c);
        used += w;
    }

    if !current.is_empty() || segments.is_empty() {
        segments.push(current);
    }
    segments
}

/// Keep the last `height` lines, so the newest text is always visible.
pub fn tail<T>(mut lines: Vec<T>, height: usize) -> Vec<T> {
    let skip = lines.len().saturating_sub(height);
    lines.drain(..skip);
    lines
}

// ============================================================================
// NETWORK ERROR
// ============================================================================

fn render_network_error(variant: usize, progress: f64, frame: &mut Frame, area: Rect) {
    let (headline, detail, retry) = NETWORK_ERRORS[variant % NETWORK_ERRORS.len()];

    let popup = centered(area, 56, 7);
    let block = Block::bordered()
        .title(" SYSTEM ALERT ")
        .border_style(theme::STYLE_ALERT);
    let inner = block.inner(popup);

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    let rows = Layout::vertical([
        Constraint::Length(1), // headline
        Constraint::Length(1), // detail
        Constraint::Length(1), // spacer
        Constraint::Length(1), // gauge
        Constraint::Min(0),
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(Line::styled(format!("!! {headline} !!"), theme::STYLE_ALERT)),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Line::styled(detail, theme::STYLE_ALERT_DETAIL)),
        rows[1],
    );

    let percent = (progress * 100.0).round() as u16;
    let gauge = Gauge::default()
        .gauge_style(theme::STYLE_PROGRESS)
        .ratio(progress.clamp(0.0, 1.0))
        .label(format!("{retry}... {percent}%"));
    frame.render_widget(gauge, rows[3]);
}

/// A `width`×`height` rectangle centred in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

// ============================================================================
// MATRIX RAIN
// ============================================================================

/// Falling glyph columns, fully determined by `seed` and `frame`.
#[derive(Debug, Clone, Copy)]
pub struct MatrixRain {
    seed: u64,
    frame: u32,
}

impl MatrixRain {
    pub fn new(seed: u64, frame: u32) -> Self {
        MatrixRain { seed, frame }
    }

    /// Glyph and style for one cell, or None for empty space.
    fn cell(&self, x: u16, y: u16, height: u16) -> Option<(char, ratatui::style::Style)> {
        let column = mix(self.seed ^ u64::from(x).wrapping_mul(0x9e37_79b9_7f4a_7c15));
        let height = u64::from(height.max(1));
        let trail = 4 + column % height.max(4);
        let speed = 1 + (column >> 8) % 3;
        let span = height + trail;
        let head = ((column >> 16) + u64::from(self.frame) * speed) % span;

        let y = u64::from(y);
        if y > head {
            return None;
        }
        let distance = head - y;
        let style = match distance {
            0 => theme::STYLE_RAIN_HEAD,
            d if d < trail / 2 => theme::STYLE_RAIN_TRAIL,
            d if d < trail => theme::STYLE_RAIN_FADE,
            _ => return None,
        };

        // Glyphs flicker every few frames
        let flicker = u64::from(self.frame / 4);
        let pick = mix(column ^ (y << 32) ^ flicker) as usize % RAIN_GLYPHS.len();
        Some((RAIN_GLYPHS[pick], style))
    }
}

impl Widget for MatrixRain {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in 0..area.height {
            for x in 0..area.width {
                let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) else {
                    continue;
                };
                match self.cell(x, y, area.height) {
                    Some((glyph, style)) => {
                        cell.set_char(glyph).set_style(style);
                    }
                    None => {
                        cell.set_char(' ');
                    }
                }
            }
        }
    }
}

/// SplitMix64 finaliser: cheap, well-spread hash for cosmetic noise.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::RevealEngine;
    use crate::tui::state::InterludePolicy;
    use crate::types::{ChunkSize, Payload};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn app_with(text: &str, chunk: i64) -> App {
        let engine = RevealEngine::from_text(text, ChunkSize::new(chunk)).unwrap();
        App::new(engine, Payload::new("hackertext1.txt", 2048), InterludePolicy::disabled())
    }

    fn press(app: &mut App, times: usize) {
        for _ in 0..times {
            app.engine.advance();
            app.keystrokes += 1;
        }
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn texts(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(line_text).collect()
    }

    fn draw(app: &App, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(app, f)).unwrap();
        let buffer = terminal.backend().buffer();
        let symbols: Vec<&str> = buffer.content.iter().map(|c| c.symbol()).collect();
        symbols
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.concat().trim_end().to_string())
            .collect()
    }

    // -- Plain screen --

    #[test]
    fn boot_screen_shows_banner_and_prompt() {
        let app = app_with("secret", 5);
        let lines = texts(&screen_lines(&app, 80));

        assert_eq!(lines.first().map(String::as_str), Some("C:\\>HACK.EXE"));
        assert!(lines.iter().any(|l| l.contains("MS-DOS")));
        assert_eq!(lines.last().map(String::as_str), Some("C:\\HACK>_"));
        assert!(!lines.iter().any(|l| l.contains("secret")));
    }

    #[test]
    fn decrypt_screen_has_header_body_and_cursor() {
        let mut app = app_with("ABCDEFGHIJ", 5);
        press(&mut app, 1);
        let lines = texts(&screen_lines(&app, 80));

        assert_eq!(lines[0], "C:\\HACK>DECRYPT.EXE hackertext1.txt");
        assert!(lines[1].starts_with("SCANNING NETWORK... ["));
        assert!(lines[1].contains("KiB"));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "ABCDE");
        assert_eq!(lines[4], CURSOR_GLYPH);
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn body_is_split_on_line_breaks_regardless_of_chunking() {
        let mut app = app_with("one\ntwo\nthree", 6);
        press(&mut app, 1); // "one\ntw"
        let lines = texts(&screen_lines(&app, 80));
        assert_eq!(&lines[3..], &["one", "tw", CURSOR_GLYPH]);
    }

    #[test]
    fn trailing_line_break_adds_no_empty_line() {
        let lines = texts(&body_lines("a\n\nb\n", 80));
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn body_uses_body_style() {
        let lines = body_lines("x", 80);
        assert_eq!(lines[0].style.fg, theme::STYLE_BODY.fg);
    }

    #[test]
    fn tabs_are_expanded() {
        let lines = texts(&body_lines("\tx", 80));
        assert_eq!(lines, vec!["    x"]);
    }

    #[test]
    fn long_lines_are_hard_wrapped() {
        assert_eq!(wrap_line("abcdefg", 3), vec!["abc", "def", "g"]);
        assert_eq!(wrap_line("", 3), vec![""]);
        assert_eq!(wrap_line("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn wide_glyphs_wrap_by_column() {
        assert_eq!(wrap_line("漢字漢字", 4), vec!["漢字", "漢字"]);
        // A wide glyph that would straddle the edge moves to the next segment
        assert_eq!(wrap_line("a漢字", 4), vec!["a漢", "字"]);
        // Combining marks add no width
        assert_eq!(wrap_line("e\u{301}e\u{301}", 2), vec!["e\u{301}e\u{301}"]);
    }

    #[test]
    fn wide_text_stays_fully_visible() {
        let text = format!("{}ABCD", "漢".repeat(20));
        let mut app = app_with(&text, 1000);
        press(&mut app, 1);

        let rows = draw(&app, 20, 10);
        let han: usize = rows.iter().map(|r| r.matches('漢').count()).sum();
        assert_eq!(han, 20);
        assert!(rows.iter().any(|r| r == "ABCD"));
    }

    #[test]
    fn tail_keeps_newest_lines() {
        assert_eq!(tail(vec![1, 2, 3, 4, 5], 2), vec![4, 5]);
        assert_eq!(tail(vec![1, 2], 10), vec![1, 2]);
        assert!(tail(vec![1, 2], 0).is_empty());
    }

    #[test]
    fn rendering_does_not_change_state() {
        let mut app = app_with("ABCDEFGHIJ", 5);
        press(&mut app, 1);
        let before = (app.engine.cursor(), app.engine.revealed().to_string(), app.keystrokes);
        draw(&app, 40, 10);
        draw(&app, 40, 10);
        assert_eq!(before, (app.engine.cursor(), app.engine.revealed().to_string(), app.keystrokes));
    }

    #[test]
    fn frame_shows_bottom_of_long_body() {
        let text: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let mut app = app_with(&text, 10_000);
        press(&mut app, 1);

        let rows = draw(&app, 30, 5);
        assert_eq!(rows[3], "line 29");
        assert_eq!(rows[4], CURSOR_GLYPH);
        assert!(!rows.iter().any(|r| r.contains("DECRYPT")));
    }

    // -- Interludes --

    #[test]
    fn network_error_overlays_alert() {
        let mut app = app_with("ABCDEFGHIJ", 5);
        press(&mut app, 1);
        app.interlude = Some(Interlude::NetworkError { variant: 0, frame: 5, frames: 10 });

        let rows = draw(&app, 70, 20);
        let screen = rows.join("\n");
        assert!(screen.contains("SYSTEM ALERT"));
        assert!(screen.contains(NETWORK_ERRORS[0].0));
        assert!(screen.contains("50%"));
    }

    #[test]
    fn matrix_rain_replaces_plain_screen() {
        let mut app = app_with("ABCDEFGHIJ", 5);
        press(&mut app, 1);
        app.interlude = Some(Interlude::matrix_rain(1234, 40));

        let rows = draw(&app, 40, 12);
        let screen = rows.join("\n");
        assert!(!screen.contains("DECRYPT"));
        assert!(!screen.contains("ABCDE"));
    }

    #[test]
    fn matrix_rain_is_deterministic_per_frame() {
        let rain = MatrixRain::new(99, 17);
        for x in 0..20 {
            for y in 0..10 {
                assert_eq!(rain.cell(x, y, 10), MatrixRain::new(99, 17).cell(x, y, 10));
            }
        }
    }

    #[test]
    fn matrix_rain_lights_up_some_cells() {
        let lit = (0..60u32)
            .flat_map(|frame| {
                let rain = MatrixRain::new(7, frame);
                (0..40u16).flat_map(move |x| (0..12u16).map(move |y| rain.cell(x, y, 12)))
            })
            .filter(Option::is_some)
            .count();
        assert!(lit > 0);
    }

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 20, 5);
        let popup = centered(area, 56, 7);
        assert_eq!(popup, Rect::new(0, 0, 20, 5));

        let roomy = centered(Rect::new(0, 0, 100, 40), 56, 7);
        assert_eq!(roomy, Rect::new(22, 16, 56, 7));
    }

    #[test]
    fn tiny_frame_does_not_panic() {
        let mut app = app_with("ABCDEFGHIJ", 5);
        press(&mut app, 1);
        app.interlude = Some(Interlude::network_error(2, 10));
        draw(&app, 3, 2);
        app.interlude = Some(Interlude::matrix_rain(5, 10));
        draw(&app, 1, 1);
    }
}
