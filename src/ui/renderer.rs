/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer (grid of Cells)
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Emit terminal commands only for cells that changed
///   4. Batch everything with `queue!` and flush once
///   5. Swap front/back
///
/// Text is split into grapheme clusters and measured with unicode-width,
/// so emoji take two columns and ZWJ sequences stay in one cell.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::config::DisplayConfig;
use crate::domain::script::MAX_ATTEMPTS;
use crate::sim::card::{Card, Screen};
use crate::sim::celebration::CelebrationScreen;
use crate::sim::confetti::Rgb;
use crate::sim::question::{Control, QuestionScreen};
use super::layout::{self, Grid, ModalLayout, Rect, MODAL_BUTTON};

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 26, g: 16, b: 30 };
const TEXT: Color = Color::Rgb { r: 255, g: 234, b: 242 };
const DIM: Color = Color::Rgb { r: 140, g: 100, b: 130 };
const PINK: Color = Color::Rgb { r: 232, g: 67, b: 147 };
const ROSE: Color = Color::Rgb { r: 253, g: 121, b: 168 };
const NO_BG: Color = Color::Rgb { r: 90, g: 90, b: 104 };
const FOCUS: Color = Color::Rgb { r: 255, g: 234, b: 167 };
const MODAL_BG: Color = Color::Rgb { r: 58, g: 20, b: 28 };
const MODAL_BAR: Color = Color::Rgb { r: 200, g: 40, b: 60 };
const TERM_BG: Color = Color::Rgb { r: 12, g: 12, b: 16 };
const TERM_FG: Color = Color::Rgb { r: 120, g: 255, b: 140 };

const HINT_ASKING: &str = "Y yes · N no · ←→ focus · Enter select · Q quit";
const HINT_CELEBRATING: &str = "Enter / Esc / Q to close";
const TERMINAL_TITLE: &str = "love_terminal v1.4.2";

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 16],  // one grapheme cluster, up to 16 bytes
    ch_len: u8,
    fg: Color,
    bg: Color,
    bold: bool,
    wide: bool,    // occupies 2 terminal columns
    cont: bool,    // right half of a wide cell, never printed
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: TEXT,
        bg: BASE_BG,
        bold: false,
        wide: false,
        cont: false,
    };

    /// Never equal to a real cell, so a back buffer full of these forces a
    /// full repaint.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        bold: false,
        wide: false,
        cont: false,
    };

    fn glyph(g: &str, fg: Color, bg: Color, bold: bool) -> Self {
        let mut cell = Self::BLANK;
        let bytes = g.as_bytes();
        let len = bytes.len().min(cell.ch.len());
        cell.ch[..len].copy_from_slice(&bytes[..len]);
        cell.ch_len = len as u8;
        cell.fg = fg;
        cell.bg = bg;
        cell.bold = bold;
        cell
    }

    fn space(bg: Color) -> Self {
        Cell { bg, ..Self::BLANK }
    }

    fn continuation(bg: Color) -> Self {
        Cell { ch: [0; 16], ch_len: 0, bg, cont: true, ..Self::BLANK }
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Store a cell, repairing any wide glyph it cuts in half.
    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = y * self.width + x;
        let old = self.cells[i];
        if old.cont && x > 0 {
            self.cells[i - 1] = Cell::space(self.cells[i - 1].bg);
        }
        if old.wide && x + 1 < self.width && !cell.wide {
            self.cells[i + 1] = Cell::space(self.cells[i + 1].bg);
        }
        self.cells[i] = cell;
    }

    /// Background colour at a position, for text drawn over existing fills.
    fn bg_at(&self, x: usize, y: usize) -> Color {
        self.get(x, y).bg
    }

    /// Write `s` starting at column `x`. Returns the column after the last
    /// glyph written.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Option<Color>, bold: bool) -> usize {
        let mut cx = x;
        for g in s.graphemes(true) {
            let w = g.width();
            if w == 0 {
                continue;
            }
            if cx + w > self.width {
                break;
            }
            let bg = bg.unwrap_or_else(|| self.bg_at(cx, y));
            let mut cell = Cell::glyph(g, fg, bg, bold);
            if w >= 2 {
                cell.wide = true;
                self.set(cx, y, cell);
                self.set(cx + 1, y, Cell::continuation(bg));
                cx += 2;
            } else {
                self.set(cx, y, cell);
                cx += 1;
            }
        }
        cx
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Option<Color>, bold: bool) {
        let x = self.width.saturating_sub(s.width()) / 2;
        self.put_str(x, y, s, fg, bg, bold);
    }

    fn fill(&mut self, r: Rect, bg: Color) {
        for y in r.y as usize..r.bottom() as usize {
            for x in r.x as usize..r.right() as usize {
                self.set(x, y, Cell::space(bg));
            }
        }
    }

    fn frame(&mut self, r: Rect, fg: Color, bg: Color) {
        if r.w < 2 || r.h < 2 {
            return;
        }
        let (x0, y0) = (r.x as usize, r.y as usize);
        let (x1, y1) = (r.right() as usize - 1, r.bottom() as usize - 1);
        for x in x0 + 1..x1 {
            self.set(x, y0, Cell::glyph("─", fg, bg, false));
            self.set(x, y1, Cell::glyph("─", fg, bg, false));
        }
        for y in y0 + 1..y1 {
            self.set(x0, y, Cell::glyph("│", fg, bg, false));
            self.set(x1, y, Cell::glyph("│", fg, bg, false));
        }
        self.set(x0, y0, Cell::glyph("╭", fg, bg, false));
        self.set(x1, y0, Cell::glyph("╮", fg, bg, false));
        self.set(x0, y1, Cell::glyph("╰", fg, bg, false));
        self.set(x1, y1, Cell::glyph("╯", fg, bg, false));
    }
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

fn pct(p: f64, extent: u16) -> usize {
    ((p / 100.0) * extent as f64).clamp(0.0, extent.saturating_sub(1) as f64) as usize
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: u16,
    term_h: u16,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        self.sync_size()?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            SetAttribute(Attribute::Reset),
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Current terminal grid. Picks up resizes and schedules a full repaint.
    pub fn grid(&mut self, display: &DisplayConfig) -> io::Result<Grid> {
        self.sync_size()?;
        Ok(Grid::new(self.term_w, self.term_h, display))
    }

    fn sync_size(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw != self.term_w || th != self.term_h {
            self.term_w = tw;
            self.term_h = th;
            self.front.resize(tw as usize, th as usize);
            self.back.resize(tw as usize, th as usize);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    pub fn render(&mut self, card: &Card, grid: Grid, recipient: &str) -> io::Result<()> {
        self.front.clear();
        match card.screen() {
            Screen::Asking(q) => {
                self.compose_question(q, grid);
                if q.error().is_visible() {
                    let modal = layout::modal_layout(q.error().message(), grid);
                    self.compose_modal(&modal, q.error().process_id());
                }
            }
            Screen::Celebrating(c) => self.compose_celebration(c, grid, recipient),
        }
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = TEXT;
        let mut last_bg = BASE_BG;
        let mut last_bold = false;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(
            self.writer,
            SetAttribute(Attribute::NormalIntensity),
            SetForegroundColor(last_fg),
            SetBackgroundColor(last_bg),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev {
                        need_move = true;
                    }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.bold != last_bold {
                    let attr = if cell.bold { Attribute::Bold } else { Attribute::NormalIntensity };
                    queue!(self.writer, SetAttribute(attr))?;
                    last_bold = cell.bold;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Question screen ──

    fn compose_question(&mut self, q: &QuestionScreen, grid: Grid) {
        let l = layout::question_layout(q, grid);

        for d in q.backdrop() {
            let x = pct(d.left_pct, grid.cols);
            let y = pct(d.top_pct, grid.rows);
            self.front.put_str(x, y, d.symbol, DIM, None, false);
        }

        self.front.put_centered(l.heart_row as usize, "💝", PINK, None, false);
        self.front.put_centered(l.title_row as usize, q.question(), ROSE, None, true);

        let focus = q.focus();
        self.compose_button(l.accept, q.accept_label(), PINK, focus == Control::Accept);
        self.compose_button(l.reject, q.reject_label(), NO_BG, focus == Control::Reject);

        if q.attempts() > 0 {
            let counter = format!(
                "Failed rejection attempts: {}/{} | Success probability: 100%",
                q.attempts().min(MAX_ATTEMPTS),
                MAX_ATTEMPTS,
            );
            self.front.put_centered(l.counter_row as usize, &counter, DIM, None, false);
        }

        let log_x = grid.cols.saturating_sub(60) as usize / 2;
        for (i, entry) in q.status_log().iter().enumerate() {
            let row = l.log_top as usize + i;
            if row + 1 >= grid.rows as usize {
                break;
            }
            let line = format!("[{}] {}", entry.stamp(), entry.text);
            self.front.put_str(log_x, row, &line, TERM_FG, None, false);
        }

        let hint_row = grid.rows.saturating_sub(1) as usize;
        self.front.put_centered(hint_row, HINT_ASKING, DIM, None, false);
    }

    fn compose_button(&mut self, r: Rect, label: &str, bg: Color, focused: bool) {
        self.front.fill(r, bg);
        let mid_y = r.y as usize + r.h as usize / 2;
        let lx = r.x as usize + (r.w as usize).saturating_sub(label.width()) / 2;
        self.front.put_str(lx, mid_y, label, TEXT, Some(bg), true);
        if focused {
            if r.x > 0 {
                self.front.put_str(r.x as usize - 1, mid_y, "▶", FOCUS, None, true);
            }
            self.front.put_str(r.right() as usize, mid_y, "◀", FOCUS, None, true);
        }
    }

    fn compose_modal(&mut self, m: &ModalLayout, pid: u32) {
        self.front.fill(m.panel, MODAL_BG);
        self.front.frame(m.panel, MODAL_BAR, MODAL_BG);

        let p = m.panel;
        let title = " valentine_error.exe ";
        // Title bar only when there is room for it beside the close glyph.
        if p.w as usize >= title.width() + 7 {
            self.front.put_str(p.x as usize + 2, p.y as usize, title, TEXT, Some(MODAL_BAR), true);
        }
        if p.w >= 8 {
            self.front.put_str(p.right() as usize - 5, p.y as usize, " ✕ ", TEXT, Some(MODAL_BAR), true);
        }

        let center = |s: &str| p.x as usize + (p.w as usize).saturating_sub(s.width()) / 2;
        let heading = "⚠️ SYSTEM ERROR";
        self.front.put_str(center(heading), m.heading_row as usize, heading, FOCUS, None, true);
        for (i, line) in m.message.iter().enumerate() {
            self.front.put_str(center(line), m.message_top as usize + i, line, TEXT, None, false);
        }
        let pid_line = format!("Process ID: {pid} | Exit code: 💔");
        self.front.put_str(center(&pid_line), m.pid_row as usize, &pid_line, DIM, None, false);

        self.front.fill(m.button, MODAL_BAR);
        self.front.put_str(m.button.x as usize, m.button.y as usize, MODAL_BUTTON, TEXT, Some(MODAL_BAR), true);
    }

    // ── Celebration screen ──

    fn compose_celebration(&mut self, c: &CelebrationScreen, grid: Grid, recipient: &str) {
        let now = c.hearts().now();
        for h in c.hearts().hearts() {
            if let Some(progress) = h.progress(now) {
                let travel = (grid.rows as f64 + 2.0) * progress;
                let y = grid.rows as f64 - travel;
                if y >= 0.0 && progress < 1.0 {
                    let x = pct(h.left_pct, grid.cols);
                    let fg = if h.id % 2 == 0 { PINK } else { ROSE };
                    self.front.put_str(x, y as usize, h.symbol, fg, None, h.size_px >= 28.0);
                }
            }
        }

        let t = c.elapsed().as_secs_f64();
        for s in c.sparkles() {
            let phase = ((t + s.delay) * 1.5) as u64;
            if phase % 2 == 0 {
                self.front.put_str(pct(s.left_pct, grid.cols), pct(s.top_pct, grid.rows), s.symbol, FOCUS, None, false);
            }
        }

        let top = (grid.rows / 2).saturating_sub(10) as usize;
        self.front.put_centered(top, "💖", PINK, None, true);
        self.front.put_centered(top + 2, "EXCELLENT DECISION", ROSE, None, true);
        let line = format!("{recipient} & You are now officially Valentines! 🎉");
        self.front.put_centered(top + 4, &line, TEXT, None, false);

        self.compose_terminal(c, grid, top + 6);

        for p in c.confetti().particles() {
            if let Some((x, y)) = grid.cell_at(p.x, p.y) {
                let mut fg = rgb(p.color);
                if p.life() < 0.25 {
                    fg = DIM;
                }
                let mut buf = [0u8; 4];
                self.front.put_str(x as usize, y as usize, p.glyph.encode_utf8(&mut buf), fg, None, false);
            }
        }

        let hint_row = grid.rows.saturating_sub(1) as usize;
        self.front.put_centered(hint_row, HINT_CELEBRATING, DIM, None, false);
    }

    fn compose_terminal(&mut self, c: &CelebrationScreen, grid: Grid, top: usize) {
        let inner_w = c.jokes().iter().map(|j| j.width() + 2).max().unwrap_or(0).max(TERMINAL_TITLE.width() + 8);
        let w = (inner_w as u16 + 4).min(grid.cols);
        let h = (c.jokes().len() as u16 + 5).min(grid.rows.saturating_sub(top as u16));
        let panel = Rect { x: grid.cols.saturating_sub(w) / 2, y: top as u16, w, h };
        if panel.h < 3 {
            return;
        }

        self.front.fill(panel, TERM_BG);
        self.front.frame(panel, DIM, TERM_BG);
        let x = panel.x as usize + 2;
        self.front.put_str(x, top, &format!(" {TERMINAL_TITLE} "), TEXT, Some(TERM_BG), true);

        let body = top + 2;
        let last = panel.bottom() as usize - 1;
        for (i, joke) in c.jokes().iter().take(c.visible_jokes()).enumerate() {
            if body + i >= last {
                break;
            }
            self.front.put_str(x, body + i, &format!("> {joke}"), TERM_FG, Some(TERM_BG), false);
        }
        let sign_row = body + c.jokes().len();
        if c.sign_off_visible() && sign_row < last {
            self.front.put_str(x, sign_row, c.sign_off(), ROSE, Some(TERM_BG), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(fb: &FrameBuffer, y: usize) -> String {
        (0..fb.width)
            .map(|x| fb.get(x, y))
            .filter(|c| !c.cont)
            .map(|c| c.as_str().to_string())
            .collect()
    }

    #[test]
    fn emoji_take_two_columns() {
        let mut fb = FrameBuffer::new(10, 1);
        let end = fb.put_str(0, 0, "a💖b", TEXT, None, false);
        assert_eq!(end, 4);
        assert!(fb.get(1, 0).wide);
        assert!(fb.get(2, 0).cont);
        assert_eq!(row_text(&fb, 0).trim_end(), "a💖b");
    }

    #[test]
    fn zwj_sequence_stays_in_one_cell() {
        let mut fb = FrameBuffer::new(10, 1);
        fb.put_str(0, 0, "🏃‍♂️!", TEXT, None, false);
        assert_eq!(fb.get(0, 0).as_str(), "🏃‍♂️");
        assert!(fb.get(0, 0).wide);
    }

    #[test]
    fn overwriting_half_a_wide_glyph_clears_the_other_half() {
        let mut fb = FrameBuffer::new(6, 1);
        fb.put_str(0, 0, "💖", TEXT, None, false);
        fb.set(1, 0, Cell::glyph("x", TEXT, BASE_BG, false));
        assert_eq!(fb.get(0, 0).as_str(), " ");
        assert_eq!(fb.get(1, 0).as_str(), "x");
    }

    #[test]
    fn text_clips_at_the_edge() {
        let mut fb = FrameBuffer::new(3, 1);
        let end = fb.put_str(1, 0, "a💖", TEXT, None, false);
        assert_eq!(end, 2);
        assert_eq!(row_text(&fb, 0), " a ");
    }

    fn modal_on(cols: u16) -> Renderer {
        let grid = Grid { cols, rows: 20, cell_w: 8, cell_h: 16 };
        let mut r = Renderer::new();
        r.front.resize(cols as usize, 20);
        let m = layout::modal_layout(crate::domain::script::DEFAULT.errors[3], grid);
        r.compose_modal(&m, 42);
        r
    }

    #[test]
    fn modal_draws_on_a_sliver_of_terminal() {
        for cols in 0..=8 {
            modal_on(cols);
        }
    }

    #[test]
    fn modal_title_bar_on_a_normal_terminal() {
        let r = modal_on(80);
        let m = layout::modal_layout(crate::domain::script::DEFAULT.errors[3], Grid { cols: 80, rows: 20, cell_w: 8, cell_h: 16 });
        let bar = row_text(&r.front, m.panel.y as usize);
        assert!(bar.contains("valentine_error.exe"));
        assert!(bar.contains('✕'));
    }

    #[test]
    fn text_inherits_fill_background() {
        let mut fb = FrameBuffer::new(8, 2);
        fb.fill(Rect { x: 0, y: 0, w: 8, h: 1 }, MODAL_BG);
        fb.put_str(2, 0, "hi", TEXT, None, false);
        assert_eq!(fb.get(2, 0).bg, MODAL_BG);
        assert_eq!(fb.get(2, 1).bg, BASE_BG);
    }
}
