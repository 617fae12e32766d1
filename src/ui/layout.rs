/// Screen geometry in terminal cells, shared by the renderer and mouse
/// hit-testing so that what is drawn is exactly what is clickable.
///
/// Logical pixels map to cells through the configured cell size, so the
/// "No" offset (in pixels) moves the button by whole cells.

use unicode_width::UnicodeWidthStr;

use crate::config::DisplayConfig;
use crate::domain::evasion::Viewport;
use crate::sim::question::{Control, QuestionScreen};

const BUTTON_GAP: u16 = 4;
const MODAL_MAX_W: u16 = 56;
pub const MODAL_BUTTON: &str = "[ OK I'll reconsider ]";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.x && col < self.x + self.w && row >= self.y && row < self.y + self.h
    }

    pub fn right(&self) -> u16 {
        self.x + self.w
    }

    pub fn bottom(&self) -> u16 {
        self.y + self.h
    }
}

/// Terminal size plus the cell size used to convert to logical pixels.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Grid {
    pub cols: u16,
    pub rows: u16,
    pub cell_w: u16,
    pub cell_h: u16,
}

impl Grid {
    pub fn new(cols: u16, rows: u16, display: &DisplayConfig) -> Self {
        Grid { cols, rows, cell_w: display.cell_width_px.max(1), cell_h: display.cell_height_px.max(1) }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width_px: self.cols as f64 * self.cell_w as f64,
            height_px: self.rows as f64 * self.cell_h as f64,
        }
    }

    /// Logical pixel position to cell; `None` when it falls off the grid.
    pub fn cell_at(&self, x_px: f64, y_px: f64) -> Option<(u16, u16)> {
        if !x_px.is_finite() || !y_px.is_finite() || x_px < 0.0 || y_px < 0.0 {
            return None;
        }
        let col = (x_px / self.cell_w as f64) as u16;
        let row = (y_px / self.cell_h as f64) as u16;
        (col < self.cols && row < self.rows).then_some((col, row))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestionLayout {
    pub heart_row: u16,
    pub title_row: u16,
    pub accept: Rect,
    pub reject: Rect,
    pub counter_row: u16,
    pub log_top: u16,
}

/// Whole-cell growth steps for a given "Yes" scale.
fn growth(scale: f64) -> u16 {
    (((scale - 1.0) / 0.3).floor().max(0.0) as u16).min(3)
}

fn button_size(label: &str, grow: u16) -> (u16, u16) {
    (label.width() as u16 + 4 + 4 * grow, 1 + 2 * grow)
}

fn clamp_axis(pos: i32, len: u16, limit: u16) -> u16 {
    let max = limit.saturating_sub(len) as i32;
    pos.clamp(0, max.max(0)) as u16
}

pub fn question_layout(q: &QuestionScreen, grid: Grid) -> QuestionLayout {
    let mid = grid.rows / 2;
    let button_row = mid.saturating_sub(1);

    let grow = growth(q.accept_scale());
    let (aw, ah) = button_size(q.accept_label(), grow);
    let (rw, rh) = button_size(q.reject_label(), 0);

    let [left, _] = q.visual_order();
    let (left_w, right_w) = match left {
        Control::Accept => (aw, rw),
        Control::Reject => (rw, aw),
    };
    let total = left_w + BUTTON_GAP + right_w;
    let left_x = grid.cols.saturating_sub(total) / 2;
    let right_x = left_x + left_w + BUTTON_GAP;
    let (accept_x, reject_x) = match left {
        Control::Accept => (left_x, right_x),
        Control::Reject => (right_x, left_x),
    };

    let accept = Rect {
        x: accept_x,
        y: clamp_axis(button_row as i32 - (ah / 2) as i32, ah, grid.rows),
        w: aw,
        h: ah,
    };

    let off = q.offset();
    let dx = (off.dx / grid.cell_w as f64).round() as i32;
    let dy = (off.dy / grid.cell_h as f64).round() as i32;
    let reject = Rect {
        x: clamp_axis(reject_x as i32 + dx, rw, grid.cols),
        y: clamp_axis(button_row as i32 - (rh / 2) as i32 + dy, rh, grid.rows),
        w: rw,
        h: rh,
    };

    let last = grid.rows.saturating_sub(1);
    QuestionLayout {
        heart_row: mid.saturating_sub(8),
        title_row: mid.saturating_sub(6),
        accept,
        reject,
        counter_row: (mid + 5).min(last),
        log_top: (mid + 7).min(last),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModalLayout {
    pub panel: Rect,
    pub message: Vec<String>,
    pub heading_row: u16,
    pub message_top: u16,
    pub pid_row: u16,
    pub button: Rect,
}

pub fn modal_layout(message: &str, grid: Grid) -> ModalLayout {
    let w = grid.cols.saturating_sub(4).min(MODAL_MAX_W);
    let lines = wrap(message, w.saturating_sub(4) as usize);
    let h = (lines.len() as u16 + 9).min(grid.rows);
    let panel = Rect {
        x: grid.cols.saturating_sub(w) / 2,
        y: grid.rows.saturating_sub(h) / 2,
        w,
        h,
    };
    let bw = (MODAL_BUTTON.width() as u16).min(w);
    let button = Rect {
        x: panel.x + w.saturating_sub(bw) / 2,
        y: panel.bottom().saturating_sub(2),
        w: bw,
        h: 1,
    };
    ModalLayout {
        heading_row: panel.y + 2,
        message_top: panel.y + 4,
        pid_row: panel.y + 5 + lines.len() as u16,
        message: lines,
        panel,
        button,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Target {
    Accept,
    Reject,
    ModalButton,
    ModalPanel,
    Backdrop,
}

/// "No" is drawn last, so it wins any overlap.
pub fn hit_question(layout: &QuestionLayout, col: u16, row: u16) -> Target {
    if layout.reject.contains(col, row) {
        Target::Reject
    } else if layout.accept.contains(col, row) {
        Target::Accept
    } else {
        Target::Backdrop
    }
}

pub fn hit_modal(layout: &ModalLayout, col: u16, row: u16) -> Target {
    if layout.button.contains(col, row) {
        Target::ModalButton
    } else if layout.panel.contains(col, row) {
        Target::ModalPanel
    } else {
        Target::Backdrop
    }
}

/// Greedy word wrap by display width. Words longer than `width` get a line
/// of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() { word.width() } else { line.width() + 1 + word.width() };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::random::{session_rng, Scripted};
    use crate::domain::script::DEFAULT;
    use std::time::Duration;

    const GRID: Grid = Grid { cols: 120, rows: 40, cell_w: 8, cell_h: 16 };

    fn screen() -> QuestionScreen {
        QuestionScreen::new(&DEFAULT, Duration::from_millis(1500), &mut Scripted::constant(0.5))
    }

    #[test]
    fn viewport_scales_cells_to_pixels() {
        let v = GRID.viewport();
        assert_eq!(v.width_px, 960.0);
        assert_eq!(v.height_px, 640.0);
        let narrow = Grid { cols: 79, ..GRID };
        assert!(narrow.viewport().is_narrow());
        assert_eq!(GRID.cell_at(17.0, 33.0), Some((2, 2)));
        assert_eq!(GRID.cell_at(-1.0, 0.0), None);
    }

    #[test]
    fn fresh_layout_puts_yes_left_of_no() {
        let q = screen();
        let l = question_layout(&q, GRID);
        assert!(l.accept.right() + BUTTON_GAP == l.reject.x);
        assert_eq!(l.accept.y, l.reject.y);
        assert_eq!(hit_question(&l, l.accept.x, l.accept.y), Target::Accept);
        assert_eq!(hit_question(&l, l.reject.x + 1, l.reject.y), Target::Reject);
        assert_eq!(hit_question(&l, 0, 0), Target::Backdrop);
    }

    #[test]
    fn click_target_follows_the_swap() {
        let mut q = screen();
        let mut rng = Scripted::constant(0.5);
        q.reject(GRID.viewport().width_px, &mut rng);
        q.reject(GRID.viewport().width_px, &mut rng);
        let l = question_layout(&q, GRID);
        assert!(l.reject.x < l.accept.x);
        assert_eq!(hit_question(&l, l.accept.x, l.accept.y), Target::Accept);
    }

    #[test]
    fn click_target_follows_the_offset() {
        let mut q = screen();
        let base = question_layout(&q, GRID);
        // u = 0.9, 0.1 on a 960 px viewport: dx = +80 px, dy = -60 px.
        q.reject(GRID.viewport().width_px, &mut Scripted::new(&[0.9, 0.1]));
        let l = question_layout(&q, GRID);
        assert_eq!(l.reject.x, l.accept.right() + BUTTON_GAP + 10);
        assert_eq!(l.reject.y as i32, base.reject.y as i32 - 4);
        assert_eq!(hit_question(&l, base.reject.x, base.reject.y), Target::Backdrop);
    }

    #[test]
    fn yes_grows_with_rejections() {
        let mut q = screen();
        let mut rng = session_rng(Some(1));
        let w0 = question_layout(&q, GRID).accept.w;
        for _ in 0..4 {
            q.reject(GRID.viewport().width_px, &mut rng);
        }
        let l = question_layout(&q, GRID);
        assert!(l.accept.w > w0);
        assert_eq!(l.accept.h, 1 + 2 * growth(q.accept_scale()));
    }

    #[test]
    fn buttons_stay_on_screen_when_tiny() {
        let mut q = screen();
        let tiny = Grid { cols: 20, rows: 6, cell_w: 8, cell_h: 16 };
        q.reject(tiny.viewport().width_px, &mut Scripted::constant(0.999));
        let l = question_layout(&q, tiny);
        assert!(l.reject.right() <= tiny.cols.max(l.reject.w));
        assert!(l.reject.bottom() <= tiny.rows);
    }

    #[test]
    fn modal_hit_regions() {
        let m = modal_layout(DEFAULT.errors[3], GRID);
        assert!(m.panel.contains(m.button.x, m.button.y));
        assert_eq!(hit_modal(&m, m.button.x + 2, m.button.y), Target::ModalButton);
        assert_eq!(hit_modal(&m, m.panel.x + 1, m.panel.y + 1), Target::ModalPanel);
        assert_eq!(hit_modal(&m, 0, 0), Target::Backdrop);
        assert!(m.pid_row < m.button.y);
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
        assert_eq!(wrap("", 10), Vec::<String>::new());
        assert_eq!(wrap("supercalifragilistic", 5), vec!["supercalifragilistic"]);
    }
}
