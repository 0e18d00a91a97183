use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::canvas::{Canvas, Context, Points};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use course_core::model::CompletionSplit;

const DONE_COLOR: Color = Color::Green;
const NOT_DONE_COLOR: Color = Color::Red;

/// Two-slice pie of done vs. not-done time, drawn on a braille canvas with
/// hour totals and percentages in the slice labels.
pub struct CompletionPie<'a> {
    split: &'a CompletionSplit,
}

impl<'a> CompletionPie<'a> {
    #[must_use]
    pub fn new(split: &'a CompletionSplit) -> Self {
        Self { split }
    }

    fn slice_label(name: &str, hours: f64, fraction: f64) -> String {
        format!("{name} ({hours:.1}h) {:.1}%", fraction * 100.0)
    }

    fn paint(ctx: &mut Context<'_>, split: &CompletionSplit) {
        let done_fraction = split.done_fraction();

        let mut done_points = Vec::new();
        let mut not_done_points = Vec::new();

        // Sample the unit disc; a point belongs to the done slice when its
        // angle, measured clockwise from twelve o'clock, falls inside the
        // done fraction of the full turn.
        let steps = 120;
        for ix in -steps..=steps {
            for iy in -steps..=steps {
                let x = f64::from(ix) / f64::from(steps);
                let y = f64::from(iy) / f64::from(steps);
                if x * x + y * y > 1.0 {
                    continue;
                }
                let turn = (x.atan2(y) / std::f64::consts::TAU).rem_euclid(1.0);
                if turn < done_fraction {
                    done_points.push((x, y));
                } else {
                    not_done_points.push((x, y));
                }
            }
        }

        ctx.draw(&Points {
            coords: &done_points,
            color: DONE_COLOR,
        });
        ctx.draw(&Points {
            coords: &not_done_points,
            color: NOT_DONE_COLOR,
        });

        ctx.print(
            -1.9,
            1.15,
            Line::styled(
                Self::slice_label("Done", split.done_hours(), done_fraction),
                Style::default().fg(DONE_COLOR),
            ),
        );
        ctx.print(
            -1.9,
            -1.15,
            Line::styled(
                Self::slice_label("Not Done", split.not_done_hours(), 1.0 - done_fraction),
                Style::default().fg(NOT_DONE_COLOR),
            ),
        );
    }
}

impl Widget for CompletionPie<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Proportion of Time: Watched vs Not Watched");

        if self.split.done + self.split.not_done == chrono::Duration::zero() {
            Paragraph::new("No recorded time yet")
                .alignment(Alignment::Center)
                .block(block)
                .render(area, buf);
            return;
        }

        Canvas::default()
            .block(block)
            .x_bounds([-2.0, 2.0])
            .y_bounds([-1.4, 1.4])
            .paint(|ctx| Self::paint(ctx, self.split))
            .render(area, buf);
    }
}
