use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Widget};

use course_core::model::MonthlyTotal;

/// Bar chart of finished time per calendar month, one bar per month in
/// chronological order, heights proportional to minutes.
pub struct MonthlyChart<'a> {
    totals: &'a [MonthlyTotal],
}

impl<'a> MonthlyChart<'a> {
    #[must_use]
    pub fn new(totals: &'a [MonthlyTotal]) -> Self {
        Self { totals }
    }

    fn bars(&self) -> Vec<Bar<'a>> {
        self.totals
            .iter()
            .map(|total| {
                #[allow(clippy::cast_sign_loss)]
                let minutes = total.duration.num_minutes().max(0) as u64;
                Bar::default()
                    .value(minutes)
                    .text_value(format!("{:.1}h", total.hours()))
                    .label(total.label().into())
            })
            .collect()
    }
}

impl Widget for MonthlyChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Time Spent Per Month");

        if self.totals.is_empty() {
            Paragraph::new("No finished videos yet")
                .alignment(Alignment::Center)
                .block(block)
                .render(area, buf);
            return;
        }

        BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&self.bars()))
            .bar_width(7)
            .bar_gap(2)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .render(area, buf);
    }
}
