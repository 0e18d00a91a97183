mod monthly;
mod pie;

pub use monthly::MonthlyChart;
pub use pie::CompletionPie;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Stylize};
use ratatui::widgets::{Paragraph, Widget};

use course_core::model::{CompletionSplit, MonthlyTotal};

enum ChartView {
    Monthly(Vec<MonthlyTotal>),
    Pie(CompletionSplit),
}

/// Full-screen viewer for one chart. Redraws until `q` or `Esc`.
pub struct ChartApp {
    view: ChartView,
    quitting: bool,
}

impl ChartApp {
    #[must_use]
    pub fn monthly(totals: Vec<MonthlyTotal>) -> Self {
        Self {
            view: ChartView::Monthly(totals),
            quitting: false,
        }
    }

    #[must_use]
    pub fn pie(split: CompletionSplit) -> Self {
        Self {
            view: ChartView::Pie(split),
            quitting: false,
        }
    }

    /// Run the draw/input loop until the user quits.
    ///
    /// # Errors
    ///
    /// Returns the underlying terminal error when drawing or reading
    /// input fails.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> io::Result<()> {
        while !self.quitting {
            terminal.draw(|frame| frame.render_widget(&self, frame.area()))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn handle_events(&mut self) -> io::Result<()> {
        let timeout = Duration::from_secs_f32(1.0 / 20.0);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => self.quitting = true,
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }
}

impl Widget for &ChartApp {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Max(1)].as_ref())
            .split(area);

        match &self.view {
            ChartView::Monthly(totals) => MonthlyChart::new(totals).render(body[0], buf),
            ChartView::Pie(split) => CompletionPie::new(split).render(body[0], buf),
        }

        Paragraph::new("Press q to close")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray)
            .render(body[1], buf);
    }
}
