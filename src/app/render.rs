//! Frame drawing: half-block surface blit, status line and toolbar line.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Paragraph, Widget};
use ratatui::Frame;
use simarium_core::surface::Surface;
use simarium_data::Rgba;

use crate::app::App;

/// Blits the RGBA surface into the terminal, two vertically stacked pixels
/// per cell via the upper-half-block glyph, then overlays the labels.
pub struct SurfaceWidget<'a> {
    surface: &'a Surface,
}

impl<'a> SurfaceWidget<'a> {
    pub fn new(surface: &'a Surface) -> Self {
        Self { surface }
    }

    fn to_color(rgba: Rgba) -> Color {
        Color::Rgb(rgba.r, rgba.g, rgba.b)
    }
}

impl Widget for SurfaceWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = area.width.min(self.surface.width() as u16);
        let rows = area.height.min((self.surface.height() as u16).div_ceil(2));

        for row in 0..rows {
            for col in 0..cols {
                let x = i64::from(col);
                let top = self.surface.get(x, i64::from(row) * 2).unwrap_or(Rgba::BLACK);
                let bottom = self
                    .surface
                    .get(x, i64::from(row) * 2 + 1)
                    .unwrap_or(Rgba::BLACK);
                let cell = &mut buf[(area.x + col, area.y + row)];
                cell.set_symbol("▀");
                cell.set_fg(Self::to_color(top));
                cell.set_bg(Self::to_color(bottom));
            }
        }

        for label in self.surface.labels() {
            let col = label.x as i64;
            let row = (label.y / 2.0) as i64;
            if col < 0 || row < 0 || col >= i64::from(cols) || row >= i64::from(rows) {
                continue;
            }
            let width = usize::from(cols.saturating_sub(col as u16));
            buf.set_stringn(
                area.x + col as u16,
                area.y + row as u16,
                &label.text,
                width,
                Style::default().fg(Self::to_color(label.color)),
            );
        }
    }
}

impl App {
    pub fn draw(&mut self, f: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // status
                Constraint::Min(0),    // world
                Constraint::Length(2), // toolbar + key hints
            ])
            .split(f.area());

        self.sync_surface(layout[1]);

        let status = match self.gallery.engine() {
            Some(engine) => format!(
                " {} | tick {} | {} | seed {}",
                self.kind.title(),
                engine.ticks(),
                if engine.is_running() {
                    "running"
                } else {
                    "stopped"
                },
                self.gallery.seed(),
            ),
            None => String::from(" no simulation selected"),
        };
        f.render_widget(
            Paragraph::new(status).style(Style::default().fg(Color::Gray)),
            layout[0],
        );

        if let Some(engine) = self.gallery.engine() {
            f.render_widget(SurfaceWidget::new(engine.surface()), layout[1]);
        }

        let toolbar_line = self.toolbar_line();
        let hints = " space start/stop · r reset · 1-7 simulation · ←→↑↓ controls · p pattern · q quit";
        f.render_widget(
            Paragraph::new(format!("{toolbar_line}\n{hints}"))
                .style(Style::default().fg(Color::DarkGray)),
            layout[2],
        );
    }

    fn toolbar_line(&mut self) -> String {
        let selected = self.selected_control;
        match self.gallery.toolbar_mut() {
            Some(toolbar) if !toolbar.controls().is_empty() => {
                let parts: Vec<String> = toolbar
                    .controls()
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        let marker = if i == selected { ">" } else { " " };
                        format!("{marker}{}: {:.2}", c.name, c.value)
                    })
                    .collect();
                format!(" {}", parts.join("  "))
            }
            Some(toolbar) if !toolbar.actions().is_empty() => {
                format!(" patterns: {}", toolbar.actions().join(", "))
            }
            _ => String::from(" no controls"),
        }
    }
}
