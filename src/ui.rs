pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HUD_MARGIN_X: u16 = 2;
const HUD_MARGIN_Y: u16 = 1;
const START_PROMPT: &str = "Click to start";
const CONTROLS: &str = "[c] export CSV   [j] export JSON   [l] event log   [q] quit";

fn text_block_area(lines: &[String], x: u16, y: u16, bounds: Rect) -> Rect {
    let width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
    Rect::new(x, y, width, lines.len() as u16).intersection(bounds)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = self.session.frame();

        let background = Style::default().bg(Color::Rgb(0, frame.background_level, 0));
        let text_style = background.fg(Color::White);
        let line_style = Style::default().fg(Color::Rgb(100, 0, 100));

        buf.set_style(area, background);

        let strip_top = self.session.control_strip_top().min(area.height);
        let plot_area = Rect::new(area.x, area.y, area.width, strip_top);
        let strip_area = Rect::new(
            area.x,
            area.y + strip_top,
            area.width,
            area.height - strip_top,
        );

        if let Some(polyline) = &frame.polyline {
            let points = charting::to_chart_points(polyline, &frame.canvas);
            let (x_bounds, y_bounds) = charting::chart_bounds(&frame.canvas);
            let datasets = vec![Dataset::default()
                .marker(ratatui::symbols::Marker::Braille)
                .style(line_style)
                .graph_type(GraphType::Line)
                .data(&points)];

            Chart::new(datasets)
                .style(background)
                .x_axis(Axis::default().bounds(x_bounds))
                .y_axis(Axis::default().bounds(y_bounds))
                .render(plot_area, buf);
        }

        if !frame.hud.is_empty() {
            let hud_area = text_block_area(
                &frame.hud,
                plot_area.x + HUD_MARGIN_X,
                plot_area.y + HUD_MARGIN_Y,
                plot_area,
            );
            let lines = frame
                .hud
                .iter()
                .map(|l| Line::from(l.as_str()))
                .collect::<Vec<Line>>();
            Paragraph::new(lines)
                .style(text_style.add_modifier(Modifier::BOLD))
                .render(hud_area, buf);
        }

        if frame.show_start_prompt && plot_area.height > 0 {
            let prompt_area = Rect::new(
                plot_area.x,
                plot_area.y + plot_area.height / 2,
                plot_area.width,
                1,
            );
            Paragraph::new(Span::styled(
                START_PROMPT,
                text_style.add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .render(prompt_area, buf);
        }

        if !frame.log_lines.is_empty() {
            let height = (frame.log_lines.len() as u16).min(plot_area.height);
            let log_top = plot_area.y + plot_area.height - height;
            let log_area = text_block_area(
                &frame.log_lines,
                plot_area.x + HUD_MARGIN_X,
                log_top,
                plot_area,
            );
            let skip = frame.log_lines.len() - height as usize;
            let lines = frame.log_lines[skip..]
                .iter()
                .map(|l| Line::from(l.as_str()))
                .collect::<Vec<Line>>();
            Paragraph::new(lines)
                .style(text_style.add_modifier(Modifier::DIM))
                .render(log_area, buf);
        }

        if strip_area.height > 0 {
            let strip_style = Style::default().bg(Color::DarkGray).fg(Color::White);
            let mut lines = vec![Line::from(CONTROLS)];
            if let Some(status) = &self.status {
                lines.push(Line::from(Span::styled(
                    status.as_str(),
                    strip_style.add_modifier(Modifier::ITALIC),
                )));
            }
            Paragraph::new(lines)
                .style(strip_style)
                .alignment(Alignment::Center)
                .render(strip_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;
    use taptime::config::{EngineConfig, Preset};
    use taptime::runtime::TapEvent;

    fn screen_text(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect()
    }

    fn draw(app: &App) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(80, 25)).unwrap();
        terminal
            .draw(|f| f.render_widget(app, f.area()))
            .unwrap();
        terminal
    }

    fn app(preset: Preset) -> App {
        let mut app = App::new(EngineConfig::preset(preset), PathBuf::from("."));
        app.on_event(TapEvent::Resize(80, 25));
        app
    }

    fn tap(app: &mut App, start: u64, end: u64) {
        app.on_event(TapEvent::PressStart {
            at_ms: start,
            row: Some(3),
        });
        app.on_event(TapEvent::PressEnd { at_ms: end });
    }

    #[test]
    fn fresh_session_shows_start_prompt_and_controls() {
        let app = app(Preset::Full);
        let text = screen_text(&draw(&app));
        assert!(text.iter().any(|l| l.contains(START_PROMPT)));
        assert!(text.iter().any(|l| l.contains("[c] export CSV")));
        assert!(!text.iter().any(|l| l.contains("Taps:")));
    }

    #[test]
    fn hud_is_drawn_after_two_taps() {
        let mut app = app(Preset::Full);
        tap(&mut app, 0, 1000);
        tap(&mut app, 2000, 2100);
        tap(&mut app, 3000, 3050);

        let text = screen_text(&draw(&app));
        assert!(!text.iter().any(|l| l.contains(START_PROMPT)));
        assert!(text.iter().any(|l| l.contains("Taps: 2")));
        assert!(text.iter().any(|l| l.contains("Average on time: 0.075s")));
        assert!(text.iter().any(|l| l.contains("Max between time: 0.9s")));
    }

    #[test]
    fn background_follows_level() {
        let mut app = app(Preset::Full);
        app.on_event(TapEvent::PressStart {
            at_ms: 0,
            row: Some(3),
        });
        for _ in 0..3 {
            app.on_event(TapEvent::Tick);
        }
        let terminal = draw(&app);
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer.content()[0].bg, Color::Rgb(0, 30, 0));
    }

    #[test]
    fn status_and_log_panel_are_rendered() {
        let mut app = app(Preset::Full);
        tap(&mut app, 0, 1000);
        tap(&mut app, 2000, 2100);
        app.status = Some("saved ./taps.csv".to_string());
        app.session.toggle_log();

        let text = screen_text(&draw(&app));
        assert!(text.iter().any(|l| l.contains("saved ./taps.csv")));
        assert!(text.iter().any(|l| l.contains(r#"{"start":2000,"end":2100}, 100"#)));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut app = app(Preset::Lite);
        app.on_event(TapEvent::Resize(4, 2));
        tap(&mut app, 0, 1000);
        tap(&mut app, 2000, 2100);
        tap(&mut app, 3000, 3050);
        let mut terminal = Terminal::new(TestBackend::new(4, 2)).unwrap();
        terminal
            .draw(|f| f.render_widget(&app, f.area()))
            .unwrap();
    }
}
