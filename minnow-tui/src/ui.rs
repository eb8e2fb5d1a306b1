//! Ratatui rendering: the active channel's backlog above one input line.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use minnow_engine::{Session, Transport};

pub fn draw<T: Transport>(frame: &mut Frame, session: &Session<T>) {
    let [messages_area, input_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    let Some(channel) = session.channels().active() else {
        return;
    };

    // Backlog lines are already wrapped to the console width; show the
    // tail that fits.
    let height = messages_area.height as usize;
    let all: Vec<&str> = channel.backlog().collect();
    let skip = all.len().saturating_sub(height);
    let lines: Vec<Line> = all.into_iter().skip(skip).map(Line::from).collect();
    frame.render_widget(Paragraph::new(lines), messages_area);

    let prompt = input_line(channel.name(), channel.input(), input_area.width as usize);
    frame.render_widget(
        Paragraph::new(prompt).style(Style::default().fg(Color::Yellow)),
        input_area,
    );
}

/// `"<channel>> <input>"`, keeping the tail when it overflows the width.
fn input_line(name: &str, input: &str, width: usize) -> String {
    let full = format!("{name}> {input}");
    let chars: Vec<char> = full.chars().collect();
    if width == 0 || chars.len() <= width {
        full
    } else {
        chars[chars.len() - width..].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::input_line;

    #[test]
    fn input_line_fits_within_width() {
        assert_eq!(input_line("#room", "hello", 40), "#room> hello");
    }

    #[test]
    fn input_line_keeps_the_tail_when_overflowing() {
        assert_eq!(input_line("#room", "hello", 8), "m> hello");
    }
}
