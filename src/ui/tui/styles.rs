use ratatui::style::{Color, Modifier, Style};

pub(super) fn accent_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

pub(super) fn success_style() -> Style {
    Style::default().fg(Color::Green)
}

pub(super) fn failure_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

pub(super) fn muted_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::DIM)
}
