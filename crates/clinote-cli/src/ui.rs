use crate::app::{App, Row};
use clinote_engine::BlockType;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn draw(f: &mut Frame, app: &mut App, note_name: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)].as_ref())
        .split(f.area());

    let editor_area = chunks[0];
    let inner_height = editor_area.height.saturating_sub(2) as usize;
    let rows = app.layout(inner_height);
    let focused = app.focused();

    let lines: Vec<Line> = rows
        .iter()
        .skip(app.scroll())
        .take(inner_height)
        .map(|row| render_row(row, row.node.is_some() && row.node == focused))
        .collect();

    let title = if app.status().is_empty() {
        note_name.to_string()
    } else {
        format!("{note_name} | {}", app.status())
    };
    let content = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(content, editor_area);

    if let Some(row_index) = app.focused_row()
        && let Some(row) = rows.get(row_index)
        && row_index >= app.scroll()
    {
        let column = row.marker.chars().count() + app.caret();
        let line = row_index - app.scroll();
        f.set_cursor_position(cursor_position(editor_area, column, line));
    }

    let help = Paragraph::new(vec![
        Line::from(
            "Enter: new block/item | Ctrl-T: block type | Ctrl-X: check | Ctrl-D: delete block",
        ),
        Line::from("Alt-↑/↓: move block | Alt-1..7: insert block | Ctrl-S: save | Esc: quit"),
    ])
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[1]);
}

/// Screen position for a caret at `column`/`line` inside the bordered area,
/// clamped to its last inner cell
fn cursor_position(area: Rect, column: usize, line: usize) -> Position {
    let clamp = |offset: usize, size: u16| {
        u16::try_from(offset)
            .unwrap_or(u16::MAX)
            .min(size.saturating_sub(3))
    };
    Position::new(
        area.x.saturating_add(1).saturating_add(clamp(column, area.width)),
        area.y.saturating_add(1).saturating_add(clamp(line, area.height)),
    )
}

fn render_row(row: &Row, focused: bool) -> Line<'static> {
    let text_style = match row.block_type {
        BlockType::Heading1 => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        BlockType::Heading2 => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        BlockType::Quote => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
        _ => Style::default(),
    };
    let text_style = if focused {
        text_style.bg(Color::Rgb(40, 40, 60))
    } else {
        text_style
    };

    Line::from(vec![
        Span::styled(row.marker.clone(), Style::default().fg(Color::Yellow)),
        Span::styled(row.text.clone(), text_style),
    ])
}
