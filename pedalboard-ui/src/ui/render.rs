//! Draws the current menu: title, items, and a status line.

use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Block, List, ListItem, ListState, Paragraph},
    Frame,
};

use pedalboard_core::menu::{MenuItem, MenuTree};

use super::menu_view::MenuView;

/// Labels may span several lines (the mapping table does); buttons never do.
fn item_lines(item: &MenuItem) -> Vec<Line<'static>> {
    if item.is_label() {
        item.text().lines().map(|l| Line::from(l.to_string())).collect()
    } else {
        vec![Line::from(item.text().to_string())]
    }
}

pub fn draw(frame: &mut Frame, view: &MenuView, tree: &MenuTree, status: &str) {
    let [body, footer] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

    let menu_name = view.current_menu();
    let Some(menu) = tree.get(menu_name) else {
        frame.render_widget(Paragraph::new(format!("unknown menu {}", menu_name)), body);
        return;
    };

    let items: Vec<ListItem> = menu
        .items()
        .iter()
        .map(|item| {
            let entry = ListItem::new(Text::from(item_lines(item)));
            if item.is_label() {
                entry.style(Style::default().fg(Color::DarkGray))
            } else {
                entry
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::bordered().title(format!(" {} ", menu.title())))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(view.selected()));
    frame.render_stateful_widget(list, body, &mut state);

    frame.render_widget(
        Paragraph::new(status.to_string()).style(Style::default().fg(Color::DarkGray)),
        footer,
    );
}
