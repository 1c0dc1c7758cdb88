use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use crate::models::{AvalStatus, UNASSIGNED};
use super::app::{App, InputField, InputMode, ViewMode};

fn status_style(status: AvalStatus) -> Style {
    let color = match status {
        AvalStatus::Pendiente => Color::Yellow,
        AvalStatus::EnProceso => Color::Blue,
        AvalStatus::Aprobado => Color::Green,
        AvalStatus::Rechazado => Color::Red,
        AvalStatus::Finalizado => Color::Gray,
    };
    Style::default().fg(color)
}

fn styled_table<'a>(rows: Vec<Row<'a>>, widths: &[Constraint], headers: Vec<&'a str>, title: String) -> Table<'a> {
    Table::new(rows, widths.to_vec())
        .header(Row::new(headers)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ")
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Status
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    match app.view_mode {
        ViewMode::Activities => {
            let rows: Vec<Row> = app
                .activities
                .iter()
                .map(|a| {
                    Row::new(vec![
                        Cell::from(a.id.to_string()),
                        Cell::from(a.title.clone()),
                        Cell::from(a.kind.to_string()),
                        Cell::from(a.date.to_string()),
                        Cell::from(format!("{:.1}", a.hours)),
                    ])
                })
                .collect();

            let widths = [
                Constraint::Length(4),
                Constraint::Min(20),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(6),
            ];
            let table = styled_table(rows, &widths, vec!["ID", "Title", "Type", "Date", "Hours"], "Avales - Planificación".to_string());
            f.render_stateful_widget(table, chunks[0], &mut app.state);
        }
        ViewMode::Tasks => {
            let rows: Vec<Row> = app
                .tasks
                .iter()
                .map(|t| {
                    let style = if t.assigned_to == UNASSIGNED {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default()
                    };
                    Row::new(vec![
                        Cell::from(t.role.to_string()),
                        Cell::from(t.title.clone()),
                        Cell::from(t.description.clone()),
                        Cell::from(t.assigned_to.clone()),
                        Cell::from(if t.evidence_required { "Yes" } else { "-" }),
                    ]).style(style)
                })
                .collect();

            let widths = [
                Constraint::Length(24),
                Constraint::Min(20),
                Constraint::Min(20),
                Constraint::Length(22),
                Constraint::Length(8),
            ];
            let title = match &app.task_activity {
                Some(a) => format!("Avales - Tareas: {}", a.title),
                None => "Avales - Tareas".to_string(),
            };
            let table = styled_table(rows, &widths, vec!["Role", "Task", "Description", "Assigned To", "Evidence"], title);
            f.render_stateful_widget(table, chunks[0], &mut app.task_state);
        }
        ViewMode::Avales => {
            let rows: Vec<Row> = app
                .avales
                .iter()
                .map(|a| {
                    Row::new(vec![
                        Cell::from(a.id.to_string()),
                        Cell::from(a.applicant_name.clone()),
                        Cell::from(a.activity_name.clone()),
                        Cell::from(a.email.clone()),
                        Cell::from(a.status.to_string()).style(status_style(a.status)),
                        Cell::from(a.rejection_reason.clone().unwrap_or_default()),
                    ])
                })
                .collect();

            let widths = [
                Constraint::Length(4),
                Constraint::Min(20),
                Constraint::Min(20),
                Constraint::Length(24),
                Constraint::Length(12),
                Constraint::Length(26),
            ];
            let table = styled_table(rows, &widths, vec!["ID", "Applicant", "Activity", "Email", "Status", "Reason"], "Avales - Solicitudes Recibidas".to_string());
            f.render_stateful_widget(table, chunks[0], &mut app.aval_state);
        }
        ViewMode::Documents => {
            let rows: Vec<Row> = app
                .documents
                .iter()
                .map(|d| {
                    Row::new(vec![
                        Cell::from(d.kind.to_string().to_uppercase()),
                        Cell::from(d.activity_name.clone()),
                        Cell::from(d.author.clone()),
                        Cell::from(d.created_at.format("%Y-%m-%d").to_string()),
                    ])
                })
                .collect();

            let widths = [
                Constraint::Length(12),
                Constraint::Min(20),
                Constraint::Length(16),
                Constraint::Length(12),
            ];
            let table = styled_table(rows, &widths, vec!["Type", "Activity", "Author", "Date"], "Avales - Documentos Generados".to_string());
            f.render_stateful_widget(table, chunks[0], &mut app.document_state);
        }
    }

    let status = Paragraph::new(app.status.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(status, chunks[1]);

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Activities => "q: Quit | a: Add | Enter: Tasks | p: Payment Letter | s: Supplies Letter | v: View Avales",
            ViewMode::Tasks => "q: Quit | Esc/v: Back to Activities",
            ViewMode::Avales => "q: Quit | y: Approve | x: Reject | v: View Documents",
            ViewMode::Documents => "q: Quit | v: View Activities",
        },
        InputMode::Editing => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    // Render Input Box if needed
    if app.input_mode != InputMode::Normal {
        let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
        f.render_widget(Clear, area);

        let title = match app.input_mode {
            InputMode::Adding => match app.add_state.step {
                0 => "Add Activity: Enter Title",
                1 => "Add Activity: Enter Type (Diplomado/Taller/Conferencia)",
                2 => "Add Activity: Enter Date (YYYY-MM-DD)",
                3 => "Add Activity: Enter Hours (Optional)",
                _ => "Add Activity",
            },
            InputMode::Editing => match app.input_field {
                InputField::RejectReason => "Reject: Enter Reason",
                InputField::None => "Edit",
            },
            InputMode::Normal => "",
        };

        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(input, area);
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
