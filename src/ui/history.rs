use std::collections::HashMap;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::{App, SortBy};

pub struct HistoryRowData {
    pub question_id: String,
    pub prompt: String,
    pub miss_rate: f64,
    pub avg_response_ms: f64,
    pub attempts: i64,
    pub correct: i64,
    pub last_attempt: Option<String>,
}

/// Pure presenter for a single question history row
pub fn present_row(data: &HistoryRowData) -> Row<'static> {
    let prompt_display = if data.prompt.chars().count() > 40 {
        let head: String = data.prompt.chars().take(39).collect();
        format!("{head}…")
    } else {
        data.prompt.clone()
    };

    let response_color = if data.avg_response_ms < 2000.0 {
        Color::Green
    } else if data.avg_response_ms < 5000.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    let miss_color = if data.miss_rate == 0.0 {
        Color::Green
    } else if data.miss_rate < 25.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    let correct_display = format!("{}/{}", data.correct, data.attempts);

    let last_display = data
        .last_attempt
        .as_deref()
        .map(|s| s.chars().take(16).collect::<String>())
        .unwrap_or_else(|| "—".to_string());

    Row::new(vec![
        Cell::from(data.question_id.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(prompt_display),
        Cell::from(format!("{:.1}", data.miss_rate)).style(Style::default().fg(miss_color)),
        Cell::from(format!("{:.0}", data.avg_response_ms))
            .style(Style::default().fg(response_color)),
        Cell::from(correct_display),
        Cell::from(last_display),
    ])
}

/// Render the Question History screen
pub fn render_history(app: &mut App, f: &mut Frame) {
    let area = f.area();

    // Create layout
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // History table
            Constraint::Length(4), // Instructions
        ])
        .split(area);

    // Title with sort indicator
    let sort_direction = if app.history_state.sort_ascending {
        "↑"
    } else {
        "↓"
    };
    let sort_by_text = match app.history_state.sort_by {
        SortBy::Question => "Question",
        SortBy::MissRate => "Miss Rate",
        SortBy::AvgResponse => "Avg Response",
        SortBy::Attempts => "Attempts",
    };
    let title_text = format!(
        "{} (Sort: {sort_by_text} {sort_direction})",
        app.bank.title
    );

    let title = Paragraph::new(title_text)
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    // Per-question attempt history for the current bank
    let summary = app
        .game
        .progress_db()
        .and_then(|db| db.question_summary(&app.bank.id).ok())
        .filter(|rows| !rows.is_empty());

    if let Some(mut summary) = summary {
        let prompts: HashMap<&str, &str> = app
            .bank
            .questions
            .iter()
            .map(|q| (q.id.as_str(), q.prompt.as_str()))
            .collect();

        // Sort the data based on current sort criteria
        match app.history_state.sort_by {
            SortBy::Question => summary.sort_by(|a, b| {
                let cmp = a.question_id.cmp(&b.question_id);
                if app.history_state.sort_ascending {
                    cmp
                } else {
                    cmp.reverse()
                }
            }),
            SortBy::MissRate => summary.sort_by(|a, b| {
                let cmp = a
                    .miss_rate
                    .partial_cmp(&b.miss_rate)
                    .unwrap_or(std::cmp::Ordering::Equal);
                if app.history_state.sort_ascending {
                    cmp
                } else {
                    cmp.reverse()
                }
            }),
            SortBy::AvgResponse => summary.sort_by(|a, b| {
                let cmp = a
                    .avg_response_ms
                    .partial_cmp(&b.avg_response_ms)
                    .unwrap_or(std::cmp::Ordering::Equal);
                if app.history_state.sort_ascending {
                    cmp
                } else {
                    cmp.reverse()
                }
            }),
            SortBy::Attempts => summary.sort_by(|a, b| {
                let cmp = a.attempts.cmp(&b.attempts);
                if app.history_state.sort_ascending {
                    cmp
                } else {
                    cmp.reverse()
                }
            }),
        }

        // Calculate scrolling bounds
        let table_height = chunks[1].height.saturating_sub(3) as usize; // borders + header
        let total_rows = summary.len();
        let max_scroll = total_rows.saturating_sub(table_height);

        // Clamp scroll offset
        if app.history_state.scroll_offset > max_scroll {
            app.history_state.scroll_offset = max_scroll;
        }

        // Create header with sort indicators
        let question_indicator = if matches!(app.history_state.sort_by, SortBy::Question) {
            sort_direction
        } else {
            ""
        };
        let miss_indicator = if matches!(app.history_state.sort_by, SortBy::MissRate) {
            sort_direction
        } else {
            ""
        };
        let response_indicator = if matches!(app.history_state.sort_by, SortBy::AvgResponse) {
            sort_direction
        } else {
            ""
        };
        let attempts_indicator = if matches!(app.history_state.sort_by, SortBy::Attempts) {
            sort_direction
        } else {
            ""
        };

        let header = Row::new(vec![
            Cell::from(format!("Question {question_indicator}")),
            Cell::from("Prompt"),
            Cell::from(format!("Miss Rate (%) {miss_indicator}")),
            Cell::from(format!("Avg (ms) {response_indicator}")),
            Cell::from(format!("Correct {attempts_indicator}")),
            Cell::from("Last Seen"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        // Visible rows
        let visible_rows: Vec<Row> = summary
            .iter()
            .skip(app.history_state.scroll_offset)
            .take(table_height)
            .map(|row| {
                let data = HistoryRowData {
                    question_id: row.question_id.clone(),
                    prompt: prompts
                        .get(row.question_id.as_str())
                        .copied()
                        .unwrap_or("(removed)")
                        .to_string(),
                    miss_rate: row.miss_rate,
                    avg_response_ms: row.avg_response_ms,
                    attempts: row.attempts,
                    correct: row.correct,
                    last_attempt: row.last_attempt.clone(),
                };
                present_row(&data)
            })
            .collect();

        // Create the table
        let widths = [
            Constraint::Length(10), // Question
            Constraint::Min(24),    // Prompt
            Constraint::Length(15), // Miss Rate
            Constraint::Length(10), // Avg Response
            Constraint::Length(9),  // Correct
            Constraint::Length(16), // Last Seen
        ];

        let table = Table::new(visible_rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Question Stats"))
            .column_spacing(2);

        f.render_widget(table, chunks[1]);
    } else {
        // No data state
        let no_data = Paragraph::new("No attempts recorded for this bank yet. Play a round first.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[1]);
    }

    // Instructions
    let instructions = Paragraph::new(
        "(↑/↓) scroll  (PgUp/PgDn) page  (Home) top  (1-4) sort  (space) flip  (b/backspace) back  (r) replay",
    )
    .alignment(Alignment::Center)
    .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(instructions, chunks[2]);
}
