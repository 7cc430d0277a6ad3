pub mod charting;
pub mod history;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::quiz::{Outcome, Phase, Quiz};
use crate::reflex::Reflex;
use crate::{App, Game};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.game {
            Game::Quiz(quiz) => {
                if quiz.is_complete() {
                    render_quiz_results(self, quiz, area, buf);
                } else {
                    render_quiz_playing(quiz, area, buf);
                }
                if quiz.celebration.is_active {
                    render_celebration_particles(&quiz.celebration, area, buf);
                }
            }
            Game::Reflex(reflex) => {
                if reflex.is_complete() {
                    render_reflex_results(self, reflex, area, buf);
                } else {
                    render_reflex_playing(reflex, area, buf);
                }
                if reflex.celebration.is_active {
                    render_celebration_particles(&reflex.celebration, area, buf);
                }
            }
        }
    }
}

fn render_quiz_playing(quiz: &Quiz, area: Rect, buf: &mut Buffer) {
    let question = match quiz.current_question() {
        Some(q) => q,
        None => return,
    };

    // styles
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let green_style = Style::default().fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let dim_bold_style = Style::default().patch(bold_style).add_modifier(Modifier::DIM);
    let green_italic_style = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::ITALIC);
    let red_italic_style = Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::ITALIC);
    let gray_italic_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let mut prompt_occupied_lines =
        ((question.prompt.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;
    if question.prompt.width() <= max_chars_per_line as usize {
        prompt_occupied_lines = 1;
    }

    let timer_lines = if question
        .time_limit_secs
        .or(quiz.scoring.default_time_limit_secs)
        .is_some()
    {
        2
    } else {
        0
    };

    let choice_lines = question.choices.len() as u16;
    let body_lines = 1 + timer_lines + prompt_occupied_lines + 1 + choice_lines + 1 + 3;
    let top_pad = area.height.saturating_sub(body_lines) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(1),                     // header
                Constraint::Length(timer_lines),           // countdown
                Constraint::Length(top_pad),               // padding
                Constraint::Length(prompt_occupied_lines), // prompt
                Constraint::Length(1),                     // padding
                Constraint::Length(choice_lines),          // choices
                Constraint::Length(1),                     // padding
                Constraint::Length(3),                     // feedback
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);

    let header = Paragraph::new(Span::styled(
        format!(
            "{}   question {} of {}   {} coins",
            quiz.title,
            quiz.current_index + 1,
            quiz.questions.len(),
            quiz.coins_earned
        ),
        dim_bold_style,
    ))
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    if quiz.phase == Phase::Presenting {
        if let Some(remaining) = quiz.seconds_remaining {
            // The countdown turns red in the final seconds
            let timer_style = if remaining <= 3.0 {
                red_bold_style
            } else {
                dim_bold_style
            };
            let timer = Paragraph::new(Span::styled(
                format!("{:.1}", remaining.max(0.0)),
                timer_style,
            ))
            .alignment(Alignment::Center);
            timer.render(chunks[1], buf);
        }
    }

    let prompt = Paragraph::new(Span::styled(question.prompt.clone(), bold_style))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    prompt.render(chunks[3], buf);

    let revealed = quiz.phase == Phase::Answered;
    let choice_rows: Vec<Line> = question
        .choices
        .iter()
        .map(|choice| {
            let chosen = quiz.selected.as_deref() == Some(choice.id.as_str());
            let style = if revealed {
                match (choice.is_correct, chosen) {
                    (true, true) => green_bold_style,
                    (true, false) => green_style,
                    (false, true) => red_bold_style,
                    (false, false) => dim_style,
                }
            } else {
                Style::default()
            };
            Line::from(Span::styled(
                format!("{})  {}", choice.id, choice.label),
                style,
            ))
        })
        .collect();
    let choices = Paragraph::new(choice_rows).alignment(Alignment::Left);
    choices.render(chunks[5], buf);

    if revealed {
        if let Some(answer) = quiz.last_answer() {
            let correct = question.correct_choice();
            let mut feedback_rows = vec![match answer.outcome {
                Outcome::Correct => Line::from(Span::styled(
                    format!("correct!  +{} coins", quiz.scoring.coins_per_correct),
                    green_italic_style,
                )),
                Outcome::Incorrect => {
                    let text = if answer.choice_id.is_none() {
                        format!("time's up!  the answer was {}) {}", correct.id, correct.label)
                    } else {
                        format!("not quite. the answer was {}) {}", correct.id, correct.label)
                    };
                    Line::from(Span::styled(text, red_italic_style))
                }
            }];
            if let Some(explanation) = &correct.explanation {
                feedback_rows.push(Line::from(Span::styled(
                    explanation.clone(),
                    gray_italic_style,
                )));
            }
            let feedback = Paragraph::new(feedback_rows)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            feedback.render(chunks[7], buf);
        }
    }
}

fn render_quiz_results(app: &App, quiz: &Quiz, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Min(1),    // chart
                Constraint::Length(1), // stats
                Constraint::Length(1), // verdict
                Constraint::Length(1), // running totals
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area);

    let points = quiz.response_points();
    let (question_count, highest_secs) = charting::compute_chart_params(&points);

    let tuples: Vec<(f64, f64)> = points.iter().map(|p| (p.question, p.secs)).collect();
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&tuples)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("question")
                .bounds([1.0, question_count])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(charting::format_label(question_count), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, highest_secs])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_secs), bold_style),
                ]),
        );

    chart.render(chunks[0], buf);

    let summary = quiz.summary();

    let stats = Paragraph::new(Span::styled(
        format!(
            "{}/{} correct   {} coins   {} xp   {:.1} s avg",
            summary.correct_count,
            summary.total,
            summary.coins_awarded,
            summary.xp_awarded,
            summary.mean_response_ms / 1000.0
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[1], buf);

    let verdict = if summary.passed {
        Span::styled(
            "PASSED",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            "TRY AGAIN",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    };
    Paragraph::new(verdict)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let mut totals = format!(
        "total coins {}   total xp {}",
        app.handoff.total_coins, app.handoff.total_xp
    );
    if let Some(next) = &app.handoff.next_game {
        totals.push_str(&format!("   next up: {}", next.id));
    }
    let totals_widget = Paragraph::new(Span::styled(
        totals,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    totals_widget.render(chunks[3], buf);

    let legend = Paragraph::new(Span::styled(
        String::from(if app.handoff.next_game.is_some() {
            "(r)eplay / (n)ext / (s)tats / (esc)ape"
        } else {
            "(r)eplay / (s)tats / (esc)ape"
        }),
        italic_style,
    ));
    legend.render(chunks[5], buf);
}

fn render_reflex_playing(reflex: &Reflex, area: Rect, buf: &mut Buffer) {
    let question = match reflex.current_question() {
        Some(q) => q,
        None => return,
    };

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default().patch(bold_style).add_modifier(Modifier::DIM);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let mut prompt_occupied_lines =
        ((question.prompt.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;
    if question.prompt.width() <= max_chars_per_line as usize {
        prompt_occupied_lines = 1;
    }

    let choice_lines = question.choices.len() as u16;
    let body_lines = 1 + 2 + prompt_occupied_lines + 1 + choice_lines;
    let top_pad = area.height.saturating_sub(body_lines) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(1),                     // header
                Constraint::Length(2),                     // countdown
                Constraint::Length(top_pad),               // padding
                Constraint::Length(prompt_occupied_lines), // prompt
                Constraint::Length(1),                     // padding
                Constraint::Length(choice_lines),          // choices
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);

    let header = Paragraph::new(Span::styled(
        format!(
            "{}   score {}   streak {}   best {}",
            reflex.title, reflex.score, reflex.streak, reflex.best_streak
        ),
        dim_bold_style,
    ))
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    let timer_style = if reflex.seconds_remaining <= 5.0 {
        red_bold_style
    } else {
        dim_bold_style
    };
    let timer = Paragraph::new(Span::styled(
        format!("{:.1}", reflex.seconds_remaining.max(0.0)),
        timer_style,
    ))
    .alignment(Alignment::Center);
    timer.render(chunks[1], buf);

    let prompt = Paragraph::new(Span::styled(question.prompt.clone(), bold_style))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    prompt.render(chunks[3], buf);

    let choice_rows: Vec<Line> = question
        .choices
        .iter()
        .map(|choice| Line::from(format!("{})  {}", choice.id, choice.label)))
        .collect();
    Paragraph::new(choice_rows)
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
}

fn render_reflex_results(app: &App, reflex: &Reflex, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Min(1),    // padding
                Constraint::Length(1), // stats
                Constraint::Length(1), // pace
                Constraint::Length(1), // verdict
                Constraint::Length(1), // running totals
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area);

    let summary = reflex.summary();

    let stats = Paragraph::new(Span::styled(
        format!(
            "{} correct of {} taps   best streak {}   {} coins   {} xp",
            summary.score, summary.taps, summary.best_streak, summary.coins_awarded, summary.xp_awarded
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[1], buf);

    let pace = Paragraph::new(Span::styled(
        format!("{:.0} per minute", summary.per_minute),
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    pace.render(chunks[2], buf);

    let verdict_text = if summary.score >= 15 {
        "LIGHTNING FAST"
    } else if summary.passed {
        "QUICK THINKER"
    } else {
        "KEEP PRACTICING"
    };
    let verdict_style = if summary.passed {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    };
    Paragraph::new(Span::styled(verdict_text, verdict_style))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let totals_widget = Paragraph::new(Span::styled(
        format!(
            "total coins {}   total xp {}",
            app.handoff.total_coins, app.handoff.total_xp
        ),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    totals_widget.render(chunks[4], buf);

    let legend = Paragraph::new(Span::styled(
        "(r)eplay / (s)tats / (esc)ape",
        italic_style,
    ));
    legend.render(chunks[6], buf);
}

/// Draws the celebration overlay on top of whatever screen is up.
/// Particles fade through bold/plain/dim as they age out.
fn render_celebration_particles(
    celebration: &crate::celebration::CelebrationAnimation,
    area: Rect,
    buf: &mut Buffer,
) {
    use crate::celebration::ParticleKind;

    let palette = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::LightYellow,
    ];

    for particle in &celebration.particles {
        let x = particle.x as u16;
        let y = particle.y as u16;
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = palette[particle.hue % palette.len()];
        let remaining = 1.0 - (particle.age / particle.lifespan);

        let style = match particle.kind {
            // Headline glyphs stay bold until they are nearly gone
            ParticleKind::Glyph if remaining > 0.4 => {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            }
            ParticleKind::Glyph => Style::default().fg(color),
            ParticleKind::Confetti if remaining > 0.7 => {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            }
            ParticleKind::Confetti if remaining > 0.3 => Style::default().fg(color),
            ParticleKind::Confetti => Style::default().fg(color).add_modifier(Modifier::DIM),
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }
}
