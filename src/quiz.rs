use crate::bank::{Bank, Question};
use crate::celebration::CelebrationAnimation;
use crate::config::Scoring;
use crate::session_log::{SessionLog, SessionRecord};
use crate::stats::{time_diff_ms, AttemptStat, ProgressDb};
use crate::time_series::ResponsePoint;
use crate::util::{mean, std_dev};
use crate::TICK_RATE_MS;
use chrono::prelude::*;
use std::time::SystemTime;

#[derive(Clone, Debug, Copy, PartialEq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// One resolved question. A timeout is an answer with no choice.
#[derive(Clone, Debug, PartialEq)]
pub struct Answer {
    pub question_id: String,
    pub choice_id: Option<String>,
    pub outcome: Outcome,
    pub response_ms: u64,
    pub timestamp: SystemTime,
}

/// Where the session is in its presenting/reveal/done cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Presenting,
    Answered,
    Complete,
}

/// End-of-session totals.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub correct_count: usize,
    pub coins_awarded: u32,
    pub xp_awarded: u32,
    pub passed: bool,
    pub elapsed_secs: f64,
    pub mean_response_ms: f64,
    pub std_dev_response_ms: f64,
}

/// represents one quiz session being played
///
/// The session owns its countdowns: `on_tick` drives both the
/// per-question timer while presenting and the reveal delay after an
/// answer, so the ui never mutates game state directly.
#[derive(Debug)]
pub struct Quiz {
    pub bank_id: String,
    pub title: String,
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub phase: Phase,
    pub selected: Option<String>,
    pub answers: Vec<Answer>,
    pub coins_earned: u32,
    pub scoring: Scoring,
    pub pass_mark: usize,
    pub started_at: SystemTime,
    pub finished_at: Option<SystemTime>,
    pub seconds_remaining: Option<f64>,
    pub reveal_remaining_ms: Option<u64>,
    pub question_shown_at: SystemTime,
    pub celebration: CelebrationAnimation,
    pub progress_db: Option<ProgressDb>,
    pub session_log: Option<SessionLog>,
    pub abandoned: bool,
}

impl Quiz {
    pub fn with_db(
        bank: &Bank,
        questions: Vec<Question>,
        scoring: Scoring,
        pass_mark: usize,
        progress_db: Option<ProgressDb>,
    ) -> Self {
        let now = SystemTime::now();
        let seconds_remaining = questions
            .first()
            .and_then(|q| q.time_limit_secs.or(scoring.default_time_limit_secs))
            .map(|s| s as f64);

        Self {
            bank_id: bank.id.clone(),
            title: bank.title.clone(),
            questions,
            current_index: 0,
            phase: Phase::Presenting,
            selected: None,
            answers: vec![],
            coins_earned: 0,
            scoring,
            pass_mark,
            started_at: now,
            finished_at: None,
            seconds_remaining,
            reveal_remaining_ms: None,
            question_shown_at: now,
            celebration: CelebrationAnimation::new(),
            progress_db,
            session_log: None,
            abandoned: false,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn last_answer(&self) -> Option<&Answer> {
        self.answers.last()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Locks in a choice for the current question. Returns false when
    /// the session is not accepting answers (already answered, complete
    /// or abandoned) or the choice id is unknown; the first accepted
    /// answer per question is the only one that counts.
    pub fn submit_choice(&mut self, choice_id: &str) -> bool {
        if self.abandoned || self.phase != Phase::Presenting {
            return false;
        }
        let (question_id, is_correct) = match self.current_question() {
            Some(question) => match question.choice(choice_id) {
                Some(choice) => (question.id.clone(), choice.is_correct),
                None => return false,
            },
            None => return false,
        };

        let now = SystemTime::now();
        let outcome = if is_correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        let response_ms = time_diff_ms(self.question_shown_at, now);

        self.record(question_id, Some(choice_id.to_string()), outcome, response_ms, now);

        if outcome == Outcome::Correct {
            self.coins_earned += self.scoring.coins_per_correct;
        }
        self.selected = Some(choice_id.to_string());
        self.phase = Phase::Answered;
        self.seconds_remaining = None;
        self.reveal_remaining_ms = Some(match outcome {
            Outcome::Correct => self.scoring.correct_reveal_ms,
            Outcome::Incorrect => self.scoring.incorrect_reveal_ms,
        });
        true
    }

    pub fn on_tick(&mut self) {
        if self.abandoned {
            return;
        }
        match self.phase {
            Phase::Presenting => {
                if let Some(remaining) = self.seconds_remaining {
                    let remaining = remaining - (TICK_RATE_MS as f64 / 1000_f64);
                    self.seconds_remaining = Some(remaining);
                    if remaining <= 0.0 {
                        self.time_out();
                    }
                }
            }
            Phase::Answered => {
                if let Some(ms) = self.reveal_remaining_ms {
                    let ms = ms.saturating_sub(TICK_RATE_MS);
                    self.reveal_remaining_ms = Some(ms);
                    if ms == 0 {
                        self.advance();
                    }
                }
            }
            Phase::Complete => {}
        }
        self.celebration.update();
    }

    /// A timer expiry counts as an incorrect answer with no choice made.
    fn time_out(&mut self) {
        let (question_id, limit_secs) = match self.current_question() {
            Some(question) => (
                question.id.clone(),
                question
                    .time_limit_secs
                    .or(self.scoring.default_time_limit_secs)
                    .unwrap_or(0),
            ),
            None => return,
        };
        self.record(
            question_id,
            None,
            Outcome::Incorrect,
            limit_secs * 1000,
            SystemTime::now(),
        );
        self.selected = None;
        self.phase = Phase::Answered;
        self.seconds_remaining = None;
        self.reveal_remaining_ms = Some(self.scoring.incorrect_reveal_ms);
    }

    /// Moves on from a revealed answer: next question, or completion
    /// after the last one. Only legal from the reveal phase, so a
    /// finished session completes exactly once.
    pub fn advance(&mut self) {
        if self.abandoned || self.phase != Phase::Answered {
            return;
        }
        if self.current_index + 1 >= self.questions.len() {
            self.complete();
        } else {
            self.current_index += 1;
            self.selected = None;
            self.reveal_remaining_ms = None;
            self.question_shown_at = SystemTime::now();
            self.seconds_remaining = self.questions[self.current_index]
                .time_limit_secs
                .or(self.scoring.default_time_limit_secs)
                .map(|s| s as f64);
            self.phase = Phase::Presenting;
        }
    }

    fn complete(&mut self) {
        self.phase = Phase::Complete;
        self.finished_at = Some(SystemTime::now());
        self.reveal_remaining_ms = None;
        let _ = self.save_results();
    }

    fn record(
        &mut self,
        question_id: String,
        choice_id: Option<String>,
        outcome: Outcome,
        response_ms: u64,
        now: SystemTime,
    ) {
        if let Some(ref db) = self.progress_db {
            let stat = AttemptStat {
                bank_id: self.bank_id.clone(),
                question_id: question_id.clone(),
                choice_id: choice_id.clone(),
                was_correct: outcome == Outcome::Correct,
                response_ms,
                timestamp: Local::now(),
            };
            let _ = db.record_attempt(&stat);
        }
        self.answers.push(Answer {
            question_id,
            choice_id,
            outcome,
            response_ms,
            timestamp: now,
        });
    }

    pub fn summary(&self) -> Summary {
        let correct_count = self
            .answers
            .iter()
            .filter(|a| a.outcome == Outcome::Correct)
            .count();
        let response_times: Vec<f64> = self.answers.iter().map(|a| a.response_ms as f64).collect();
        let elapsed_secs = match self.finished_at {
            Some(end) => end
                .duration_since(self.started_at)
                .unwrap_or_default()
                .as_secs_f64(),
            None => self.started_at.elapsed().unwrap_or_default().as_secs_f64(),
        };
        // Session xp is only awarded for a finished run
        let xp_awarded = if self.phase == Phase::Complete {
            self.scoring.xp_per_session
        } else {
            0
        };

        Summary {
            total: self.questions.len(),
            correct_count,
            coins_awarded: self.coins_earned,
            xp_awarded,
            passed: correct_count >= self.pass_mark,
            elapsed_secs,
            mean_response_ms: mean(&response_times).unwrap_or(0.0),
            std_dev_response_ms: std_dev(&response_times).unwrap_or(0.0),
        }
    }

    /// Per-question response times in seconds, for the results chart.
    pub fn response_points(&self) -> Vec<ResponsePoint> {
        self.answers
            .iter()
            .enumerate()
            .map(|(i, a)| ResponsePoint::new((i + 1) as f64, a.response_ms as f64 / 1000.0))
            .collect()
    }

    pub fn celebrate_answer(&mut self, width: u16, height: u16) {
        self.celebration
            .burst(width, height, self.scoring.coins_per_correct);
    }

    /// Walks away from the session: both countdowns stop and every
    /// later call into the game is a no-op.
    pub fn abandon(&mut self) {
        self.abandoned = true;
        self.seconds_remaining = None;
        self.reveal_remaining_ms = None;
        self.celebration.is_active = false;
        self.celebration.particles.clear();
    }

    pub fn save_results(&self) -> std::io::Result<()> {
        if let Some(ref log) = self.session_log {
            let summary = self.summary();
            log.append(&SessionRecord {
                date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                bank: self.bank_id.clone(),
                mode: "quiz".to_string(),
                total: summary.total,
                correct: summary.correct_count,
                coins: summary.coins_awarded,
                xp: summary.xp_awarded,
                passed: summary.passed,
                elapsed_secs: summary.elapsed_secs,
            })?;
        }
        Ok(())
    }
}
