use crate::bank::{Bank, Question};
use crate::celebration::CelebrationAnimation;
use crate::config::Scoring;
use crate::session_log::{SessionLog, SessionRecord};
use crate::stats::{time_diff_ms, AttemptStat, ProgressDb};
use crate::TICK_RATE_MS;
use chrono::prelude::*;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::time::SystemTime;

/// Coins for seeing a whole round through to the buzzer.
pub const FINISH_BONUS_COINS: u32 = 5;

/// End-of-round totals for a reflex session.
#[derive(Clone, Debug, PartialEq)]
pub struct ReflexSummary {
    pub score: u32,
    pub taps: u32,
    pub best_streak: u32,
    pub per_minute: f64,
    pub coins_awarded: u32,
    pub xp_awarded: u32,
    pub passed: bool,
}

/// Rapid-fire round over a bank: one global countdown, instant
/// advancement, questions cycling until the buzzer. Attempts are held
/// back and written to the progress database in one batch at the end.
#[derive(Debug)]
pub struct Reflex {
    pub bank_id: String,
    pub title: String,
    pub questions: Vec<Question>,
    pub position: usize,
    pub score: u32,
    pub taps: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub coins_earned: u32,
    pub scoring: Scoring,
    pub pass_score: u32,
    pub duration_secs: u64,
    pub seconds_remaining: f64,
    pub started_at: SystemTime,
    pub question_shown_at: SystemTime,
    pub finished: bool,
    pub pending: Vec<AttemptStat>,
    pub celebration: CelebrationAnimation,
    pub progress_db: Option<ProgressDb>,
    pub session_log: Option<SessionLog>,
    pub abandoned: bool,
}

impl Reflex {
    pub fn with_db(
        bank: &Bank,
        scoring: Scoring,
        duration_secs: u64,
        pass_score: u32,
        progress_db: Option<ProgressDb>,
    ) -> Self {
        let mut questions = bank.questions.clone();
        questions.shuffle(&mut thread_rng());
        let now = SystemTime::now();

        Self {
            bank_id: bank.id.clone(),
            title: bank.title.clone(),
            questions,
            position: 0,
            score: 0,
            taps: 0,
            streak: 0,
            best_streak: 0,
            coins_earned: 0,
            scoring,
            pass_score,
            duration_secs,
            seconds_remaining: duration_secs as f64,
            started_at: now,
            question_shown_at: now,
            finished: false,
            pending: vec![],
            celebration: CelebrationAnimation::new(),
            progress_db,
            session_log: None,
            abandoned: false,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.questions.is_empty() {
            return None;
        }
        self.questions.get(self.position % self.questions.len())
    }

    pub fn is_complete(&self) -> bool {
        self.finished
    }

    /// One tap. Correct extends the streak and pays out, wrong resets
    /// it; either way the next question comes up immediately.
    pub fn answer(&mut self, choice_id: &str) -> bool {
        if self.abandoned || self.finished {
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
        self.taps += 1;
        if is_correct {
            self.score += 1;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
            self.coins_earned += self.scoring.coins_per_correct;
        } else {
            self.streak = 0;
        }

        self.pending.push(AttemptStat {
            bank_id: self.bank_id.clone(),
            question_id,
            choice_id: Some(choice_id.to_string()),
            was_correct: is_correct,
            response_ms: time_diff_ms(self.question_shown_at, now),
            timestamp: Local::now(),
        });

        self.position += 1;
        self.question_shown_at = now;
        true
    }

    pub fn on_tick(&mut self) {
        if self.abandoned || self.finished {
            self.celebration.update();
            return;
        }
        self.seconds_remaining -= TICK_RATE_MS as f64 / 1000_f64;
        if self.seconds_remaining <= 0.0 {
            self.seconds_remaining = 0.0;
            self.finish();
        }
        self.celebration.update();
    }

    fn finish(&mut self) {
        self.finished = true;
        self.coins_earned += FINISH_BONUS_COINS;
        if let Some(ref mut db) = self.progress_db {
            let _ = db.record_attempts_batch(&self.pending);
        }
        let _ = self.save_results();
    }

    pub fn summary(&self) -> ReflexSummary {
        let per_minute = if self.duration_secs == 0 {
            0.0
        } else {
            self.score as f64 * 60.0 / self.duration_secs as f64
        };

        ReflexSummary {
            score: self.score,
            taps: self.taps,
            best_streak: self.best_streak,
            per_minute,
            coins_awarded: self.coins_earned,
            xp_awarded: if self.finished {
                self.scoring.xp_per_session
            } else {
                0
            },
            passed: self.score >= self.pass_score,
        }
    }

    /// Walks away mid-round: the countdown stops, no bonus is paid and
    /// the held-back attempts never reach the database.
    pub fn abandon(&mut self) {
        self.abandoned = true;
        self.celebration.is_active = false;
        self.celebration.particles.clear();
    }

    pub fn save_results(&self) -> std::io::Result<()> {
        if let Some(ref log) = self.session_log {
            let summary = self.summary();
            log.append(&SessionRecord {
                date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                bank: self.bank_id.clone(),
                mode: "reflex".to_string(),
                total: summary.taps as usize,
                correct: summary.score as usize,
                coins: summary.coins_awarded,
                xp: summary.xp_awarded,
                passed: summary.passed,
                elapsed_secs: self.duration_secs as f64,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scoring() -> Scoring {
        Scoring {
            coins_per_correct: 1,
            xp_per_session: 10,
            correct_reveal_ms: 1500,
            incorrect_reveal_ms: 800,
            default_time_limit_secs: None,
        }
    }

    fn reflex() -> Reflex {
        let bank = Bank::load("finance-kids-reflex").unwrap();
        Reflex::with_db(&bank, scoring(), 30, 10, None)
    }

    fn correct_id(reflex: &Reflex) -> String {
        reflex
            .current_question()
            .unwrap()
            .correct_choice()
            .id
            .clone()
    }

    fn wrong_id(reflex: &Reflex) -> String {
        reflex
            .current_question()
            .unwrap()
            .choices
            .iter()
            .find(|c| !c.is_correct)
            .unwrap()
            .id
            .clone()
    }

    #[test]
    fn test_reflex_new() {
        let reflex = reflex();

        assert_eq!(reflex.score, 0);
        assert_eq!(reflex.taps, 0);
        assert_eq!(reflex.seconds_remaining, 30.0);
        assert!(!reflex.is_complete());
        assert!(reflex.current_question().is_some());
    }

    #[test]
    fn test_correct_answer_extends_the_streak() {
        let mut reflex = reflex();

        for _ in 0..3 {
            let id = correct_id(&reflex);
            assert!(reflex.answer(&id));
        }

        assert_eq!(reflex.score, 3);
        assert_eq!(reflex.streak, 3);
        assert_eq!(reflex.best_streak, 3);
        assert_eq!(reflex.coins_earned, 3);
        assert_eq!(reflex.taps, 3);
    }

    #[test]
    fn test_wrong_answer_resets_the_streak() {
        let mut reflex = reflex();

        for _ in 0..2 {
            let id = correct_id(&reflex);
            reflex.answer(&id);
        }
        let id = wrong_id(&reflex);
        reflex.answer(&id);

        assert_eq!(reflex.score, 2);
        assert_eq!(reflex.streak, 0);
        assert_eq!(reflex.best_streak, 2);
        assert_eq!(reflex.taps, 3);
    }

    #[test]
    fn test_questions_cycle_past_the_end_of_the_bank() {
        let mut reflex = reflex();
        let total = reflex.questions.len();

        for _ in 0..total + 2 {
            let id = correct_id(&reflex);
            assert!(reflex.answer(&id));
        }

        assert_eq!(reflex.taps as usize, total + 2);
        assert!(reflex.current_question().is_some());
    }

    #[test]
    fn test_buzzer_finishes_the_round_with_a_bonus() {
        let mut reflex = reflex();
        let id = correct_id(&reflex);
        reflex.answer(&id);

        reflex.seconds_remaining = 0.05;
        reflex.on_tick();

        assert!(reflex.is_complete());
        assert_eq!(reflex.seconds_remaining, 0.0);
        assert_eq!(reflex.coins_earned, 1 + FINISH_BONUS_COINS);

        // Finishing again is not possible
        let coins = reflex.coins_earned;
        reflex.on_tick();
        assert_eq!(reflex.coins_earned, coins);
        assert!(!reflex.answer("a"));
    }

    #[test]
    fn test_finish_flushes_attempts_in_one_batch() {
        let bank = Bank::load("finance-kids-reflex").unwrap();
        let db = ProgressDb::open_in_memory().unwrap();
        let mut reflex = Reflex::with_db(&bank, scoring(), 30, 10, Some(db));

        for _ in 0..4 {
            let id = correct_id(&reflex);
            reflex.answer(&id);
        }
        // Nothing hits the database until the buzzer
        assert_eq!(
            reflex
                .progress_db
                .as_ref()
                .unwrap()
                .bank_totals("finance-kids-reflex")
                .unwrap(),
            (0, 0)
        );

        reflex.seconds_remaining = 0.05;
        reflex.on_tick();

        assert_eq!(
            reflex
                .progress_db
                .as_ref()
                .unwrap()
                .bank_totals("finance-kids-reflex")
                .unwrap(),
            (4, 4)
        );
    }

    #[test]
    fn test_buzzer_appends_to_the_injected_session_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.csv");
        let mut reflex = reflex();
        reflex.session_log = Some(SessionLog::with_path(&path));

        for _ in 0..2 {
            let id = correct_id(&reflex);
            reflex.answer(&id);
        }
        reflex.seconds_remaining = 0.05;
        reflex.on_tick();

        let records = SessionLog::with_path(&path).read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mode, "reflex");
        assert_eq!(records[0].correct, 2);
        assert_eq!(records[0].coins, 2 + FINISH_BONUS_COINS);
    }

    #[test]
    fn test_summary_rates_and_pass_mark() {
        let mut reflex = reflex();

        for _ in 0..10 {
            let id = correct_id(&reflex);
            reflex.answer(&id);
        }
        reflex.seconds_remaining = 0.05;
        reflex.on_tick();

        let summary = reflex.summary();
        assert_eq!(summary.score, 10);
        assert_eq!(summary.per_minute, 20.0);
        assert!(summary.passed);
        assert_eq!(summary.xp_awarded, 10);
        assert_eq!(summary.coins_awarded, 10 + FINISH_BONUS_COINS);
    }

    #[test]
    fn test_below_pass_score_fails() {
        let mut reflex = reflex();

        for _ in 0..3 {
            let id = correct_id(&reflex);
            reflex.answer(&id);
        }
        reflex.seconds_remaining = 0.05;
        reflex.on_tick();

        assert!(!reflex.summary().passed);
    }

    #[test]
    fn test_abandon_forfeits_bonus_and_database_write() {
        let bank = Bank::load("finance-kids-reflex").unwrap();
        let db = ProgressDb::open_in_memory().unwrap();
        let mut reflex = Reflex::with_db(&bank, scoring(), 30, 10, Some(db));

        let id = correct_id(&reflex);
        reflex.answer(&id);
        reflex.abandon();

        let remaining = reflex.seconds_remaining;
        for _ in 0..50 {
            reflex.on_tick();
        }

        assert_eq!(reflex.seconds_remaining, remaining);
        assert!(!reflex.is_complete());
        assert_eq!(reflex.coins_earned, 1);
        assert_eq!(
            reflex
                .progress_db
                .as_ref()
                .unwrap()
                .bank_totals("finance-kids-reflex")
                .unwrap(),
            (0, 0)
        );
        assert_eq!(reflex.summary().xp_awarded, 0);
    }
}
