use super::Question;
use crate::stats::ProgressDb;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::HashMap;

/// Strategy for picking which questions a session plays, and in what order.
pub trait QuestionSelector {
    fn select(&self, questions: &[Question], count: usize) -> Vec<Question>;
}

/// Plays the bank in authored order. The default.
pub struct OrderedSelector;

impl QuestionSelector for OrderedSelector {
    fn select(&self, questions: &[Question], count: usize) -> Vec<Question> {
        questions.iter().take(count).cloned().collect()
    }
}

pub struct ShuffledSelector;

impl QuestionSelector for ShuffledSelector {
    fn select(&self, questions: &[Question], count: usize) -> Vec<Question> {
        let mut picked = questions.to_vec();
        picked.shuffle(&mut thread_rng());
        picked.truncate(count);
        picked
    }
}

/// Front-loads the questions the player misses most often, using the
/// recorded attempt history. Questions with no history keep bank order
/// and fill the tail.
pub struct WeakSpotSelector<'a> {
    db: &'a ProgressDb,
    bank_id: &'a str,
}

impl<'a> WeakSpotSelector<'a> {
    pub fn new(db: &'a ProgressDb, bank_id: &'a str) -> Self {
        Self { db, bank_id }
    }
}

impl QuestionSelector for WeakSpotSelector<'_> {
    fn select(&self, questions: &[Question], count: usize) -> Vec<Question> {
        let summaries = match self.db.question_summary(self.bank_id) {
            Ok(s) => s,
            Err(_) => return OrderedSelector.select(questions, count),
        };
        let miss_rate: HashMap<&str, f64> = summaries
            .iter()
            .map(|s| (s.question_id.as_str(), s.miss_rate))
            .collect();
        let mut seen: Vec<(f64, &Question)> = Vec::new();
        let mut unseen: Vec<&Question> = Vec::new();
        for question in questions {
            match miss_rate.get(question.id.as_str()) {
                Some(&rate) => seen.push((rate, question)),
                None => unseen.push(question),
            }
        }
        seen.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        seen.into_iter()
            .map(|(_, q)| q)
            .chain(unseen)
            .take(count)
            .cloned()
            .collect()
    }
}

/// Picks the selector the cli flags ask for. Practice mode needs the
/// progress database; without one it falls back to the plain orderings.
pub fn selector_for<'a>(
    practice: bool,
    shuffle: bool,
    db: Option<&'a ProgressDb>,
    bank_id: &'a str,
) -> Box<dyn QuestionSelector + 'a> {
    if practice {
        if let Some(db) = db {
            return Box::new(WeakSpotSelector::new(db, bank_id));
        }
    }
    if shuffle {
        Box::new(ShuffledSelector)
    } else {
        Box::new(OrderedSelector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Choice;
    use crate::stats::AttemptStat;
    use chrono::Local;

    fn questions(n: usize) -> Vec<Question> {
        (1..=n)
            .map(|i| Question {
                id: format!("q{}", i),
                prompt: format!("prompt {}", i),
                choices: vec![
                    Choice {
                        id: "a".into(),
                        label: "yes".into(),
                        is_correct: true,
                        explanation: None,
                    },
                    Choice {
                        id: "b".into(),
                        label: "no".into(),
                        is_correct: false,
                        explanation: None,
                    },
                ],
                time_limit_secs: None,
            })
            .collect()
    }

    fn attempt(question_id: &str, was_correct: bool) -> AttemptStat {
        AttemptStat {
            bank_id: "drills".into(),
            question_id: question_id.into(),
            choice_id: Some("a".into()),
            was_correct,
            response_ms: 1200,
            timestamp: Local::now(),
        }
    }

    #[test]
    fn ordered_takes_the_first_n() {
        let qs = questions(5);
        let picked = OrderedSelector.select(&qs, 3);
        let ids: Vec<_> = picked.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn ordered_caps_at_the_bank_size() {
        let qs = questions(2);
        assert_eq!(OrderedSelector.select(&qs, 10).len(), 2);
    }

    #[test]
    fn shuffled_keeps_the_requested_count_and_set() {
        let qs = questions(5);
        let picked = ShuffledSelector.select(&qs, 5);
        assert_eq!(picked.len(), 5);
        for q in &qs {
            assert!(picked.iter().any(|p| p.id == q.id));
        }
    }

    #[test]
    fn weak_spots_come_first() {
        let db = ProgressDb::open_in_memory().unwrap();
        db.record_attempt(&attempt("q1", true)).unwrap();
        db.record_attempt(&attempt("q1", true)).unwrap();
        db.record_attempt(&attempt("q3", false)).unwrap();
        db.record_attempt(&attempt("q3", false)).unwrap();

        let qs = questions(4);
        let picked = WeakSpotSelector::new(&db, "drills").select(&qs, 4);
        let ids: Vec<_> = picked.iter().map(|q| q.id.as_str()).collect();
        // q3 missed every time, then q1, then the unseen pair in bank order.
        assert_eq!(ids, vec!["q3", "q1", "q2", "q4"]);
    }

    #[test]
    fn selector_for_prefers_practice_when_a_db_exists() {
        let db = ProgressDb::open_in_memory().unwrap();
        let qs = questions(3);
        let picked = selector_for(true, false, Some(&db), "drills").select(&qs, 3);
        assert_eq!(picked.len(), 3);
        let picked = selector_for(false, false, None, "drills").select(&qs, 2);
        assert_eq!(picked[0].id, "q1");
    }
}
