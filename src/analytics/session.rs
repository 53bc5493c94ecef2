// src/analytics/session.rs

//! Aggregates over game sessions and assignment progress.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{
    ratio,
    record::{number, timestamp},
};
use crate::{
    config::{SCORE_PER_XP, XP_PER_LEVEL},
    models::progress::ProgressStatus,
    store::Row,
};

/// One ended (or still running) game session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    pub student_id: String,
    pub game_type: String,
    pub final_score: f64,
    pub accuracy: f64,
    pub duration_seconds: f64,
    pub words_practiced: u64,
    pub ended_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn from_row(row: &Row) -> Self {
        let text = |name: &str| row.get(name).and_then(Value::as_str).unwrap_or_default().to_string();
        Self {
            student_id: text("student_id"),
            game_type: text("game_type"),
            final_score: number(row.get("final_score")),
            accuracy: number(row.get("accuracy_percentage")),
            duration_seconds: number(row.get("duration_seconds")),
            words_practiced: number(row.get("unique_words_practiced")).max(0.0) as u64,
            ended_at: timestamp(row.get("ended_at")),
        }
    }
}

/// XP earned for one session: one point per ten score points, rounded down.
pub fn xp_for_score(score: f64) -> u64 {
    if score.is_finite() && score > 0.0 {
        (score / SCORE_PER_XP).floor() as u64
    } else {
        0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameTypeStats {
    pub games_played: u64,
    pub total_score: f64,
    pub total_accuracy: f64,
    pub best_score: f64,
    pub total_time: f64,
    pub average_score: f64,
    pub average_accuracy: f64,
}

/// Per-game-type totals and averages.
pub fn summarize_by_game(sessions: &[SessionRecord]) -> BTreeMap<String, GameTypeStats> {
    let mut stats: BTreeMap<String, GameTypeStats> = BTreeMap::new();
    for session in sessions {
        let entry = stats.entry(session.game_type.clone()).or_default();
        entry.games_played += 1;
        entry.total_score += session.final_score;
        entry.total_accuracy += session.accuracy;
        entry.best_score = entry.best_score.max(session.final_score);
        entry.total_time += session.duration_seconds;
    }
    for entry in stats.values_mut() {
        let played = entry.games_played as f64;
        entry.average_score = ratio(entry.total_score, played);
        entry.average_accuracy = ratio(entry.total_accuracy, played);
    }
    stats
}

/// Game profile derived from a student's sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentProfile {
    pub total_xp: u64,
    pub current_level: u64,
    pub xp_to_next_level: u64,
    pub total_games_played: u64,
    pub words_learned: u64,
    pub total_time_played: f64,
    pub accuracy_average: f64,
    pub last_activity: Option<DateTime<Utc>>,
}

impl StudentProfile {
    pub fn from_sessions(sessions: &[SessionRecord]) -> Self {
        let total_xp: u64 = sessions.iter().map(|s| xp_for_score(s.final_score)).sum();
        let accuracy_sum: f64 = sessions.iter().map(|s| s.accuracy).sum();
        Self {
            total_xp,
            current_level: total_xp / XP_PER_LEVEL + 1,
            xp_to_next_level: XP_PER_LEVEL - total_xp % XP_PER_LEVEL,
            total_games_played: sessions.len() as u64,
            words_learned: sessions.iter().map(|s| s.words_practiced).sum(),
            total_time_played: sessions.iter().map(|s| s.duration_seconds).sum(),
            accuracy_average: ratio(accuracy_sum, sessions.len() as f64),
            last_activity: sessions.iter().filter_map(|s| s.ended_at).max(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub student_id: String,
    pub total_score: f64,
    pub total_xp: u64,
    pub games_played: u64,
    pub best_score: f64,
    pub average_accuracy: f64,
    pub game_types: Vec<String>,
}

/// Ranks students by total score across all games, best single score
/// breaking ties, then student id.
pub fn rank_students(sessions: &[SessionRecord], limit: usize) -> Vec<LeaderboardEntry> {
    let mut by_student: HashMap<&str, Vec<&SessionRecord>> = HashMap::new();
    for session in sessions {
        by_student.entry(session.student_id.as_str()).or_default().push(session);
    }

    let mut entries: Vec<LeaderboardEntry> = by_student
        .into_iter()
        .map(|(student_id, played)| {
            let mut game_types: Vec<String> = played.iter().map(|s| s.game_type.clone()).collect();
            game_types.sort();
            game_types.dedup();
            LeaderboardEntry {
                rank: 0,
                student_id: student_id.to_string(),
                total_score: played.iter().map(|s| s.final_score).sum(),
                total_xp: played.iter().map(|s| xp_for_score(s.final_score)).sum(),
                games_played: played.len() as u64,
                best_score: played.iter().map(|s| s.final_score).fold(0.0, f64::max),
                average_accuracy: ratio(
                    played.iter().map(|s| s.accuracy).sum(),
                    played.len() as f64,
                ),
                game_types,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_score
            .total_cmp(&a.total_score)
            .then(b.best_score.total_cmp(&a.best_score))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    entries.truncate(limit);
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    entries
}

/// Completion and score figures across an assignment's progress rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssignmentSummary {
    pub total_students: u64,
    pub completed_students: u64,
    pub completion_rate: f64,
    pub average_score: f64,
    pub average_accuracy: f64,
}

impl AssignmentSummary {
    pub fn from_progress(rows: &[Row]) -> Self {
        let total = rows.len() as f64;
        let completed = rows
            .iter()
            .filter(|row| ProgressStatus::of(row) == ProgressStatus::Completed)
            .count() as u64;
        let score_sum: f64 = rows.iter().map(|row| number(row.get("best_score"))).sum();
        let accuracy_sum: f64 = rows.iter().map(|row| number(row.get("best_accuracy"))).sum();
        Self {
            total_students: rows.len() as u64,
            completed_students: completed,
            completion_rate: ratio(completed as f64, total) * 100.0,
            average_score: ratio(score_sum, total),
            average_accuracy: ratio(accuracy_sum, total),
        }
    }
}

/// Class-wide activity figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassSummary {
    pub total_students: u64,
    pub active_students: u64,
    pub total_games: u64,
    pub average_xp: f64,
    pub average_accuracy: f64,
}

impl ClassSummary {
    /// `enrolled` is the class size; active students are those with at
    /// least one session in `sessions`.
    pub fn new(enrolled: usize, sessions: &[SessionRecord]) -> Self {
        let mut per_student: HashMap<&str, Vec<SessionRecord>> = HashMap::new();
        for session in sessions {
            per_student
                .entry(session.student_id.as_str())
                .or_default()
                .push(session.clone());
        }
        let profiles: Vec<StudentProfile> = per_student
            .values()
            .map(|played| StudentProfile::from_sessions(played))
            .collect();
        let active = profiles.len() as f64;
        Self {
            total_students: enrolled as u64,
            active_students: profiles.len() as u64,
            total_games: sessions.len() as u64,
            average_xp: ratio(profiles.iter().map(|p| p.total_xp as f64).sum(), active),
            average_accuracy: ratio(profiles.iter().map(|p| p.accuracy_average).sum(), active),
        }
    }
}
