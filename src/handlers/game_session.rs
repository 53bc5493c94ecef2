// src/handlers/game_session.rs

use chrono::Utc;
use serde_json::{Value, json};

use super::{enrolled_students, stored_id};
use crate::{
    analytics::session::{
        ClassSummary, SessionRecord, StudentProfile, rank_students, summarize_by_game, xp_for_score,
    },
    config::{CLASS_RECENT_SESSIONS, DEFAULT_LEADERBOARD_LIMIT, STUDENT_RECENT_SESSIONS},
    error::HandlerError,
    models::{
        game_session::{
            ClassAnalyticsRequest, EndGameSessionRequest, LeaderboardRequest,
            StartGameSessionRequest, StudentAnalyticsRequest,
        },
        tables::{ACHIEVEMENTS, CLASSES, GAME_SESSIONS, PROFILES, STUDENT_CLASSES},
        to_row,
    },
    store::{DataStore, Embed, Filter, Row, Select},
    utils::time::{TimePeriod, timestamp_value},
};

/// Ended sessions, newest first, restricted to `period`.
fn ended_sessions(period: TimePeriod) -> Select {
    let query = Select::from(GAME_SESSIONS).not_null("ended_at");
    let query = match period.start(Utc::now()) {
        Some(start) => query.gte("ended_at", timestamp_value(start)),
        None => query,
    };
    query.newest_first("ended_at")
}

fn records(rows: &[Row]) -> Vec<SessionRecord> {
    rows.iter().map(SessionRecord::from_row).collect()
}

pub async fn start_session(
    store: &dyn DataStore,
    req: StartGameSessionRequest,
) -> Result<Value, HandlerError> {
    let mut row = to_row("game session", &req)?;
    row.insert("started_at".into(), timestamp_value(Utc::now()));

    let session = store.insert_one(GAME_SESSIONS, row).await.map_err(|e| {
        tracing::error!("Failed to start game session: {:?}", e);
        e
    })?;
    let session_id = stored_id(GAME_SESSIONS, &session)?;

    Ok(json!({ "success": true, "session_id": session_id }))
}

/// Records the results of a session owned by the given student.
///
/// The XP a session is worth is reported back; student profiles are
/// derived from sessions on read, so nothing else is written.
pub async fn end_session(
    store: &dyn DataStore,
    req: EndGameSessionRequest,
) -> Result<Value, HandlerError> {
    let mut patch = to_row("game session results", &req)?;
    patch.insert("ended_at".into(), timestamp_value(Utc::now()));

    let filters = [
        Filter::Eq("id", json!(req.session_id)),
        Filter::Eq("student_id", json!(req.student_id)),
    ];
    let session = store
        .update(GAME_SESSIONS, &filters, patch)
        .await
        .map_err(|e| {
            tracing::error!("Failed to end game session {}: {:?}", req.session_id, e);
            e
        })?
        .into_iter()
        .next()
        .ok_or_else(|| {
            HandlerError::NotFound(format!(
                "Game session {} for student {}",
                req.session_id, req.student_id
            ))
        })?;

    Ok(json!({
        "success": true,
        "session": session,
        "xp_gained": xp_for_score(req.final_score),
    }))
}

/// Students ranked by total score over ended sessions in the period,
/// optionally limited to one class.
pub async fn leaderboard(
    store: &dyn DataStore,
    req: LeaderboardRequest,
) -> Result<Value, HandlerError> {
    let mut query = ended_sessions(req.time_period);
    if let Some(class_id) = &req.class_id {
        let students = enrolled_students(store, class_id).await?;
        query = query.is_in("student_id", students);
    }

    let sessions = records(&store.select(&query).await?);
    let limit = req
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT as usize);

    Ok(json!({
        "leaderboard": rank_students(&sessions, limit),
        "time_period": req.time_period.as_str(),
        "class_id": req.class_id,
    }))
}

pub async fn student_analytics(
    store: &dyn DataStore,
    req: StudentAnalyticsRequest,
) -> Result<Value, HandlerError> {
    let rows = store
        .select(&ended_sessions(req.time_period).eq("student_id", req.student_id.as_str()))
        .await?;
    let sessions = records(&rows);
    let profile = StudentProfile::from_sessions(&sessions);

    let achievements = store
        .select(
            &Select::from(ACHIEVEMENTS)
                .eq("student_id", req.student_id.as_str())
                .newest_first("earned_at"),
        )
        .await?;

    let recent: Vec<&Row> = rows.iter().take(STUDENT_RECENT_SESSIONS as usize).collect();

    Ok(json!({
        "analytics": {
            "summary": {
                "total_games": profile.total_games_played,
                "total_xp": profile.total_xp,
                "current_level": profile.current_level,
                "total_achievements": achievements.len(),
            },
            "profile": profile,
            "game_stats": summarize_by_game(&sessions),
            "sessions": recent,
            "achievements": achievements,
            "time_period": req.time_period.as_str(),
        }
    }))
}

pub async fn class_analytics(
    store: &dyn DataStore,
    req: ClassAnalyticsRequest,
) -> Result<Value, HandlerError> {
    let class_info = store
        .select_one(&Select::from(CLASSES).eq("id", req.class_id.as_str()))
        .await?
        .ok_or_else(|| HandlerError::NotFound(format!("Class {}", req.class_id)))?;

    let students = store
        .select(
            &Select::from(STUDENT_CLASSES)
                .eq("class_id", req.class_id.as_str())
                .embed(Embed::one(PROFILES, "profile", "student_id", "id")),
        )
        .await?;
    let student_ids: Vec<Value> = students
        .iter()
        .filter_map(|row| row.get("student_id").cloned())
        .collect();

    let rows = store
        .select(&ended_sessions(req.time_period).is_in("student_id", student_ids))
        .await?;
    let sessions = records(&rows);
    let recent: Vec<&Row> = rows.iter().take(CLASS_RECENT_SESSIONS).collect();

    Ok(json!({
        "analytics": {
            "class": class_info,
            "summary": ClassSummary::new(students.len(), &sessions),
            "game_breakdown": summarize_by_game(&sessions),
            "students": students,
            "recent_sessions": recent,
            "time_period": req.time_period.as_str(),
        }
    }))
}
