//! Practice types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeSession {
    pub id: String,
    pub word_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<PracticeFeedback>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl PracticeSession {
    /// Attach feedback from a scored recording.
    pub fn apply_feedback(&mut self, feedback: &PracticeFeedback) {
        self.score = Some(feedback.overall_score);
        self.feedback = Some(feedback.clone());
    }
}

/// Feedback computed from a submitted recording. Sub-metrics are 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeFeedback {
    pub overall_score: f64,
    #[serde(default)]
    pub phoneme_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub fluency: f64,
    #[serde(default)]
    pub pronunciation: f64,
    #[serde(default)]
    pub word_accuracy: f64,
    #[serde(default)]
    pub rhythm_score: f64,
    #[serde(default)]
    pub stress_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyProgress {
    pub date: String,
    pub practice_time: u64,
    pub sessions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProgress {
    pub month: String,
    pub practice_time: u64,
    pub sessions: u32,
    pub average_score: f64,
}

/// Aggregate read-model; never patched locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeStats {
    pub total_sessions: u64,
    pub average_score: f64,
    pub words_practiced: u64,
    pub current_streak: u32,
    #[serde(default)]
    pub daily_goal_progress: f64,
    #[serde(default)]
    pub weekly_progress: Vec<WeeklyProgress>,
    #[serde(default)]
    pub monthly_progress: Vec<MonthlyProgress>,
    #[serde(default)]
    pub difficulty_breakdown: BTreeMap<String, u64>,
    #[serde(default)]
    pub category_breakdown: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    DailyTime,
    DailySessions,
    WeeklyWords,
    MonthlyScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeGoal {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: f64,
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
}

/// Recorded audio to submit for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub bytes: Bytes,
    pub mime: String,
    pub file_name: String,
}

impl Recording {
    pub fn new(bytes: impl Into<Bytes>, mime: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: mime.into(),
            file_name: "recording".to_string(),
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// WebM/Opus, the usual browser `MediaRecorder` output.
    pub fn webm(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes, "audio/webm").with_file_name("recording.webm")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_type_uses_wire_names() {
        let goal: PracticeGoal = serde_json::from_value(serde_json::json!({
            "id": "g1",
            "user_id": "u1",
            "type": "weekly_words",
            "target_value": 20,
            "current_value": 3,
            "start_date": "2024-05-01",
            "end_date": "2024-05-07",
            "is_active": true
        }))
        .unwrap();
        assert_eq!(goal.goal_type, GoalType::WeeklyWords);
        let back = serde_json::to_value(&goal).unwrap();
        assert_eq!(back["type"], "weekly_words");
    }

    #[test]
    fn apply_feedback_sets_score() {
        let mut session = PracticeSession {
            id: "s1".into(),
            word_id: "w1".into(),
            user_id: "u1".into(),
            audio_url: None,
            score: None,
            feedback: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let feedback: PracticeFeedback =
            serde_json::from_value(serde_json::json!({"overall_score": 87.5})).unwrap();
        session.apply_feedback(&feedback);
        assert_eq!(session.score, Some(87.5));
        assert_eq!(session.feedback, Some(feedback));
    }
}
