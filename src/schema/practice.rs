//! Practice goal forms.

use serde::{Deserialize, Serialize};

use super::{is_iso_date, Validate, ValidationErrors};
use crate::types::GoalType;

/// A goal to create. The server assigns `id`, `user_id` and `current_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub target_value: f64,
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
}

impl NewGoal {
    pub fn new(
        goal_type: GoalType,
        target_value: f64,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            goal_type,
            target_value,
            start_date: start_date.into(),
            end_date: end_date.into(),
            is_active: true,
        }
    }
}

impl Validate for NewGoal {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_target(&mut errors, self.goal_type, self.target_value);
        check_range(&mut errors, Some(&self.start_date), Some(&self.end_date));
        errors.into_result()
    }
}

/// Partial goal update; only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalUpdate {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<GoalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl GoalUpdate {
    pub fn is_empty(&self) -> bool {
        self.goal_type.is_none()
            && self.target_value.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.is_active.is_none()
    }
}

impl Validate for GoalUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.is_empty() {
            errors.add("goal", "Nothing to update");
        }
        if let Some(target) = self.target_value {
            check_target(
                &mut errors,
                self.goal_type.unwrap_or(GoalType::DailySessions),
                target,
            );
        }
        check_range(
            &mut errors,
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        );
        errors.into_result()
    }
}

fn check_target(errors: &mut ValidationErrors, goal_type: GoalType, target: f64) {
    if !target.is_finite() || target <= 0.0 {
        errors.add("target_value", "Target must be greater than zero");
    } else if goal_type == GoalType::MonthlyScore && target > 100.0 {
        errors.add("target_value", "Score targets must be between 0 and 100");
    }
}

fn check_range(errors: &mut ValidationErrors, start: Option<&str>, end: Option<&str>) {
    if let Some(start) = start {
        if !is_iso_date(start) {
            errors.add("start_date", "Start date must be an ISO-8601 date");
        }
    }
    if let Some(end) = end {
        if !is_iso_date(end) {
            errors.add("end_date", "End date must be an ISO-8601 date");
        }
    }
    if let (Some(start), Some(end)) = (start, end) {
        // ISO-8601 dates order lexicographically.
        if is_iso_date(start) && is_iso_date(end) && end[..10] < start[..10] {
            errors.add("end_date", "End date must not be before start date");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_goal_rules() {
        let goal = NewGoal::new(GoalType::DailySessions, 3.0, "2024-05-01", "2024-05-31");
        assert!(goal.validate().is_ok());

        let goal = NewGoal::new(GoalType::MonthlyScore, 120.0, "2024-05-31", "2024-05-01");
        let errs = goal.validate().unwrap_err();
        assert!(errs.has("target_value"));
        assert!(errs.has("end_date"));

        let goal = NewGoal::new(GoalType::WeeklyWords, 0.0, "yesterday", "2024-05-01");
        let errs = goal.validate().unwrap_err();
        assert!(errs.has("target_value"));
        assert!(errs.has("start_date"));
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(GoalUpdate::default().validate().unwrap_err().has("goal"));
        let update = GoalUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"is_active": false})
        );
    }
}
