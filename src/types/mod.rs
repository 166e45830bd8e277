//! 类型系统模块：定义与后端交换的实体（用户、词汇、练习）。
//!
//! # Types Module
//!
//! Plain records exchanged with the backend. The client never holds an
//! authoritative copy, only cached snapshots.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`User`] | Identity of the signed-in user |
//! | [`AuthResponse`] | User plus session token from login/register/refresh |
//! | [`Word`] / [`PracticeWord`] | Vocabulary entries |
//! | [`VocabularyPage`] | Paginated word listing |
//! | [`PracticeSession`] / [`PracticeFeedback`] | A practice attempt and its scoring |
//! | [`PracticeGoal`] | User-defined practice target |
//! | [`PracticeStats`] | Aggregate read-model |

pub mod practice;
pub mod user;
pub mod vocabulary;

pub use practice::{
    GoalType, MonthlyProgress, PracticeFeedback, PracticeGoal, PracticeSession, PracticeStats,
    Recording, WeeklyProgress,
};
pub use user::{AuthResponse, User, UserPatch};
pub use vocabulary::{Difficulty, PracticeWord, SortField, SortOrder, VocabularyPage, Word};
