// src/tools/mod.rs

//! The operation catalogue exposed to the calling agent.

pub mod dispatcher;
pub mod requests;
pub mod schema;

use std::sync::LazyLock;

use serde::Serialize;
use serde_json::Value;

use crate::models::{
    aqa::{AqaAnalyticsQuery, AqaResultsQuery, CreateAqaAssignmentRequest},
    assignment::{AssignmentAnalyticsRequest, CreateAssignmentRequest, GetAssignmentRequest},
    competition::{ActiveCompetitionsQuery, CreateCompetitionRequest},
    game_session::{
        ClassAnalyticsRequest, EndGameSessionRequest, LeaderboardRequest, StartGameSessionRequest,
        StudentAnalyticsRequest,
    },
    progress::UpdateProgressRequest,
    reading::{
        CreateReadingTaskRequest, ReadingAnalyticsQuery, ReadingTasksQuery,
        SaveReadingResultRequest,
    },
    vocabulary::{CreateVocabularyListRequest, VocabularyForGameRequest, VocabularyListsQuery},
};

pub use dispatcher::{Dispatcher, ToolOutcome};
pub use requests::ToolRequest;
use schema::InputSchema;

/// Every operation the server can run. The declaration order is the
/// catalogue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAssignment,
    GetAssignment,
    UpdateAssignmentProgress,
    GetAssignmentAnalytics,
    CreateVocabularyList,
    GetVocabularyLists,
    GetVocabularyForGame,
    StartGameSession,
    EndGameSession,
    GetCrossGameLeaderboard,
    GetStudentAnalytics,
    GetClassAnalytics,
    CreateCompetition,
    GetActiveCompetitions,
    CreateAqaReadingAssignment,
    GetAqaReadingResults,
    GetAqaReadingAnalytics,
    CreateReadingComprehensionTask,
    GetReadingComprehensionTasks,
    SaveReadingComprehensionResult,
    GetReadingComprehensionAnalytics,
}

impl Operation {
    pub const ALL: [Operation; 21] = [
        Operation::CreateAssignment,
        Operation::GetAssignment,
        Operation::UpdateAssignmentProgress,
        Operation::GetAssignmentAnalytics,
        Operation::CreateVocabularyList,
        Operation::GetVocabularyLists,
        Operation::GetVocabularyForGame,
        Operation::StartGameSession,
        Operation::EndGameSession,
        Operation::GetCrossGameLeaderboard,
        Operation::GetStudentAnalytics,
        Operation::GetClassAnalytics,
        Operation::CreateCompetition,
        Operation::GetActiveCompetitions,
        Operation::CreateAqaReadingAssignment,
        Operation::GetAqaReadingResults,
        Operation::GetAqaReadingAnalytics,
        Operation::CreateReadingComprehensionTask,
        Operation::GetReadingComprehensionTasks,
        Operation::SaveReadingComprehensionResult,
        Operation::GetReadingComprehensionAnalytics,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateAssignment => "create_assignment",
            Operation::GetAssignment => "get_assignment",
            Operation::UpdateAssignmentProgress => "update_assignment_progress",
            Operation::GetAssignmentAnalytics => "get_assignment_analytics",
            Operation::CreateVocabularyList => "create_vocabulary_list",
            Operation::GetVocabularyLists => "get_vocabulary_lists",
            Operation::GetVocabularyForGame => "get_vocabulary_for_game",
            Operation::StartGameSession => "start_game_session",
            Operation::EndGameSession => "end_game_session",
            Operation::GetCrossGameLeaderboard => "get_cross_game_leaderboard",
            Operation::GetStudentAnalytics => "get_student_analytics",
            Operation::GetClassAnalytics => "get_class_analytics",
            Operation::CreateCompetition => "create_competition",
            Operation::GetActiveCompetitions => "get_active_competitions",
            Operation::CreateAqaReadingAssignment => "create_aqa_reading_assignment",
            Operation::GetAqaReadingResults => "get_aqa_reading_results",
            Operation::GetAqaReadingAnalytics => "get_aqa_reading_analytics",
            Operation::CreateReadingComprehensionTask => "create_reading_comprehension_task",
            Operation::GetReadingComprehensionTasks => "get_reading_comprehension_tasks",
            Operation::SaveReadingComprehensionResult => "save_reading_comprehension_result",
            Operation::GetReadingComprehensionAnalytics => "get_reading_comprehension_analytics",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Catalogue entry of this operation.
    pub fn definition(self) -> &'static ToolDefinition {
        &catalogue()[self as usize]
    }

    fn description(self) -> &'static str {
        match self {
            Operation::CreateAssignment => {
                "Create a new assignment for a class and a not-started progress record for every enrolled student"
            }
            Operation::GetAssignment => {
                "Get assignment details by ID, with its class and assigned vocabulary"
            }
            Operation::UpdateAssignmentProgress => {
                "Record a student's attempt on an assignment; best score and accuracy keep the highest values"
            }
            Operation::GetAssignmentAnalytics => {
                "Get completion and score analytics for an assignment"
            }
            Operation::CreateVocabularyList => "Create a new vocabulary list with its items",
            Operation::GetVocabularyLists => {
                "Get vocabulary lists with optional filtering, newest first"
            }
            Operation::GetVocabularyForGame => {
                "Get vocabulary items from a list that are compatible with a specific game"
            }
            Operation::StartGameSession => "Start a new game session",
            Operation::EndGameSession => {
                "End a game session, record its results and report the XP gained"
            }
            Operation::GetCrossGameLeaderboard => {
                "Get a leaderboard of students ranked by total score across all games"
            }
            Operation::GetStudentAnalytics => {
                "Get game profile, recent sessions, achievements and per-game statistics for a student"
            }
            Operation::GetClassAnalytics => "Get game activity analytics for a class",
            Operation::CreateCompetition => "Create a new competition",
            Operation::GetActiveCompetitions => {
                "Get active competitions, public ones plus those of the given class"
            }
            Operation::CreateAqaReadingAssignment => {
                "Create an AQA Reading Assessment assignment for a class or a single student"
            }
            Operation::GetAqaReadingResults => {
                "Get AQA Reading Assessment results for a teacher's assignments"
            }
            Operation::GetAqaReadingAnalytics => {
                "Get AQA Reading Assessment analytics grouped by question type, theme, topic or student"
            }
            Operation::CreateReadingComprehensionTask => {
                "Create a reading comprehension task with content and questions"
            }
            Operation::GetReadingComprehensionTasks => {
                "Get reading comprehension tasks with filtering options"
            }
            Operation::SaveReadingComprehensionResult => {
                "Save a reading comprehension result and update assignment progress when assigned"
            }
            Operation::GetReadingComprehensionAnalytics => {
                "Get reading comprehension analytics grouped by student, difficulty, category or language"
            }
        }
    }

    fn input(self) -> InputSchema {
        match self {
            Operation::CreateAssignment => InputSchema::of::<CreateAssignmentRequest>(),
            Operation::GetAssignment => InputSchema::of::<GetAssignmentRequest>(),
            Operation::UpdateAssignmentProgress => InputSchema::of::<UpdateProgressRequest>(),
            Operation::GetAssignmentAnalytics => InputSchema::of::<AssignmentAnalyticsRequest>(),
            Operation::CreateVocabularyList => InputSchema::of::<CreateVocabularyListRequest>(),
            Operation::GetVocabularyLists => InputSchema::of::<VocabularyListsQuery>(),
            Operation::GetVocabularyForGame => InputSchema::of::<VocabularyForGameRequest>(),
            Operation::StartGameSession => InputSchema::of::<StartGameSessionRequest>(),
            Operation::EndGameSession => InputSchema::of::<EndGameSessionRequest>(),
            Operation::GetCrossGameLeaderboard => InputSchema::of::<LeaderboardRequest>(),
            Operation::GetStudentAnalytics => InputSchema::of::<StudentAnalyticsRequest>(),
            Operation::GetClassAnalytics => InputSchema::of::<ClassAnalyticsRequest>(),
            Operation::CreateCompetition => InputSchema::of::<CreateCompetitionRequest>(),
            Operation::GetActiveCompetitions => InputSchema::of::<ActiveCompetitionsQuery>(),
            Operation::CreateAqaReadingAssignment => InputSchema::of::<CreateAqaAssignmentRequest>(),
            Operation::GetAqaReadingResults => InputSchema::of::<AqaResultsQuery>(),
            Operation::GetAqaReadingAnalytics => InputSchema::of::<AqaAnalyticsQuery>(),
            Operation::CreateReadingComprehensionTask => {
                InputSchema::of::<CreateReadingTaskRequest>()
            }
            Operation::GetReadingComprehensionTasks => InputSchema::of::<ReadingTasksQuery>(),
            Operation::SaveReadingComprehensionResult => {
                InputSchema::of::<SaveReadingResultRequest>()
            }
            Operation::GetReadingComprehensionAnalytics => {
                InputSchema::of::<ReadingAnalyticsQuery>()
            }
        }
    }
}

/// One catalogue entry.
#[derive(Debug)]
pub struct ToolDefinition {
    pub operation: Operation,
    pub name: &'static str,
    pub description: &'static str,
    pub input: InputSchema,
}

/// Discovery form of a catalogue entry.
#[derive(Debug, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl From<&ToolDefinition> for ToolDescriptor {
    fn from(definition: &ToolDefinition) -> Self {
        Self {
            name: definition.name,
            description: definition.description,
            input_schema: definition.input.document().clone(),
        }
    }
}

static CATALOGUE: LazyLock<Vec<ToolDefinition>> = LazyLock::new(|| {
    Operation::ALL
        .into_iter()
        .map(|operation| ToolDefinition {
            operation,
            name: operation.name(),
            description: operation.description(),
            input: operation.input(),
        })
        .collect()
});

/// All catalogue entries, in declaration order.
pub fn catalogue() -> &'static [ToolDefinition] {
    &CATALOGUE
}
