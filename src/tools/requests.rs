// src/tools/requests.rs

//! Statically typed requests, one variant per operation.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Operation;
use crate::{
    error::ToolError,
    models::{
        aqa::{AqaAnalyticsQuery, AqaResultsQuery, CreateAqaAssignmentRequest},
        assignment::{AssignmentAnalyticsRequest, CreateAssignmentRequest, GetAssignmentRequest},
        competition::{ActiveCompetitionsQuery, CreateCompetitionRequest},
        game_session::{
            ClassAnalyticsRequest, EndGameSessionRequest, LeaderboardRequest,
            StartGameSessionRequest, StudentAnalyticsRequest,
        },
        progress::UpdateProgressRequest,
        reading::{
            CreateReadingTaskRequest, ReadingAnalyticsQuery, ReadingTasksQuery,
            SaveReadingResultRequest,
        },
        vocabulary::{CreateVocabularyListRequest, VocabularyForGameRequest, VocabularyListsQuery},
    },
};

#[derive(Debug)]
pub enum ToolRequest {
    CreateAssignment(CreateAssignmentRequest),
    GetAssignment(GetAssignmentRequest),
    UpdateAssignmentProgress(UpdateProgressRequest),
    GetAssignmentAnalytics(AssignmentAnalyticsRequest),
    CreateVocabularyList(CreateVocabularyListRequest),
    GetVocabularyLists(VocabularyListsQuery),
    GetVocabularyForGame(VocabularyForGameRequest),
    StartGameSession(StartGameSessionRequest),
    EndGameSession(EndGameSessionRequest),
    GetCrossGameLeaderboard(LeaderboardRequest),
    GetStudentAnalytics(StudentAnalyticsRequest),
    GetClassAnalytics(ClassAnalyticsRequest),
    CreateCompetition(CreateCompetitionRequest),
    GetActiveCompetitions(ActiveCompetitionsQuery),
    CreateAqaReadingAssignment(CreateAqaAssignmentRequest),
    GetAqaReadingResults(AqaResultsQuery),
    GetAqaReadingAnalytics(AqaAnalyticsQuery),
    CreateReadingComprehensionTask(CreateReadingTaskRequest),
    GetReadingComprehensionTasks(ReadingTasksQuery),
    SaveReadingComprehensionResult(SaveReadingResultRequest),
    GetReadingComprehensionAnalytics(ReadingAnalyticsQuery),
}

impl ToolRequest {
    /// Checks `arguments` against the operation's schema, then decodes the
    /// typed request. Nothing here touches the data store.
    pub fn parse(operation: Operation, arguments: Value) -> Result<Self, ToolError> {
        operation.definition().input.validate(&arguments)?;

        let request = match operation {
            Operation::CreateAssignment => ToolRequest::CreateAssignment(decode(arguments)?),
            Operation::GetAssignment => ToolRequest::GetAssignment(decode(arguments)?),
            Operation::UpdateAssignmentProgress => {
                ToolRequest::UpdateAssignmentProgress(decode(arguments)?)
            }
            Operation::GetAssignmentAnalytics => {
                ToolRequest::GetAssignmentAnalytics(decode(arguments)?)
            }
            Operation::CreateVocabularyList => ToolRequest::CreateVocabularyList(decode(arguments)?),
            Operation::GetVocabularyLists => ToolRequest::GetVocabularyLists(decode(arguments)?),
            Operation::GetVocabularyForGame => ToolRequest::GetVocabularyForGame(decode(arguments)?),
            Operation::StartGameSession => ToolRequest::StartGameSession(decode(arguments)?),
            Operation::EndGameSession => ToolRequest::EndGameSession(decode(arguments)?),
            Operation::GetCrossGameLeaderboard => {
                ToolRequest::GetCrossGameLeaderboard(decode(arguments)?)
            }
            Operation::GetStudentAnalytics => ToolRequest::GetStudentAnalytics(decode(arguments)?),
            Operation::GetClassAnalytics => ToolRequest::GetClassAnalytics(decode(arguments)?),
            Operation::CreateCompetition => ToolRequest::CreateCompetition(decode(arguments)?),
            Operation::GetActiveCompetitions => {
                ToolRequest::GetActiveCompetitions(decode(arguments)?)
            }
            Operation::CreateAqaReadingAssignment => {
                ToolRequest::CreateAqaReadingAssignment(decode(arguments)?)
            }
            Operation::GetAqaReadingResults => ToolRequest::GetAqaReadingResults(decode(arguments)?),
            Operation::GetAqaReadingAnalytics => {
                ToolRequest::GetAqaReadingAnalytics(decode(arguments)?)
            }
            Operation::CreateReadingComprehensionTask => {
                ToolRequest::CreateReadingComprehensionTask(decode(arguments)?)
            }
            Operation::GetReadingComprehensionTasks => {
                ToolRequest::GetReadingComprehensionTasks(decode(arguments)?)
            }
            Operation::SaveReadingComprehensionResult => {
                ToolRequest::SaveReadingComprehensionResult(decode(arguments)?)
            }
            Operation::GetReadingComprehensionAnalytics => {
                ToolRequest::GetReadingComprehensionAnalytics(decode(arguments)?)
            }
        };
        Ok(request)
    }
}

fn decode<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    Ok(serde_json::from_value(arguments)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEACHER: &str = "7f1c6a64-5d0e-4c55-9b7e-0f5f1f6f2a11";

    fn invalid(op: Operation, args: Value) -> String {
        match ToolRequest::parse(op, args) {
            Err(ToolError::InvalidArguments(message)) => message,
            other => panic!("expected invalid arguments, got {:?}", other),
        }
    }

    #[test]
    fn shape_errors_name_the_field() {
        let message = invalid(Operation::GetAssignment, json!({}));
        assert!(message.contains("assignment_id"), "{}", message);

        let message = invalid(Operation::GetAssignment, json!({ "assignment_id": "not-a-uuid" }));
        assert!(message.contains("uuid"), "{}", message);
    }

    #[test]
    fn enum_errors_list_allowed_values() {
        let message = invalid(
            Operation::GetAqaReadingAnalytics,
            json!({ "teacher_id": TEACHER, "group_by": "language" }),
        );
        assert!(message.contains("group_by"), "{}", message);
        assert!(message.contains("question_type"), "{}", message);
    }

    #[test]
    fn nested_item_errors_carry_the_index() {
        let message = invalid(
            Operation::CreateVocabularyList,
            json!({
                "name": "Food",
                "teacher_id": TEACHER,
                "language": "french",
                "content_type": "words",
                "difficulty_level": "beginner",
                "items": [
                    { "type": "word", "term": "pain", "translation": "bread", "difficulty_level": "beginner" },
                    { "type": "word", "term": "eau", "translation": "water", "difficulty_level": "expert" }
                ]
            }),
        );
        assert!(message.contains("items[1].difficulty_level"), "{}", message);
    }

    #[test]
    fn values_outside_everyday_ranges_are_accepted() {
        let request = ToolRequest::parse(
            Operation::UpdateAssignmentProgress,
            json!({
                "assignment_id": TEACHER, "student_id": TEACHER,
                "score": -5, "accuracy": 140, "time_spent": 0, "completed": false
            }),
        );
        assert!(request.is_ok(), "{:?}", request);
    }

    #[test]
    fn assignment_mode_does_not_demand_an_assignment_id() {
        let request = ToolRequest::parse(
            Operation::StartGameSession,
            json!({
                "student_id": TEACHER, "game_type": "hangman",
                "session_mode": "assignment", "max_score_possible": 100
            }),
        );
        assert!(matches!(request, Ok(ToolRequest::StartGameSession(_))), "{:?}", request);
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let message = invalid(Operation::GetActiveCompetitions, json!([1, 2]));
        assert!(message.contains("object"), "{}", message);
    }
}
