// src/models/reading.rs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::choice;
use crate::{
    analytics::GroupKey,
    utils::text::{reading_minutes, word_count},
};

choice!(
    /// Groupings offered by reading comprehension analytics.
    ReadingGrouping {
        Student => "student",
        Difficulty => "difficulty",
        Category => "category",
        Language => "language",
    }
);

impl ReadingGrouping {
    pub fn key(self) -> GroupKey {
        match self {
            ReadingGrouping::Student => GroupKey::Student,
            ReadingGrouping::Difficulty => GroupKey::Difficulty,
            ReadingGrouping::Category => GroupKey::Category,
            ReadingGrouping::Language => GroupKey::Language,
        }
    }
}

/// A single answer or a list of accepted answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    List(Vec<String>),
}

choice!(ReadingLanguage {
    Spanish => "spanish",
    French => "french",
    German => "german",
});

choice!(CurriculumLevel {
    Ks3 => "ks3",
    Ks4 => "ks4",
});

choice!(ExamBoard {
    Aqa => "aqa",
    Edexcel => "edexcel",
});

choice!(ReadingDifficulty {
    Foundation => "foundation",
    Intermediate => "intermediate",
    Higher => "higher",
});

choice!(QuestionType {
    MultipleChoice => "multiple-choice",
    TrueFalse => "true-false",
    ShortAnswer => "short-answer",
    GapFill => "gap-fill",
});

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadingQuestionInput {
    pub question: String,

    #[serde(rename = "type")]
    pub question_type: QuestionType,

    pub options: Option<Vec<String>>,
    pub correct_answer: Answer,
    pub points: f64,
    pub explanation: Option<String>,
}

/// DTO for creating a task with its questions.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateReadingTaskRequest {
    #[schemars(description = "Task title")]
    pub title: String,

    #[schemars(description = "Task language")]
    pub language: ReadingLanguage,

    #[schemars(description = "Curriculum level")]
    pub curriculum_level: Option<CurriculumLevel>,

    #[schemars(description = "Exam board (for KS4)")]
    pub exam_board: Option<ExamBoard>,

    #[schemars(description = "AQA theme/topic")]
    pub theme_topic: Option<String>,

    #[schemars(description = "Content category")]
    pub category: Option<String>,

    #[schemars(description = "Content subcategory")]
    pub subcategory: Option<String>,

    #[schemars(description = "Difficulty level")]
    pub difficulty: ReadingDifficulty,

    #[schemars(description = "Reading text content")]
    pub content: String,

    #[schemars(description = "Word count of the text")]
    pub word_count: Option<u32>,

    #[schemars(description = "Estimated reading time in minutes")]
    pub estimated_reading_time: Option<u32>,

    #[schemars(description = "Comprehension questions")]
    pub questions: Vec<ReadingQuestionInput>,

    #[schemars(description = "Teacher UUID who created the task", extend("format" = "uuid"))]
    pub created_by: String,
}

/// The `reading_comprehension_tasks` row for a new task.
#[derive(Debug, Serialize)]
pub struct NewReadingTask<'a> {
    pub title: &'a str,
    pub language: ReadingLanguage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curriculum_level: Option<CurriculumLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_board: Option<ExamBoard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_topic: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<&'a str>,
    pub difficulty: ReadingDifficulty,
    pub content: &'a str,
    pub word_count: u32,
    pub estimated_reading_time: u32,
    pub created_by: &'a str,
    pub created_at: Value,
}

impl<'a> NewReadingTask<'a> {
    /// Word count and reading time default to values measured from `content`.
    pub fn new(req: &'a CreateReadingTaskRequest, created_at: Value) -> Self {
        let measured = word_count(&req.content);
        Self {
            title: &req.title,
            language: req.language,
            curriculum_level: req.curriculum_level,
            exam_board: req.exam_board,
            theme_topic: req.theme_topic.as_deref(),
            category: req.category.as_deref(),
            subcategory: req.subcategory.as_deref(),
            difficulty: req.difficulty,
            content: &req.content,
            word_count: req.word_count.unwrap_or(measured),
            estimated_reading_time: req
                .estimated_reading_time
                .unwrap_or_else(|| reading_minutes(measured)),
            created_by: &req.created_by,
            created_at,
        }
    }
}

/// One `reading_comprehension_questions` row, numbered from 1.
#[derive(Debug, Serialize)]
pub struct NewReadingQuestion<'a> {
    pub task_id: &'a str,
    pub question_number: usize,
    pub question: &'a str,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Option<&'a [String]>,
    pub correct_answer: &'a Answer,
    pub points: f64,
    pub explanation: Option<&'a str>,
}

impl<'a> NewReadingQuestion<'a> {
    pub fn numbered(task_id: &'a str, index: usize, input: &'a ReadingQuestionInput) -> Self {
        Self {
            task_id,
            question_number: index + 1,
            question: &input.question,
            question_type: input.question_type,
            options: input.options.as_deref(),
            correct_answer: &input.correct_answer,
            points: input.points,
            explanation: input.explanation.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadingTasksQuery {
    #[schemars(description = "Filter by language")]
    pub language: Option<ReadingLanguage>,

    #[schemars(description = "Filter by curriculum level")]
    pub curriculum_level: Option<CurriculumLevel>,

    #[schemars(description = "Filter by exam board")]
    pub exam_board: Option<ExamBoard>,

    #[schemars(description = "Filter by category")]
    pub category: Option<String>,

    #[schemars(description = "Filter by subcategory")]
    pub subcategory: Option<String>,

    #[schemars(description = "Filter by difficulty")]
    pub difficulty: Option<ReadingDifficulty>,

    #[schemars(description = "Filter by AQA theme/topic")]
    pub theme_topic: Option<String>,

    #[schemars(description = "Maximum number of tasks to return")]
    pub limit: Option<i64>,

    #[serde(default)]
    #[schemars(description = "Return a random selection")]
    pub random: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuestionResultInput {
    pub question_id: String,
    pub user_answer: Answer,
    pub correct_answer: Answer,
    pub is_correct: bool,
    pub points_earned: f64,

    /// Seconds spent on the question; stored as 0 when absent.
    #[serde(default)]
    pub time_spent: f64,
}

/// DTO for a completed reading task.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveReadingResultRequest {
    #[schemars(description = "Task UUID", extend("format" = "uuid"))]
    pub task_id: String,

    #[schemars(description = "Student UUID", extend("format" = "uuid"))]
    pub student_id: String,

    #[schemars(description = "Assignment UUID (optional)", extend("format" = "uuid"))]
    pub assignment_id: Option<String>,

    #[schemars(description = "Total number of questions")]
    pub total_questions: u32,

    #[schemars(description = "Number of correct answers")]
    pub correct_answers: u32,

    #[schemars(description = "Score as percentage")]
    pub score_percentage: f64,

    #[schemars(description = "Time spent in seconds")]
    pub time_spent_seconds: f64,

    #[schemars(description = "Whether the student passed")]
    pub passed: bool,

    #[schemars(description = "Individual question results")]
    pub question_results: Vec<QuestionResultInput>,
}

impl SaveReadingResultRequest {
    /// Percentage of questions answered correctly; 0 for an empty task.
    pub fn accuracy(&self) -> f64 {
        crate::analytics::ratio(f64::from(self.correct_answers), f64::from(self.total_questions)) * 100.0
    }
}

/// The `reading_comprehension_results` row.
#[derive(Debug, Serialize)]
pub struct NewReadingResult<'a> {
    pub task_id: &'a str,
    pub student_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<&'a str>,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score_percentage: f64,
    pub time_spent_seconds: f64,
    pub passed: bool,
    pub completed_at: Value,
}

impl<'a> NewReadingResult<'a> {
    pub fn new(req: &'a SaveReadingResultRequest, completed_at: Value) -> Self {
        Self {
            task_id: &req.task_id,
            student_id: &req.student_id,
            assignment_id: req.assignment_id.as_deref(),
            total_questions: req.total_questions,
            correct_answers: req.correct_answers,
            score_percentage: req.score_percentage,
            time_spent_seconds: req.time_spent_seconds,
            passed: req.passed,
            completed_at,
        }
    }
}

/// One `reading_comprehension_question_results` row.
#[derive(Debug, Serialize)]
pub struct NewQuestionResult<'a> {
    pub result_id: &'a str,
    #[serde(flatten)]
    pub answer: &'a QuestionResultInput,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadingAnalyticsQuery {
    #[schemars(description = "Student UUID (optional)", extend("format" = "uuid"))]
    pub student_id: Option<String>,

    #[schemars(description = "Class UUID (optional)", extend("format" = "uuid"))]
    pub class_id: Option<String>,

    #[schemars(description = "Teacher UUID (optional)", extend("format" = "uuid"))]
    pub teacher_id: Option<String>,

    #[schemars(description = "Filter by language")]
    pub language: Option<ReadingLanguage>,

    #[schemars(description = "Filter by difficulty")]
    pub difficulty: Option<ReadingDifficulty>,

    #[schemars(description = "Filter from date (ISO string)")]
    pub date_from: Option<String>,

    #[schemars(description = "Filter to date (ISO string)")]
    pub date_to: Option<String>,

    #[serde(default = "default_reading_grouping")]
    #[schemars(description = "Group results by")]
    pub group_by: ReadingGrouping,
}

fn default_reading_grouping() -> ReadingGrouping {
    ReadingGrouping::Student
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(content: &str, extra: Value) -> CreateReadingTaskRequest {
        let mut args = json!({
            "title": "Mi familia",
            "language": "spanish",
            "difficulty": "foundation",
            "content": content,
            "questions": [{ "question": "¿Quién?", "type": "short-answer", "correct_answer": "Ana", "points": 1 }],
            "created_by": "t1"
        });
        if let (Some(args), Some(extra)) = (args.as_object_mut(), extra.as_object()) {
            args.extend(extra.clone());
        }
        serde_json::from_value(args).unwrap()
    }

    #[test]
    fn measures_words_and_reading_time_when_absent() {
        let content = vec!["palabra"; 401].join(" ");
        let req = task(&content, json!({}));
        let row = NewReadingTask::new(&req, json!("2025-01-01T00:00:00+00:00"));
        assert_eq!(row.word_count, 401);
        assert_eq!(row.estimated_reading_time, 3);
    }

    #[test]
    fn keeps_caller_supplied_measurements() {
        let req = task("hola", json!({ "word_count": 50, "estimated_reading_time": 4 }));
        let row = NewReadingTask::new(&req, Value::Null);
        assert_eq!(row.word_count, 50);
        assert_eq!(row.estimated_reading_time, 4);
    }

    #[test]
    fn questions_are_numbered_from_one() {
        let req = task("hola", json!({}));
        let question = NewReadingQuestion::numbered("task-1", 0, &req.questions[0]);
        assert_eq!(question.question_number, 1);
        let row = crate::models::to_row("question", &question).unwrap();
        assert_eq!(row["type"], json!("short-answer"));
        assert_eq!(row["options"], Value::Null);
    }

    #[test]
    fn accuracy_handles_empty_tasks() {
        let req: SaveReadingResultRequest = serde_json::from_value(json!({
            "task_id": "t", "student_id": "s", "total_questions": 0, "correct_answers": 0,
            "score_percentage": 0, "time_spent_seconds": 10, "passed": false, "question_results": []
        }))
        .unwrap();
        assert_eq!(req.accuracy(), 0.0);
    }

    #[test]
    fn group_by_defaults_to_student() {
        let query: ReadingAnalyticsQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.group_by, ReadingGrouping::Student);
        assert_eq!(query.group_by.key(), GroupKey::Student);
    }

    #[test]
    fn answers_keep_their_wire_shape() {
        let single: Answer = serde_json::from_value(json!("Ana")).unwrap();
        assert_eq!(single, Answer::Text("Ana".into()));
        let several: Answer = serde_json::from_value(json!(["Ana", "Luis"])).unwrap();
        assert_eq!(serde_json::to_value(&several).unwrap(), json!(["Ana", "Luis"]));
        assert!(serde_json::from_value::<Answer>(json!(4)).is_err());
    }
}
