// src/models/vocabulary.rs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::choice;

choice!(Language {
    Spanish => "spanish",
    French => "french",
    German => "german",
    Italian => "italian",
});

choice!(ContentType {
    Words => "words",
    Sentences => "sentences",
    Mixed => "mixed",
});

choice!(DifficultyLevel {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

choice!(ItemType {
    Word => "word",
    Sentence => "sentence",
    Phrase => "phrase",
});

/// One vocabulary entry as supplied by the caller. Serializes to an
/// `enhanced_vocabulary_items` row once `list_id` is added.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VocabularyItemInput {
    #[serde(rename = "type")]
    pub item_type: ItemType,

    pub term: String,
    pub translation: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_sentence: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_translation: Option<String>,

    pub difficulty_level: DifficultyLevel,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// DTO for creating a list together with its items.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateVocabularyListRequest {
    #[schemars(description = "List name")]
    pub name: String,

    #[schemars(description = "List description")]
    pub description: Option<String>,

    #[schemars(description = "Teacher UUID", extend("format" = "uuid"))]
    pub teacher_id: String,

    pub language: Language,
    pub content_type: ContentType,
    pub difficulty_level: DifficultyLevel,

    #[serde(default)]
    #[schemars(description = "Whether the list is public")]
    pub is_public: bool,

    #[schemars(description = "Vocabulary items")]
    pub items: Vec<VocabularyItemInput>,
}

/// The `enhanced_vocabulary_lists` row written for a new list.
#[derive(Debug, Serialize)]
pub struct NewVocabularyList<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub teacher_id: &'a str,
    pub language: Language,
    pub content_type: ContentType,
    pub difficulty_level: DifficultyLevel,
    pub is_public: bool,
    pub word_count: usize,
}

impl<'a> From<&'a CreateVocabularyListRequest> for NewVocabularyList<'a> {
    fn from(req: &'a CreateVocabularyListRequest) -> Self {
        Self {
            name: &req.name,
            description: req.description.as_deref(),
            teacher_id: &req.teacher_id,
            language: req.language,
            content_type: req.content_type,
            difficulty_level: req.difficulty_level,
            is_public: req.is_public,
            word_count: req.items.len(),
        }
    }
}

/// Filters for listing vocabulary lists. All are optional and combined with AND.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct VocabularyListsQuery {
    #[schemars(description = "Filter by teacher UUID", extend("format" = "uuid"))]
    pub teacher_id: Option<String>,

    #[schemars(description = "Filter by language")]
    pub language: Option<String>,

    #[schemars(description = "Filter by content type")]
    pub content_type: Option<String>,

    #[schemars(description = "Filter by public status")]
    pub is_public: Option<bool>,

    #[schemars(description = "Maximum number of results")]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VocabularyForGameRequest {
    #[schemars(description = "Vocabulary list UUID", extend("format" = "uuid"))]
    pub list_id: String,

    #[schemars(description = "Game type for compatibility check")]
    pub game_type: String,

    #[schemars(description = "Maximum number of items")]
    pub limit: Option<usize>,

    #[serde(default)]
    #[schemars(description = "Whether to randomize order")]
    pub randomize: bool,
}

/// What a game can display and how many items it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameCompatibility {
    pub supports_words: bool,
    pub supports_sentences: bool,
    pub max_items: usize,
}

impl GameCompatibility {
    const fn words(max_items: usize) -> Self {
        Self {
            supports_words: true,
            supports_sentences: false,
            max_items,
        }
    }

    const fn sentences(max_items: usize) -> Self {
        Self {
            supports_words: true,
            supports_sentences: true,
            max_items,
        }
    }

    /// Compatibility of a known game, or `None` for an unknown game type.
    pub fn lookup(game_type: &str) -> Option<Self> {
        let compatibility = match game_type {
            "noughts-and-crosses" => Self::words(50),
            "memory-game" => Self::words(20),
            "hangman" => Self::words(100),
            "word-scramble" => Self::words(50),
            "word-guesser" => Self::words(100),
            "vocab-blast" => Self::words(100),
            "speed-builder" => Self::sentences(50),
            "sentence-towers" => Self::sentences(100),
            _ => return None,
        };
        Some(compatibility)
    }

    /// Whether an item of the given stored `type` can appear in this game.
    pub fn accepts(&self, item_type: Option<&str>) -> bool {
        match item_type {
            Some("sentence") => self.supports_sentences,
            _ => self.supports_words,
        }
    }

    /// Number of items to hand out when the caller asked for `requested`.
    pub fn cap(&self, requested: Option<usize>) -> usize {
        requested.map_or(self.max_items, |n| n.min(self.max_items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_only_games_reject_sentences() {
        let hangman = GameCompatibility::lookup("hangman").unwrap();
        assert!(hangman.accepts(Some("word")));
        assert!(hangman.accepts(Some("phrase")));
        assert!(!hangman.accepts(Some("sentence")));

        let towers = GameCompatibility::lookup("sentence-towers").unwrap();
        assert!(towers.accepts(Some("sentence")));
    }

    #[test]
    fn unknown_games_have_no_compatibility() {
        assert_eq!(GameCompatibility::lookup("chess"), None);
    }

    #[test]
    fn cap_never_exceeds_max_items() {
        let memory = GameCompatibility::lookup("memory-game").unwrap();
        assert_eq!(memory.cap(None), 20);
        assert_eq!(memory.cap(Some(5)), 5);
        assert_eq!(memory.cap(Some(500)), 20);
    }
}
