use crate::models::{DocumentMetadata, DocumentType};
use thiserror::Error;

/// Metadata a document type cannot be summarized without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Year,
    Genre,
    SubjectOrGradeLevel,
}

impl RequiredField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Genre => "genre",
            Self::SubjectOrGradeLevel => "subject or grade level",
        }
    }

    fn document_kind(&self) -> &'static str {
        match self {
            Self::Year => "research paper",
            Self::Genre => "literature",
            Self::SubjectOrGradeLevel => "textbook",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("Missing {} for {}.", .0.label(), .0.document_kind())]
    MissingField(RequiredField),
    #[error("Invalid document type.")]
    InvalidType,
}

/// Builds the summarization question the AI engine is asked for a document.
///
/// The wording is part of the engine's prompt contract and must not change.
pub fn build_question(metadata: &DocumentMetadata) -> Result<String, QuestionError> {
    let document_type =
        DocumentType::parse(&metadata.document_type).ok_or(QuestionError::InvalidType)?;
    let title = &metadata.title;
    let author = &metadata.author;

    match document_type {
        DocumentType::ResearchPaper => {
            let year = present(&metadata.year)
                .ok_or(QuestionError::MissingField(RequiredField::Year))?;
            Ok(format!(
                "Provide a summary of the research paper titled \"{title}\" by {author}, published in {year}."
            ))
        }
        DocumentType::Literature => {
            let genre = present(&metadata.genre)
                .ok_or(QuestionError::MissingField(RequiredField::Genre))?;
            Ok(format!(
                "Give me a summary of the literature \"{title}\" by {author}, belonging to the {genre} genre."
            ))
        }
        DocumentType::Textbook => {
            let (Some(subject), Some(grade_level)) =
                (present(&metadata.subject), present(&metadata.grade_level))
            else {
                return Err(QuestionError::MissingField(
                    RequiredField::SubjectOrGradeLevel,
                ));
            };
            Ok(format!(
                "Provide a summary of the textbook \"{title}\" by {author}, which is related to {subject} at the {grade_level} grade level."
            ))
        }
    }
}

// Empty form values count as missing.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
