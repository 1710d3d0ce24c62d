use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const OPTION_COUNT: usize = 4;
pub const MAX_MARKS: i32 = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub question_text: String,
    pub options: Vec<String>, // always four
    pub correct_option_index: i32,
    pub marks: i32,
}

impl Question {
    pub fn new(question_text: &str, options: Vec<String>, correct_option_index: i32, marks: i32) -> Self {
        Question {
            id: Uuid::new_v4().to_string(),
            question_text: question_text.trim().to_string(),
            options,
            correct_option_index,
            marks,
        }
    }

    pub fn is_correct(&self, selected_option_index: i32) -> bool {
        self.correct_option_index == selected_option_index
    }

    pub fn marks_for(&self, selected_option_index: i32) -> i32 {
        if self.is_correct(selected_option_index) {
            self.marks
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question::new(
            "  Capital of France?  ",
            vec!["Berlin".into(), "Madrid".into(), "Paris".into(), "Rome".into()],
            2,
            5,
        )
    }

    #[test]
    fn question_text_is_trimmed_and_id_assigned() {
        let question = sample();
        assert_eq!(question.question_text, "Capital of France?");
        assert!(Uuid::parse_str(&question.id).is_ok());
        assert_eq!(question.options.len(), OPTION_COUNT);
    }

    #[test]
    fn marks_awarded_only_for_correct_option() {
        let question = sample();
        assert!(question.is_correct(2));
        assert_eq!(question.marks_for(2), 5);
        assert!(!question.is_correct(0));
        assert_eq!(question.marks_for(0), 0);
    }
}
