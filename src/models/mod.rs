pub mod loaders;
pub mod question;
pub mod submission;

pub use loaders::{load_all_submissions, load_question_bank, load_submission};
pub use question::{Question, QuestionBank, QuestionRef};
pub use submission::{CreativityScore, Submission, SubmissionMetadata, SubmissionRecord};
