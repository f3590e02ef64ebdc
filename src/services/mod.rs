pub mod input_guard;
pub mod llm_service;
pub mod result_writer;

pub use input_guard::bound_input;
pub use llm_service::{parse_creativity_response, LlmService};
pub use result_writer::ResultWriter;
