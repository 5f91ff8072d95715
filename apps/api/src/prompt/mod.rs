// Context selection and prompt assembly for recommendation letters.
// Pure string work: no I/O, no LLM calls.

pub mod assembler;
pub mod context;
pub mod display_name;
pub mod prompts;
