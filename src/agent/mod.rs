//! Document analysis agent.
//!
//! This module provides the agent that scores PDFs and the prompts it
//! (and the chat endpoint) send to the model.

pub mod prompts;
pub mod scorer;

pub use scorer::PdfScorerAgent;
