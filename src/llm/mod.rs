//! Remote document audit via a hosted language model

pub mod prompts;
pub mod auditor;
pub mod gemini;

pub use auditor::{AuditDocument, AuditReport, DocumentAuditor};
pub use gemini::GeminiAuditor;
