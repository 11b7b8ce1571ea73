use cascade_core::{Span, TraceFrame};

#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub code: &'static str,
    pub message: String,
    pub span: Option<Span>,
    pub trace: Vec<TraceFrame>,
}

pub(crate) fn runtime_error_at(
    code: &'static str,
    message: impl Into<String>,
    span: Span,
) -> RuntimeError {
    RuntimeError {
        code,
        message: message.into(),
        span: Some(span),
        trace: Vec::new(),
    }
}
