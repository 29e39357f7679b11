use thiserror::Error;

pub type ScriptResult<T> = Result<T, ScriptError>;

/// Outcome of a failed script execution, as the console sees it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// `incomplete` is set when the parser ran out of input mid-statement.
    #[error("{message}")]
    Syntax { message: String, incomplete: bool },

    #[error("{0}")]
    Runtime(String),
}

impl ScriptError {
    #[inline]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Syntax { incomplete: true, .. })
    }
}

/// Errors raised from native callbacks arrive wrapped; report the innermost one.
fn root_cause(err: &mlua::Error) -> &mlua::Error {
    match err {
        mlua::Error::CallbackError { cause, .. } => root_cause(cause),
        other => other,
    }
}

/// Lua appends a stack traceback to runtime errors; the console only shows the message.
fn strip_traceback(msg: &str) -> String {
    match msg.find("\nstack traceback:") {
        Some(i) => msg[..i].to_string(),
        None => msg.to_string(),
    }
}

impl From<mlua::Error> for ScriptError {
    fn from(err: mlua::Error) -> Self {
        match root_cause(&err) {
            mlua::Error::SyntaxError {
                message,
                incomplete_input,
            } => Self::Syntax {
                message: message.clone(),
                incomplete: *incomplete_input,
            },
            mlua::Error::RuntimeError(msg) => Self::Runtime(strip_traceback(msg)),
            other => Self::Runtime(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn callback_errors_unwrap_to_cause() {
        let err = mlua::Error::CallbackError {
            traceback: "stack traceback:".into(),
            cause: Arc::new(mlua::Error::RuntimeError("boom".into())),
        };
        assert_eq!(ScriptError::from(err), ScriptError::Runtime("boom".into()));
    }

    #[test]
    fn traceback_is_dropped() {
        let err = mlua::Error::RuntimeError(
            "console:1: nope\nstack traceback:\n\t[C]: in function 'error'".into(),
        );
        assert_eq!(ScriptError::from(err).to_string(), "console:1: nope");
    }

    #[test]
    fn syntax_flag_is_preserved() {
        let err = mlua::Error::SyntaxError {
            message: "'end' expected near <eof>".into(),
            incomplete_input: true,
        };
        let err = ScriptError::from(err);
        assert!(err.is_incomplete());
        assert_eq!(err.to_string(), "'end' expected near <eof>");
    }
}
