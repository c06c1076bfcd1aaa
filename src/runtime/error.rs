use thiserror::Error;

/// Every failure the host can observe from the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Source text failed to parse or compile. Carries the rendered diagnostics.
    #[error("compilation failed:\n{diagnostics}")]
    Compile { diagnostics: String },

    /// A `@required` name had no binding when the lambda was called.
    #[error("missing required binding `{name}`")]
    Binding { name: String },

    /// Any fault while a program was running.
    #[error("execution failed: {message}")]
    Execution { message: String },

    /// A value could not be converted to or from its host form.
    #[error("marshal failed: {message}")]
    Marshal { message: String },
}

impl Error {
    pub fn execution(message: impl Into<String>) -> Self {
        Error::Execution {
            message: message.into(),
        }
    }

    pub fn marshal(message: impl Into<String>) -> Self {
        Error::Marshal {
            message: message.into(),
        }
    }

    pub fn binding(name: impl Into<String>) -> Self {
        Error::Binding { name: name.into() }
    }

    /// Message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            Error::Compile { diagnostics } => diagnostics.clone(),
            Error::Binding { name } => format!("missing required binding `{}`", name),
            Error::Execution { message } | Error::Marshal { message } => message.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_error_names_identifier() {
        let err = Error::binding("A");
        assert_eq!(err.to_string(), "missing required binding `A`");
    }

    #[test]
    fn execution_message_strips_prefix() {
        let err = Error::execution("division by zero");
        assert_eq!(err.to_string(), "execution failed: division by zero");
        assert_eq!(err.message(), "division by zero");
    }
}
