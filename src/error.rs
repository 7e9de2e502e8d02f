use crate::expression::Value;
use crate::process::ProcessStatus;
use thiserror::Error;

/// Errors raised while turning flowchart source into a graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at line {line}, column {column}: {message}")]
    Lexical {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Parse error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Flowchart source must not be empty")]
    EmptySource,

    #[error("Flow graph JSON error: {0}")]
    Json(String),
}

impl ParseError {
    /// Position of the offending token, if the error carries one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::Lexical { line, column, .. } | ParseError::Syntax { line, column, .. } => {
                Some((*line, *column))
            }
            ParseError::EmptySource | ParseError::Json(_) => None,
        }
    }
}

/// Errors that can occur while parsing or evaluating an edge condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Invalid expression '{expression}': {message}")]
    Syntax { expression: String, message: String },

    #[error("Variable '{name}' holds a value that cannot be used in an expression")]
    UnsupportedValue { name: String },

    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },

    #[error("Expression '{expression}' evaluated to '{found}', not a boolean")]
    NotBoolean { expression: String, found: Value },

    #[error("Division by zero")]
    DivisionByZero,
}

/// Errors raised when resolving an executor for a node.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutorError {
    #[error("No executor found for shape: {shape}")]
    UnsupportedShape { shape: String },
}

/// An event listener's failure. Logged by the publisher, never propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Listener error: {message}")]
pub struct ListenerError {
    pub message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fatal causes that abort a process execution.
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("No start node found in the flow graph")]
    NoStartNode,

    #[error("Node '{0}' not found in the flow graph")]
    NodeNotFound(String),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("Execution exceeded {max_steps} steps, possible infinite loop")]
    LoopLimitExceeded { max_steps: usize },

    #[error("Instance is already {status} and cannot be executed again")]
    AlreadyFinished { status: ProcessStatus },
}

/// A fatal execution failure, tagged with the instance it terminated.
#[derive(Error, Debug, Clone)]
#[error("Process instance '{instance_id}' terminated: {cause}")]
pub struct EngineError {
    pub instance_id: String,
    #[source]
    pub cause: ExecutionError,
}

impl EngineError {
    pub fn new(instance_id: impl Into<String>, cause: ExecutionError) -> Self {
        Self {
            instance_id: instance_id.into(),
            cause,
        }
    }
}

/// Errors surfaced by the definition and instance services.
#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    #[error("Process definition '{0}' not found")]
    DefinitionNotFound(String),

    #[error("Process instance '{0}' not found")]
    InstanceNotFound(String),

    #[error("'{id}' is {actual}, expected {expected}")]
    InvalidState {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid flowchart source: {0}")]
    InvalidSource(#[from] ParseError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors raised while reading or writing a compiled flow artifact.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Encode(String),

    #[error("Deserialization failed: {0}")]
    Decode(String),
}
