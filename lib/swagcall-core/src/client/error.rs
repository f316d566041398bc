use std::fmt;

use super::security::SecurityDefinition;

/// Errors delivered to the transport when a request cannot be built.
///
/// Every failure of the request-building pipeline ends up here: invalid caller
/// arguments, media type negotiation failures, unresolved path segments and
/// unsatisfied security requirements. None of them is fatal, they all describe
/// input or configuration the caller can fix.
#[derive(Debug, Clone, PartialEq, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum RequestError {
    /// One or more parameters are missing or have an invalid value.
    #[display("{_0}")]
    Validation(ValidationErrors),

    /// No declared security requirement set could be satisfied.
    #[display("{_0}")]
    MissingAuthorization(MissingAuthorizationError),

    /// An explicit `Accept` or `Content-Type` is not declared by the operation.
    #[display("{_0}")]
    MediaType(MediaTypeError),

    /// A path segment could not be filled.
    #[display("{_0}")]
    MissingParameter(MissingParameterError),
}

impl RequestError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::MissingAuthorization(_) => ErrorKind::MissingAuthorization,
            Self::MediaType(_) => ErrorKind::MediaType,
            Self::MissingParameter(_) => ErrorKind::MissingParameter,
        }
    }
}

/// Discriminant of [`RequestError`], used to describe what a handler may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ErrorKind {
    /// See [`ValidationErrors`].
    Validation,
    /// See [`MissingAuthorizationError`].
    MissingAuthorization,
    /// See [`MediaTypeError`].
    MediaType,
    /// See [`MissingParameterError`].
    MissingParameter,
}

/// Aggregate of every invalid or missing parameter of one call.
///
/// Validation never stops at the first problem: each declared parameter is
/// checked and contributes at most one [`ParameterError`].
#[derive(Debug, Clone, PartialEq, derive_more::Error)]
pub struct ValidationErrors {
    /// Identifier of the operation (method and path template).
    pub operation: String,
    /// One entry per faulty parameter, in declaration order.
    pub errors: Vec<ParameterError>,
}

impl ValidationErrors {
    /// Returns the error reported for a parameter, if any.
    pub fn get(&self, name: &str) -> Option<&ParameterError> {
        self.errors.iter().find(|error| error.name == name)
    }

    /// Number of faulty parameters.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `true` when no parameter is faulty.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid arguments for '{}'", self.operation)?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

/// A single faulty parameter.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
#[display("{name}: {problem}")]
pub struct ParameterError {
    /// The declared parameter name.
    pub name: String,
    /// What is wrong with its value.
    pub problem: ParameterProblem,
}

/// What is wrong with a parameter value.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ParameterProblem {
    /// A required parameter has no value.
    #[display("missing required value")]
    Missing,

    /// The value does not have the declared type.
    #[display("expected {expected}, got {found}")]
    InvalidType {
        /// The declared type.
        expected: String,
        /// The JSON type of the provided value.
        found: &'static str,
    },

    /// An element of an array value is invalid.
    #[display("item {index}: {problem}")]
    InvalidItem {
        /// Position of the first faulty element.
        index: usize,
        /// What is wrong with it.
        problem: Box<ParameterProblem>,
    },

    /// A property of a model value is missing or invalid.
    #[display("property '{property}': {problem}")]
    InvalidProperty {
        /// The property name.
        property: String,
        /// What is wrong with it.
        problem: Box<ParameterProblem>,
    },

    /// The declared model is not part of the schema definitions.
    #[display("unknown model '{model}'")]
    UnknownModel {
        /// The model name.
        model: String,
    },

    /// A header parameter cannot be written as an HTTP header.
    #[display("invalid header: {message}")]
    InvalidHeader {
        /// Why the name or value was rejected.
        message: String,
    },
}

/// None of the operation's security requirement sets could be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error)]
pub struct MissingAuthorizationError {
    /// Every requirement set that was tried, in declaration order.
    pub attempts: Vec<RequirementFailure>,
}

impl fmt::Display for MissingAuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no security requirement could be satisfied")?;
        for attempt in &self.attempts {
            write!(f, "\n  - {attempt}")?;
        }
        Ok(())
    }
}

/// A security requirement set that failed, with the scheme that made it fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementFailure {
    /// The evaluated schemes of the set with their definitions.
    pub schemes: Vec<AttemptedScheme>,
    /// Name of the first scheme that failed.
    pub failed_scheme: String,
    /// Why it failed.
    pub reason: SchemeFailure,
}

impl fmt::Display for RequirementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .schemes
            .iter()
            .map(|scheme| scheme.name.as_str())
            .collect::<Vec<_>>()
            .join(" + ");
        write!(f, "[{names}] {}: {}", self.failed_scheme, self.reason)
    }
}

/// A scheme name together with its definition, if the schema declares one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptedScheme {
    /// The scheme name.
    pub name: String,
    /// Its definition.
    pub definition: Option<SecurityDefinition>,
}

/// Why a single security scheme could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SchemeFailure {
    /// No usable credential was provided.
    #[display("missing credential")]
    MissingCredential,

    /// The scheme is not part of the security definitions.
    #[display("undefined security scheme")]
    UndefinedScheme,

    /// The credential cannot be written where the scheme expects it.
    #[display("invalid credential: {message}")]
    InvalidCredential {
        /// Description of the problem.
        message: String,
    },
}

/// Which negotiated header a [`MediaTypeError`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MediaTypeHeader {
    /// The `Accept` header, checked against `produces`.
    #[display("Accept")]
    Accept,
    /// The `Content-Type` header, checked against `consumes`.
    #[display("Content-Type")]
    ContentType,
}

/// An explicitly requested media type is not declared by the operation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
#[display("unsupported {header} '{requested}', expected one of {supported:?}")]
pub struct MediaTypeError {
    /// The header being negotiated.
    pub header: MediaTypeHeader,
    /// The requested media type.
    pub requested: String,
    /// The media types the operation declares.
    pub supported: Vec<String>,
}

/// The path template still has unresolved segments.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
#[display("path '{path}' is missing required arguments: {missings:?}")]
pub struct MissingParameterError {
    /// The path template.
    pub path: String,
    /// Names of the unresolved segments.
    pub missings: Vec<String>,
}

/// Errors raised while loading an operation descriptor or an API schema.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum DescriptorError {
    /// The JSON document does not match the expected shape.
    #[display("invalid descriptor at '{}': {}", _0.path(), _0.inner())]
    Json(serde_path_to_error::Error<serde_json::Error>),

    /// Two parameters share the same name.
    #[display("duplicate parameter '{name}'")]
    #[from(skip)]
    DuplicateParameter {
        /// The duplicated name.
        name: String,
    },

    /// The base path is not an absolute URL.
    #[display("invalid base path '{base_path}': {error}")]
    #[from(skip)]
    InvalidBasePath {
        /// The rejected base path.
        base_path: String,
        /// Why it was rejected.
        error: url::ParseError,
    },

    /// The method is not a valid HTTP method.
    #[display("invalid HTTP method '{method}'")]
    #[from(skip)]
    InvalidMethod {
        /// The rejected method.
        method: String,
    },
}
