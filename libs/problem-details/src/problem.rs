//! RFC 7807 Problem Details: concrete occurrences of a [`ProblemType`].

use std::sync::Arc;

use http::StatusCode;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{ProblemError, ProblemResult};
use crate::problem_type::ProblemType;
use crate::schema::{JsonSchemaValidator, SchemaValidator};
use crate::template;

const TYPE_NAME: &str = "ProblemDetails";

/// Status code as supplied by the caller: a bare integer or an `http::StatusCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusInput {
    Code(u16),
    Typed(StatusCode),
}

impl From<u16> for StatusInput {
    fn from(code: u16) -> Self {
        Self::Code(code)
    }
}

impl From<StatusCode> for StatusInput {
    fn from(status: StatusCode) -> Self {
        Self::Typed(status)
    }
}

impl StatusInput {
    /// Coerce into a registered HTTP status code.
    ///
    /// # Errors
    /// Returns `ProblemError::InvalidStatus` for codes that are not a
    /// registered status (no canonical reason phrase), however they were supplied.
    pub fn into_status(self) -> ProblemResult<StatusCode> {
        let (status, code) = match self {
            Self::Typed(status) => (Some(status), status.as_u16()),
            Self::Code(code) => (StatusCode::from_u16(code).ok(), code),
        };
        status
            .filter(|status| status.canonical_reason().is_some())
            .ok_or(ProblemError::InvalidStatus { code })
    }
}

/// A member of a [`ProblemDetails`], as returned by [`ProblemDetails::get`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Type(&'a ProblemType),
    Title(&'a str),
    Detail(&'a str),
    Status(Option<StatusCode>),
    Extension(&'a Value),
}

impl Field<'_> {
    /// JSON form of the member, as it appears in [`ProblemDetails::fields`].
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Type(problem_type) => Value::String(problem_type.identifier().to_owned()),
            Self::Title(s) | Self::Detail(s) => Value::String((*s).to_owned()),
            Self::Status(status) => status.map_or(Value::Null, |s| Value::from(s.as_u16())),
            Self::Extension(value) => (*value).clone(),
        }
    }
}

/// One occurrence of a problem type.
///
/// Extension data is validated against the type's schemas and the title/detail
/// templates are resolved once, at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemDetails {
    problem_type: Arc<ProblemType>,
    title: String,
    detail: String,
    status: Option<StatusCode>,
    data: IndexMap<String, Value>,
}

impl Default for ProblemDetails {
    fn default() -> Self {
        Self {
            problem_type: ProblemType::blank_shared(),
            title: String::new(),
            detail: String::new(),
            status: None,
            data: IndexMap::new(),
        }
    }
}

impl ProblemDetails {
    pub fn builder() -> ProblemDetailsBuilder {
        ProblemDetailsBuilder::default()
    }

    #[must_use]
    pub fn problem_type(&self) -> &Arc<ProblemType> {
        &self.problem_type
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Validated extension data, in insertion order.
    #[must_use]
    pub fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    /// Look up a member by name.
    ///
    /// `type`, `title`, `detail` and `status` are checked first, then the
    /// extension data.
    ///
    /// # Errors
    /// Returns `ProblemError::AttributeNotFound` if the name is neither.
    pub fn get(&self, name: &str) -> ProblemResult<Field<'_>> {
        let field = match name {
            "type" => Field::Type(&self.problem_type),
            "title" => Field::Title(&self.title),
            "detail" => Field::Detail(&self.detail),
            "status" => Field::Status(self.status),
            _ => self
                .data
                .get(name)
                .map(Field::Extension)
                .ok_or_else(|| ProblemError::AttributeNotFound {
                    attribute: name.to_owned(),
                    type_name: TYPE_NAME,
                })?,
        };
        Ok(field)
    }

    /// Ordered `(name, value)` pairs: `type`, `title`, `detail`, `status`, then
    /// the extension members in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Value)> + '_ {
        [
            ("type", Field::Type(&self.problem_type).to_value()),
            ("title", Value::String(self.title.clone())),
            ("detail", Value::String(self.detail.clone())),
            ("status", Field::Status(self.status).to_value()),
        ]
        .into_iter()
        .chain(self.data.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }

    /// Validate every supplied extension value against `problem_type`.
    ///
    /// # Errors
    /// Returns `ProblemError::UnknownExtensionField` for undeclared members and
    /// `ProblemError::SchemaValidation` for values that fail their schema.
    pub fn validate_data(
        problem_type: &ProblemType,
        data: IndexMap<String, Value>,
        validator: &dyn SchemaValidator,
    ) -> ProblemResult<IndexMap<String, Value>> {
        for (field, value) in &data {
            problem_type.validate_value(field, value, validator)?;
        }
        Ok(data)
    }
}

impl Serialize for ProblemDetails {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(4 + self.data.len()))?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Builder for [`ProblemDetails`].
#[derive(Debug, Default)]
#[must_use]
pub struct ProblemDetailsBuilder {
    problem_type: Option<Arc<ProblemType>>,
    title: Option<String>,
    detail: Option<String>,
    status: Option<StatusInput>,
    data: IndexMap<String, Value>,
}

impl ProblemDetailsBuilder {
    pub fn problem_type(mut self, problem_type: Arc<ProblemType>) -> Self {
        self.problem_type = Some(problem_type);
        self
    }

    /// Title template overriding the type's title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Detail template overriding the type's detail.
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn status(mut self, status: impl Into<StatusInput>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Supply one extension member.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn fields<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.data
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Validate and build with the `jsonschema` validator.
    ///
    /// # Errors
    /// See [`ProblemDetailsBuilder::build_with`].
    pub fn build(self) -> ProblemResult<ProblemDetails> {
        self.build_with(&JsonSchemaValidator)
    }

    /// Validate the extension data, resolve the templates and coerce the status.
    ///
    /// # Errors
    /// Returns `ProblemError::UnknownExtensionField`, `ProblemError::SchemaValidation`,
    /// `ProblemError::MissingTemplateField`, `ProblemError::InvalidTemplate` or
    /// `ProblemError::InvalidStatus`.
    pub fn build_with(self, validator: &dyn SchemaValidator) -> ProblemResult<ProblemDetails> {
        let problem_type = self
            .problem_type
            .unwrap_or_else(ProblemType::blank_shared);
        let data = ProblemDetails::validate_data(&problem_type, self.data, validator)?;

        let title = template::format(
            self.title.as_deref().unwrap_or(problem_type.title()),
            &data,
        )?;
        let detail = template::format(
            self.detail.as_deref().unwrap_or(problem_type.detail()),
            &data,
        )?;
        let status = self.status.map(StatusInput::into_status).transpose()?;

        tracing::trace!(
            problem_type = %problem_type,
            status = ?status,
            members = data.len(),
            "problem details constructed"
        );
        Ok(ProblemDetails {
            problem_type,
            title,
            detail,
            status,
            data,
        })
    }
}
