//! Request parsing
//!
//! Turns a gateway request into an [`OperationEnvelope`]. GET requests carry
//! the operation in query parameters, every other method in a JSON body.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::RouterError;

/// Handler input payload
pub type Data = Map<String, Value>;

/// Inbound request as the gateway hands it to the router
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    pub http_method: String,
    #[serde(default, alias = "queryParameters")]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl GatewayRequest {
    pub fn get<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            http_method: "GET".to_string(),
            query_string_parameters: Some(
                params
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn post(body: impl Into<String>) -> Self {
        Self {
            http_method: "POST".to_string(),
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn options() -> Self {
        Self {
            http_method: "OPTIONS".to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn is_preflight(&self) -> bool {
        self.http_method.eq_ignore_ascii_case("OPTIONS")
    }

    fn is_get(&self) -> bool {
        self.http_method.eq_ignore_ascii_case("GET")
    }
}

/// Verb the caller intends, carried inside the payload because the transport
/// only exposes GET and POST.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalMethod {
    #[default]
    Get,
    Post,
    Patch,
    Delete,
}

impl LogicalMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for LogicalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalMethod {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(RouterError::parse(format!("Unsupported method: {s}"))),
        }
    }
}

/// Normalized form of a parsed request
#[derive(Debug, Clone, PartialEq)]
pub struct OperationEnvelope {
    pub operation: String,
    pub data: Data,
    pub method: LogicalMethod,
}

/// Parse a gateway request into an envelope.
///
/// Query values are used exactly as the gateway decoded them.
pub fn parse_request(request: &GatewayRequest) -> Result<OperationEnvelope, RouterError> {
    if request.is_get() {
        parse_query(request.query_string_parameters.as_ref())
    } else {
        parse_body(request.body.as_deref())
    }
}

fn parse_query(
    params: Option<&HashMap<String, String>>,
) -> Result<OperationEnvelope, RouterError> {
    let operation = params.and_then(|p| p.get("operation")).cloned();

    let data = match params.and_then(|p| p.get("data")) {
        Some(raw) => {
            let value: Value = serde_json::from_str(raw)
                .map_err(|e| RouterError::parse(format!("Invalid JSON in data parameter: {e}")))?;
            match value {
                Value::Null => Data::new(),
                value => into_data(value)?,
            }
        }
        None => Data::new(),
    };

    Ok(OperationEnvelope {
        operation: require_operation(operation)?,
        data,
        method: LogicalMethod::Get,
    })
}

fn parse_body(body: Option<&str>) -> Result<OperationEnvelope, RouterError> {
    let raw = body.map(str::trim).filter(|b| !b.is_empty()).unwrap_or("{}");

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| RouterError::parse(format!("Invalid JSON in request body: {e}")))?;
    let Value::Object(mut fields) = value else {
        return Err(RouterError::parse("Request body must be a JSON object"));
    };

    let operation = match fields.remove("operation") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(_) => return Err(RouterError::parse("operation must be a string")),
    };

    let data = match fields.remove("data") {
        None | Some(Value::Null) => Data::new(),
        Some(value) => into_data(value)?,
    };

    let method = match fields.remove("method") {
        None | Some(Value::Null) => LogicalMethod::default(),
        Some(Value::String(s)) => s.parse()?,
        Some(_) => return Err(RouterError::parse("method must be a string")),
    };

    Ok(OperationEnvelope {
        operation: require_operation(operation)?,
        data,
        method,
    })
}

fn into_data(value: Value) -> Result<Data, RouterError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(RouterError::parse("data must be a JSON object")),
    }
}

fn require_operation(operation: Option<String>) -> Result<String, RouterError> {
    operation
        .filter(|op| !op.is_empty())
        .ok_or(RouterError::MissingOperation)
}
