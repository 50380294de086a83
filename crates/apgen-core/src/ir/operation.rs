use indexmap::IndexMap;

use super::schema::IrSchema;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    /// Methods in the fixed order path items are walked.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Header,
    Path,
    Query,
    Cookie,
}

/// A normalized parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct IrParameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<IrSchema>,
}

/// Operation parameters grouped by location, each keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrParameterGroups {
    pub header: IndexMap<String, IrParameter>,
    pub path: IndexMap<String, IrParameter>,
    pub query: IndexMap<String, IrParameter>,
    pub cookie: IndexMap<String, IrParameter>,
}

impl IrParameterGroups {
    /// Insert a parameter into its location group. A later insert with the
    /// same name replaces the earlier one, which is how method-level
    /// parameters win over path-item parameters.
    pub fn insert(&mut self, parameter: IrParameter) {
        let group = match parameter.location {
            ParameterLocation::Header => &mut self.header,
            ParameterLocation::Path => &mut self.path,
            ParameterLocation::Query => &mut self.query,
            ParameterLocation::Cookie => &mut self.cookie,
        };
        group.insert(parameter.name.clone(), parameter);
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.path.is_empty() && self.query.is_empty() && self.cookie.is_empty()
    }
}

/// A normalized request body.
#[derive(Debug, Clone, PartialEq)]
pub struct IrRequestBody {
    pub description: Option<String>,
    pub required: bool,
    pub schema: Option<IrSchema>,
}

/// A normalized response.
#[derive(Debug, Clone, PartialEq)]
pub struct IrResponse {
    pub description: Option<String>,
    pub schema: Option<IrSchema>,
}

/// A security requirement: scheme name → scopes.
pub type IrSecurityRequirement = IndexMap<String, Vec<String>>;

/// A server URL.
#[derive(Debug, Clone, PartialEq)]
pub struct IrServer {
    pub url: String,
    pub description: Option<String>,
}

/// One HTTP method applied to one path.
#[derive(Debug, Clone, PartialEq)]
pub struct IrOperation {
    /// Stable id derived from `operationId` or method + path segments.
    pub id: String,
    pub method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub parameters: IrParameterGroups,
    pub body: Option<IrRequestBody>,
    pub responses: IndexMap<String, IrResponse>,
    pub security: Vec<IrSecurityRequirement>,
    pub servers: Vec<IrServer>,
}
