//! Route table of the tobacco API.
//!
//! Every route runs exactly one inventory operation and answers with a status
//! code and a JSON body:
//!
//! | Route                       | Success    | Otherwise                |
//! |-----------------------------|------------|--------------------------|
//! | `POST /api/tobacco/`        | 201 or 207 | 400 on a malformed body  |
//! | `GET /api/tobacco/`         | 200        | 404 when empty           |
//! | `GET /api/tobacco/brands`   | 200        | 404 when empty           |
//! | `GET /api/tobacco/<mark>`   | 200        | 404 when no match        |
//!
//! Store failures become 500.
use crate::core::StoreError;
use crate::inventory::{AddRequest, Inventory};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use tracing::error;

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const MULTI_STATUS: u16 = 207;
pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const METHOD_NOT_ALLOWED: u16 = 405;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

const TOBACCO_ROOT: &str = "/api/tobacco";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            other => Err(format!("Unsupported method: {}", other)),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Status code plus JSON body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        ApiResponse { status, body }
    }

    fn data<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => ApiResponse::new(OK, json!({ "data": data })),
            Err(e) => ApiResponse::from_error(&StoreError::Json(e)),
        }
    }

    fn not_found(description: &str) -> Self {
        ApiResponse::new(
            NOT_FOUND,
            json!({ "error": "Not Found", "description": description }),
        )
    }

    fn from_error(err: &StoreError) -> Self {
        error!("Request failed: {}", err);
        ApiResponse::new(INTERNAL_SERVER_ERROR, json!({ "error": err.to_string() }))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `POST /api/tobacco/`
pub fn add_tobacco(inventory: &Inventory, body: &str) -> ApiResponse {
    let request: AddRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            return ApiResponse::new(
                BAD_REQUEST,
                json!({ "error": "Bad Request", "description": e.to_string() }),
            )
        }
    };

    match inventory.add_tobaccos(&request) {
        Ok(report) if report.has_conflicts() => ApiResponse::new(
            MULTI_STATUS,
            json!({ "warning": "Some warnings appeared", "data": report.conflicts }),
        ),
        Ok(_) => ApiResponse::new(CREATED, json!({ "message": "Tobacco successfully added" })),
        Err(e) => ApiResponse::from_error(&e),
    }
}

/// `GET /api/tobacco/`
pub fn list_tobacco(inventory: &Inventory) -> ApiResponse {
    match inventory.list() {
        Ok(tobaccos) if tobaccos.is_empty() => ApiResponse::not_found("No tobacco found in the database"),
        Ok(tobaccos) => ApiResponse::data(tobaccos),
        Err(e) => ApiResponse::from_error(&e),
    }
}

/// `GET /api/tobacco/<mark>`
pub fn get_by_mark(inventory: &Inventory, mark: &str) -> ApiResponse {
    match inventory.by_mark(mark) {
        Ok(tobaccos) if tobaccos.is_empty() => {
            ApiResponse::not_found("Tobacco with the given mark not found")
        }
        Ok(tobaccos) => ApiResponse::data(tobaccos),
        Err(e) => ApiResponse::from_error(&e),
    }
}

/// `GET /api/tobacco/brands`
pub fn get_brands(inventory: &Inventory) -> ApiResponse {
    match inventory.brands() {
        Ok(brands) if brands.is_empty() => ApiResponse::not_found("Empty table 'BRANDS'"),
        Ok(brands) => ApiResponse::data(brands),
        Err(e) => ApiResponse::from_error(&e),
    }
}

/// Dispatches a request to its route
pub fn handle(inventory: &Inventory, method: Method, path: &str, body: Option<&str>) -> ApiResponse {
    let rest = match path.strip_prefix(TOBACCO_ROOT) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_matches('/'),
        _ => return ApiResponse::not_found("The requested URL was not found on the server"),
    };

    match (method, rest) {
        (Method::Post, "") => add_tobacco(inventory, body.unwrap_or("")),
        (Method::Get, "") => list_tobacco(inventory),
        (Method::Get, "brands") => get_brands(inventory),
        (Method::Get, mark) if !mark.contains('/') => get_by_mark(inventory, mark),
        (Method::Post, mark) if !mark.contains('/') => ApiResponse::new(
            METHOD_NOT_ALLOWED,
            json!({ "error": "Method Not Allowed", "description": format!("{} is not allowed here", method) }),
        ),
        _ => ApiResponse::not_found("The requested URL was not found on the server"),
    }
}
