#![deny(missing_docs)]

//! # Invoke Command
//!
//! Dispatches one request against the demo service and prints the result.

use http::Method;
use swagplus_core::{Request, Response, SpecConfig};
use tracing::debug;

use crate::demo;
use crate::error::{CliError, CliResult};

/// Arguments for the invoke command.
#[derive(clap::Args, Debug, Clone)]
pub struct InvokeArgs {
    /// HTTP method.
    #[clap(long, default_value = "GET")]
    pub method: String,

    /// Request path (e.g. `/users/1`).
    #[clap(long)]
    pub path: String,

    /// Query pair `key=value`; repeatable.
    #[clap(long = "query", value_parser = parse_pair)]
    pub query: Vec<(String, String)>,

    /// Form pair `key=value`; repeatable.
    #[clap(long = "form", value_parser = parse_pair)]
    pub form: Vec<(String, String)>,

    /// JSON body.
    #[clap(long)]
    pub json: Option<String>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

/// Builds the request described by `args`.
pub fn build_request(args: &InvokeArgs) -> CliResult<Request> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .map_err(|e| CliError::InvalidArgument(format!("method '{}': {}", args.method, e)))?;
    let mut request = Request::new(method, args.path.clone());
    for (key, value) in &args.query {
        request = request.with_query(key, value);
    }
    for (key, value) in &args.form {
        request = request.with_form(key, value);
    }
    if let Some(body) = &args.json {
        let value = serde_json::from_str(body)
            .map_err(|e| CliError::InvalidArgument(format!("JSON body: {}", e)))?;
        request = request.with_json(value);
    }
    Ok(request)
}

/// Dispatches the request against the demo service.
pub fn run(args: &InvokeArgs) -> CliResult<Response> {
    let service = demo::service(SpecConfig::default())?;
    let request = build_request(args)?;
    debug!(method = %request.method(), path = request.path(), "Dispatching");
    Ok(service.dispatch(request))
}

/// Executes the invoke command.
pub fn execute(args: &InvokeArgs) -> CliResult<()> {
    let response = run(args)?;
    println!("{}", response.status);
    println!(
        "{}",
        serde_json::to_string_pretty(&response.body).map_err(swagplus_core::SpecError::from)?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    fn args(method: &str, path: &str) -> InvokeArgs {
        InvokeArgs {
            method: method.into(),
            path: path.into(),
            query: Vec::new(),
            form: Vec::new(),
            json: None,
        }
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("a=b=c").unwrap(), ("a".into(), "b=c".into()));
        assert!(parse_pair("novalue").is_err());
    }

    #[test]
    fn test_invoke_get_user() {
        let response = run(&args("get", "/users/1")).unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["email"], json!("ada@example.com"));
    }

    #[test]
    fn test_invoke_with_json_body() {
        let mut a = args("POST", "/users");
        a.json = Some(r#"{"email": "x@y.z"}"#.into());
        let response = run(&a).unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["country"], json!("US"));
    }

    #[test]
    fn test_bad_json_body() {
        let mut a = args("POST", "/users");
        a.json = Some("{".into());
        assert!(matches!(run(&a), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_route() {
        let response = run(&args("GET", "/nope")).unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}
