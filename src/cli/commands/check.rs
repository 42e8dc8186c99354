use axum::http::{header, HeaderMap, HeaderValue};
use serde_json::{json, Value};

use crate::cli::utils::output_fields;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::gateway::{routes, Decision, Gateway, PathKind};

pub fn handle(path: &str, token: Option<&str>, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let gateway = Gateway::from_config(&config.security)?;

    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }

    let decision = gateway.evaluate(path, &headers);

    let mut fields = json!({
        "path": path,
        "class": format!("{:?}", routes::classify(path)),
        "kind": match PathKind::of(path) {
            PathKind::Api => "api",
            PathKind::Page => "page",
        },
    });
    if let (Some(object), Value::Object(described)) = (fields.as_object_mut(), describe(&decision)) {
        object.extend(described);
    }

    output_fields(output_format, fields)
}

/// Flat JSON description of a decision.
pub fn describe(decision: &Decision) -> Value {
    match decision {
        Decision::PassThrough => json!({ "decision": "pass" }),
        Decision::Allow(identity) => json!({
            "decision": "allow",
            "x-user-id": identity.user_id().to_string(),
            "x-user-role": identity.role().as_str(),
            "x-company-id": identity.company_id().map(|id| id.to_string()).unwrap_or_default(),
        }),
        Decision::RedirectTo(location) => json!({
            "decision": "redirect",
            "status": 307,
            "location": location,
        }),
        Decision::Reject(rejection) => json!({
            "decision": "reject",
            "status": rejection.status().as_u16(),
            "message": rejection.message(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Rejection;

    #[test]
    fn test_describe_reject_and_redirect() {
        let value = describe(&Decision::Reject(Rejection::Forbidden("No company associated with account")));
        assert_eq!(value["status"], json!(403));
        assert_eq!(value["decision"], json!("reject"));

        let value = describe(&Decision::RedirectTo("/login"));
        assert_eq!(value["location"], json!("/login"));
        assert_eq!(value["status"], json!(307));
    }
}
