use axum::extract::Request;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

/// Rewrites `POST /path?_method=PUT|DELETE` into the verb named by the
/// query parameter, letting plain HTML forms drive the full route table.
/// Only POST requests are eligible and only those two verbs are honored.
pub async fn method_override(mut request: Request, next: Next) -> Response {
    if request.method() == Method::POST {
        if let Some(method) = request.uri().query().and_then(override_from_query) {
            *request.method_mut() = method;
        }
    }
    next.run(request).await
}

fn override_from_query(query: &str) -> Option<Method> {
    let value = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("_method="))?;
    match value.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_put_and_delete() {
        assert_eq!(override_from_query("_method=PUT"), Some(Method::PUT));
        assert_eq!(override_from_query("_method=delete"), Some(Method::DELETE));
    }

    #[test]
    fn ignores_other_verbs_and_missing_parameter() {
        assert_eq!(override_from_query("_method=PATCH"), None);
        assert_eq!(override_from_query("_method=GET"), None);
        assert_eq!(override_from_query("search=loft"), None);
    }

    #[test]
    fn finds_the_parameter_among_others() {
        assert_eq!(
            override_from_query("search=x&_method=PUT&order=asc"),
            Some(Method::PUT)
        );
    }
}
