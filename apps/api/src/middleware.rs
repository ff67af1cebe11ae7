use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use gridrights_core::{AppError, NonEmptyString, UserIdentity};

use crate::error::ApiResult;

/// Header carrying the operator subject set by the auth-terminating proxy.
pub const OPERATOR_SUBJECT_HEADER: &str = "x-operator-subject";
/// Header carrying the operator display name.
pub const OPERATOR_NAME_HEADER: &str = "x-operator-name";

/// Maps the proxy identity headers to a [`UserIdentity`] extension.
///
/// The surrounding product terminates authentication upstream; requests
/// reaching this service without the subject header are rejected.
pub async fn require_operator(mut request: Request, next: Next) -> ApiResult<Response> {
    let identity = operator_identity(request.headers())?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn operator_identity(headers: &HeaderMap) -> Result<UserIdentity, AppError> {
    let subject = headers
        .get(OPERATOR_SUBJECT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .and_then(|value| NonEmptyString::new(value).ok())
        .ok_or_else(|| AppError::Unauthorized("operator identity required".to_owned()))?;

    let display_name = headers
        .get(OPERATOR_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(subject.as_str())
        .to_owned();

    Ok(UserIdentity::new(subject, display_name))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderName, HeaderValue};

    use super::{OPERATOR_NAME_HEADER, OPERATOR_SUBJECT_HEADER, operator_identity};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        headers
    }

    #[test]
    fn requests_without_a_subject_header_are_rejected() {
        assert!(operator_identity(&headers(&[])).is_err());
    }

    #[test]
    fn a_whitespace_only_subject_is_rejected() {
        let headers = headers(&[(OPERATOR_SUBJECT_HEADER, "   ")]);
        assert!(operator_identity(&headers).is_err());
    }

    #[test]
    fn the_display_name_defaults_to_the_subject() {
        let headers = headers(&[(OPERATOR_SUBJECT_HEADER, "op-7")]);
        let identity = operator_identity(&headers).ok();
        assert_eq!(
            identity.as_ref().map(|identity| identity.display_name()),
            Some("op-7")
        );
    }

    #[test]
    fn both_headers_are_mapped_onto_the_identity() {
        let headers = headers(&[
            (OPERATOR_SUBJECT_HEADER, "op-7"),
            (OPERATOR_NAME_HEADER, "Dana"),
        ]);
        let identity = operator_identity(&headers).ok();
        assert_eq!(
            identity
                .as_ref()
                .map(|identity| (identity.subject(), identity.display_name())),
            Some(("op-7", "Dana"))
        );
    }
}
