use gridrights_core::{AppError, AppResult};
use serde::Deserialize;

/// Result code the upstream API uses for success.
pub(crate) const RESULT_SUCCESS: i32 = 1;
/// Result code the upstream API uses for a locked/unauthorized screen.
pub(crate) const RESULT_LOCKED: i32 = -2;

/// Response envelope shared by every upstream rights endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub result: i32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Returns the payload on success, mapping failure codes to errors.
    /// The locked code is an error here; callers that render a lock state
    /// must check [`Self::is_locked`] first.
    pub(crate) fn into_data(self, context: &str) -> AppResult<T> {
        if self.result != RESULT_SUCCESS {
            return Err(AppError::Upstream(format!(
                "{context} failed with result {}: {}",
                self.result,
                self.message.unwrap_or_else(|| "no message".to_owned())
            )));
        }

        self.data
            .ok_or_else(|| AppError::Upstream(format!("{context} returned no data")))
    }

    /// Returns whether the envelope carries the locked result code.
    pub(crate) fn is_locked(&self) -> bool {
        self.result == RESULT_LOCKED
    }

    /// Fails unless the envelope carries the success code; for endpoints
    /// whose payload is irrelevant.
    pub(crate) fn require_success(&self, context: &str) -> AppResult<()> {
        if self.result != RESULT_SUCCESS {
            return Err(AppError::Upstream(format!(
                "{context} failed with result {}: {}",
                self.result,
                self.message.as_deref().unwrap_or("no message")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Envelope;

    #[test]
    fn success_envelope_yields_data() {
        let envelope: Envelope<Vec<i32>> = match serde_json::from_str(
            r#"{"result": 1, "message": "ok", "data": [1, 2]}"#,
        ) {
            Ok(envelope) => envelope,
            Err(error) => panic!("decode failed: {error}"),
        };
        assert!(!envelope.is_locked());
        assert_eq!(envelope.into_data("fetch").ok(), Some(vec![1, 2]));
    }

    #[test]
    fn locked_envelope_is_detected() {
        let envelope: Envelope<Vec<i32>> =
            match serde_json::from_str(r#"{"result": -2, "message": "locked"}"#) {
                Ok(envelope) => envelope,
                Err(error) => panic!("decode failed: {error}"),
            };
        assert!(envelope.is_locked());
    }

    #[test]
    fn failure_envelope_surfaces_the_upstream_message() {
        let envelope: Envelope<Vec<i32>> =
            match serde_json::from_str(r#"{"result": 0, "message": "session expired"}"#) {
                Ok(envelope) => envelope,
                Err(error) => panic!("decode failed: {error}"),
            };
        let error = envelope.into_data("fetch");
        assert!(error.is_err_and(|error| error.to_string().contains("session expired")));
    }
}
