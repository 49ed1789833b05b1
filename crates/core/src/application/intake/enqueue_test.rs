//! Unit tests for enqueue validation

#[cfg(test)]
mod tests {
    use super::super::enqueue::*;
    use tokio_test::{assert_err, assert_ok};

    fn request() -> EnqueueRequest {
        EnqueueRequest {
            requester_id: "client-42".to_string(),
            requester_name: "Maria Souza".to_string(),
            service_id: "svc-color".to_string(),
            service_name: "Coloring".to_string(),
            note: None,
        }
    }

    #[test]
    fn test_validate_valid_request() {
        assert_ok!(validate_request(&request()));
    }

    #[test]
    fn test_validate_requester_empty() {
        let req = EnqueueRequest {
            requester_id: "  ".to_string(),
            ..request()
        };

        let err = assert_err!(validate_request(&req));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_validate_service_name_too_long() {
        let req = EnqueueRequest {
            service_name: "a".repeat(MAX_NAME_LEN + 1),
            ..request()
        };

        let err = assert_err!(validate_request(&req));
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn test_validate_name_at_limit() {
        let req = EnqueueRequest {
            requester_name: "é".repeat(MAX_NAME_LEN),
            ..request()
        };

        assert_ok!(validate_request(&req));
    }

    #[test]
    fn test_validate_note_too_long() {
        let req = EnqueueRequest {
            note: Some("x".repeat(MAX_NOTE_LEN + 1)),
            ..request()
        };

        let err = assert_err!(validate_request(&req));
        assert!(err.to_string().contains("note"));
    }
}
