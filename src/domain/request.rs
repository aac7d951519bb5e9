//! Request descriptors.

use crate::domain::signature::ClientSignature;

/// Descriptor of an incoming request, as seen by the throttle.
///
/// Carries only what the throttle reports on: the identity inputs (source
/// address, user agent) and the request line (method, path) for event
/// context. The source address is optional because some transports cannot
/// recover one; an absent address participates in the signature as the empty
/// string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    /// Client source address, if the transport knows one.
    pub source_address: Option<String>,
    /// Client user agent, verbatim.
    pub user_agent: String,
    /// Request method (e.g. `GET`).
    pub method: String,
    /// Request path.
    pub path: String,
}

impl RequestInfo {
    /// Derive the client signature for this request.
    pub fn signature(&self) -> ClientSignature {
        ClientSignature::derive(self.source_address.as_deref(), &self.user_agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_matches_direct_derivation() {
        let request = RequestInfo {
            source_address: Some("192.0.2.1".to_string()),
            user_agent: "curl/8.4.0".to_string(),
            method: "GET".to_string(),
            path: "/api/status".to_string(),
        };
        assert_eq!(
            request.signature(),
            ClientSignature::derive(Some("192.0.2.1"), "curl/8.4.0")
        );
    }

    #[test]
    fn test_signature_ignores_method_and_path() {
        let get = RequestInfo {
            source_address: Some("192.0.2.1".to_string()),
            user_agent: "curl/8.4.0".to_string(),
            method: "GET".to_string(),
            path: "/a".to_string(),
        };
        let post = RequestInfo {
            method: "POST".to_string(),
            path: "/b".to_string(),
            ..get.clone()
        };
        assert_eq!(get.signature(), post.signature());
    }

    #[test]
    fn test_absent_address_hashes_as_empty() {
        let request = RequestInfo {
            user_agent: "curl/8.4.0".to_string(),
            ..Default::default()
        };
        assert_eq!(
            request.signature(),
            ClientSignature::derive(Some(""), "curl/8.4.0")
        );
    }
}
