//! HTTP Basic and Digest authentication for the device API
//!
//! The device answers unauthenticated requests with a `401` carrying a
//! `WWW-Authenticate: Digest ...` challenge. The challenge is cached on the
//! client and reused for every subsequent request until the device rejects it
//! again; the nonce counter restarts at zero whenever a new challenge is
//! cached, and a fresh client nonce is generated per request.

use base64::Engine;
use md5::{Digest, Md5};

use crate::config::{ClientConfig, FirstContact};

/// A parsed `WWW-Authenticate: Digest` challenge
///
/// Cached on the client; invalidated only by a replacement challenge, never
/// by age.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    /// Protection realm
    pub realm: String,
    /// Server nonce
    pub nonce: String,
    /// Opaque value echoed back verbatim when present
    pub opaque: Option<String>,
    /// Quality-of-protection value, `auth` when offered
    pub qop: Option<String>,
    /// Digest algorithm name, `MD5` unless the device says otherwise
    pub algorithm: Option<String>,
}

impl AuthChallenge {
    /// Parse a `WWW-Authenticate` header value
    ///
    /// Returns `None` for non-Digest schemes or challenges missing the
    /// mandatory realm/nonce fields.
    pub fn parse(header: &str) -> Option<Self> {
        let params = header.trim().strip_prefix("Digest")?.trim();

        let mut realm = None;
        let mut nonce = None;
        let mut opaque = None;
        let mut qop = None;
        let mut algorithm = None;

        for (key, value) in split_challenge_params(params) {
            match key.as_str() {
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "opaque" => opaque = Some(value),
                // The device may offer "auth,auth-int"; only auth is used
                "qop" => {
                    let preferred = value
                        .split(',')
                        .map(str::trim)
                        .find(|q| *q == "auth")
                        .map(str::to_string);
                    qop = preferred.or(Some(value));
                }
                "algorithm" => algorithm = Some(value),
                _ => {}
            }
        }

        Some(Self {
            realm: realm?,
            nonce: nonce?,
            opaque,
            qop,
            algorithm,
        })
    }
}

/// Split `key="value", key=value` challenge parameters, honoring quotes
fn split_challenge_params(input: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let Some(eq) = rest.find('=') else { break };
        let key = rest[..eq].trim().trim_start_matches(',').trim().to_string();
        rest = &rest[eq + 1..];

        let value = if let Some(stripped) = rest.strip_prefix('"') {
            match stripped.find('"') {
                Some(end) => {
                    let value = stripped[..end].to_string();
                    rest = &stripped[end + 1..];
                    value
                }
                None => {
                    let value = stripped.to_string();
                    rest = "";
                    value
                }
            }
        } else {
            match rest.find(',') {
                Some(end) => {
                    let value = rest[..end].trim().to_string();
                    rest = &rest[end + 1..];
                    value
                }
                None => {
                    let value = rest.trim().to_string();
                    rest = "";
                    value
                }
            }
        };

        if !key.is_empty() {
            params.push((key, value));
        }
    }

    params
}

/// Compute the RFC 2617 digest response
///
/// Deterministic and reproducible from its inputs alone. `nc` must already be
/// formatted as eight zero-padded hex digits; `qop` is `Some("auth")` when the
/// challenge offered quality-of-protection and `None` for the legacy scheme.
pub fn digest_response(
    username: &str,
    realm: &str,
    password: &str,
    method: &str,
    uri: &str,
    nonce: &str,
    nc: &str,
    cnonce: &str,
    qop: Option<&str>,
) -> String {
    let ha1 = md5_hex(&format!("{username}:{realm}:{password}"));
    let ha2 = md5_hex(&format!("{method}:{uri}"));

    match qop {
        Some(qop) => md5_hex(&format!("{ha1}:{nonce}:{nc}:{cnonce}:{qop}:{ha2}")),
        None => md5_hex(&format!("{ha1}:{nonce}:{ha2}")),
    }
}

fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build a Basic `Authorization` header value
pub fn basic_authorization(username: &str, password: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

/// Mutable authentication state for one client instance
///
/// Holds the cached challenge and the nonce counter. Callers must serialize
/// access so concurrent requests never reuse a counter value; the client
/// guards this with one mutex per instance.
#[derive(Debug, Default)]
pub struct AuthState {
    challenge: Option<AuthChallenge>,
    nonce_count: u32,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a digest challenge is currently cached
    pub fn has_challenge(&self) -> bool {
        self.challenge.is_some()
    }

    /// Cache a fresh challenge and restart the nonce counter
    pub fn cache(&mut self, challenge: AuthChallenge) {
        self.challenge = Some(challenge);
        self.nonce_count = 0;
    }

    /// Drop the cached challenge
    pub fn reset(&mut self) {
        self.challenge = None;
        self.nonce_count = 0;
    }

    /// Compute the `Authorization` header for one request attempt
    ///
    /// With a cached challenge this produces a Digest header, incrementing
    /// the nonce counter exactly once and generating a fresh client nonce.
    /// Without one, the first-contact strategy decides between optimistic
    /// Basic and no header at all.
    pub fn authorization(&mut self, config: &ClientConfig, method: &str, uri: &str) -> Option<String> {
        match &self.challenge {
            Some(challenge) => {
                self.nonce_count += 1;
                let nc = format!("{:08x}", self.nonce_count);
                let cnonce = client_nonce();
                Some(digest_authorization(
                    &config.username,
                    &config.password,
                    method,
                    uri,
                    challenge,
                    &nc,
                    &cnonce,
                ))
            }
            None => match config.first_contact {
                FirstContact::Basic => {
                    Some(basic_authorization(&config.username, &config.password))
                }
                FirstContact::Digest => None,
            },
        }
    }
}

/// Random per-request client nonce, 16 hex digits
fn client_nonce() -> String {
    let bytes: [u8; 8] = rand::random();
    hex::encode(bytes)
}

/// Assemble a Digest `Authorization` header value
fn digest_authorization(
    username: &str,
    password: &str,
    method: &str,
    uri: &str,
    challenge: &AuthChallenge,
    nc: &str,
    cnonce: &str,
) -> String {
    let qop = challenge.qop.as_deref();
    let response = digest_response(
        username,
        &challenge.realm,
        password,
        method,
        uri,
        &challenge.nonce,
        nc,
        cnonce,
        qop,
    );

    let mut header = format!(
        "Digest username=\"{username}\", realm=\"{realm}\", nonce=\"{nonce}\", uri=\"{uri}\", response=\"{response}\"",
        realm = challenge.realm,
        nonce = challenge.nonce,
    );

    if let Some(qop) = qop {
        header.push_str(&format!(", qop={qop}, nc={nc}, cnonce=\"{cnonce}\""));
    }
    if let Some(opaque) = &challenge.opaque {
        header.push_str(&format!(", opaque=\"{opaque}\""));
    }
    if let Some(algorithm) = &challenge.algorithm {
        header.push_str(&format!(", algorithm={algorithm}"));
    }

    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_challenge() {
        let header = r#"Digest realm="intercom", nonce="abc123", qop="auth", opaque="xyz", algorithm=MD5"#;
        let challenge = AuthChallenge::parse(header).unwrap();

        assert_eq!(challenge.realm, "intercom");
        assert_eq!(challenge.nonce, "abc123");
        assert_eq!(challenge.qop.as_deref(), Some("auth"));
        assert_eq!(challenge.opaque.as_deref(), Some("xyz"));
        assert_eq!(challenge.algorithm.as_deref(), Some("MD5"));
    }

    #[test]
    fn test_parse_challenge_minimal() {
        let challenge = AuthChallenge::parse(r#"Digest realm="r", nonce="n""#).unwrap();
        assert_eq!(challenge.realm, "r");
        assert_eq!(challenge.nonce, "n");
        assert!(challenge.qop.is_none());
        assert!(challenge.opaque.is_none());
    }

    #[test]
    fn test_parse_challenge_qop_list_picks_auth() {
        let challenge =
            AuthChallenge::parse(r#"Digest realm="r", nonce="n", qop="auth-int,auth""#).unwrap();
        assert_eq!(challenge.qop.as_deref(), Some("auth"));
    }

    #[test]
    fn test_parse_rejects_basic_scheme() {
        assert!(AuthChallenge::parse(r#"Basic realm="intercom""#).is_none());
    }

    #[test]
    fn test_parse_rejects_missing_nonce() {
        assert!(AuthChallenge::parse(r#"Digest realm="intercom""#).is_none());
    }

    #[test]
    fn test_digest_response_rfc2617_vector() {
        // Known vector from RFC 2617 section 3.5
        let response = digest_response(
            "Mufasa",
            "testrealm@host.com",
            "Circle Of Life",
            "GET",
            "/dir/index.html",
            "dcd98b7102dd2f0e8b11d0f600bfb0c093",
            "00000001",
            "0a4f113b",
            Some("auth"),
        );
        assert_eq!(response, "6629fae49393a05397450978507c4ef1");
    }

    #[test]
    fn test_digest_response_deterministic() {
        let compute = || {
            digest_response(
                "admin", "intercom", "secret", "GET", "/api/system/info", "nonce1", "00000002",
                "cafebabe00000000", Some("auth"),
            )
        };
        assert_eq!(compute(), compute());
    }

    #[test]
    fn test_digest_response_without_qop() {
        let with_qop = digest_response(
            "admin", "r", "p", "GET", "/x", "n", "00000001", "c", Some("auth"),
        );
        let without_qop = digest_response("admin", "r", "p", "GET", "/x", "n", "00000001", "c", None);
        assert_ne!(with_qop, without_qop);
    }

    #[test]
    fn test_basic_authorization() {
        // base64("admin:secret")
        assert_eq!(basic_authorization("admin", "secret"), "Basic YWRtaW46c2VjcmV0");
    }

    #[test]
    fn test_auth_state_nonce_counter() {
        let config = ClientConfig::new("host", "admin", "secret");
        let mut state = AuthState::new();

        let challenge = AuthChallenge::parse(r#"Digest realm="r", nonce="n", qop="auth""#).unwrap();
        state.cache(challenge.clone());

        let first = state.authorization(&config, "GET", "/api/system/info").unwrap();
        let second = state.authorization(&config, "GET", "/api/system/info").unwrap();
        assert!(first.contains("nc=00000001"));
        assert!(second.contains("nc=00000002"));

        // A replacement challenge restarts the counter
        state.cache(challenge);
        let third = state.authorization(&config, "GET", "/api/system/info").unwrap();
        assert!(third.contains("nc=00000001"));
    }

    #[test]
    fn test_auth_state_first_contact() {
        let basic_config = ClientConfig::new("host", "admin", "secret");
        let mut state = AuthState::new();
        let header = state.authorization(&basic_config, "GET", "/api/system/info").unwrap();
        assert!(header.starts_with("Basic "));

        let digest_config =
            ClientConfig::new("host", "admin", "secret").with_first_contact(FirstContact::Digest);
        let mut state = AuthState::new();
        assert!(state.authorization(&digest_config, "GET", "/api/system/info").is_none());
    }

    #[test]
    fn test_digest_header_shape() {
        let config = ClientConfig::new("host", "admin", "secret");
        let mut state = AuthState::new();
        state.cache(
            AuthChallenge::parse(r#"Digest realm="intercom", nonce="n1", qop="auth", opaque="op""#)
                .unwrap(),
        );

        let header = state.authorization(&config, "GET", "/api/switch/ctrl?switch=1").unwrap();
        assert!(header.starts_with("Digest username=\"admin\""));
        assert!(header.contains("realm=\"intercom\""));
        assert!(header.contains("uri=\"/api/switch/ctrl?switch=1\""));
        assert!(header.contains("qop=auth"));
        assert!(header.contains("opaque=\"op\""));
    }
}
