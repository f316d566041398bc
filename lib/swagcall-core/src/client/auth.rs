use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secure wrapper for credential strings that zeroes memory on drop.
///
/// The value is redacted in `Debug` output and masked in `Display` output so
/// credentials never leak through logs.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the wrapped value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn mask_sensitive(value: &str) -> String {
        if value.len() <= 8 {
            "***".to_string()
        } else {
            let head: String = value.chars().take(4).collect();
            let tail: String = value
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("{head}...{tail}")
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl Serialize for SecureString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Credentials handed to the security resolver.
///
/// A credential is either a bare token (api keys), a username/password pair
/// (basic schemes), or a map keyed by security scheme name when an operation
/// combines several schemes.
///
/// # Example
///
/// ```rust
/// use swagcall_core::AuthData;
///
/// let token = AuthData::from("123");
/// let basic = AuthData::basic("Bob", "secret");
/// let both = AuthData::schemes([("apiKey", token), ("basicAuth", basic)]);
/// assert!(!both.is_empty());
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthData {
    /// A single token, used by `apiKey` schemes.
    Token(SecureString),

    /// Username and password, used by `basic` schemes.
    Basic {
        /// The username.
        username: String,
        /// The password.
        password: SecureString,
    },

    /// Credentials keyed by security scheme name.
    Schemes(IndexMap<String, AuthData>),
}

impl AuthData {
    /// Creates basic credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<SecureString>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates credentials keyed by scheme name.
    pub fn schemes(
        entries: impl IntoIterator<Item = (impl Into<String>, impl Into<AuthData>)>,
    ) -> Self {
        Self::Schemes(
            entries
                .into_iter()
                .map(|(name, data)| (name.into(), data.into()))
                .collect(),
        )
    }

    /// `true` when the credential carries nothing usable.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Token(token) => token.is_empty(),
            Self::Basic { username, password } => username.is_empty() && password.is_empty(),
            Self::Schemes(entries) => entries.is_empty(),
        }
    }

    /// Returns the credential to use for a scheme.
    ///
    /// Credentials keyed by scheme name yield their entry; anything else is
    /// used as the sole credential of every scheme.
    pub fn for_scheme(&self, scheme: &str) -> &AuthData {
        match self {
            Self::Schemes(entries) => entries.get(scheme).unwrap_or(self),
            _ => self,
        }
    }
}

impl fmt::Debug for AuthData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.debug_tuple("Token").field(&"[REDACTED]").finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Schemes(entries) => f.debug_tuple("Schemes").field(entries).finish(),
        }
    }
}

impl From<&str> for AuthData {
    fn from(value: &str) -> Self {
        Self::Token(value.into())
    }
}

impl From<String> for AuthData {
    fn from(value: String) -> Self {
        Self::Token(value.into())
    }
}

impl From<SecureString> for AuthData {
    fn from(value: SecureString) -> Self {
        Self::Token(value)
    }
}

impl<U, P> From<(U, P)> for AuthData
where
    U: Into<String>,
    P: Into<SecureString>,
{
    fn from((username, password): (U, P)) -> Self {
        Self::basic(username, password)
    }
}

/// A shared, settable auth configuration value.
///
/// Cloning the slot shares it: a write through any clone is visible to every
/// handler holding it. Concurrent writers race, the last write wins.
#[derive(Debug, Clone, Default)]
pub struct AuthSlot(Arc<RwLock<Option<AuthData>>>);

impl AuthSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the current value.
    pub fn get(&self) -> Option<AuthData> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the current value.
    pub fn set(&self, data: impl Into<AuthData>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(data.into());
    }

    /// Stores basic credentials, the two-argument form of [`AuthSlot::set`].
    pub fn set_basic(&self, username: impl Into<String>, password: impl Into<SecureString>) {
        self.set(AuthData::basic(username, password));
    }

    /// Empties the slot.
    pub fn clear(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// The api, model, and operation auth levels of one operation.
///
/// The effective credential is the most specific non-empty level.
#[derive(Debug, Clone, Default)]
pub struct AuthScopeChain {
    /// Client-wide credentials.
    pub api: AuthSlot,
    /// Credentials shared by the operations of one model.
    pub model: AuthSlot,
    /// Credentials of a single operation.
    pub operation: AuthSlot,
}

impl AuthScopeChain {
    /// Resolves the effective credential: operation, then model, then api level.
    pub fn resolve(&self) -> Option<AuthData> {
        [&self.operation, &self.model, &self.api]
            .into_iter()
            .filter_map(AuthSlot::get)
            .find(|data| !data.is_empty())
    }
}

/// Something that yields the effective credential of an operation on each call.
pub trait AuthSource {
    /// Returns the credential to use, if any.
    fn auth_data(&self) -> Option<AuthData>;
}

impl AuthSource for AuthScopeChain {
    fn auth_data(&self) -> Option<AuthData> {
        self.resolve()
    }
}

impl AuthSource for AuthSlot {
    fn auth_data(&self) -> Option<AuthData> {
        self.get().filter(|data| !data.is_empty())
    }
}

impl<F> AuthSource for F
where
    F: Fn() -> Option<AuthData>,
{
    fn auth_data(&self) -> Option<AuthData> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_string_mask() {
        assert_eq!(SecureString::mask_sensitive("short"), "***");
        assert_eq!(SecureString::mask_sensitive("12345678"), "***");
        assert_eq!(SecureString::mask_sensitive("123456789"), "1234...6789");
    }

    #[test]
    fn test_auth_data_debug_is_redacted() {
        let data = AuthData::schemes([
            ("apiKey", AuthData::from("very-secret-token")),
            ("basicAuth", AuthData::basic("Bob", "secret")),
        ]);

        let debug = format!("{data:?}");
        assert!(!debug.contains("very-secret-token"));
        assert!(!debug.contains("secret\""));
        insta::assert_snapshot!(debug, @r#"Schemes({"apiKey": Token("[REDACTED]"), "basicAuth": Basic { username: "Bob", password: "[REDACTED]" }})"#);
    }

    #[test]
    fn test_auth_data_deserialization() {
        let data: AuthData = serde_json::from_value(serde_json::json!({
            "basicAuth": { "username": "Bob", "password": "secret" },
            "apiKeyHeader": "header"
        }))
        .expect("valid auth data");

        assert_eq!(
            data,
            AuthData::schemes([
                ("basicAuth", AuthData::basic("Bob", "secret")),
                ("apiKeyHeader", AuthData::from("header")),
            ])
        );

        let data: AuthData = serde_json::from_value(serde_json::json!("123")).expect("a token");
        assert_eq!(data, AuthData::from("123"));
    }

    #[test]
    fn test_for_scheme_falls_back_to_whole_data() {
        let keyed = AuthData::schemes([("apiKey", "123")]);
        assert_eq!(keyed.for_scheme("apiKey"), &AuthData::from("123"));
        assert_eq!(keyed.for_scheme("other"), &keyed);

        let token = AuthData::from("abc");
        assert_eq!(token.for_scheme("anything"), &token);
    }

    #[test]
    fn test_slot_read_write() {
        let slot = AuthSlot::new();
        assert_eq!(slot.get(), None);

        slot.set("123");
        assert_eq!(slot.get(), Some(AuthData::from("123")));

        slot.set_basic("Bob", "secret");
        assert_eq!(slot.get(), Some(AuthData::basic("Bob", "secret")));

        slot.clear();
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_slot_clones_share_state() {
        let slot = AuthSlot::new();
        let shared = slot.clone();

        shared.set("shared");
        assert_eq!(slot.get(), Some(AuthData::from("shared")));
    }

    #[test]
    fn test_chain_prefers_most_specific_level() {
        let chain = AuthScopeChain::default();
        assert_eq!(chain.resolve(), None);

        chain.api.set("api");
        assert_eq!(chain.resolve(), Some(AuthData::from("api")));

        chain.model.set("model");
        assert_eq!(chain.resolve(), Some(AuthData::from("model")));

        chain.operation.set("operation");
        assert_eq!(chain.resolve(), Some(AuthData::from("operation")));

        chain.operation.set("");
        assert_eq!(chain.resolve(), Some(AuthData::from("model")));

        chain.model.clear();
        assert_eq!(chain.resolve(), Some(AuthData::from("api")));
    }

    #[test]
    fn test_closure_auth_source() {
        let source = || Some(AuthData::from("from-closure"));
        assert_eq!(source.auth_data(), Some(AuthData::from("from-closure")));
    }
}
