//! Authentication settings validated once at startup.
//!
//! Secrets, lifetimes and the cookie `Secure` flag live here and are handed to
//! the token codec and cookie transport. Nothing is global: every router gets
//! its own copy.

use std::fmt;
use std::time::Duration;

/// Longest lifetime either token domain may be configured with (ten years).
pub const MAX_LIFETIME_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Errors raised while validating configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} secret must not be empty")]
    EmptySecret(&'static str),
    #[error("access and refresh secrets must differ")]
    SharedSecret,
    #[error("token lifetimes must be at least one second")]
    ZeroLifetime,
    #[error("token lifetimes must not exceed {max}s, got {got}s")]
    LifetimeTooLong { got: u64, max: u64 },
    #[error("access lifetime ({access}s) must be shorter than refresh lifetime ({refresh}s)")]
    LifetimeOrder { access: u64, refresh: u64 },
}

#[derive(Clone)]
pub struct AuthSettings {
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
    secure_cookies: bool,
}

impl AuthSettings {
    pub fn new(
        access_secret: impl Into<Vec<u8>>,
        refresh_secret: impl Into<Vec<u8>>,
        access_lifetime: Duration,
        refresh_lifetime: Duration,
        secure_cookies: bool,
    ) -> Result<Self, ConfigError> {
        let access_secret = access_secret.into();
        let refresh_secret = refresh_secret.into();

        if access_secret.is_empty() {
            return Err(ConfigError::EmptySecret("access"));
        }
        if refresh_secret.is_empty() {
            return Err(ConfigError::EmptySecret("refresh"));
        }
        if access_secret == refresh_secret {
            return Err(ConfigError::SharedSecret);
        }

        let access = access_lifetime.as_secs();
        let refresh = refresh_lifetime.as_secs();
        if access == 0 || refresh == 0 {
            return Err(ConfigError::ZeroLifetime);
        }
        if let Some(got) = [access, refresh].into_iter().find(|&s| s > MAX_LIFETIME_SECS) {
            return Err(ConfigError::LifetimeTooLong {
                got,
                max: MAX_LIFETIME_SECS,
            });
        }
        if access >= refresh {
            return Err(ConfigError::LifetimeOrder { access, refresh });
        }

        Ok(Self {
            access_secret,
            refresh_secret,
            access_lifetime: Duration::from_secs(access),
            refresh_lifetime: Duration::from_secs(refresh),
            secure_cookies,
        })
    }

    pub fn access_secret(&self) -> &[u8] {
        &self.access_secret
    }

    pub fn refresh_secret(&self) -> &[u8] {
        &self.refresh_secret
    }

    pub fn access_lifetime(&self) -> Duration {
        self.access_lifetime
    }

    pub fn refresh_lifetime(&self) -> Duration {
        self.refresh_lifetime
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_valid_settings() {
        let settings = AuthSettings::new("a-secret", "r-secret", secs(5), secs(10), true).unwrap();
        assert_eq!(settings.access_lifetime(), secs(5));
        assert_eq!(settings.refresh_lifetime(), secs(10));
        assert!(settings.secure_cookies());
    }

    #[test]
    fn test_access_must_be_shorter_than_refresh() {
        let err = AuthSettings::new("a", "r", secs(10), secs(10), false).unwrap_err();
        assert_eq!(
            err,
            ConfigError::LifetimeOrder {
                access: 10,
                refresh: 10
            }
        );
    }

    #[test]
    fn test_sub_second_lifetime_rejected() {
        let err =
            AuthSettings::new("a", "r", Duration::from_millis(500), secs(10), false).unwrap_err();
        assert_eq!(err, ConfigError::ZeroLifetime);
    }

    #[test]
    fn test_unbounded_lifetime_rejected() {
        let err = AuthSettings::new("a", "r", secs(5), secs(u64::MAX), false).unwrap_err();
        assert_eq!(
            err,
            ConfigError::LifetimeTooLong {
                got: u64::MAX,
                max: MAX_LIFETIME_SECS
            }
        );

        assert!(AuthSettings::new("a", "r", secs(5), secs(MAX_LIFETIME_SECS), false).is_ok());
    }

    #[test]
    fn test_shared_secret_rejected() {
        let err = AuthSettings::new("same", "same", secs(5), secs(10), false).unwrap_err();
        assert_eq!(err, ConfigError::SharedSecret);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let err = AuthSettings::new("", "r", secs(5), secs(10), false).unwrap_err();
        assert_eq!(err, ConfigError::EmptySecret("access"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = AuthSettings::new("top-secret-a", "top-secret-r", secs(5), secs(10), false)
            .unwrap();
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("top-secret"));
    }
}
