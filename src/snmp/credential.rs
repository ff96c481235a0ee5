use serde::Deserialize;

use crate::error::{Error, Result};

/// SNMPv3 user-based security data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsmUser {
    pub username: String,
    #[serde(default)]
    pub auth_password: String,
    #[serde(default)]
    pub privacy_password: String,
}

/// Secret material a credential is built from.
#[derive(Debug, Clone)]
pub enum Secret {
    Community(String),
    Usm(UsmUser),
}

/// Credential handed to the query executor.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// v1/v2c read community.
    Community(Vec<u8>),
}

// Keeps the community string out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Community(_) => f.write_str("Community(..)"),
        }
    }
}

impl Credential {
    /// Builds the credential for a query.
    ///
    /// SNMPv3 is not implemented; asking for it fails whatever the secret.
    pub fn build(use_v3: bool, secret: Secret) -> Result<Self> {
        if use_v3 {
            return Err(Error::UnsupportedFeature("SNMPv3 user-based security"));
        }

        match secret {
            Secret::Community(community) => Ok(Credential::Community(community.into_bytes())),
            Secret::Usm(_) => Err(Error::Config(
                "a community string is required unless SNMPv3 is selected".to_string(),
            )),
        }
    }

    pub fn community(&self) -> &[u8] {
        match self {
            Credential::Community(c) => c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_community_credential() {
        let cred = Credential::build(false, Secret::Community("public".to_string())).unwrap();
        assert_eq!(cred.community(), b"public");
        assert_eq!(format!("{:?}", cred), "Community(..)");
    }

    #[test]
    fn test_v3_is_unsupported_for_any_secret() {
        let secrets = [
            Secret::Community("public".to_string()),
            Secret::Usm(UsmUser::default()),
            Secret::Usm(UsmUser {
                username: "monitor".to_string(),
                auth_password: "authpass".to_string(),
                privacy_password: "privpass".to_string(),
            }),
        ];
        for secret in secrets {
            assert!(matches!(
                Credential::build(true, secret),
                Err(Error::UnsupportedFeature(_))
            ));
        }
    }

    #[test]
    fn test_usm_secret_without_v3() {
        assert!(matches!(
            Credential::build(false, Secret::Usm(UsmUser::default())),
            Err(Error::Config(_))
        ));
    }
}
