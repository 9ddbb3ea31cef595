use crate::utils::error::{Result, TravelError};
use secrecy::SecretString;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const PINECONE_API_KEY: &str = "PINECONE_API_KEY";
pub const OPENWEATHER_API_KEY: &str = "OPENWEATHER_API_KEY";

/// API keys for the hosted services. All three must be present before any
/// remote call is attempted.
pub struct Credentials {
    pub openai_api_key: SecretString,
    pub pinecone_api_key: SecretString,
    pub openweather_api_key: SecretString,
}

impl Credentials {
    /// Keys are checked in order; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<SecretString> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string().into()),
                _ => Err(TravelError::MissingCredential {
                    name: name.to_string(),
                }),
            }
        };

        Ok(Self {
            openai_api_key: required(OPENAI_API_KEY)?,
            pinecone_api_key: required(PINECONE_API_KEY)?,
            openweather_api_key: required(OPENWEATHER_API_KEY)?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_all_keys_present() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (OPENAI_API_KEY, "sk-1"),
            (PINECONE_API_KEY, " pc-2 "),
            (OPENWEATHER_API_KEY, "ow-3"),
        ]))
        .unwrap();

        assert_eq!(creds.openai_api_key.expose_secret(), "sk-1");
        assert_eq!(creds.pinecone_api_key.expose_secret(), "pc-2");
        assert!(!format!("{:?}", creds).contains("sk-1"));
    }

    #[test]
    fn test_missing_openai_key_is_reported_first() {
        let err = Credentials::from_lookup(lookup_from(&[(PINECONE_API_KEY, "pc")])).unwrap_err();
        assert!(matches!(
            err,
            TravelError::MissingCredential { ref name } if name == OPENAI_API_KEY
        ));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let err = Credentials::from_lookup(lookup_from(&[
            (OPENAI_API_KEY, "sk"),
            (PINECONE_API_KEY, "pc"),
            (OPENWEATHER_API_KEY, "   "),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            TravelError::MissingCredential { ref name } if name == OPENWEATHER_API_KEY
        ));
    }
}
