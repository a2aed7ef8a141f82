use crate::error::optional;

const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Browser origins allowed to call the API with credentials.
///
/// Session cookies are sent cross-origin, so origins are listed explicitly
/// and never wildcarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Reads the comma separated `ALLOWED_ORIGINS` list.
    pub fn from_env() -> Self {
        let list = optional("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGINS.to_string());
        Self {
            allowed_origins: parse_origins(&list),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: parse_origins(DEFAULT_ORIGINS),
        }
    }
}

/// Splits an origin list, dropping blanks, `*` and trailing slashes.
pub fn parse_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty() && s != "*")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_local_frontends() {
        let config = CorsConfig::default();
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
    }

    #[test]
    fn parse_drops_blanks_and_wildcards() {
        let origins = parse_origins(" https://aula.ucb.edu.bo/ ,, *,https://aula.upb.edu.bo");
        assert_eq!(
            origins,
            vec!["https://aula.ucb.edu.bo", "https://aula.upb.edu.bo"]
        );
    }
}
