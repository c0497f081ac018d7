use reqwest::Url;

/// Parse "true"/"false"/"1"/"0"/"yes"/"no"/"on"/"off".
pub fn parse_bool_str(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key).ok().as_deref().and_then(parse_bool_str)
}

/// Environment value with surrounding whitespace removed; blank counts as unset.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Returns true for localhost, loopback IPv4/IPv6, and 0.0.0.0 URLs.
pub fn is_local_endpoint_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };

    match parsed.host_str() {
        Some(host) => {
            let normalized = host.trim().to_ascii_lowercase();
            normalized == "localhost"
                || normalized == "[::1]"
                || normalized == "::1"
                || normalized == "0.0.0.0"
                || normalized.starts_with("127.")
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_str() {
        assert_eq!(parse_bool_str(" TRUE "), Some(true));
        assert_eq!(parse_bool_str("off"), Some(false));
        assert_eq!(parse_bool_str("maybe"), None);
    }

    #[test]
    fn test_env_non_empty_treats_blank_as_unset() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        let env = crate::test_support::ScopedEnv::cleared(&["WARDLINE_TEST_VALUE"]);
        assert_eq!(env_non_empty("WARDLINE_TEST_VALUE"), None);
        env.set("WARDLINE_TEST_VALUE", "   ");
        assert_eq!(env_non_empty("WARDLINE_TEST_VALUE"), None);
        env.set("WARDLINE_TEST_VALUE", " value ");
        assert_eq!(env_non_empty("WARDLINE_TEST_VALUE").as_deref(), Some("value"));
        env.set("WARDLINE_TEST_VALUE", "ON");
        assert_eq!(env_flag("WARDLINE_TEST_VALUE"), Some(true));
    }

    #[test]
    fn test_is_local_endpoint_url() {
        assert!(is_local_endpoint_url("http://localhost:8080/agents/x:run"));
        assert!(is_local_endpoint_url(" HTTP://127.0.0.1:9000/run "));
        assert!(is_local_endpoint_url("http://[::1]:9000/run"));
        assert!(!is_local_endpoint_url("https://localhost.evil.example/run"));
        assert!(!is_local_endpoint_url(
            "https://acme.snowflakecomputing.com/api/v2/databases/D/schemas/S/agents/A:run"
        ));
        assert!(!is_local_endpoint_url("not a url"));
    }
}
