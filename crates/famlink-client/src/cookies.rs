//! Netscape cookies.txt loading
//!
//! The Family Link web session is authenticated with Google account
//! cookies. Export them from a logged-in browser session in Netscape
//! format (`cookies.txt` extensions produce this).

use famlink_api::{ApiError, ApiResult};
use std::path::Path;

/// One cookie from a cookies.txt file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    pub name: String,
    pub value: String,
}

impl Cookie {
    /// True for cookies that should be sent to Google API hosts
    pub fn is_google(&self) -> bool {
        self.domain.trim_start_matches('.').ends_with("google.com")
    }
}

/// Load cookies from a Netscape-format file.
///
/// Lines are tab-separated `domain flag path secure expiry name value`.
/// Comment lines start with `#`, except the `#HttpOnly_` prefix, which
/// marks a real cookie.
pub fn load_cookie_file(path: impl AsRef<Path>) -> ApiResult<Vec<Cookie>> {
    let content = std::fs::read_to_string(&path)?;
    Ok(parse_cookies(&content))
}

pub fn parse_cookies(content: &str) -> Vec<Cookie> {
    let mut cookies = Vec::new();

    for line in content.lines() {
        let line = match line.strip_prefix("#HttpOnly_") {
            Some(rest) => rest,
            None if line.starts_with('#') || line.trim().is_empty() => continue,
            None => line,
        };

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 7 {
            continue;
        }

        cookies.push(Cookie {
            domain: fields[0].to_string(),
            name: fields[5].to_string(),
            value: fields[6].to_string(),
        });
    }

    cookies
}

/// Find the SAPISID cookie used to sign API requests
pub fn find_sapisid(cookies: &[Cookie]) -> ApiResult<&str> {
    cookies
        .iter()
        .find(|c| c.name == "SAPISID" && c.is_google())
        .map(|c| c.value.as_str())
        .ok_or_else(|| ApiError::Auth("SAPISID cookie not found in cookie file".into()))
}

/// Build a Cookie header value from the Google cookies in the jar
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .filter(|c| c.is_google())
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# Netscape HTTP Cookie File
.google.com\tTRUE\t/\tTRUE\t1790000000\tSAPISID\tabc123/secret
#HttpOnly_.google.com\tTRUE\t/\tTRUE\t1790000000\tSSID\thttponly-value
.example.com\tTRUE\t/\tFALSE\t1790000000\tOTHER\tnope

malformed line without tabs
";

    #[test]
    fn parse_cookie_file_format() {
        let cookies = parse_cookies(SAMPLE);
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies[0].name, "SAPISID");
        assert_eq!(cookies[1].name, "SSID");
        assert_eq!(cookies[1].value, "httponly-value");
    }

    #[test]
    fn find_sapisid_in_jar() {
        let cookies = parse_cookies(SAMPLE);
        assert_eq!(find_sapisid(&cookies).unwrap(), "abc123/secret");
    }

    #[test]
    fn sapisid_must_be_a_google_cookie() {
        let cookies = parse_cookies(
            ".example.com\tTRUE\t/\tTRUE\t1790000000\tSAPISID\tnot-google\n",
        );
        assert!(find_sapisid(&cookies).is_err());
    }

    #[test]
    fn cookie_header_excludes_non_google() {
        let cookies = parse_cookies(SAMPLE);
        let header = cookie_header(&cookies);
        assert!(header.contains("SAPISID=abc123/secret"));
        assert!(header.contains("SSID=httponly-value"));
        assert!(!header.contains("OTHER"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let cookies = load_cookie_file(file.path()).unwrap();
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn load_missing_file() {
        assert!(matches!(
            load_cookie_file("/nonexistent/cookies.txt"),
            Err(ApiError::Io(_))
        ));
    }
}
