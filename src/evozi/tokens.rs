use std::str::FromStr;

use regex::Regex;
use simple_error::SimpleError;
use tracing::debug;

use crate::consts;
use crate::error::Error;
use super::Session;

/// The two values the landing page hands out to authorize a single exchange request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
    pub numeric: String,
    pub opaque: String,
}

impl FromStr for TokenPair {
    type Err = SimpleError;

    /// Parses the `NUMERIC:OPAQUE` form accepted by `--tokens` and the config file.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once(':') {
            Some((numeric, opaque)) if !numeric.is_empty()
                && numeric.chars().all(|c| c.is_ascii_digit())
                && !opaque.is_empty() => {
                Ok(TokenPair {
                    numeric: numeric.to_string(),
                    opaque: opaque.to_string(),
                })
            },
            _ => Err(SimpleError::new(format!("Invalid token pair '{}', expected NUMERIC:OPAQUE", s))),
        }
    }
}

/// Something able to produce a valid token pair for a package.
pub trait TokenSource {
    async fn acquire(&self, session: &Session, app_id: &str) -> Result<TokenPair, Error>;
}

/// Scrapes a fresh token pair from the landing page of each package.
pub struct ScrapedTokens;

impl TokenSource for ScrapedTokens {
    async fn acquire(&self, session: &Session, app_id: &str) -> Result<TokenPair, Error> {
        let html = session.fetch_landing_page(app_id).await?;
        let tokens = extract_tokens(&html)?;
        debug!(app_id, numeric = %tokens.numeric, "extracted session tokens");
        Ok(tokens)
    }
}

/// Hands out the same token pair for every package.
pub struct FixedTokens(pub TokenPair);

impl TokenSource for FixedTokens {
    async fn acquire(&self, _session: &Session, app_id: &str) -> Result<TokenPair, Error> {
        debug!(app_id, "using fixed session tokens");
        Ok(self.0.clone())
    }
}

/// The page names the variable holding the opaque token, and that name changes per page load, so
/// the value is found in two hops: marker -> variable name -> `var <name> = '<value>'`.
pub fn extract_tokens(html: &str) -> Result<TokenPair, Error> {
    let numeric_re = Regex::new(consts::EVOZI_NUMERIC_TOKEN_REGEX)?;
    let name_re = Regex::new(consts::EVOZI_OPAQUE_TOKEN_NAME_REGEX)?;
    let (numeric, name) = match (numeric_re.captures(html), name_re.captures(html)) {
        (Some(numeric_caps), Some(name_caps)) => (numeric_caps[1].to_string(), name_caps[1].to_string()),
        _ => return Err(Error::Extraction("Unable to extract session tokens".to_string())),
    };

    let value_re = Regex::new(&format!(r"var\s+{}\s*=\s*'(.*?)'", regex::escape(&name)))?;
    match value_re.captures(html) {
        Some(caps) => Ok(TokenPair {
            numeric,
            opaque: caps[1].to_string(),
        }),
        None => Err(Error::Extraction(format!("Unable to extract value for {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evozi::Endpoints;
    use httpmock::prelude::*;

    const LANDING_PAGE: &str = r##"
        <script type="text/javascript">
            var fa1bd3e0 = 'a81f7e0bc2d14f';
            var cb4ae = 'decoy';
            $("#apk_info").on("click", function() {
                var packageguide = { caabcbcdfabcaffac   :  1736459261, bbdeafcaaeeddfd: packagename,
                    badcbcacacaadc: fa1bd3e0, fetch: false };
            });
        </script>"##;

    #[test]
    fn extracts_both_tokens() {
        let tokens = extract_tokens(LANDING_PAGE).unwrap();
        assert_eq!(tokens, TokenPair {
            numeric: "1736459261".to_string(),
            opaque: "a81f7e0bc2d14f".to_string(),
        });
    }

    #[test]
    fn tolerates_whitespace_and_newlines_around_delimiters() {
        let html = "var\n  tok_9\t=\n 'xyz' ;\ncaabcbcdfabcaffac:42,badcbcacacaadc\n:\ntok_9";
        let tokens = extract_tokens(html).unwrap();
        assert_eq!(tokens.numeric, "42");
        assert_eq!(tokens.opaque, "xyz");
    }

    #[test]
    fn variable_lookup_matches_the_whole_name() {
        let html = "var tokenExtra = 'wrong'; var token = 'right'; caabcbcdfabcaffac: 7, badcbcacacaadc: token";
        assert_eq!(extract_tokens(html).unwrap().opaque, "right");
    }

    #[test]
    fn missing_numeric_marker_is_an_error() {
        let html = "var abc = 'value'; badcbcacacaadc: abc";
        let err = extract_tokens(html).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
        assert_eq!(err.to_string(), "Unable to extract session tokens");
    }

    #[test]
    fn missing_name_marker_is_an_error() {
        let html = "var abc = 'value'; caabcbcdfabcaffac: 99";
        assert!(matches!(extract_tokens(html), Err(Error::Extraction(_))));
    }

    #[test]
    fn missing_variable_declaration_names_the_variable() {
        let html = "caabcbcdfabcaffac: 99, badcbcacacaadc: ghostvar";
        let err = extract_tokens(html).unwrap_err();
        assert_eq!(err.to_string(), "Unable to extract value for ghostvar");
    }

    #[test]
    fn parses_token_pair_argument() {
        let tokens: TokenPair = "1234:ab:cd".parse().unwrap();
        assert_eq!(tokens.numeric, "1234");
        assert_eq!(tokens.opaque, "ab:cd");
        assert!("abc:def".parse::<TokenPair>().is_err());
        assert!("1234:".parse::<TokenPair>().is_err());
        assert!("1234".parse::<TokenPair>().is_err());
    }

    #[tokio::test]
    async fn scraped_tokens_come_from_the_landing_page() {
        let server = MockServer::start_async().await;
        let landing = server.mock_async(|when, then| {
            when.method(GET).path("/apk-downloader/").query_param("id", "com.example.app");
            then.status(200).body(LANDING_PAGE);
        }).await;

        let endpoints = Endpoints {
            landing_url_format: server.url("/apk-downloader/?id="),
            exchange_url: server.url("/download"),
        };
        let session = Session::new(endpoints, None, true).unwrap();
        let tokens = ScrapedTokens.acquire(&session, "com.example.app").await.unwrap();

        landing.assert_async().await;
        assert_eq!(tokens.numeric, "1736459261");
        assert_eq!(tokens.opaque, "a81f7e0bc2d14f");
    }

    #[tokio::test]
    async fn scraping_fails_on_error_status() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/apk-downloader/");
            then.status(503);
        }).await;

        let endpoints = Endpoints {
            landing_url_format: server.url("/apk-downloader/?id="),
            exchange_url: server.url("/download"),
        };
        let session = Session::new(endpoints, None, true).unwrap();
        let err = ScrapedTokens.acquire(&session, "com.example.app").await.unwrap_err();
        assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn fixed_tokens_never_touch_the_network() {
        let endpoints = Endpoints {
            landing_url_format: "http://127.0.0.1:9/unreachable?id=".to_string(),
            exchange_url: "http://127.0.0.1:9/download".to_string(),
        };
        let session = Session::new(endpoints, None, false).unwrap();
        let pair = TokenPair { numeric: "1".to_string(), opaque: "two".to_string() };
        let tokens = FixedTokens(pair.clone()).acquire(&session, "com.example.app").await.unwrap();
        assert_eq!(tokens, pair);
    }
}
