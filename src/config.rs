use std::fs;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use tracing::debug;

use crate::consts;
use crate::error::Error;
use crate::evozi::{Endpoints, TokenPair};
use crate::util;

/// Settings read from the `[apkdl]` section of the config file. Command line flags take
/// precedence over anything set here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub path: Option<PathBuf>,
    pub proxy: Option<String>,
    pub save_info: Option<bool>,
    pub verify_tls: Option<bool>,
    pub tokens: Option<TokenPair>,
    pub landing_url: Option<String>,
    pub exchange_url: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("could not read {}: {}", path.display(), err)))?;
        debug!(path = %path.display(), "loaded config file");
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut ini = Ini::new();
        ini.read(text.to_string()).map_err(Error::Config)?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, Error> {
        let section = consts::CONFIG_SECTION;
        let get = |key: &str| ini.get(section, key).filter(|value| !value.is_empty());
        let get_bool = |key: &str| ini.getboolcoerce(section, key).map_err(Error::Config);
        let tokens = match get("tokens") {
            Some(tokens) => Some(tokens.parse::<TokenPair>().map_err(|err| Error::Config(err.to_string()))?),
            None => None,
        };
        Ok(Config {
            path: get("path").map(PathBuf::from),
            proxy: get("proxy"),
            save_info: get_bool("saveinfo")?,
            verify_tls: get_bool("verify_tls")?,
            tokens,
            landing_url: get("landing_url"),
            exchange_url: get("exchange_url"),
        })
    }

    pub fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            landing_url_format: self.landing_url.clone().unwrap_or(defaults.landing_url_format),
            exchange_url: self.exchange_url.clone().unwrap_or(defaults.exchange_url),
        }
    }
}

/// An explicitly named file must exist; the default one is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, Error> {
    match explicit {
        Some(path) => Config::load(path),
        None => match util::default_config_file() {
            Some(path) if path.is_file() => Config::load(&path),
            _ => Ok(Config::default()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_apkdl_section() {
        let config = Config::parse(
            "[apkdl]\n\
             path = /srv/apks\n\
             proxy = http://127.0.0.1:3128\n\
             saveinfo = true\n\
             verify_tls = no\n\
             tokens = 1700000000:abcdef\n\
             exchange_url = http://localhost:8080/download\n\
             [other]\n\
             proxy = http://ignored:1\n",
        ).unwrap();

        assert_eq!(config.path, Some(PathBuf::from("/srv/apks")));
        assert_eq!(config.proxy.as_deref(), Some("http://127.0.0.1:3128"));
        assert_eq!(config.save_info, Some(true));
        assert_eq!(config.verify_tls, Some(false));
        assert_eq!(config.tokens, Some(TokenPair { numeric: "1700000000".to_string(), opaque: "abcdef".to_string() }));
        assert_eq!(config.landing_url, None);

        let endpoints = config.endpoints();
        assert_eq!(endpoints.landing_url_format, consts::EVOZI_LANDING_URL_FORMAT);
        assert_eq!(endpoints.exchange_url, "http://localhost:8080/download");
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
        assert_eq!(Config::default().endpoints(), Endpoints::default());
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(Config::parse("[apkdl]\nsaveinfo = maybe\n"), Err(Error::Config(_))));
        assert!(matches!(Config::parse("[apkdl]\ntokens = nodigits\n"), Err(Error::Config(_))));
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.ini");
        assert!(matches!(load_config(Some(&missing)), Err(Error::Config(_))));

        let present = dir.path().join("apkdl.ini");
        fs::write(&present, "[apkdl]\nsaveinfo = 1\n").unwrap();
        assert_eq!(load_config(Some(&present)).unwrap().save_info, Some(true));
    }
}
