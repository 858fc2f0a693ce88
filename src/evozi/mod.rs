use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::time::{sleep, Duration as TokioDuration};
use tracing::{debug, warn};

use crate::consts;
use crate::download::{download_to_file, ensure_success};
use crate::error::Error;

mod descriptor;
mod tokens;

pub use descriptor::DownloadDescriptor;
pub use tokens::{FixedTokens, ScrapedTokens, TokenPair, TokenSource};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// The package id is appended to this.
    pub landing_url_format: String,
    pub exchange_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            landing_url_format: consts::EVOZI_LANDING_URL_FORMAT.to_string(),
            exchange_url: consts::EVOZI_EXCHANGE_URL.to_string(),
        }
    }
}

/// HTTP client and endpoints shared by every request of a run.
pub struct Session {
    http_client: reqwest::Client,
    endpoints: Endpoints,
}

impl Session {
    pub fn new(endpoints: Endpoints, proxy: Option<&str>, accept_invalid_certs: bool) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs);
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|err| Error::Config(format!("invalid proxy URL '{}': {}", proxy, err)))?;
            builder = builder.proxy(proxy);
        }
        Ok(Session {
            http_client: builder.build()?,
            endpoints,
        })
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub async fn fetch_landing_page(&self, app_id: &str) -> Result<String, Error> {
        let landing_url = format!("{}{}", self.endpoints.landing_url_format, app_id);
        debug!(%landing_url, "fetching landing page");
        let response = ensure_success(self.http_client.get(&landing_url).send().await?)?;
        Ok(response.text().await?)
    }

    pub async fn exchange(&self, tokens: &TokenPair, app_id: &str) -> Result<DownloadDescriptor, Error> {
        let form = [
            (consts::EVOZI_NUMERIC_TOKEN_KEY, tokens.numeric.as_str()),
            (consts::EVOZI_PACKAGE_KEY, app_id),
            (consts::EVOZI_OPAQUE_TOKEN_KEY, tokens.opaque.as_str()),
            ("fetch", "false"),
        ];
        debug!(exchange_url = %self.endpoints.exchange_url, app_id, "requesting download link");
        let response = self.http_client
            .post(&self.endpoints.exchange_url)
            .form(&form)
            .send().await?;
        let body = ensure_success(response)?.text().await?;
        let descriptor = DownloadDescriptor::from_json(&body)?;
        debug!(url = %descriptor.url, version = %descriptor.version, "received download link");
        Ok(descriptor)
    }
}

/// Runs the whole pipeline for one package and returns the path of the APK written.
pub async fn download_app<S: TokenSource>(
    session: &Session,
    source: &S,
    app_id: &str,
    outpath: &Path,
    save_info: bool,
) -> Result<PathBuf, Error> {
    let tokens = source.acquire(session, app_id).await?;
    let descriptor = session.exchange(&tokens, app_id).await?;

    let stem = descriptor.file_stem(app_id);
    if stem != descriptor.package_name {
        warn!(app_id, package_name = %descriptor.package_name, "unusable package name in response, using the requested id");
    }
    let package_dir = outpath.join(stem);
    let created_dir = !package_dir.is_dir();
    fs::create_dir_all(&package_dir).await?;

    let apk_path = package_dir.join(format!("{}.apk", stem));
    let sha1sum = match download_to_file(session.http_client(), &descriptor.url, &apk_path).await {
        Ok(sha1sum) => sha1sum,
        Err(err) => {
            if created_dir {
                let _ = fs::remove_dir(&package_dir).await;
            }
            return Err(err);
        }
    };
    match descriptor.expected_sha1() {
        Some(expected) if expected != sha1sum => {
            println!("{} downloaded, but the sha1sum does not match the one reported by Evozi. Proceed with caution.", app_id);
        },
        Some(_) => debug!(app_id, %sha1sum, "sha1sum verified"),
        None => debug!(app_id, %sha1sum, "no sha1sum to verify against"),
    }

    if save_info {
        let info_path = package_dir.join(consts::INFO_FILE_NAME);
        descriptor.write_info(&info_path)?;
        println!("App information saved to: {}", info_path.display());
    }
    Ok(apk_path)
}

/// Downloads each app in turn. A failing app is reported and skipped; returns how many failed.
pub async fn download_apps<S: TokenSource>(
    apps: Vec<String>,
    sleep_duration: u64,
    session: &Session,
    source: &S,
    outpath: &Path,
    save_info: bool,
) -> usize {
    let mut failures = 0;
    for app_id in apps {
        println!("Downloading {}...", app_id);
        if sleep_duration > 0 {
            sleep(TokioDuration::from_millis(sleep_duration)).await;
        }
        match download_app(session, source, &app_id, outpath, save_info).await {
            Ok(apk_path) => println!("{} downloaded successfully to {}!", app_id, apk_path.display()),
            Err(err) => {
                failures += 1;
                println!("An error has occurred attempting to download {}: {}. Skipping...", app_id, err);
            }
        }
    }
    failures
}
