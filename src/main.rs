//! # Usage
//!
//! See `USAGE`, which is regenerated from the command line definition on every build.
//!
//! # Examples
//!
//! The simplest example is to download a single APK into a directory named after the package,
//! below the current directory:
//!
//! ```shell
//! apkdl com.instagram.android
//! ```
//!
//! To pick the output directory and keep the metadata Evozi reports for the APK:
//!
//! ```shell
//! apkdl -a com.instagram.android -o apks -i
//! ```
//!
//! This writes `apks/com.instagram.android/com.instagram.android.apk` and
//! `apks/com.instagram.android/info.txt`.
//!
//! To download every app listed in a file, one app ID per line:
//!
//! ```shell
//! apkdl -l apps.txt -o apks
//! ```
//!
//! If the list is a CSV file with the app ID in another column, select it with `-f`.
//!
//! # Session tokens
//!
//! Evozi only hands out a download link in exchange for a pair of short-lived session tokens
//! embedded in the landing page of each app. By default a fresh pair is scraped for every app.
//! A known pair can be supplied with `-t NUMERIC:OPAQUE` instead, which skips the landing page.
//!
//! # Config file
//!
//! Defaults can be kept in `apkdl/apkdl.ini` inside the user's config directory, or in the file
//! given with `-c`:
//!
//! ```ini
//! [apkdl]
//! path = /srv/apks
//! proxy = http://127.0.0.1:3128
//! saveinfo = true
//! verify_tls = false
//! ```
//!
//! `landing_url` and `exchange_url` may be set as well, should Evozi move its endpoints.
//!
//! # Usage Note
//!
//! TLS certificates are not verified unless `--verify-tls` is given. Lists are processed one app
//! at a time; use `-s` to space out requests rather than placing unreasonable load on the service.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ArgMatches;
use simple_error::SimpleError;
use tracing::{debug, Level};

mod cli;
mod config;
mod consts;
mod download;
mod error;
mod evozi;
mod util;

use config::Config;
use error::Error;
use evozi::{Endpoints, FixedTokens, ScrapedTokens, Session, TokenPair, TokenSource};

fn fetch_list(list: &Path, field: usize) -> Result<Vec<String>, Error> {
    let apps = parse_list_text(&fs::read_to_string(list)?, field);
    if apps.is_empty() {
        return Err(Error::Other(Box::new(SimpleError::new(format!("No app IDs found in {}", list.display())))));
    }
    Ok(apps)
}

fn parse_list_text(text: &str, field: usize) -> Vec<String> {
    let field = field - 1;
    text.lines()
        .filter_map(|l| {
            let entry = l.trim();
            if entry.is_empty() {
                return None;
            }
            entry.split(',')
                .nth(field)
                .map(str::trim)
                .filter(|app_id| !app_id.is_empty())
                .map(String::from)
        })
        .collect()
}

#[derive(Debug, PartialEq)]
enum Target {
    Single(String),
    Batch(Vec<String>),
}

struct RunOptions {
    outpath: PathBuf,
    save_info: bool,
    proxy: Option<String>,
    verify_tls: bool,
    tokens: Option<TokenPair>,
    endpoints: Endpoints,
    sleep_duration: u64,
}

fn resolve_options(matches: &ArgMatches, config: Config) -> Result<RunOptions, Error> {
    let tokens = match matches.get_one::<String>("tokens") {
        Some(tokens) => Some(tokens.parse::<TokenPair>().map_err(|err| Error::Config(err.to_string()))?),
        None => config.tokens.clone(),
    };
    Ok(RunOptions {
        outpath: matches.get_one::<PathBuf>("path").cloned()
            .or_else(|| config.path.clone())
            .unwrap_or_else(|| PathBuf::from(".")),
        save_info: matches.get_flag("saveinfo") || config.save_info.unwrap_or(false),
        proxy: matches.get_one::<String>("proxy").cloned().or_else(|| config.proxy.clone()),
        verify_tls: matches.get_flag("verify_tls") || config.verify_tls.unwrap_or(false),
        tokens,
        endpoints: config.endpoints(),
        sleep_duration: matches.get_one::<u64>("sleep_duration").copied().unwrap_or(0),
    })
}

fn select_target(matches: &ArgMatches) -> Result<Target, String> {
    let app_id = matches.get_one::<String>("package")
        .or_else(|| matches.get_one::<String>("pkg"))
        .map(|app_id| app_id.trim().to_string())
        .filter(|app_id| !app_id.is_empty());
    match (app_id, matches.get_one::<PathBuf>("list")) {
        (Some(app_id), _) => Ok(Target::Single(app_id)),
        (None, Some(list)) => {
            let field = matches.get_one::<usize>("field").copied().unwrap_or(1);
            if field < 1 {
                return Err("App ID field must be 1 or greater".to_string());
            }
            fetch_list(list, field)
                .map(Target::Batch)
                .map_err(|err| format!("Could not read app list {}: {}", list.display(), err))
        },
        (None, None) => Err("Either a package name or a list of packages must be specified".to_string()),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run<S: TokenSource>(session: &Session, source: &S, target: Target, options: &RunOptions) -> i32 {
    match target {
        Target::Single(app_id) => {
            println!("Downloading {}...", app_id);
            match evozi::download_app(session, source, &app_id, &options.outpath, options.save_info).await {
                Ok(apk_path) => {
                    println!("APK downloaded successfully to: {}", apk_path.display());
                    0
                },
                Err(err) => {
                    println!("Error: {}", err);
                    1
                },
            }
        },
        Target::Batch(apps) => {
            let total = apps.len();
            let failures = evozi::download_apps(
                apps,
                options.sleep_duration,
                session,
                source,
                &options.outpath,
                options.save_info,
            ).await;
            if failures > 0 {
                println!("{} of {} apps could not be downloaded.", failures, total);
                1
            } else {
                0
            }
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut app = cli::app();
    let matches = app.clone().get_matches();
    init_logging(matches.get_flag("verbose"));

    let config = match config::load_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path)) {
        Ok(config) => config,
        Err(err) => {
            println!("{}", err);
            std::process::exit(1);
        }
    };
    debug!(?config, "resolved config file");

    let options = match resolve_options(&matches, config) {
        Ok(options) => options,
        Err(err) => {
            println!("{}\n\n{}", app.render_usage(), err);
            std::process::exit(1);
        }
    };

    let target = match select_target(&matches) {
        Ok(target) => target,
        Err(msg) => {
            println!("{}\n\n{}", app.render_usage(), msg);
            std::process::exit(1);
        }
    };

    let session = match Session::new(options.endpoints.clone(), options.proxy.as_deref(), !options.verify_tls) {
        Ok(session) => session,
        Err(err) => {
            println!("{}", err);
            std::process::exit(1);
        }
    };

    let code = match options.tokens.clone() {
        Some(tokens) => run(&session, &FixedTokens(tokens), target, &options).await,
        None => run(&session, &ScrapedTokens, target, &options).await,
    };
    std::process::exit(code);
}
