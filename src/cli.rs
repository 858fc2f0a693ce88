use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

pub fn app() -> Command {
    Command::new("apkdl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Downloads APKs through the Evozi APK Downloader")
        .override_usage("apkdl <PACKAGE | -a app_id | -l list [-f field]> [-i] [-o path] [-x proxy] [-t numeric:opaque]")
        .arg(
            Arg::new("package")
                .help("ID of the app to download (e.g. com.instagram.android)")
                .value_name("PACKAGE")
                .index(1)
                .conflicts_with_all(["pkg", "list"]),
        )
        .arg(
            Arg::new("pkg")
                .help("ID of the app to download, as an option")
                .short('a')
                .long("pkg")
                .value_name("APP_ID")
                .conflicts_with("list"),
        )
        .arg(
            Arg::new("list")
                .help("File listing app IDs, one per line")
                .short('l')
                .long("list")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("field")
                .help("Comma-separated field containing app IDs (used only if a list is specified)")
                .short('f')
                .long("field")
                .value_parser(value_parser!(usize))
                .default_value("1"),
        )
        .arg(
            Arg::new("saveinfo")
                .help("Save app information to info.txt next to the APK")
                .short('i')
                .long("saveinfo")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("path")
                .help("Path to store output files [default: .]")
                .short('o')
                .long("path")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("proxy")
                .help("HTTP/HTTPS proxy URL (e.g. http://proxy:port)")
                .short('x')
                .long("proxy"),
        )
        .arg(
            Arg::new("tokens")
                .help("Use this session token pair instead of scraping one per app")
                .short('t')
                .long("tokens")
                .value_name("NUMERIC:OPAQUE"),
        )
        .arg(
            Arg::new("verify_tls")
                .help("Verify TLS certificates (skipped by default)")
                .long("verify-tls")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("sleep_duration")
                .help("Sleep duration (in ms) before download requests")
                .short('s')
                .long("sleep-duration")
                .value_parser(value_parser!(u64))
                .default_value("0"),
        )
        .arg(
            Arg::new("config")
                .help("Config file to read defaults from")
                .short('c')
                .long("config")
                .value_name("INI")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .help("Print debug output")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue),
        )
}
