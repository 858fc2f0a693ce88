pub const EVOZI_LANDING_URL_FORMAT: &'static str = "https://apps.evozi.com/apk-downloader/?id=";
pub const EVOZI_EXCHANGE_URL: &'static str = "https://api-apk.evozi.com/download";
pub const EVOZI_NUMERIC_TOKEN_KEY: &'static str = "caabcbcdfabcaffac";
pub const EVOZI_OPAQUE_TOKEN_KEY: &'static str = "badcbcacacaadc";
pub const EVOZI_PACKAGE_KEY: &'static str = "bbdeafcaaeeddfd";
pub const EVOZI_NUMERIC_TOKEN_REGEX: &'static str = r"caabcbcdfabcaffac\s*:\s*(\d+)";
pub const EVOZI_OPAQUE_TOKEN_NAME_REGEX: &'static str = r"badcbcacacaadc\s*:\s*(\w+)";
pub const CONFIG_SECTION: &'static str = "apkdl";
pub const CONFIG_FILE_NAME: &'static str = "apkdl.ini";
pub const INFO_FILE_NAME: &'static str = "info.txt";
pub const UNKNOWN_FIELD: &'static str = "unknown";
pub const PROGRESS_STYLE: &'static str = "{msg:30!} [{elapsed_precise}] {wide_bar} {bytes:>10}/{total_bytes:<10}";
