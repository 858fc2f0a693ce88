use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::consts;
use crate::error::Error;

#[derive(Deserialize)]
struct ExchangeResponse {
    url: Option<Value>,
    packagename: Option<Value>,
    filesize: Option<Value>,
    sha1: Option<Value>,
    version: Option<Value>,
    fetched_at: Option<Value>,
    data: Option<Value>,
}

/// Download link and metadata handed back by the exchange endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadDescriptor {
    pub url: String,
    pub package_name: String,
    pub file_size: String,
    pub sha1: String,
    pub version: String,
    pub fetched_at: String,
}

fn field_or_unknown(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => consts::UNKNOWN_FIELD.to_string(),
    }
}

/// Upstream links are protocol-relative with JSON-escaped slashes, e.g. `//host\/app.apk`.
pub fn resolve_download_url(raw: &str) -> String {
    let url = raw.replace('\\', "");
    if url.starts_with("http://") || url.starts_with("https://") {
        url
    } else {
        format!("https:{}", url)
    }
}

impl DownloadDescriptor {
    pub fn from_json(body: &str) -> Result<Self, Error> {
        let response: ExchangeResponse = serde_json::from_str(body)?;
        let url = match response.url {
            Some(Value::String(url)) if !url.is_empty() => resolve_download_url(&url),
            _ => {
                let detail = match response.data {
                    Some(Value::String(msg)) if !msg.is_empty() => Some(msg),
                    _ => None,
                };
                return Err(Error::MissingField { field: "url", detail });
            },
        };
        Ok(DownloadDescriptor {
            url,
            package_name: field_or_unknown(response.packagename),
            file_size: field_or_unknown(response.filesize),
            sha1: field_or_unknown(response.sha1),
            version: field_or_unknown(response.version),
            fetched_at: field_or_unknown(response.fetched_at),
        })
    }

    pub fn info_entries(&self) -> [(&'static str, &str); 5] {
        [
            ("Package Name", self.package_name.as_str()),
            ("File Size", self.file_size.as_str()),
            ("SHA1", self.sha1.as_str()),
            ("Version", self.version.as_str()),
            ("Fetched At", self.fetched_at.as_str()),
        ]
    }

    pub fn write_info(&self, path: &Path) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        for (key, value) in self.info_entries() {
            writeln!(writer, "{}: {}", key, value)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Only a 40 hex digit value counts as a checksum worth comparing against.
    pub fn expected_sha1(&self) -> Option<String> {
        if self.sha1.len() == 40 && self.sha1.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(self.sha1.to_lowercase())
        } else {
            None
        }
    }

    /// Name used for the output directory and the APK file. Falls back to the requested
    /// package id when upstream gave no usable name.
    pub fn file_stem<'a>(&'a self, app_id: &'a str) -> &'a str {
        let name = self.package_name.as_str();
        let unusable = name.is_empty()
            || name == consts::UNKNOWN_FIELD
            || name == "."
            || name == ".."
            || name.contains(|c: char| c == '/' || c == '\\');
        if unusable {
            app_id
        } else {
            name
        }
    }
}
