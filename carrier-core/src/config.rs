//! Typed configuration (spec §4.8, §6), resolved once at component start
//! from string key/value pairs handed in by the out-of-scope option-loading
//! layer. Field-by-field fallback on invalid values, in the shape of
//! `otty`'s `SettingsData::from_json`.

use std::path::PathBuf;

use carrier_transfer::{AsciiTransferConfig, CrlfPolicy};
use log::warn;
use serde::Serialize;

/// Resolved configuration for one session. Read once at start; the source
/// never re-reads options mid-operation (§6).
#[derive(Debug, Clone, Serialize)]
pub struct ConfigOptions {
    pub download_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub scripts_stderr_fifo: PathBuf,
    pub utf8_locale: String,
    pub ascii_transfer: AsciiTransferConfig,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("."),
            upload_dir: PathBuf::from("."),
            scripts_dir: PathBuf::from("./scripts"),
            scripts_stderr_fifo: PathBuf::from("./scripts/.stderr.fifo"),
            utf8_locale: String::from("en_US.UTF-8"),
            ascii_transfer: AsciiTransferConfig::default(),
        }
    }
}

impl ConfigOptions {
    /// Resolve from `(key, value)` pairs. Unrecognized keys are logged and
    /// skipped; recognized keys with an invalid value fall back to the
    /// field's default rather than failing the whole load.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, value) in pairs {
            config.apply(key, value);
        }
        config
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "download_dir" => self.download_dir = PathBuf::from(value),
            "upload_dir" => self.upload_dir = PathBuf::from(value),
            "scripts_dir" => self.scripts_dir = PathBuf::from(value),
            "scripts_stderr_fifo" => self.scripts_stderr_fifo = PathBuf::from(value),
            "utf8_locale" => {
                if value.is_empty() {
                    warn!("empty utf8_locale, keeping default {:?}", self.utf8_locale);
                } else {
                    self.utf8_locale = value.to_string();
                }
            },
            "upload_use_translate_table" => {
                self.ascii_transfer.upload_use_translate_table = parse_bool(key, value);
            },
            "upload_cr_policy" => {
                self.ascii_transfer.upload_cr_policy = parse_crlf_policy(key, value);
            },
            "upload_lf_policy" => {
                self.ascii_transfer.upload_lf_policy = parse_crlf_policy(key, value);
            },
            "download_use_translate_table" => {
                self.ascii_transfer.download_use_translate_table = parse_bool(key, value);
            },
            "download_cr_policy" => {
                self.ascii_transfer.download_cr_policy = parse_crlf_policy(key, value);
            },
            "download_lf_policy" => {
                self.ascii_transfer.download_lf_policy = parse_crlf_policy(key, value);
            },
            _ => warn!("unrecognized config option {key:?}, ignoring"),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> bool {
    match value {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => {
            warn!("invalid boolean for {key}: {value:?}, defaulting to false");
            false
        },
    }
}

fn parse_crlf_policy(key: &str, value: &str) -> CrlfPolicy {
    match value {
        "none" | "strip" | "add" => CrlfPolicy::from_str_or_default(value),
        _ => {
            warn!("invalid CRLF policy for {key}: {value:?}, defaulting to none");
            CrlfPolicy::None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_keys_are_ignored() {
        let config = ConfigOptions::from_pairs([("bogus", "whatever")]);
        assert_eq!(config.download_dir, PathBuf::from("."));
    }

    #[test]
    fn invalid_bool_falls_back_to_false() {
        let config = ConfigOptions::from_pairs([("upload_use_translate_table", "maybe")]);
        assert!(!config.ascii_transfer.upload_use_translate_table);
    }

    #[test]
    fn invalid_crlf_policy_falls_back_to_none() {
        let config = ConfigOptions::from_pairs([("download_cr_policy", "explode")]);
        assert_eq!(config.ascii_transfer.download_cr_policy, CrlfPolicy::None);
    }

    #[test]
    fn recognized_pairs_resolve() {
        let config = ConfigOptions::from_pairs([
            ("download_dir", "/tmp/dl"),
            ("upload_cr_policy", "add"),
            ("utf8_locale", "C.UTF-8"),
        ]);
        assert_eq!(config.download_dir, PathBuf::from("/tmp/dl"));
        assert_eq!(config.ascii_transfer.upload_cr_policy, CrlfPolicy::Add);
        assert_eq!(config.utf8_locale, "C.UTF-8");
    }
}
