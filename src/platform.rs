use std::path::PathBuf;
use std::process::Command;

use directories::ProjectDirs;

const APP_NAME: &str = "retinai";
const NO_ARGS: &[&str] = &[];
// cmd would split URLs at `&`, rundll32 passes the target through untouched
const PROTOCOL_HANDLER_ARGS: &[&str] = &["url.dll,FileProtocolHandler"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Ios,
    Android,
    Linux,
    Windows,
    Unknown,
}

impl Platform {
    /// Apple platforms resolve `maps.apple.com` links natively.
    pub fn is_apple(&self) -> bool {
        matches!(self, Platform::MacOS | Platform::Ios)
    }
}

pub fn detect() -> Platform {
    match std::env::consts::OS {
        "macos" => Platform::MacOS,
        "ios" => Platform::Ios,
        "android" => Platform::Android,
        "linux" => Platform::Linux,
        "windows" => Platform::Windows,
        _ => Platform::Unknown,
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// ~/.local/share/retinai or platform equivalent. Falls back to ./.retinai
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".retinai"))
}

/// Export documents land here, the OS may clear it.
pub fn cache_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".retinai").join("cache"))
}

pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Program that hands a path or URL to the desktop's default handler.
pub fn opener_command(platform: Platform) -> Option<(&'static str, &'static [&'static str])> {
    match platform {
        Platform::MacOS => Some(("open", NO_ARGS)),
        Platform::Windows => Some(("rundll32", PROTOCOL_HANDLER_ARGS)),
        Platform::Linux | Platform::Unknown => Some(("xdg-open", NO_ARGS)),
        // no shell-level opener on mobile targets
        Platform::Ios | Platform::Android => None,
    }
}

/// Full argument vector for opening `target`, program first.
pub fn opener_argv(platform: Platform, target: &str) -> Option<Vec<String>> {
    let (program, args) = opener_command(platform)?;

    let mut argv = Vec::with_capacity(args.len() + 2);
    argv.push(program.to_string());
    argv.extend(args.iter().map(|a| a.to_string()));
    argv.push(target.to_string());
    Some(argv)
}

/// Whether the desktop opener on `platform` resolves URLs with this scheme.
pub fn handles_scheme(platform: Platform, url: &str) -> bool {
    let scheme = url.split_once(':').map(|(s, _)| s).unwrap_or("");
    match scheme {
        "http" | "https" => opener_command(platform).is_some(),
        "geo" => platform == Platform::Android,
        _ => false,
    }
}

pub fn opener_available(platform: Platform) -> bool {
    match platform {
        Platform::MacOS | Platform::Windows => true,
        Platform::Linux | Platform::Unknown => Command::new("xdg-open")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false),
        Platform::Ios | Platform::Android => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEB: &str = "https://www.google.com/maps/search/?api=1&query=ophthalmologist%20near%20me";

    #[test]
    fn windows_opener_keeps_url_as_one_argument() {
        let argv = opener_argv(Platform::Windows, WEB).unwrap();

        assert_eq!(argv, ["rundll32", "url.dll,FileProtocolHandler", WEB]);
        assert!(!argv.iter().any(|a| a == "cmd"));
    }

    #[test]
    fn desktop_openers_take_target_last() {
        assert_eq!(opener_argv(Platform::MacOS, WEB).unwrap(), ["open", WEB]);
        assert_eq!(opener_argv(Platform::Linux, WEB).unwrap(), ["xdg-open", WEB]);
        assert!(opener_argv(Platform::Android, WEB).is_none());
        assert!(opener_argv(Platform::Ios, WEB).is_none());
    }

    #[test]
    fn scheme_support_by_platform() {
        let cases = [
            (Platform::Linux, WEB, true),
            (Platform::Linux, "geo:0,0?q=x", false),
            (Platform::MacOS, "http://maps.apple.com/?q=ophthalmologist", true),
            (Platform::MacOS, "geo:0,0?q=x", false),
            (Platform::Windows, WEB, true),
            (Platform::Windows, "geo:0,0?q=x", false),
            (Platform::Android, "geo:0,0?q=x", true),
            (Platform::Android, WEB, false),
            (Platform::Ios, WEB, false),
            (Platform::Unknown, "maps:q=x", false),
            (Platform::Linux, "no-scheme", false),
        ];

        for (platform, url, expected) in cases {
            assert_eq!(handles_scheme(platform, url), expected, "{platform:?} {url}");
        }
    }

    #[test]
    fn mobile_targets_have_no_opener() {
        assert!(!opener_available(Platform::Android));
        assert!(!opener_available(Platform::Ios));
        assert!(opener_available(Platform::MacOS));
        assert!(opener_available(Platform::Windows));
    }
}
