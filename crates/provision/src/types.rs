//! Core types for declarative package provisioning

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Package name to install flag
pub type PackagePolicy = BTreeMap<String, bool>;

/// Where to fetch a direct-download installer from
///
/// Packages without a source are handed to the platform package manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Remote location of the installer
    #[serde(default)]
    pub url: Option<String>,
    /// Expected sha256 of the downloaded file (hex)
    #[serde(default)]
    pub checksum: Option<String>,
    /// Arguments passed to the installer when it runs
    #[serde(default)]
    pub installer_flags: String,
    /// Name of the file in the download cache
    #[serde(default)]
    pub file_name: Option<String>,
}

impl SourceDescriptor {
    /// Source with just a url
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.installer_flags = flags.into();
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// A checksum is only meaningful next to a url
    pub fn is_well_formed(&self) -> bool {
        self.checksum.is_none() || self.url.is_some()
    }

    /// Whether an explicit `file_name` stays inside the download cache
    pub fn has_safe_file_name(&self) -> bool {
        self.file_name.as_deref().is_none_or(is_plain_file_name)
    }

    /// Cache file name, falling back to the last url path segment
    ///
    /// Urls with a query or fragment (redirectors such as `fwlink/?LinkID=`)
    /// and segments without an extension say nothing about the payload, so
    /// those fall back to the package name.
    pub fn cache_file_name(&self, package: &str) -> String {
        if let Some(name) = &self.file_name {
            return name.clone();
        }

        self.url
            .as_deref()
            .filter(|u| !u.contains(['?', '#']))
            .map(|u| u.split_once("://").map_or(u, |(_, rest)| rest))
            .and_then(|u| u.split_once('/'))
            .and_then(|(_, path)| path.trim_end_matches('/').rsplit('/').next())
            .filter(|segment| segment.contains('.') && is_plain_file_name(segment))
            .map_or_else(|| package.to_string(), str::to_string)
    }
}

/// A bare file name: no separators, no drive prefix, not `.` or `..`
pub fn is_plain_file_name(name: &str) -> bool {
    !name.trim().is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', ':'])
}

/// Proxy settings handed to command-line tools
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Value for `http_proxy` / `https_proxy`
    #[serde(default, alias = "http")]
    pub http_proxy: Option<String>,
    /// Comma-separated hosts that bypass the proxy
    #[serde(default)]
    pub no_proxy: Option<String>,
}

impl ProxyConfig {
    /// Build from an environment lookup
    ///
    /// Lower-case names win over upper-case ones, as curl does. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |lower: &str, upper: &str| {
            lookup(lower)
                .or_else(|| lookup(upper))
                .filter(|v| !v.trim().is_empty())
        };

        Self {
            http_proxy: read("http_proxy", "HTTP_PROXY"),
            no_proxy: read("no_proxy", "NO_PROXY"),
        }
    }

    /// Snapshot of the current process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Drop blank values so they cannot shadow a lower layer
    pub fn normalized(self) -> Self {
        let keep = |v: Option<String>| v.filter(|v| !v.trim().is_empty());
        Self {
            http_proxy: keep(self.http_proxy),
            no_proxy: keep(self.no_proxy),
        }
    }

    /// Layer `self` over `fallback`, field by field
    pub fn or(self, fallback: Self) -> Self {
        Self {
            http_proxy: self.http_proxy.or(fallback.http_proxy),
            no_proxy: self.no_proxy.or(fallback.no_proxy),
        }
    }

    /// Whether any proxy setting is present
    pub fn is_set(&self) -> bool {
        self.http_proxy.is_some() || self.no_proxy.is_some()
    }

    /// Environment variables a collaborator should export
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = Vec::new();
        if let Some(proxy) = &self.http_proxy {
            vars.push(("http_proxy", proxy.clone()));
            vars.push(("https_proxy", proxy.clone()));
        }
        if let Some(no_proxy) = &self.no_proxy {
            vars.push(("no_proxy", no_proxy.clone()));
        }
        vars
    }
}

/// A single unit of work for an installer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstallAction {
    /// Install through the platform package manager
    PackageManagerInstall { name: String },
    /// Download an installer and run it
    DownloadAndInstall {
        name: String,
        url: String,
        checksum: Option<String>,
        installer_flags: String,
        file_name: String,
    },
}

impl InstallAction {
    /// Package this action provisions
    pub fn name(&self) -> &str {
        match self {
            Self::PackageManagerInstall { name } | Self::DownloadAndInstall { name, .. } => name,
        }
    }

    /// Short label for the action kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PackageManagerInstall { .. } => "package",
            Self::DownloadAndInstall { .. } => "download",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        match self {
            Self::PackageManagerInstall { name } => format!("Install {name} via package manager"),
            Self::DownloadAndInstall { name, url, .. } => format!("Download {name} from {url}"),
        }
    }
}

/// Everything a collaborator needs to provision one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionPlan {
    /// Platform family the plan was resolved for
    pub platform: String,
    /// Ordered install actions
    pub actions: Vec<InstallAction>,
    /// Proxy settings to export while installing
    pub proxy: ProxyConfig,
    /// Whether PowerShell settings should be managed
    pub configure_powershell: bool,
}

/// Result of performing one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// The package was installed
    Installed,
    /// Nothing to do, the package is already there
    AlreadySatisfied,
    /// The installer reported an error
    Failed { error: String },
    /// The action was not attempted
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Installed)
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub installed: usize,
    pub satisfied: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Names of the actions that failed, with the reported error
    pub failures: Vec<(String, String)>,
}

impl ExecuteSummary {
    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of actions processed
    pub fn total(&self) -> usize {
        self.installed + self.satisfied + self.skipped + self.failed
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, name: &str, result: &ApplyResult) {
        match result {
            ApplyResult::Installed => self.installed += 1,
            ApplyResult::AlreadySatisfied => self.satisfied += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
            ApplyResult::Failed { error } => {
                self.failed += 1;
                self.failures.push((name.to_string(), error.clone()));
            }
        }
    }
}

/// Options for execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Don't make changes, just report what would happen
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_cache_file_name_prefers_explicit_name() {
        let source = SourceDescriptor::url("https://example.com/setup.exe")
            .with_file_name("VSCodeSetup.exe");
        assert_eq!(source.cache_file_name("vscode"), "VSCodeSetup.exe");
    }

    #[test]
    fn test_cache_file_name_from_url() {
        let source = SourceDescriptor::url(
            "http://download.virtualbox.org/virtualbox/5.0.14/VirtualBox-5.0.14-105127-OSX.dmg",
        );
        assert_eq!(
            source.cache_file_name("virtualbox"),
            "VirtualBox-5.0.14-105127-OSX.dmg"
        );
    }

    #[test]
    fn test_redirector_urls_cache_under_package_name() {
        let vscode = SourceDescriptor::url("https://go.microsoft.com/fwlink/?LinkID=623230");
        let other = SourceDescriptor::url("https://go.microsoft.com/fwlink/?LinkID=999999");

        assert_eq!(vscode.cache_file_name("vscode"), "vscode");
        assert_eq!(other.cache_file_name("other"), "other");
    }

    #[test]
    fn test_cache_file_name_falls_back_to_package() {
        let host_only = SourceDescriptor::url("https://atom.io/");
        assert_eq!(host_only.cache_file_name("atom"), "atom");

        let no_extension = SourceDescriptor::url("https://example.com/download/latest");
        assert_eq!(no_extension.cache_file_name("tool"), "tool");

        let bare = SourceDescriptor::default();
        assert_eq!(bare.cache_file_name("atom"), "atom");
    }

    #[test]
    fn test_file_name_must_stay_in_cache() {
        assert!(SourceDescriptor::default().has_safe_file_name());
        assert!(
            SourceDescriptor::url("https://x/a.exe")
                .with_file_name("VSCodeSetup.exe")
                .has_safe_file_name()
        );

        for bad in ["../evil.exe", "/tmp/evil.exe", "..", "dir\\evil.exe", "C:evil.exe", ""] {
            let source = SourceDescriptor::url("https://x/a.exe").with_file_name(bad);
            assert!(!source.has_safe_file_name(), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_well_formed_source() {
        assert!(SourceDescriptor::default().is_well_formed());
        assert!(SourceDescriptor::url("https://x").with_checksum("ab").is_well_formed());

        let checksum_only = SourceDescriptor {
            checksum: Some("ab".into()),
            ..Default::default()
        };
        assert!(!checksum_only.is_well_formed());
    }

    #[test]
    fn test_proxy_from_lookup_prefers_lowercase() {
        let env: HashMap<&str, &str> = [
            ("http_proxy", "http://lower:1"),
            ("HTTP_PROXY", "http://upper:2"),
            ("NO_PROXY", "localhost"),
        ]
        .into_iter()
        .collect();

        let proxy = ProxyConfig::from_lookup(|k| env.get(k).map(|v| (*v).to_string()));
        assert_eq!(proxy.http_proxy.as_deref(), Some("http://lower:1"));
        assert_eq!(proxy.no_proxy.as_deref(), Some("localhost"));
    }

    #[test]
    fn test_proxy_from_lookup_ignores_empty() {
        let proxy = ProxyConfig::from_lookup(|k| (k == "http_proxy").then(|| "  ".to_string()));
        assert!(!proxy.is_set());
    }

    #[test]
    fn test_blank_proxy_values_do_not_shadow_fallback() {
        let configured = ProxyConfig {
            http_proxy: Some(String::new()),
            no_proxy: Some("  ".into()),
        };
        let env = ProxyConfig {
            http_proxy: Some("http://env:3128".into()),
            no_proxy: None,
        };

        let merged = configured.normalized().or(env);
        assert_eq!(merged.http_proxy.as_deref(), Some("http://env:3128"));
        assert_eq!(merged.no_proxy, None);
    }

    #[test]
    fn test_proxy_layering() {
        let configured = ProxyConfig {
            http_proxy: Some("http://corp:8080".into()),
            no_proxy: None,
        };
        let env = ProxyConfig {
            http_proxy: Some("http://env:3128".into()),
            no_proxy: Some("example.com".into()),
        };

        let merged = configured.or(env);
        assert_eq!(merged.http_proxy.as_deref(), Some("http://corp:8080"));
        assert_eq!(merged.no_proxy.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_proxy_env_vars() {
        let proxy = ProxyConfig {
            http_proxy: Some("http://corp:8080".into()),
            no_proxy: Some("localhost".into()),
        };
        let names: Vec<_> = proxy.env_vars().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["http_proxy", "https_proxy", "no_proxy"]);
        assert!(ProxyConfig::default().env_vars().is_empty());
    }

    #[test]
    fn test_action_name_and_kind() {
        let action = InstallAction::PackageManagerInstall { name: "git".into() };
        assert_eq!(action.name(), "git");
        assert_eq!(action.kind(), "package");
    }

    #[test]
    fn test_action_serializes_with_kind_tag() {
        let action = InstallAction::PackageManagerInstall { name: "git".into() };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["kind"], "package_manager_install");
        assert_eq!(json["name"], "git");
    }

    #[test]
    fn test_summary_records_failures() {
        let mut summary = ExecuteSummary::default();
        summary.add_result("git", &ApplyResult::Installed);
        summary.add_result(
            "vscode",
            &ApplyResult::Failed {
                error: "exit 1".into(),
            },
        );

        assert_eq!(summary.total(), 2);
        assert!(!summary.is_success());
        assert_eq!(summary.failures, vec![("vscode".into(), "exit 1".into())]);
    }
}
