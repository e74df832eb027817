//! System installer - performs install actions on this host
//!
//! Package-manager installs shell out to the platform's package manager
//! (Homebrew on macOS, Chocolatey on Windows). Direct downloads land in the
//! cache directory, are checked against their sha256 when one is given, and
//! are then run with the configured installer flags.

use provision::{ApplyResult, InstallAction, Installer, InstallerError, ProxyConfig, platform};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::runner;

/// Records the url a cached file was downloaded from
const SOURCE_MARKER: &str = ".source-url";

/// Errors raised while performing an install action
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("no package manager is supported on platform '{0}'")]
    NoPackageManager(String),

    #[error("{program} is not installed or not in PATH")]
    ProgramNotFound { program: &'static str },

    #[error("{command} exited with {code}")]
    CommandFailed { command: String, code: String },

    #[error("download of {url} failed: {message}")]
    Download { url: String, message: String },

    #[error("checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// How a platform's package manager is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageManager {
    pub program: &'static str,
    install: &'static [&'static str],
    query: &'static [&'static str],
}

impl PackageManager {
    /// Package manager for a platform family
    pub fn for_platform(family: &str) -> Option<Self> {
        match family {
            platform::MAC_OS_X => Some(Self {
                program: "brew",
                install: &["install"],
                query: &["list", "--versions"],
            }),
            platform::WINDOWS => Some(Self {
                program: "choco",
                install: &["install", "-y"],
                query: &["list", "--exact", "--limit-output"],
            }),
            _ => None,
        }
    }

    fn install_args<'a>(&self, name: &'a str) -> Vec<&'a str> {
        let mut args: Vec<&str> = self.install.to_vec();
        args.push(name);
        args
    }

    fn query_args<'a>(&self, name: &'a str) -> Vec<&'a str> {
        let mut args: Vec<&str> = self.query.to_vec();
        args.push(name);
        args
    }
}

/// Installer backed by the host's package manager and an HTTP client
pub struct SystemInstaller {
    platform: String,
    cache_dir: PathBuf,
    proxy: ProxyConfig,
    agent: ureq::Agent,
}

impl SystemInstaller {
    pub fn new(
        platform: &str,
        cache_dir: PathBuf,
        proxy: ProxyConfig,
    ) -> Result<Self, InstallError> {
        let mut builder = ureq::Agent::config_builder();
        if let Some(url) = &proxy.http_proxy {
            let parsed = ureq::Proxy::new(url).map_err(|e| InstallError::Download {
                url: url.clone(),
                message: format!("invalid proxy: {e}"),
            })?;
            builder = builder.proxy(Some(parsed));
        }
        let agent: ureq::Agent = builder.build().into();

        Ok(Self {
            platform: platform.to_string(),
            cache_dir,
            proxy,
            agent,
        })
    }

    fn package_manager(&self) -> Result<PackageManager, InstallError> {
        let pm = PackageManager::for_platform(&self.platform)
            .ok_or_else(|| InstallError::NoPackageManager(self.platform.clone()))?;
        if !runner::command_exists(pm.program) {
            return Err(InstallError::ProgramNotFound {
                program: pm.program,
            });
        }
        Ok(pm)
    }

    fn run(&self, program: &Path, args: &[&str]) -> Result<(), InstallError> {
        let status = runner::run_with_env(program, args, &self.proxy.env_vars())?;
        if status.success() {
            Ok(())
        } else {
            Err(InstallError::CommandFailed {
                command: format!("{} {}", program.display(), args.join(" ")),
                code: status
                    .code()
                    .map_or_else(|| "signal".to_string(), |c| format!("status {c}")),
            })
        }
    }

    /// Fetch `url` into `<cache>/<package>/<file_name>`
    ///
    /// A cached copy is reused when it matches `checksum`, or, without a
    /// checksum, when it was downloaded from the same url.
    fn fetch(
        &self,
        package: &str,
        url: &str,
        checksum: Option<&str>,
        file_name: &str,
    ) -> Result<PathBuf, InstallError> {
        let dir = self.cache_dir.join(package);
        fs::create_dir_all(&dir).map_err(|source| InstallError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(file_name);
        let marker = dir.join(SOURCE_MARKER);

        if path.exists() {
            let reusable = match checksum {
                Some(expected) => verify_checksum(&path, expected).is_ok(),
                None => fs::read_to_string(&marker).is_ok_and(|cached| cached.trim() == url),
            };
            if reusable {
                log::debug!("Reusing cached {}", path.display());
                return Ok(path);
            }
            log::info!("Cached {} is stale, downloading again", path.display());
        }

        log::info!("Downloading {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| InstallError::Download {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let partial = path.with_extension("part");
        write_partial(response.into_body().into_reader(), &partial, url)?;

        if let Some(expected) = checksum
            && let Err(e) = verify_checksum(&partial, expected)
        {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }

        fs::rename(&partial, &path).map_err(|source| InstallError::Io {
            path: path.clone(),
            source,
        })?;
        fs::write(&marker, url).map_err(|source| InstallError::Io {
            path: marker,
            source,
        })?;
        Ok(path)
    }

    /// Run a downloaded installer according to its file type
    fn launch(&self, path: &Path, flags: &str) -> Result<ApplyResult, InstallError> {
        let flags: Vec<&str> = flags.split_whitespace().collect();
        let path_str = path.to_string_lossy().into_owned();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("msi") => {
                let mut args = vec!["/i", path_str.as_str()];
                args.extend(flags);
                self.run(Path::new("msiexec"), &args)?;
            }
            Some("pkg") => {
                let mut args = vec!["-pkg", path_str.as_str(), "-target", "/"];
                args.extend(flags);
                self.run(Path::new("installer"), &args)?;
            }
            Some("dmg" | "zip") => {
                return Ok(ApplyResult::Skipped {
                    reason: format!("downloaded to {}, open it to finish", path.display()),
                });
            }
            _ => self.run(path, &flags)?,
        }

        Ok(ApplyResult::Installed)
    }
}

impl Installer for SystemInstaller {
    fn install_package(&self, name: &str) -> Result<ApplyResult, InstallerError> {
        let pm = self.package_manager()?;
        self.run(Path::new(pm.program), &pm.install_args(name))?;
        Ok(ApplyResult::Installed)
    }

    fn download_and_install(
        &self,
        name: &str,
        url: &str,
        checksum: Option<&str>,
        flags: &str,
        file_name: &str,
    ) -> Result<ApplyResult, InstallerError> {
        let path = self.fetch(name, url, checksum, file_name)?;
        Ok(self.launch(&path, flags)?)
    }

    fn is_satisfied(&self, action: &InstallAction) -> Result<bool, InstallerError> {
        // Downloaded installers have no reliable presence check
        let InstallAction::PackageManagerInstall { name } = action else {
            return Ok(false);
        };

        let pm = self.package_manager()?;
        let output = runner::run_capture_opt(pm.program, &pm.query_args(name))?;
        Ok(output.is_some_and(|out| is_listed(&out, name)))
    }
}

/// Stream a download into `partial`, removing it if the transfer breaks off
fn write_partial(mut reader: impl Read, partial: &Path, url: &str) -> Result<(), InstallError> {
    let mut file = File::create(partial).map_err(|source| InstallError::Io {
        path: partial.to_path_buf(),
        source,
    })?;

    if let Err(e) = io::copy(&mut reader, &mut file) {
        drop(file);
        let _ = fs::remove_file(partial);
        return Err(InstallError::Download {
            url: url.to_string(),
            message: e.to_string(),
        });
    }
    Ok(())
}

/// Whether package-manager listing output mentions `name` as installed
///
/// Handles both `brew list --versions` (`name 1.2.3`) and
/// `choco list --limit-output` (`name|1.2.3`).
fn is_listed(output: &str, name: &str) -> bool {
    output.lines().any(|line| {
        line.split(['|', ' '])
            .next()
            .is_some_and(|first| first.eq_ignore_ascii_case(name))
    })
}

/// Hex sha256 of a file
pub fn sha256_file(path: &Path) -> Result<String, InstallError> {
    let file = File::open(path).map_err(|source| InstallError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buf).map_err(|source| InstallError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

fn verify_checksum(path: &Path, expected: &str) -> Result<(), InstallError> {
    let actual = sha256_file(path)?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(InstallError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello\n")
    const HELLO_SHA256: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    #[test]
    fn test_package_manager_for_platform() {
        assert_eq!(
            PackageManager::for_platform("mac_os_x").map(|p| p.program),
            Some("brew")
        );
        assert_eq!(
            PackageManager::for_platform("windows").map(|p| p.program),
            Some("choco")
        );
        assert!(PackageManager::for_platform("linux").is_none());
    }

    #[test]
    fn test_install_args() {
        let choco = PackageManager::for_platform("windows").unwrap();
        assert_eq!(choco.install_args("kdiff3"), ["install", "-y", "kdiff3"]);
    }

    #[test]
    fn test_is_listed() {
        assert!(is_listed("git 2.44.0\n", "git"));
        assert!(is_listed("kdiff3|0.9.98\n", "kdiff3"));
        assert!(!is_listed("gitextensions|4.2\n", "git"));
        assert!(!is_listed("", "git"));
    }

    #[test]
    fn test_sha256_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, "hello\n").unwrap();

        assert_eq!(sha256_file(&path).unwrap(), HELLO_SHA256);
        assert!(verify_checksum(&path, &HELLO_SHA256.to_uppercase()).is_ok());
    }

    #[test]
    fn test_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, "hello\n").unwrap();

        let err = verify_checksum(&path, "00").unwrap_err();
        assert!(matches!(err, InstallError::ChecksumMismatch { .. }));
    }

    fn installer_in(dir: &Path, platform: &str) -> SystemInstaller {
        SystemInstaller::new(platform, dir.to_path_buf(), ProxyConfig::default()).unwrap()
    }

    #[test]
    fn test_cached_download_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tool")).unwrap();
        fs::write(dir.path().join("tool").join("setup.exe"), "hello\n").unwrap();
        let installer = installer_in(dir.path(), "windows");

        // The url is unreachable; a verified cache hit must not touch it
        let path = installer
            .fetch("tool", "http://127.0.0.1:9/setup.exe", Some(HELLO_SHA256), "setup.exe")
            .unwrap();
        assert_eq!(path, dir.path().join("tool").join("setup.exe"));
    }

    #[test]
    fn test_unverified_cache_is_reused_only_for_same_url() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("vscode");
        fs::create_dir_all(&cached).unwrap();
        fs::write(cached.join("vscode"), "hello\n").unwrap();
        fs::write(cached.join(SOURCE_MARKER), "http://127.0.0.1:9/fwlink/?LinkID=623230").unwrap();
        let installer = installer_in(dir.path(), "windows");

        let path = installer
            .fetch("vscode", "http://127.0.0.1:9/fwlink/?LinkID=623230", None, "vscode")
            .unwrap();
        assert_eq!(path, cached.join("vscode"));

        // Same file name under another url must go back to the network
        let err = installer
            .fetch("vscode", "http://127.0.0.1:9/fwlink/?LinkID=999999", None, "vscode")
            .unwrap_err();
        assert!(matches!(err, InstallError::Download { .. }));
    }

    #[test]
    fn test_packages_do_not_share_cache_entries() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("vscode");
        fs::create_dir_all(&first).unwrap();
        fs::write(first.join("fwlink"), "hello\n").unwrap();
        fs::write(first.join(SOURCE_MARKER), "http://127.0.0.1:9/fwlink/?LinkID=999999").unwrap();
        let installer = installer_in(dir.path(), "windows");

        let err = installer
            .fetch("insiders", "http://127.0.0.1:9/fwlink/?LinkID=999999", None, "fwlink")
            .unwrap_err();
        assert!(matches!(err, InstallError::Download { .. }));
    }

    #[test]
    fn test_interrupted_download_leaves_no_partial_file() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("setup.part");

        let err = write_partial(Broken, &partial, "http://example.com/setup.exe").unwrap_err();
        assert!(matches!(err, InstallError::Download { .. }));
        assert!(!partial.exists());
    }

    #[test]
    fn test_dmg_is_left_for_the_user() {
        let dir = tempfile::tempdir().unwrap();
        let installer = installer_in(dir.path(), "mac_os_x");

        let result = installer
            .launch(&dir.path().join("VirtualBox.dmg"), "")
            .unwrap();
        assert!(matches!(result, ApplyResult::Skipped { .. }));
    }

    #[test]
    fn test_unsupported_platform_has_no_package_manager() {
        let dir = tempfile::tempdir().unwrap();
        let installer = installer_in(dir.path(), "plan9");

        let err = installer.install_package("git").unwrap_err();
        assert!(err.to_string().contains("plan9"));
    }
}
