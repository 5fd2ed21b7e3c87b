use async_trait::async_trait;
use chrome_url_installer::downloader::{Downloader, ZipExtractor};
use chrome_url_installer::tool_cache::LocalToolCache;
use chrome_url_installer::{
    Arch, InstallResult, Installer, InstallerError, InstallerOptions, Os, Platform, UrlInstaller,
    cache_key,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use zip::write::SimpleFileOptions;

const BROWSER_URL: &str =
    "https://storage.googleapis.com/chrome-for-testing-public/120.0.6099.109/linux64/chrome-linux64.zip";
const DRIVER_URL: &str =
    "https://storage.googleapis.com/chrome-for-testing-public/120.0.6099.109/linux64/chromedriver-linux64.zip";

/// Serves archives built on disk instead of fetching them.
struct LocalArchives {
    archives: Vec<(&'static str, PathBuf)>,
    downloads: AtomicUsize,
}

#[async_trait]
impl Downloader for LocalArchives {
    async fn download_tool(&self, url: &str) -> chrome_url_installer::Result<PathBuf> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let (_, path) = self
            .archives
            .iter()
            .find(|(known, _)| *known == url)
            .expect("unknown url in test");
        Ok(path.clone())
    }
}

fn write_zip(path: &Path, entries: &[&str]) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().unix_permissions(0o755);
    for name in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(name.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

struct Setup {
    scratch: tempfile::TempDir,
    downloader: Arc<LocalArchives>,
}

impl Setup {
    fn new() -> Self {
        let scratch = tempfile::tempdir().unwrap();
        let browser_zip = scratch.path().join("chrome-linux64.zip");
        write_zip(
            &browser_zip,
            &["chrome-linux64/chrome", "chrome-linux64/resources.pak"],
        );
        let driver_zip = scratch.path().join("chromedriver-linux64.zip");
        write_zip(&driver_zip, &["chromedriver-linux64/chromedriver"]);

        Setup {
            downloader: Arc::new(LocalArchives {
                archives: vec![(BROWSER_URL, browser_zip), (DRIVER_URL, driver_zip)],
                downloads: AtomicUsize::new(0),
            }),
            scratch,
        }
    }

    fn cache_root(&self) -> PathBuf {
        self.scratch.path().join("toolcache")
    }

    fn installer(&self, options: InstallerOptions) -> UrlInstaller {
        UrlInstaller::with_collaborators(
            Platform::new(Os::Linux, Arch::Amd64).unwrap(),
            options,
            Arc::new(LocalToolCache::new(self.cache_root(), "x64")),
            self.downloader.clone(),
            Arc::new(ZipExtractor::new(self.scratch.path().join("tmp"))),
        )
    }
}

/// This is a full integration test that simulates the end-user workflow.
#[tokio::test]
async fn test_full_browser_and_driver_install_flow() {
    let setup = Setup::new();
    let installer = setup.installer(InstallerOptions::default());

    // 1. Nothing cached yet.
    assert_eq!(installer.check_installed_browser(BROWSER_URL).await.unwrap(), None);

    // 2. Download and install the browser.
    let downloaded = installer.download_browser(BROWSER_URL).await.unwrap();
    let browser = installer
        .install_browser(BROWSER_URL, &downloaded.archive)
        .await
        .unwrap();

    assert_eq!(browser.bin, PathBuf::from("chrome"));
    assert!(browser.executable_path().is_file());
    assert!(browser.root.join("resources.pak").is_file());
    assert!(browser.root.ends_with(
        Path::new("chromium").join(cache_key(BROWSER_URL)).join("x64")
    ));

    // 3. A second lookup hits the cache.
    let cached = installer
        .check_installed_browser(BROWSER_URL)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        dunce::canonicalize(&cached.root).unwrap(),
        dunce::canonicalize(&browser.root).unwrap()
    );

    // 4. The driver goes through the same steps under its own tool name.
    let driver = installer.ensure_driver(DRIVER_URL).await.unwrap();
    assert_eq!(driver.bin, PathBuf::from("chromedriver"));
    assert!(driver.executable_path().is_file());
    assert!(driver.root.ends_with(
        Path::new("chromedriver").join(cache_key(DRIVER_URL)).join("x64")
    ));

    assert_eq!(setup.downloader.downloads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cache_survives_new_installer_instance() {
    let setup = Setup::new();

    let first: InstallResult = setup
        .installer(InstallerOptions::default())
        .ensure_browser(BROWSER_URL)
        .await
        .unwrap();
    let second = setup
        .installer(InstallerOptions::default())
        .ensure_browser(BROWSER_URL)
        .await
        .unwrap();

    assert_eq!(setup.downloader.downloads.load(Ordering::SeqCst), 1);
    assert_eq!(
        dunce::canonicalize(first.executable_path()).unwrap(),
        dunce::canonicalize(second.executable_path()).unwrap()
    );
}

#[tokio::test]
async fn test_browser_only_installer_refuses_driver() {
    let setup = Setup::new();
    let installer = setup.installer(InstallerOptions {
        resolve_browser_version_only: true,
    });

    let err = installer.ensure_driver(DRIVER_URL).await.unwrap_err();
    assert!(matches!(err, InstallerError::UnexpectedDriverOperation { .. }));
    assert_eq!(setup.downloader.downloads.load(Ordering::SeqCst), 0);
    assert!(!setup.cache_root().join("chromedriver").exists());
}

#[test]
fn test_install_result_serializes_root_and_bin() {
    let result = InstallResult {
        root: PathBuf::from("/cache/chromium"),
        bin: PathBuf::from("chrome"),
    };
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "root": "/cache/chromium", "bin": "chrome" })
    );
}
