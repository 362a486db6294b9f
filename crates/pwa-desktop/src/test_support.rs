//! Recording collaborator doubles for pipeline tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::collaborators::{
    Collaborators, DependencyInstaller, FileSystem, IconFetcher, IconTranscoder, NativePackager,
    PackageRequest,
};
use crate::error::{BuildError, Result};
use crate::icons::IconSelection;
use crate::manifest::{IconDescriptor, Manifest, ManifestFormat, ManifestInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    MkdirAll(PathBuf),
    CopyTree(PathBuf, PathBuf),
    CopyFile(PathBuf, PathBuf),
    Read(PathBuf),
    Write(PathBuf),
    Fetch { base_url: String, files: Vec<String> },
    Transcode(PathBuf),
    Install(PathBuf, Vec<String>),
    Package(PackageRequest),
}

/// Collaborator operations a failure can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Fetch,
    Transcode,
    Install,
    Package,
    CopyFile,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    files: HashMap<PathBuf, String>,
    call_failures: Vec<(Call, BuildError)>,
    op_failures: Vec<(Op, BuildError)>,
}

/// In-memory stand-in for every collaborator, sharing one call log
#[derive(Clone, Default)]
pub struct Recorder {
    state: Arc<Mutex<State>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            fs: Arc::new(self.clone()),
            fetcher: Arc::new(self.clone()),
            transcoder: Arc::new(self.clone()),
            installer: Arc::new(self.clone()),
            packager: Arc::new(self.clone()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn seed_file(&self, path: impl Into<PathBuf>, contents: &str) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.into(), contents.to_string());
    }

    pub fn file(&self, path: &Path) -> Option<String> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    /// Fail the first call equal to `call`
    pub fn fail_on(&self, call: Call, err: BuildError) {
        self.state.lock().unwrap().call_failures.push((call, err));
    }

    /// Fail the next call of `op`, whatever its arguments
    pub fn fail_op(&self, op: Op, err: BuildError) {
        self.state.lock().unwrap().op_failures.push((op, err));
    }

    pub fn fail_mkdir(&self, path: impl Into<PathBuf>, err: BuildError) {
        self.fail_on(Call::MkdirAll(path.into()), err);
    }

    pub fn fail_copy_tree(&self, src: impl Into<PathBuf>, dst: impl Into<PathBuf>, err: BuildError) {
        self.fail_on(Call::CopyTree(src.into(), dst.into()), err);
    }

    pub fn fail_read(&self, path: impl Into<PathBuf>, err: BuildError) {
        self.fail_on(Call::Read(path.into()), err);
    }

    pub fn fail_write(&self, path: impl Into<PathBuf>, err: BuildError) {
        self.fail_on(Call::Write(path.into()), err);
    }

    pub fn fail_fetch(&self, err: BuildError) {
        self.fail_op(Op::Fetch, err);
    }

    pub fn fail_transcode(&self, err: BuildError) {
        self.fail_op(Op::Transcode, err);
    }

    pub fn fail_install(&self, err: BuildError) {
        self.fail_op(Op::Install, err);
    }

    pub fn fail_package(&self, err: BuildError) {
        self.fail_op(Op::Package, err);
    }

    pub fn fail_copy_file(&self, err: BuildError) {
        self.fail_op(Op::CopyFile, err);
    }

    /// Log `call`, then return the failure injected for it, if any
    fn record(&self, op: Option<Op>, call: Call) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let by_call = state.call_failures.iter().position(|(c, _)| *c == call);
        let by_op = op.and_then(|op| state.op_failures.iter().position(|(o, _)| *o == op));
        let failure = match (by_call, by_op) {
            (Some(i), _) => Some(state.call_failures.remove(i).1),
            (None, Some(i)) => Some(state.op_failures.remove(i).1),
            (None, None) => None,
        };
        state.calls.push(call);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FileSystem for Recorder {
    async fn mkdir_all(&self, path: &Path) -> Result<()> {
        self.record(None, Call::MkdirAll(path.to_path_buf()))
    }

    async fn copy_tree(&self, src: &Path, dst: &Path) -> Result<()> {
        self.record(None, Call::CopyTree(src.to_path_buf(), dst.to_path_buf()))
    }

    async fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        self.record(
            Some(Op::CopyFile),
            Call::CopyFile(src.to_path_buf(), dst.to_path_buf()),
        )
    }

    async fn exists(&self, path: &Path) -> bool {
        self.state.lock().unwrap().files.contains_key(path)
    }

    async fn read_to_string(&self, path: &Path) -> Result<String> {
        self.record(None, Call::Read(path.to_path_buf()))?;
        self.file(path)
            .ok_or_else(|| BuildError::io(format!("Failed to read {}", path.display())))
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.record(None, Call::Write(path.to_path_buf()))?;
        self.seed_file(path, &String::from_utf8_lossy(contents));
        Ok(())
    }
}

#[async_trait]
impl IconFetcher for Recorder {
    async fn fetch(&self, base_url: &str, icons: &[IconSelection], _images_dir: &Path) -> Result<()> {
        let call = Call::Fetch {
            base_url: base_url.to_string(),
            files: icons.iter().map(|icon| icon.file_name.clone()).collect(),
        };
        self.record(Some(Op::Fetch), call)
    }
}

#[async_trait]
impl IconTranscoder for Recorder {
    async fn transcode(
        &self,
        images_dir: &Path,
        output_dir: &Path,
        artifact_name: &str,
    ) -> Result<PathBuf> {
        self.record(Some(Op::Transcode), Call::Transcode(images_dir.to_path_buf()))?;
        Ok(output_dir.join(format!("{}.icns", artifact_name)))
    }
}

#[async_trait]
impl DependencyInstaller for Recorder {
    async fn install(&self, target_dir: &Path, dependencies: &[String]) -> Result<()> {
        self.record(
            Some(Op::Install),
            Call::Install(target_dir.to_path_buf(), dependencies.to_vec()),
        )
    }
}

#[async_trait]
impl NativePackager for Recorder {
    async fn package(&self, request: &PackageRequest) -> Result<PathBuf> {
        self.record(Some(Op::Package), Call::Package(request.clone()))?;
        Ok(request.bundle_path())
    }
}

/// Packager that fakes electron-packager output on disk
#[derive(Debug, Clone, Default)]
pub struct DiskPackager {
    pub resources_path: String,
}

#[async_trait]
impl NativePackager for DiskPackager {
    async fn package(&self, request: &PackageRequest) -> Result<PathBuf> {
        let bundle = request.bundle_path();
        tokio::fs::create_dir_all(bundle.join(&self.resources_path)).await?;
        Ok(bundle)
    }
}

/// Installer that succeeds without touching the network
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInstaller;

#[async_trait]
impl DependencyInstaller for NoopInstaller {
    async fn install(&self, _target_dir: &Path, _dependencies: &[String]) -> Result<()> {
        Ok(())
    }
}

pub fn sample_manifest() -> ManifestInfo {
    let content = Manifest::new("My App", "https://example.com/index.html").with_icons(vec![
        IconDescriptor::new("icons/icon-512.png", "512x512").with_type("image/png"),
    ]);
    ManifestInfo::new(ManifestFormat::W3c, content)
}
