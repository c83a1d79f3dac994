//! Shared test doubles, fixtures and arbitrary generators.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use tokio::sync::Notify;

use crate::builds::{FetchError, FileGetter};
use crate::dispatch::{DispatchConfig, Dispatcher};
use crate::github::{GitHubApiError, StatusReporter, StatusUpdate};
use crate::store::{Store, StoreError};
use crate::types::{Build, Project};
use crate::webhooks::EVENT_RULES;

/// Name of the project the GitHub fixtures belong to.
pub const TEST_PROJECT: &str = "baxterthehacker/public-repo";

/// Shared secret of [`TEST_PROJECT`].
pub const TEST_SECRET: &str = "asdf";

/// Script served by the default [`StaticFileGetter`] in a [`Harness`].
pub const REPO_SCRIPT: &[u8] = b"console.log('hello build.js')";

/// How long waits on background tasks may take before a test fails.
const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Reads a payload from `testdata/`.
pub fn fixture(name: &str) -> Vec<u8> {
    let path = format!("{}/testdata/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("reading fixture {path}: {e}"))
}

pub fn arb_sha() -> impl Strategy<Value = String> {
    "[0-9a-f]{40}".prop_map(String::from)
}

/// Event labels that are neither `ping` nor in the rule table.
pub fn arb_unknown_label() -> impl Strategy<Value = String> {
    "[a-z_]{0,24}".prop_filter("must not be a known label", |label| {
        label != "ping" && EVENT_RULES.iter().all(|rule| rule.name != label)
    })
}

/// A store holding at most one project, recording every call.
#[derive(Debug, Default)]
pub struct RecordingStore {
    project: Option<Project>,
    fail_builds: bool,
    hang_builds: bool,
    lookups: Mutex<Vec<String>>,
    builds: Mutex<Vec<Build>>,
    created: Notify,
}

impl RecordingStore {
    /// A store that answers every lookup with `project`.
    pub fn new(project: Project) -> Self {
        RecordingStore {
            project: Some(project),
            ..Default::default()
        }
    }

    /// A store with no projects.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Makes `create_build` fail without recording anything.
    pub fn failing_builds(mut self) -> Self {
        self.fail_builds = true;
        self
    }

    /// Makes `create_build` never complete.
    pub fn hanging_builds(mut self) -> Self {
        self.hang_builds = true;
        self
    }

    pub fn builds(&self) -> Vec<Build> {
        self.builds.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    /// Waits until at least `n` builds have been created.
    pub async fn wait_for_builds(&self, n: usize) -> Vec<Build> {
        tokio::time::timeout(WAIT_TIMEOUT, async {
            loop {
                let notified = self.created.notified();
                let builds = self.builds();
                if builds.len() >= n {
                    return builds;
                }
                notified.await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {n} builds"))
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn get_project(&self, name: &str) -> Result<Project, StoreError> {
        self.lookups.lock().unwrap().push(name.to_string());
        self.project
            .clone()
            .ok_or_else(|| StoreError::ProjectNotFound(name.to_string()))
    }

    async fn create_build(&self, build: &Build) -> Result<(), StoreError> {
        if self.hang_builds {
            std::future::pending::<()>().await;
        }
        if self.fail_builds {
            return Err(StoreError::Backend("connection refused".to_string()));
        }
        self.builds.lock().unwrap().push(build.clone());
        self.created.notify_waiters();
        Ok(())
    }
}

/// Serves the same contents for every path, recording `(commit, path)`.
#[derive(Debug)]
pub struct StaticFileGetter {
    contents: Vec<u8>,
    requests: Mutex<Vec<(String, String)>>,
}

impl StaticFileGetter {
    pub fn new(contents: Vec<u8>) -> Self {
        StaticFileGetter {
            contents,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileGetter for StaticFileGetter {
    async fn get_file(
        &self,
        _project: &Project,
        commit: &str,
        path: &str,
    ) -> Result<Vec<u8>, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((commit.to_string(), path.to_string()));
        Ok(self.contents.clone())
    }
}

/// A file getter whose every fetch fails.
#[derive(Debug, Clone, Copy)]
pub struct FailingFileGetter;

#[async_trait]
impl FileGetter for FailingFileGetter {
    async fn get_file(
        &self,
        _project: &Project,
        _commit: &str,
        _path: &str,
    ) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Api(GitHubApiError::without_source(
            "file getter unavailable",
        )))
    }
}

/// Records every status update as `(project name, update)`.
#[derive(Debug, Default)]
pub struct RecordingStatusReporter {
    updates: Mutex<Vec<(String, StatusUpdate)>>,
    posted: Notify,
}

impl RecordingStatusReporter {
    pub fn updates(&self) -> Vec<(String, StatusUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    /// Waits until at least `n` updates have been posted.
    pub async fn wait_for(&self, n: usize) -> Vec<(String, StatusUpdate)> {
        tokio::time::timeout(WAIT_TIMEOUT, async {
            loop {
                let notified = self.posted.notified();
                let updates = self.updates();
                if updates.len() >= n {
                    return updates;
                }
                notified.await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {n} status updates"))
    }
}

#[async_trait]
impl StatusReporter for RecordingStatusReporter {
    async fn create_status(
        &self,
        project: &Project,
        update: &StatusUpdate,
    ) -> Result<(), GitHubApiError> {
        self.updates
            .lock()
            .unwrap()
            .push((project.name.clone(), update.clone()));
        self.posted.notify_waiters();
        Ok(())
    }
}

/// A reporter whose every call fails.
#[derive(Debug, Clone, Copy)]
pub struct FailingStatusReporter;

#[async_trait]
impl StatusReporter for FailingStatusReporter {
    async fn create_status(
        &self,
        _project: &Project,
        _update: &StatusUpdate,
    ) -> Result<(), GitHubApiError> {
        Err(GitHubApiError::without_source("status API unavailable"))
    }
}

/// A reporter whose calls never complete.
#[derive(Debug, Clone, Copy)]
pub struct HangingStatusReporter;

#[async_trait]
impl StatusReporter for HangingStatusReporter {
    async fn create_status(
        &self,
        _project: &Project,
        _update: &StatusUpdate,
    ) -> Result<(), GitHubApiError> {
        std::future::pending().await
    }
}

/// A dispatcher wired to recording doubles.
///
/// `files` and `reporter` are the doubles the dispatcher uses unless the
/// builder replaced them.
pub struct Harness {
    pub store: Arc<RecordingStore>,
    pub files: Arc<StaticFileGetter>,
    pub reporter: Arc<RecordingStatusReporter>,
    pub dispatcher: Dispatcher,
}

impl Harness {
    /// A harness serving [`Harness::project`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            project: Some(Self::project()),
            fail_builds: false,
            hang_builds: false,
            script: REPO_SCRIPT.to_vec(),
            file_getter: None,
            reporter: None,
            config: DispatchConfig::default(),
        }
    }

    /// The project the fixtures were signed for.
    pub fn project() -> Project {
        Project::new("p-baxter", TEST_PROJECT)
            .with_secret(TEST_SECRET)
            .with_repo("github.com/baxterthehacker/public-repo")
    }
}

pub struct HarnessBuilder {
    project: Option<Project>,
    fail_builds: bool,
    hang_builds: bool,
    script: Vec<u8>,
    file_getter: Option<Arc<dyn FileGetter>>,
    reporter: Option<Arc<dyn StatusReporter>>,
    config: DispatchConfig,
}

impl HarnessBuilder {
    pub fn project(mut self, project: Project) -> Self {
        self.project = Some(project);
        self
    }

    pub fn no_project(mut self) -> Self {
        self.project = None;
        self
    }

    pub fn failing_builds(mut self) -> Self {
        self.fail_builds = true;
        self
    }

    pub fn hanging_builds(mut self) -> Self {
        self.hang_builds = true;
        self
    }

    /// Contents served by the recording file getter.
    pub fn script(mut self, script: &[u8]) -> Self {
        self.script = script.to_vec();
        self
    }

    pub fn file_getter(mut self, getter: Arc<dyn FileGetter>) -> Self {
        self.file_getter = Some(getter);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn target_url(mut self, url: &str) -> Self {
        self.config.status_target_url = Some(url.to_string());
        self
    }

    pub fn build(self) -> Harness {
        let store = match self.project {
            Some(project) => RecordingStore::new(project),
            None => RecordingStore::empty(),
        };
        let store = if self.fail_builds {
            store.failing_builds()
        } else {
            store
        };
        let store = Arc::new(if self.hang_builds {
            store.hanging_builds()
        } else {
            store
        });
        let files = Arc::new(StaticFileGetter::new(self.script));
        let reporter = Arc::new(RecordingStatusReporter::default());

        let dispatcher = Dispatcher::new(
            store.clone(),
            self.file_getter
                .unwrap_or_else(|| files.clone() as Arc<dyn FileGetter>),
            self.reporter
                .unwrap_or_else(|| reporter.clone() as Arc<dyn StatusReporter>),
            self.config,
        );

        Harness {
            store,
            files,
            reporter,
            dispatcher,
        }
    }
}
