//! In-memory release host for integration tests.

#![allow(dead_code)]

use bytes::Bytes;
use kodegen_release_upload::error::ApiResult;
use kodegen_release_upload::{
    ApiError, AssetInfo, NewRelease, ReleaseApi, ReleaseDescriptor, ReleaseUpdate, Repository,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

pub const DEFAULT_BRANCH_SHA: &str = "1111111111111111111111111111111111111111";

#[derive(Debug, Clone)]
pub struct StoredRelease {
    pub descriptor: ReleaseDescriptor,
    pub body: Option<String>,
    pub target_commitish: Option<String>,
    pub assets: Vec<AssetInfo>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    releases: Vec<StoredRelease>,
    tags: HashMap<String, String>,
    branches: HashMap<String, String>,
    release_lookup_error: Option<ApiError>,
    release_delete_error: Option<ApiError>,
    tag_update_error: Option<ApiError>,
    upload_failures: HashMap<String, u32>,
    calls: Vec<String>,
}

/// Fake GitHub keeping releases, assets and tags in memory
#[derive(Debug)]
pub struct FakeGitHub {
    state: Mutex<State>,
}

impl Default for FakeGitHub {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGitHub {
    pub fn new() -> Self {
        let mut state = State {
            next_id: 100,
            ..State::default()
        };
        state
            .branches
            .insert("main".to_string(), DEFAULT_BRANCH_SHA.to_string());
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn with_branch(self, branch: &str, sha: &str) -> Self {
        self.lock().branches.insert(branch.to_string(), sha.to_string());
        self
    }

    pub fn with_tag(self, tag: &str, sha: &str) -> Self {
        self.lock().tags.insert(tag.to_string(), sha.to_string());
        self
    }

    /// Seed an existing published release carrying `assets`
    pub fn with_release(self, tag: &str, name: &str, assets: &[&str]) -> Self {
        self.seed_release(tag, name, assets, false)
    }

    /// Seed an existing draft release
    pub fn with_draft_release(self, tag: &str, name: &str) -> Self {
        self.seed_release(tag, name, &[], true)
    }

    fn seed_release(self, tag: &str, name: &str, assets: &[&str], draft: bool) -> Self {
        {
            let mut state = self.lock();
            let id = next_id(&mut state);
            let assets = assets
                .iter()
                .map(|asset| {
                    let asset_id = next_id(&mut state);
                    asset_info(asset_id, asset, 1)
                })
                .collect();
            let descriptor = descriptor(id, tag, name, draft, false);
            state.releases.push(StoredRelease {
                descriptor,
                body: None,
                target_commitish: None,
                assets,
            });
        }
        self
    }

    /// Make the release lookup fail with `error`
    pub fn fail_release_lookup(self, error: ApiError) -> Self {
        self.lock().release_lookup_error = Some(error);
        self
    }

    /// Make every release deletion fail with `error`
    pub fn fail_release_delete(self, error: ApiError) -> Self {
        self.lock().release_delete_error = Some(error);
        self
    }

    /// Make every tag update fail with `error`
    pub fn fail_tag_update(self, error: ApiError) -> Self {
        self.lock().tag_update_error = Some(error);
        self
    }

    /// Fail the next `times` uploads of `asset_name` with a server error
    pub fn fail_uploads(self, asset_name: &str, times: u32) -> Self {
        self.lock()
            .upload_failures
            .insert(asset_name.to_string(), times);
        self
    }

    pub fn release(&self, tag: &str) -> Option<StoredRelease> {
        self.lock()
            .releases
            .iter()
            .find(|r| r.descriptor.tag_name == tag)
            .cloned()
    }

    pub fn release_count(&self) -> usize {
        self.lock().releases.len()
    }

    pub fn asset_names(&self, tag: &str) -> Vec<String> {
        self.release(tag)
            .map(|r| r.assets.iter().map(|a| a.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn tag_commit(&self, tag: &str) -> Option<String> {
        self.lock().tags.get(tag).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.as_str() == name).count()
    }
}

fn next_id(state: &mut State) -> u64 {
    state.next_id += 1;
    state.next_id
}

fn upload_url(id: u64) -> String {
    format!("https://uploads.test/releases/{id}/assets{{?name,label}}")
}

fn descriptor(id: u64, tag: &str, name: &str, draft: bool, prerelease: bool) -> ReleaseDescriptor {
    ReleaseDescriptor {
        id,
        name: name.to_string(),
        tag_name: tag.to_string(),
        upload_url: upload_url(id),
        html_url: format!("https://github.test/releases/{id}"),
        draft,
        prerelease,
    }
}

fn asset_info(id: u64, name: &str, size: u64) -> AssetInfo {
    AssetInfo {
        id,
        name: name.to_string(),
        size,
        browser_download_url: format!("https://github.test/download/{name}"),
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::NotFound {
        message: format!("{what} not found"),
    }
}

impl ReleaseApi for FakeGitHub {
    async fn get_release_by_tag(&self, _repo: &Repository, tag: &str) -> ApiResult<ReleaseDescriptor> {
        let mut state = self.lock();
        state.calls.push("get_release_by_tag".to_string());
        if let Some(error) = state.release_lookup_error.clone() {
            return Err(error);
        }
        // like GitHub, the by-tag lookup only sees published releases
        state
            .releases
            .iter()
            .find(|r| r.descriptor.tag_name == tag && !r.descriptor.draft)
            .map(|r| r.descriptor.clone())
            .ok_or_else(|| not_found("release"))
    }

    async fn list_releases(&self, _repo: &Repository) -> ApiResult<Vec<ReleaseDescriptor>> {
        let mut state = self.lock();
        state.calls.push("list_releases".to_string());
        Ok(state.releases.iter().map(|r| r.descriptor.clone()).collect())
    }

    async fn create_release(
        &self,
        _repo: &Repository,
        release: &NewRelease,
    ) -> ApiResult<ReleaseDescriptor> {
        let mut state = self.lock();
        state.calls.push("create_release".to_string());
        if state
            .releases
            .iter()
            .any(|r| r.descriptor.tag_name == release.tag_name)
        {
            return Err(ApiError::Unprocessable {
                message: "already_exists".to_string(),
            });
        }

        if !state.tags.contains_key(&release.tag_name) {
            let sha = match release.target_commitish.as_deref() {
                Some(target) => state
                    .branches
                    .get(target)
                    .cloned()
                    .unwrap_or_else(|| target.to_string()),
                None => DEFAULT_BRANCH_SHA.to_string(),
            };
            state.tags.insert(release.tag_name.clone(), sha);
        }

        let id = next_id(&mut state);
        let descriptor = descriptor(
            id,
            &release.tag_name,
            &release.name,
            release.draft,
            release.prerelease,
        );
        state.releases.push(StoredRelease {
            descriptor: descriptor.clone(),
            body: None,
            target_commitish: release.target_commitish.clone(),
            assets: Vec::new(),
        });
        Ok(descriptor)
    }

    async fn update_release(
        &self,
        _repo: &Repository,
        release_id: u64,
        update: &ReleaseUpdate,
    ) -> ApiResult<ReleaseDescriptor> {
        let mut state = self.lock();
        state.calls.push("update_release".to_string());
        let stored = state
            .releases
            .iter_mut()
            .find(|r| r.descriptor.id == release_id)
            .ok_or_else(|| not_found("release"))?;
        stored.descriptor.name = update.name.clone();
        stored.descriptor.tag_name = update.tag_name.clone();
        stored.descriptor.draft = update.draft;
        stored.descriptor.prerelease = update.prerelease;
        if update.body.is_some() {
            stored.body = update.body.clone();
        }
        if update.target_commitish.is_some() {
            stored.target_commitish = update.target_commitish.clone();
        }
        Ok(stored.descriptor.clone())
    }

    async fn delete_release(&self, _repo: &Repository, release_id: u64) -> ApiResult<()> {
        let mut state = self.lock();
        state.calls.push("delete_release".to_string());
        if let Some(error) = state.release_delete_error.clone() {
            return Err(error);
        }
        let before = state.releases.len();
        state.releases.retain(|r| r.descriptor.id != release_id);
        if state.releases.len() == before {
            return Err(not_found("release"));
        }
        Ok(())
    }

    async fn list_assets(&self, _repo: &Repository, release_id: u64) -> ApiResult<Vec<AssetInfo>> {
        let mut state = self.lock();
        state.calls.push("list_assets".to_string());
        state
            .releases
            .iter()
            .find(|r| r.descriptor.id == release_id)
            .map(|r| r.assets.clone())
            .ok_or_else(|| not_found("release"))
    }

    async fn delete_asset(&self, _repo: &Repository, asset_id: u64) -> ApiResult<()> {
        let mut state = self.lock();
        state.calls.push("delete_asset".to_string());
        for release in &mut state.releases {
            if let Some(pos) = release.assets.iter().position(|a| a.id == asset_id) {
                release.assets.remove(pos);
                return Ok(());
            }
        }
        Err(not_found("asset"))
    }

    async fn upload_asset(
        &self,
        upload_url: &str,
        asset_name: &str,
        content: Bytes,
    ) -> ApiResult<AssetInfo> {
        let mut state = self.lock();
        state.calls.push("upload_asset".to_string());

        if let Some(remaining) = state.upload_failures.get_mut(asset_name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ApiError::Unknown {
                    status: Some(502),
                    message: "Bad Gateway".to_string(),
                });
            }
        }

        let id = next_id(&mut state);
        let release = state
            .releases
            .iter_mut()
            .find(|r| r.descriptor.upload_url == upload_url)
            .ok_or_else(|| not_found("release"))?;
        if release.assets.iter().any(|a| a.name == asset_name) {
            return Err(ApiError::Unprocessable {
                message: "already_exists".to_string(),
            });
        }
        let asset = asset_info(id, asset_name, content.len() as u64);
        release.assets.push(asset.clone());
        Ok(asset)
    }

    async fn get_branch_commit(&self, _repo: &Repository, branch: &str) -> ApiResult<String> {
        let mut state = self.lock();
        state.calls.push("get_branch_commit".to_string());
        state
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| not_found("branch"))
    }

    async fn update_tag_ref(&self, _repo: &Repository, tag: &str, sha: &str) -> ApiResult<()> {
        let mut state = self.lock();
        state.calls.push("update_tag_ref".to_string());
        if let Some(error) = state.tag_update_error.clone() {
            return Err(error);
        }
        if !state.tags.contains_key(tag) {
            return Err(ApiError::Unprocessable {
                message: "Reference does not exist".to_string(),
            });
        }
        state.tags.insert(tag.to_string(), sha.to_string());
        Ok(())
    }

    async fn get_tag_commit(&self, _repo: &Repository, tag: &str) -> ApiResult<String> {
        let mut state = self.lock();
        state.calls.push("get_tag_commit".to_string());
        state.tags.get(tag).cloned().ok_or_else(|| not_found("tag"))
    }
}

/// Write `name` with `content` under `dir`, returning its path
pub fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
