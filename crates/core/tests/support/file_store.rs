//! In-memory multipart file service
//!
//! Implements both the REST side (initiate, presign, add, complete, file
//! handle) and the presigned byte store, with hooks to script failures.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use conduit_core::ports::{ApiRequest, ApiResponse, HttpMethod, PartTransfer, RestDispatcher};
use conduit_core::upload::digest::md5_hex;
use conduit_domain::{
    AddPartResponse, AddPartState, BatchPresignedUploadUrlRequest,
    BatchPresignedUploadUrlResponse, ConduitError, Endpoint, FileHandle, MultipartState,
    MultipartUploadRequest, MultipartUploadStatus, PartPresignedUrl, Result,
};
use parking_lot::Mutex;
use serde::Serialize;

const URL_PREFIX: &str = "mem://store/";

/// Fails a part's PUT on every attempt.
pub const ALWAYS: u32 = u32::MAX;

#[derive(Default)]
pub struct FakeFileStore {
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    next_id: u64,
    uploads: HashMap<String, StoredUpload>,
    staged: HashMap<(String, u32), Vec<u8>>,
    preload: Option<Preload>,
    failing_puts: HashMap<u32, u32>,
    rejected_adds: HashSet<u32>,
    signed_content_type: Option<String>,
    files: FileRegistry,
    calls: Vec<String>,
    put_content_types: Vec<String>,
    presign_batches: Vec<Vec<u32>>,
    complete_calls: u32,
}

#[derive(Default)]
struct FileRegistry {
    next_id: u64,
    handles: HashMap<String, FileHandle>,
    contents: HashMap<String, Vec<u8>>,
}

struct Preload {
    data: Vec<u8>,
    parts: BTreeSet<u32>,
    completed: bool,
}

struct StoredUpload {
    request: MultipartUploadRequest,
    total_parts: u32,
    parts: BTreeMap<u32, Vec<u8>>,
    file_handle_id: Option<String>,
}

impl StoredUpload {
    fn status(&self, upload_id: &str) -> MultipartUploadStatus {
        let parts_state =
            (1..=self.total_parts).map(|n| if self.parts.contains_key(&n) { '1' } else { '0' });
        MultipartUploadStatus {
            upload_id: upload_id.to_string(),
            state: if self.file_handle_id.is_some() {
                MultipartState::Completed
            } else {
                MultipartState::Uploading
            },
            parts_state: Some(parts_state.collect()),
            result_file_handle_id: self.file_handle_id.clone(),
            started_by: Some("tester".into()),
        }
    }
}

impl FakeFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next initiate resumes an earlier session that already holds
    /// `parts`, cut from `data` at the requested part size.
    pub fn with_existing_parts(self, data: Vec<u8>, parts: impl IntoIterator<Item = u32>) -> Self {
        self.state.lock().preload =
            Some(Preload { data, parts: parts.into_iter().collect(), completed: false });
        self
    }

    /// The next initiate finds the same file already fully uploaded.
    pub fn with_completed_upload(self, data: Vec<u8>) -> Self {
        self.state.lock().preload =
            Some(Preload { data, parts: BTreeSet::new(), completed: true });
        self
    }

    /// Fail the next `times` PUTs of `part_number`.
    pub fn fail_puts(self, part_number: u32, times: u32) -> Self {
        self.state.lock().failing_puts.insert(part_number, times);
        self
    }

    /// Answer ADD_FAILED for `part_number` regardless of its digest.
    pub fn reject_add(self, part_number: u32) -> Self {
        self.state.lock().rejected_adds.insert(part_number);
        self
    }

    /// Sign every presigned URL for this content type.
    pub fn with_signed_content_type(self, content_type: &str) -> Self {
        self.state.lock().signed_content_type = Some(content_type.to_string());
        self
    }

    pub fn stored_bytes(&self, file_handle_id: &str) -> Option<Vec<u8>> {
        self.state.lock().files.contents.get(file_handle_id).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn calls_matching(&self, needle: &str) -> usize {
        self.state.lock().calls.iter().filter(|call| call.contains(needle)).count()
    }

    pub fn complete_calls(&self) -> u32 {
        self.state.lock().complete_calls
    }

    pub fn presign_batches(&self) -> Vec<Vec<u32>> {
        self.state.lock().presign_batches.clone()
    }

    pub fn put_content_types(&self) -> Vec<String> {
        self.state.lock().put_content_types.clone()
    }

    /// Part numbers whose bytes were PUT at least once, in arrival order.
    pub fn transferred_parts(&self) -> Vec<u32> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| call.strip_prefix("PUT-BYTES "))
            .filter_map(|part| part.parse().ok())
            .collect()
    }

    /// Part number encoded in one of this store's presigned URLs.
    pub fn part_of_url(url: &str) -> Option<u32> {
        url.strip_prefix(URL_PREFIX)?.split('/').nth(1)?.parse().ok()
    }

    fn route(&self, request: &ApiRequest) -> Result<ApiResponse> {
        if request.endpoint != Endpoint::File {
            return Err(ConduitError::NotFound(format!("{} on {}", request.path, request.endpoint)));
        }
        let segments: Vec<&str> = request.path.trim_start_matches('/').split('/').collect();
        let mut state = self.state.lock();
        state.calls.push(format!("{} {}", request.method, request.path));

        match (request.method, segments.as_slice()) {
            (HttpMethod::Post, ["file", "multipart"]) => state.initiate(request),
            (HttpMethod::Post, ["file", "multipart", id, "presigned", "url", "batch"]) => {
                state.presign(id, request)
            }
            (HttpMethod::Put, ["file", "multipart", id, "add", part]) => {
                let part_number = part.parse().map_err(|_| bad_request("bad part number"))?;
                state.add_part(id, part_number, request.query_value("partMD5Hex"))
            }
            (HttpMethod::Put, ["file", "multipart", id, "complete"]) => state.complete(id),
            (HttpMethod::Get, ["fileHandle", id]) => state
                .files
                .handles
                .get(*id)
                .ok_or_else(|| ConduitError::NotFound(format!("file handle {id}")))
                .and_then(ok_json),
            _ => Err(ConduitError::NotFound(format!("{} {}", request.method, request.path))),
        }
    }
}

impl StoreState {
    fn initiate(&mut self, request: &ApiRequest) -> Result<ApiResponse> {
        let body: MultipartUploadRequest =
            serde_json::from_value(request.body.clone().ok_or_else(|| bad_request("no body"))?)?;
        let part_size = body.part_size_bytes;
        let total_parts = u32::try_from(body.file_size_bytes.div_ceil(part_size))
            .map_err(|_| bad_request("too many parts"))?;
        let force_restart = request.query_value("forceRestart") == Some("true");

        self.next_id += 1;
        let upload_id = format!("upload-{}", self.next_id);
        let mut upload =
            StoredUpload { request: body, total_parts, parts: BTreeMap::new(), file_handle_id: None };

        if let Some(preload) = self.preload.take().filter(|_| !force_restart) {
            let wanted: Vec<u32> = if preload.completed {
                (1..=total_parts).collect()
            } else {
                preload.parts.into_iter().collect()
            };
            for n in wanted {
                let start = (u64::from(n - 1) * part_size) as usize;
                let end = (start + part_size as usize).min(preload.data.len());
                upload.parts.insert(n, preload.data[start..end].to_vec());
            }
            if preload.completed {
                upload.file_handle_id = Some(self.files.store(&upload));
            }
        }

        let status = upload.status(&upload_id);
        self.uploads.insert(upload_id, upload);
        ok_json(&status)
    }

    fn presign(&mut self, upload_id: &str, request: &ApiRequest) -> Result<ApiResponse> {
        let body: BatchPresignedUploadUrlRequest =
            serde_json::from_value(request.body.clone().ok_or_else(|| bad_request("no body"))?)?;
        if !self.uploads.contains_key(upload_id) || body.upload_id != upload_id {
            return Err(ConduitError::NotFound(format!("upload {upload_id}")));
        }
        self.presign_batches.push(body.part_numbers.clone());

        let content_type = self.signed_content_type.clone().unwrap_or(body.content_type);
        let urls = body
            .part_numbers
            .iter()
            .map(|&part_number| {
                self.next_id += 1;
                PartPresignedUrl {
                    part_number,
                    upload_presigned_url: format!(
                        "{URL_PREFIX}{upload_id}/{part_number}/{}",
                        self.next_id
                    ),
                    signed_headers: Some(BTreeMap::from([(
                        "Content-Type".to_string(),
                        content_type.clone(),
                    )])),
                }
            })
            .collect();
        ok_json(&BatchPresignedUploadUrlResponse { part_presigned_urls: urls })
    }

    fn add_part(
        &mut self,
        upload_id: &str,
        part_number: u32,
        md5: Option<&str>,
    ) -> Result<ApiResponse> {
        let md5 = md5.ok_or_else(|| bad_request("partMD5Hex is required"))?;
        let staged = self.staged.get(&(upload_id.to_string(), part_number)).cloned();
        let upload = self
            .uploads
            .get_mut(upload_id)
            .ok_or_else(|| ConduitError::NotFound(format!("upload {upload_id}")))?;

        let verdict = match staged {
            _ if self.rejected_adds.contains(&part_number) => Err("MD5 does not match".to_string()),
            None => Err("no bytes were uploaded for this part".to_string()),
            Some(bytes) if md5_hex(&bytes) != md5 => Err(format!("expected {}", md5_hex(&bytes))),
            Some(bytes) => {
                upload.parts.insert(part_number, bytes);
                Ok(())
            }
        };

        ok_json(&AddPartResponse {
            upload_id: Some(upload_id.to_string()),
            part_number,
            add_part_state: if verdict.is_ok() {
                AddPartState::AddSuccess
            } else {
                AddPartState::AddFailed
            },
            error_message: verdict.err(),
        })
    }

    fn complete(&mut self, upload_id: &str) -> Result<ApiResponse> {
        self.complete_calls += 1;
        let upload = self
            .uploads
            .get_mut(upload_id)
            .ok_or_else(|| ConduitError::NotFound(format!("upload {upload_id}")))?;
        if upload.file_handle_id.is_none() {
            if upload.parts.len() != upload.total_parts as usize {
                return Err(ConduitError::Client {
                    status: 400,
                    reason: format!("{} of {} parts added", upload.parts.len(), upload.total_parts),
                });
            }
            upload.file_handle_id = Some(self.files.store(upload));
        }
        ok_json(&upload.status(upload_id))
    }
}

impl FileRegistry {
    /// Assemble the upload's parts into a stored file and mint its handle.
    fn store(&mut self, upload: &StoredUpload) -> String {
        let bytes: Vec<u8> = upload.parts.values().flatten().copied().collect();
        self.next_id += 1;
        let id = format!("fh-{}", self.next_id);
        let handle = FileHandle {
            id: id.clone(),
            etag: None,
            concrete_type: Some("org.sagebionetworks.repo.model.file.S3FileHandle".into()),
            created_by: Some("tester".into()),
            created_on: None,
            file_name: Some(upload.request.file_name.clone()),
            content_type: Some(upload.request.content_type.clone()),
            content_size: Some(bytes.len() as u64),
            content_md5: Some(md5_hex(&bytes)),
            storage_location_id: upload.request.storage_location_id,
            bucket_name: Some("test-bucket".into()),
            key: Some(format!("{id}/{}", upload.request.file_name)),
        };
        self.handles.insert(id.clone(), handle);
        self.contents.insert(id.clone(), bytes);
        id
    }
}

#[async_trait]
impl RestDispatcher for FakeFileStore {
    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.route(&request)
    }
}

#[async_trait]
impl PartTransfer for FakeFileStore {
    async fn put_part(&self, url: &str, content_type: &str, bytes: &[u8]) -> Result<()> {
        let mut segments = url
            .strip_prefix(URL_PREFIX)
            .ok_or_else(|| bad_request("not a presigned URL"))?
            .split('/');
        let upload_id = segments.next().unwrap_or_default().to_string();
        let part_number =
            Self::part_of_url(url).ok_or_else(|| bad_request("URL has no part number"))?;

        let mut state = self.state.lock();
        state.calls.push(format!("PUT-BYTES {part_number}"));
        state.put_content_types.push(content_type.to_string());

        if let Some(remaining) = state.failing_puts.get_mut(&part_number) {
            if *remaining > 0 {
                if *remaining != ALWAYS {
                    *remaining -= 1;
                }
                return Err(ConduitError::Network(format!("store refused part {part_number}")));
            }
        }
        state.staged.insert((upload_id, part_number), bytes.to_vec());
        Ok(())
    }
}

fn ok_json<T: Serialize>(value: &T) -> Result<ApiResponse> {
    Ok(ApiResponse::new(200, serde_json::to_string(value)?))
}

fn bad_request(reason: &str) -> ConduitError {
    ConduitError::Client { status: 400, reason: reason.to_string() }
}
