//! Multipart upload session model and wire types

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::impl_state_conversions;

// ============================================================================
// Client-side session model
// ============================================================================

/// Client-side lifecycle of an upload session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadState {
    Initiated,
    Planned,
    Uploading,
    Complete,
    Failed,
}

impl_state_conversions!(UploadState {
    Initiated => "INITIATED",
    Planned => "PLANNED",
    Uploading => "UPLOADING",
    Complete => "COMPLETE",
    Failed => "FAILED",
});

impl UploadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartState {
    Pending,
    Uploaded,
    Failed,
}

impl_state_conversions!(PartState {
    Pending => "PENDING",
    Uploaded => "UPLOADED",
    Failed => "FAILED",
});

/// One contiguous byte range of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// 1-based, contiguous across the session.
    pub part_number: u32,
    pub offset: u64,
    pub length: u64,
    /// Lowercase hex MD5 of the part bytes, filled in by planning.
    pub digest: Option<String>,
    /// Presigned URL from the batch call; consumed by the first attempt only.
    pub upload_url: Option<PartPresignedUrl>,
    pub state: PartState,
}

impl Part {
    pub fn byte_range(&self) -> Range<u64> {
        self.offset..self.offset + self.length
    }
}

/// Caller-supplied description of the file being uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    /// Overrides the source's own file name.
    pub file_name: Option<String>,
    pub content_type: String,
    pub generate_preview: bool,
}

impl Default for UploadMetadata {
    fn default() -> Self {
        Self {
            file_name: None,
            content_type: crate::constants::DEFAULT_CONTENT_TYPE.to_string(),
            generate_preview: true,
        }
    }
}

/// An in-progress multipart upload, owned by the orchestrator.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub upload_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub part_size: u64,
    pub total_parts: u32,
    pub state: UploadState,
    pub storage_location_id: Option<i64>,
    pub content_type: String,
    pub generate_preview: bool,
    /// Lowercase hex MD5 of the whole file.
    pub content_md5: String,
    pub parts: Vec<Part>,
    pub result_file_handle_id: Option<String>,
}

impl UploadSession {
    pub fn pending_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|part| part.state != PartState::Uploaded)
    }

    pub fn uploaded_count(&self) -> usize {
        self.parts.iter().filter(|part| part.state == PartState::Uploaded).count()
    }

    /// Every part number in `[1, total_parts]` is UPLOADED.
    pub fn all_parts_uploaded(&self) -> bool {
        self.parts.len() == self.total_parts as usize
            && self.parts.iter().all(|part| part.state == PartState::Uploaded)
    }

    pub fn part_mut(&mut self, part_number: u32) -> Option<&mut Part> {
        self.parts.iter_mut().find(|part| part.part_number == part_number)
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Body of the initiate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartUploadRequest {
    pub file_name: String,
    pub file_size_bytes: u64,
    pub content_type: String,
    #[serde(rename = "contentMD5Hex")]
    pub content_md5_hex: String,
    pub part_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_location_id: Option<i64>,
    pub generate_preview: bool,
}

/// Server-side upload state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MultipartState {
    Uploading,
    Completed,
}

/// Response of initiate and complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartUploadStatus {
    pub upload_id: String,
    pub state: MultipartState,
    /// One `'0'`/`'1'` character per part, `'1'` meaning already added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_file_handle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_by: Option<String>,
}

impl MultipartUploadStatus {
    /// Whether the server already holds part `part_number` (1-based).
    pub fn is_part_added(&self, part_number: u32) -> bool {
        let Some(parts_state) = self.parts_state.as_deref() else {
            return false;
        };
        part_number
            .checked_sub(1)
            .and_then(|index| parts_state.as_bytes().get(index as usize))
            .is_some_and(|flag| *flag == b'1')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPresignedUploadUrlRequest {
    pub upload_id: String,
    pub content_type: String,
    pub part_numbers: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPresignedUploadUrlResponse {
    #[serde(default)]
    pub part_presigned_urls: Vec<PartPresignedUrl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartPresignedUrl {
    pub part_number: u32,
    pub upload_presigned_url: String,
    /// Headers the URL was signed with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_headers: Option<BTreeMap<String, String>>,
}

impl PartPresignedUrl {
    /// Content type the URL was signed for, if the server pinned one.
    pub fn signed_content_type(&self) -> Option<&str> {
        self.signed_headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
                .map(|(_, value)| value.as_str())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddPartState {
    #[serde(rename = "ADD_SUCCESS", alias = "SUCCESS")]
    AddSuccess,
    #[serde(rename = "ADD_FAILED", alias = "FAILED")]
    AddFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPartResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,
    pub part_number: u32,
    #[serde(alias = "status")]
    pub add_part_state: AddPartState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
