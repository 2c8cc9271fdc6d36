//! Typed job requests
//!
//! Each request type names its [`JobKind`] and the result type a poll
//! deserializes into. Result bodies carry a `concreteType`, which is what
//! lets a poll tell a finished result apart from a status body.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::kind::JobKind;

/// A request body that starts an asynchronous job.
pub trait JobRequest: Serialize + Send + Sync {
    /// Body returned by a poll once the job is COMPLETE.
    type Response: DeserializeOwned + Send;

    fn kind(&self) -> JobKind;

    /// Owning entity, for kinds whose paths are entity scoped.
    fn entity_id(&self) -> Option<&str> {
        None
    }
}

/// Untyped request for any kind; the body is sent as given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericJobRequest {
    #[serde(skip)]
    kind: JobKind,
    #[serde(skip)]
    entity_id: Option<String>,
    #[serde(flatten)]
    body: Map<String, Value>,
}

impl GenericJobRequest {
    pub fn new(kind: JobKind, body: Map<String, Value>) -> Self {
        Self { kind, entity_id: None, body }
    }

    pub fn with_entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }
}

impl JobRequest for GenericJobRequest {
    type Response = AsyncJobResult;

    fn kind(&self) -> JobKind {
        self.kind
    }

    fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }
}

/// Untyped result; requires `concreteType` like every typed result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncJobResult {
    pub concrete_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

// ============================================================================
// Table query
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub sql: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBundleRequest {
    pub concrete_type: String,
    pub entity_id: Option<String>,
    pub query: Query,
    /// Bit mask selecting which bundle parts the server computes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_mask: Option<u64>,
}

impl QueryBundleRequest {
    pub const CONCRETE_TYPE: &'static str = "org.sagebionetworks.repo.model.table.QueryBundleRequest";

    pub fn new(entity_id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            concrete_type: Self::CONCRETE_TYPE.to_string(),
            entity_id: Some(entity_id.into()),
            query: Query { sql: sql.into(), offset: None, limit: None },
            part_mask: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResultBundle {
    pub concrete_type: String,
    #[serde(default)]
    pub query_result: Option<Value>,
    #[serde(default)]
    pub query_count: Option<u64>,
    #[serde(default)]
    pub select_columns: Option<Vec<Value>>,
    #[serde(default)]
    pub max_rows_per_page: Option<u64>,
}

impl JobRequest for QueryBundleRequest {
    type Response = QueryResultBundle;

    fn kind(&self) -> JobKind {
        JobKind::TableQuery
    }

    fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }
}

// ============================================================================
// Table transaction
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableUpdateTransactionRequest {
    pub concrete_type: String,
    pub entity_id: Option<String>,
    pub changes: Vec<Value>,
}

impl TableUpdateTransactionRequest {
    pub const CONCRETE_TYPE: &'static str =
        "org.sagebionetworks.repo.model.table.TableUpdateTransactionRequest";

    pub fn new(entity_id: impl Into<String>, changes: Vec<Value>) -> Self {
        Self {
            concrete_type: Self::CONCRETE_TYPE.to_string(),
            entity_id: Some(entity_id.into()),
            changes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableUpdateTransactionResponse {
    pub concrete_type: String,
    #[serde(default)]
    pub results: Vec<Value>,
}

impl JobRequest for TableUpdateTransactionRequest {
    type Response = TableUpdateTransactionResponse;

    fn kind(&self) -> JobKind {
        JobKind::TableTransaction
    }

    fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }
}

// ============================================================================
// Bulk file download
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandleAssociation {
    pub file_handle_id: String,
    pub associate_object_id: String,
    pub associate_object_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFileDownloadRequest {
    pub concrete_type: String,
    pub requested_files: Vec<FileHandleAssociation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_file_name: Option<String>,
}

impl BulkFileDownloadRequest {
    pub const CONCRETE_TYPE: &'static str =
        "org.sagebionetworks.repo.model.file.BulkFileDownloadRequest";

    pub fn new(requested_files: Vec<FileHandleAssociation>) -> Self {
        Self {
            concrete_type: Self::CONCRETE_TYPE.to_string(),
            requested_files,
            zip_file_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFileDownloadResponse {
    pub concrete_type: String,
    #[serde(default)]
    pub result_zip_file_handle_id: Option<String>,
    #[serde(default)]
    pub file_summary: Vec<Value>,
}

impl JobRequest for BulkFileDownloadRequest {
    type Response = BulkFileDownloadResponse;

    fn kind(&self) -> JobKind {
        JobKind::BulkFileDownload
    }
}

// ============================================================================
// Table row append
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendableRowSetRequest {
    pub concrete_type: String,
    pub entity_id: Option<String>,
    /// A `PartialRowSet` or `RowSet` body, passed through as given.
    pub to_append: Value,
}

impl AppendableRowSetRequest {
    pub const CONCRETE_TYPE: &'static str =
        "org.sagebionetworks.repo.model.table.AppendableRowSetRequest";

    pub fn new(table_id: impl Into<String>, to_append: Value) -> Self {
        Self {
            concrete_type: Self::CONCRETE_TYPE.to_string(),
            entity_id: Some(table_id.into()),
            to_append,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowReferenceSetResults {
    pub concrete_type: String,
    #[serde(default)]
    pub row_reference_set: Option<Value>,
}

impl JobRequest for AppendableRowSetRequest {
    type Response = RowReferenceSetResults;

    fn kind(&self) -> JobKind {
        JobKind::TableAppendRowSet
    }

    fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }
}

// ============================================================================
// Table query paging
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryNextPageToken {
    pub concrete_type: String,
    pub entity_id: Option<String>,
    pub token: String,
}

impl QueryNextPageToken {
    pub const CONCRETE_TYPE: &'static str = "org.sagebionetworks.repo.model.table.QueryNextPageToken";

    pub fn new(table_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            concrete_type: Self::CONCRETE_TYPE.to_string(),
            entity_id: Some(table_id.into()),
            token: token.into(),
        }
    }
}

/// One page of rows; `next_page_token` is absent on the last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub concrete_type: String,
    #[serde(default)]
    pub query_results: Option<Value>,
    #[serde(default)]
    pub next_page_token: Option<Value>,
}

impl JobRequest for QueryNextPageToken {
    type Response = QueryResult;

    fn kind(&self) -> JobKind {
        JobKind::TableQueryNextPage
    }

    fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }
}

// ============================================================================
// Table CSV download / upload
// ============================================================================

/// Separator, quote and escape settings shared by CSV jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvTableDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_character: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escape_character: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_first_line_header: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadFromTableRequest {
    pub concrete_type: String,
    pub entity_id: Option<String>,
    pub sql: String,
    pub write_header: bool,
    pub include_row_id_and_row_version: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_table_descriptor: Option<CsvTableDescriptor>,
}

impl DownloadFromTableRequest {
    pub const CONCRETE_TYPE: &'static str =
        "org.sagebionetworks.repo.model.table.DownloadFromTableRequest";

    pub fn new(table_id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            concrete_type: Self::CONCRETE_TYPE.to_string(),
            entity_id: Some(table_id.into()),
            sql: sql.into(),
            write_header: true,
            include_row_id_and_row_version: true,
            csv_table_descriptor: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadFromTableResult {
    pub concrete_type: String,
    #[serde(default)]
    pub results_file_handle_id: Option<String>,
    #[serde(default)]
    pub table_id: Option<String>,
    #[serde(default)]
    pub etag: Option<String>,
    #[serde(default)]
    pub headers: Vec<Value>,
}

impl JobRequest for DownloadFromTableRequest {
    type Response = DownloadFromTableResult;

    fn kind(&self) -> JobKind {
        JobKind::TableCsvDownload
    }

    fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }
}

/// Appends or updates rows from an already uploaded CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadToTableRequest {
    pub concrete_type: String,
    pub table_id: String,
    pub upload_file_handle_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines_to_skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_table_descriptor: Option<CsvTableDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_ids: Option<Vec<String>>,
}

impl UploadToTableRequest {
    pub const CONCRETE_TYPE: &'static str = "org.sagebionetworks.repo.model.table.UploadToTableRequest";

    pub fn new(table_id: impl Into<String>, upload_file_handle_id: impl Into<String>) -> Self {
        Self {
            concrete_type: Self::CONCRETE_TYPE.to_string(),
            table_id: table_id.into(),
            upload_file_handle_id: upload_file_handle_id.into(),
            update_etag: None,
            lines_to_skip: None,
            csv_table_descriptor: None,
            column_ids: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadToTableResult {
    pub concrete_type: String,
    #[serde(default)]
    pub rows_processed: Option<u64>,
    #[serde(default)]
    pub etag: Option<String>,
}

impl JobRequest for UploadToTableRequest {
    type Response = UploadToTableResult;

    fn kind(&self) -> JobKind {
        JobKind::TableCsvUpload
    }

    fn entity_id(&self) -> Option<&str> {
        Some(&self.table_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadToTablePreviewRequest {
    pub concrete_type: String,
    pub upload_file_handle_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines_to_skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_table_descriptor: Option<CsvTableDescriptor>,
    /// Scan every row rather than a sample when suggesting column types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_full_file_scan: Option<bool>,
}

impl UploadToTablePreviewRequest {
    pub const CONCRETE_TYPE: &'static str =
        "org.sagebionetworks.repo.model.table.UploadToTablePreviewRequest";

    pub fn new(upload_file_handle_id: impl Into<String>) -> Self {
        Self {
            concrete_type: Self::CONCRETE_TYPE.to_string(),
            upload_file_handle_id: upload_file_handle_id.into(),
            lines_to_skip: None,
            csv_table_descriptor: None,
            do_full_file_scan: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadToTablePreviewResult {
    pub concrete_type: String,
    #[serde(default)]
    pub suggested_columns: Vec<Value>,
    #[serde(default)]
    pub sample_rows: Vec<Value>,
    #[serde(default)]
    pub rows_scanned: Option<u64>,
}

impl JobRequest for UploadToTablePreviewRequest {
    type Response = UploadToTablePreviewResult;

    fn kind(&self) -> JobKind {
        JobKind::TableCsvUploadPreview
    }
}

// ============================================================================
// DOI, download list, storage report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoiRequest {
    pub concrete_type: String,
    /// DOI metadata (creators, titles, resource type, target object).
    pub doi: Value,
}

impl DoiRequest {
    pub const CONCRETE_TYPE: &'static str = "org.sagebionetworks.repo.model.doi.v2.DoiRequest";

    pub fn new(doi: Value) -> Self {
        Self { concrete_type: Self::CONCRETE_TYPE.to_string(), doi }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoiResponse {
    pub concrete_type: String,
    #[serde(default)]
    pub doi: Option<Value>,
}

impl JobRequest for DoiRequest {
    type Response = DoiResponse;

    fn kind(&self) -> JobKind {
        JobKind::Doi
    }
}

/// Adds every file in a folder, or every file a table query selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFileToDownloadListRequest {
    pub concrete_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
}

impl AddFileToDownloadListRequest {
    pub const CONCRETE_TYPE: &'static str =
        "org.sagebionetworks.repo.model.file.AddFileToDownloadListRequest";

    pub fn folder(folder_id: impl Into<String>) -> Self {
        Self {
            concrete_type: Self::CONCRETE_TYPE.to_string(),
            folder_id: Some(folder_id.into()),
            query: None,
        }
    }

    pub fn query(query: Query) -> Self {
        Self { concrete_type: Self::CONCRETE_TYPE.to_string(), folder_id: None, query: Some(query) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFileToDownloadListResponse {
    pub concrete_type: String,
    #[serde(default)]
    pub download_list: Option<Value>,
}

impl JobRequest for AddFileToDownloadListRequest {
    type Response = AddFileToDownloadListResponse;

    fn kind(&self) -> JobKind {
        JobKind::AddFilesToDownloadList
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadStorageReportRequest {
    pub concrete_type: String,
    /// e.g. `ALL_PROJECTS`
    pub report_type: String,
}

impl DownloadStorageReportRequest {
    pub const CONCRETE_TYPE: &'static str =
        "org.sagebionetworks.repo.model.report.DownloadStorageReportRequest";

    pub fn new(report_type: impl Into<String>) -> Self {
        Self { concrete_type: Self::CONCRETE_TYPE.to_string(), report_type: report_type.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadStorageReportResponse {
    pub concrete_type: String,
    #[serde(default)]
    pub results_file_handle_id: Option<String>,
}

impl JobRequest for DownloadStorageReportRequest {
    type Response = DownloadStorageReportResponse;

    fn kind(&self) -> JobKind {
        JobKind::StorageReport
    }
}
