//! Asynchronous job protocol: start, poll, wait, cancel

pub mod coordinator;
pub mod kind;
pub mod request;

pub use coordinator::JobCoordinator;
pub use kind::JobKind;
pub use request::{
    AddFileToDownloadListRequest, AddFileToDownloadListResponse, AppendableRowSetRequest,
    AsyncJobResult, BulkFileDownloadRequest, BulkFileDownloadResponse, CsvTableDescriptor,
    DoiRequest, DoiResponse, DownloadFromTableRequest, DownloadFromTableResult,
    DownloadStorageReportRequest, DownloadStorageReportResponse, FileHandleAssociation,
    GenericJobRequest, JobRequest, Query, QueryBundleRequest, QueryNextPageToken, QueryResult,
    QueryResultBundle, RowReferenceSetResults, TableUpdateTransactionRequest,
    TableUpdateTransactionResponse, UploadToTablePreviewRequest, UploadToTablePreviewResult,
    UploadToTableRequest, UploadToTableResult,
};
