//! Compile-time table of asynchronous job kinds

use std::fmt;

use conduit_domain::{ConduitError, Endpoint, JobToken, Result};

/// One logical long-running operation the platform runs asynchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    TableAppendRowSet,
    TableTransaction,
    TableQuery,
    TableQueryNextPage,
    TableCsvDownload,
    TableCsvUpload,
    TableCsvUploadPreview,
    BulkFileDownload,
    Doi,
    AddFilesToDownloadList,
    StorageReport,
}

struct KindRoute {
    base_path: &'static str,
    entity_scoped: bool,
    endpoint: Endpoint,
}

const fn repo(base_path: &'static str, entity_scoped: bool) -> KindRoute {
    KindRoute { base_path, entity_scoped, endpoint: Endpoint::Repo }
}

impl JobKind {
    pub const ALL: [Self; 11] = [
        Self::TableAppendRowSet,
        Self::TableTransaction,
        Self::TableQuery,
        Self::TableQueryNextPage,
        Self::TableCsvDownload,
        Self::TableCsvUpload,
        Self::TableCsvUploadPreview,
        Self::BulkFileDownload,
        Self::Doi,
        Self::AddFilesToDownloadList,
        Self::StorageReport,
    ];

    const fn route(self) -> KindRoute {
        match self {
            Self::TableAppendRowSet => repo("/table/append", true),
            Self::TableTransaction => repo("/table/transaction", true),
            Self::TableQuery => repo("/table/query", true),
            Self::TableQueryNextPage => repo("/table/query/nextPage", true),
            Self::TableCsvDownload => repo("/table/download/csv", true),
            Self::TableCsvUpload => repo("/table/upload/csv", true),
            Self::TableCsvUploadPreview => repo("/table/upload/csv/preview", false),
            Self::BulkFileDownload => {
                KindRoute { base_path: "/file/bulk", entity_scoped: false, endpoint: Endpoint::File }
            }
            Self::Doi => repo("/doi", false),
            Self::AddFilesToDownloadList => repo("/download/list/add", false),
            Self::StorageReport => repo("/storageReport", false),
        }
    }

    pub const fn base_path(self) -> &'static str {
        self.route().base_path
    }

    /// Paths are prefixed with `/entity/{id}` for these kinds.
    pub const fn requires_entity(self) -> bool {
        self.route().entity_scoped
    }

    pub const fn endpoint(self) -> Endpoint {
        self.route().endpoint
    }

    /// `POST` target that starts a job of this kind.
    pub fn start_path(self, entity_id: Option<&str>) -> Result<String> {
        Ok(format!("{}/async/start", self.resolve_base(entity_id)?))
    }

    /// `GET` target that returns the job's result or status.
    pub fn poll_path(self, token: &JobToken, entity_id: Option<&str>) -> Result<String> {
        Ok(format!(
            "{}/async/get/{}",
            self.resolve_base(entity_id)?,
            urlencoding::encode(token.as_str())
        ))
    }

    fn resolve_base(self, entity_id: Option<&str>) -> Result<String> {
        if !self.requires_entity() {
            return Ok(self.base_path().to_string());
        }
        match entity_id.map(str::trim) {
            Some(id) if !id.is_empty() => {
                Ok(format!("/entity/{}{}", urlencoding::encode(id), self.base_path()))
            }
            _ => Err(ConduitError::InvalidArgument(format!(
                "{self} jobs require the request's entity id"
            ))),
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
