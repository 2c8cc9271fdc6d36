//! Multipart REST calls shared by the orchestrator and workers

use conduit_domain::{
    AddPartResponse, BatchPresignedUploadUrlRequest, BatchPresignedUploadUrlResponse, Endpoint,
    FileHandle, MultipartUploadRequest, MultipartUploadStatus, PartPresignedUrl, Result,
};

use crate::ports::{ApiRequest, RestDispatcher};

const MULTIPART: &str = "/file/multipart";

fn upload_path(upload_id: &str) -> String {
    format!("{MULTIPART}/{}", urlencoding::encode(upload_id))
}

/// POST `/file/multipart?forceRestart={bool}`
pub async fn initiate(
    dispatcher: &dyn RestDispatcher,
    request: &MultipartUploadRequest,
    force_restart: bool,
) -> Result<MultipartUploadStatus> {
    let request = ApiRequest::post(Endpoint::File, MULTIPART)
        .with_query("forceRestart", force_restart.to_string())
        .with_json(request)?;
    dispatcher.dispatch(request).await?.json()
}

/// POST `/file/multipart/{uploadId}/presigned/url/batch`
pub async fn presigned_urls(
    dispatcher: &dyn RestDispatcher,
    upload_id: &str,
    content_type: &str,
    part_numbers: Vec<u32>,
) -> Result<Vec<PartPresignedUrl>> {
    let body = BatchPresignedUploadUrlRequest {
        upload_id: upload_id.to_string(),
        content_type: content_type.to_string(),
        part_numbers,
    };
    let request =
        ApiRequest::post(Endpoint::File, format!("{}/presigned/url/batch", upload_path(upload_id)))
            .with_json(&body)?;
    let response: BatchPresignedUploadUrlResponse = dispatcher.dispatch(request).await?.json()?;
    Ok(response.part_presigned_urls)
}

/// PUT `/file/multipart/{uploadId}/add/{partNumber}?partMD5Hex={hex}`
pub async fn add_part(
    dispatcher: &dyn RestDispatcher,
    upload_id: &str,
    part_number: u32,
    part_md5_hex: &str,
) -> Result<AddPartResponse> {
    let request =
        ApiRequest::put(Endpoint::File, format!("{}/add/{part_number}", upload_path(upload_id)))
            .with_query("partMD5Hex", part_md5_hex);
    dispatcher.dispatch(request).await?.json()
}

/// PUT `/file/multipart/{uploadId}/complete`
pub async fn complete(
    dispatcher: &dyn RestDispatcher,
    upload_id: &str,
) -> Result<MultipartUploadStatus> {
    let request = ApiRequest::put(Endpoint::File, format!("{}/complete", upload_path(upload_id)));
    dispatcher.dispatch(request).await?.json()
}

/// GET `/fileHandle/{id}`
pub async fn file_handle(dispatcher: &dyn RestDispatcher, file_handle_id: &str) -> Result<FileHandle> {
    let request = ApiRequest::get(
        Endpoint::File,
        format!("/fileHandle/{}", urlencoding::encode(file_handle_id)),
    );
    dispatcher.dispatch(request).await?.json()
}
