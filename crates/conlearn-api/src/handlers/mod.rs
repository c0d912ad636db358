pub mod presigned_upload;
pub mod uploads;
