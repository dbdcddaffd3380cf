use crate::services::dispatch::DispatchMode;
use crate::services::file_store::StagedFile;
use crate::services::upload_service::{BatchReport, StagedEntry};
use crate::utils::hash::short_hash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct StagedFileResponse {
    pub name: String,
    pub size: usize,
    /// Leading hex digits of the SHA-256
    pub fingerprint: String,
    pub revision: u64,
    pub staged_at: DateTime<Utc>,
}

impl From<&StagedFile> for StagedFileResponse {
    fn from(file: &StagedFile) -> Self {
        Self {
            name: file.name.clone(),
            size: file.size(),
            fingerprint: short_hash(&file.bytes),
            revision: file.revision,
            staged_at: file.staged_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StagedEntryResponse {
    pub name: String,
    pub size: usize,
    pub applied: bool,
}

impl From<StagedEntry> for StagedEntryResponse {
    fn from(entry: StagedEntry) -> Self {
        Self {
            name: entry.name,
            size: entry.size,
            applied: entry.applied,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FailedReadResponse {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub staged: Vec<StagedEntryResponse>,
    pub failed: Vec<FailedReadResponse>,
    pub selected: Option<String>,
}

impl From<BatchReport> for UploadResponse {
    fn from(report: BatchReport) -> Self {
        Self {
            staged: report.staged.into_iter().map(Into::into).collect(),
            failed: report
                .failed
                .into_iter()
                .map(|f| FailedReadResponse {
                    name: f.name,
                    error: f.error.to_string(),
                })
                .collect(),
            selected: report.selected,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct DataUrlFile {
    #[validate(length(min = 1, message = "File name must not be empty"))]
    pub name: String,
    pub data_url: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct DataUrlUploadRequest {
    #[validate(length(min = 1, message = "At least one file is required"), nested)]
    pub files: Vec<DataUrlFile>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SelectionResponse {
    pub selected: Option<String>,
    pub revision: u64,
    pub uploaded: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectRequest {
    #[validate(length(min = 1, message = "File name must not be empty"))]
    pub name: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EmitRequest {
    /// Entry to dispatch; the selected entry when omitted
    pub entry: Option<String>,
    /// Overrides the configured dispatch mode
    pub mode: Option<DispatchMode>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OutputResponse {
    pub lines: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_request_validation() {
        let empty = DataUrlUploadRequest { files: vec![] };
        assert!(empty.validate().is_err());

        let unnamed = DataUrlUploadRequest {
            files: vec![DataUrlFile {
                name: String::new(),
                data_url: "data:,x".to_string(),
            }],
        };
        assert!(unnamed.validate().is_err());

        let ok = DataUrlUploadRequest {
            files: vec![DataUrlFile {
                name: "a.txt".to_string(),
                data_url: "data:,x".to_string(),
            }],
        };
        assert!(ok.validate().is_ok());
    }
}
