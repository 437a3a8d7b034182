use crate::api::RunRecord;
use crate::StorageError;

pub fn encode_run(record: &RunRecord) -> Result<Vec<u8>, StorageError> {
    Ok(serde_json::to_vec(record)?)
}

pub fn decode_run(bytes: &[u8]) -> Result<RunRecord, StorageError> {
    Ok(serde_json::from_slice(bytes)?)
}
