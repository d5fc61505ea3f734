use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileEntryOutDTO {
    pub name: String,
    pub size: u64,
    pub modified: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FileListOutDTO {
    pub files: Vec<FileEntryOutDTO>,
}
