use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extraction::{
    models::{Credentials, RawCriteria},
    runner::RunRequest,
};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct StartInDTO {
    pub email_address: Option<String>,
    pub app_password: Option<String>,
    pub sender_mail: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl StartInDTO {
    /// Presence-only validation; date formats are checked by the run itself.
    pub fn into_run_request(self) -> Option<RunRequest> {
        Some(RunRequest {
            credentials: Credentials::new(
                present(self.email_address)?,
                present(self.app_password)?,
            ),
            criteria: RawCriteria {
                sender: present(self.sender_mail)?,
                start_date: present(self.start_date)?,
                end_date: present(self.end_date)?,
            },
        })
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StartOutDTO {
    pub message: String,
    pub run_id: Uuid,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorOutDTO {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
}

impl ErrorOutDTO {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            run_id: None,
        }
    }
}
