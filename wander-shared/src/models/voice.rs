use serde::{Deserialize, Serialize};

/// Raw audio captured by the presentation layer, uploaded as the `voice_input` form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceRecording {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl VoiceRecording {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            file_name: "voice_input.m4a".to_string(),
            mime_type: "audio/m4a".to_string(),
            bytes,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self.mime_type = mime_type.into();
        self
    }
}

/// A stored voice upload as listed by `GET /voice-files`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceFileInfo {
    pub filename: String,
    pub size: u64,
    pub created: String,
    pub modified: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceFileListing {
    pub voice_files: Vec<VoiceFileInfo>,
}
