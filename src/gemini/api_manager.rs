use keyring::Entry;
use anyhow::{Result, Context};

const KEYRING_SERVICE: &str = "pixflow";

/// Stores the Gemini API key in the OS keyring.
pub struct ApiManager {
    google_entry: Entry,
}

impl ApiManager {
    pub fn new() -> Result<Self> {
        Ok(ApiManager {
            google_entry: Entry::new(KEYRING_SERVICE, "google-api-key")
                .context("Failed to create Google keyring entry")?,
        })
    }

    pub fn save_google_key(&self, key: &str) -> Result<()> {
        self.google_entry.set_password(key)
            .context("Failed to save Google API key")
    }

    pub fn get_google_key(&self) -> Result<String> {
        self.google_entry.get_password()
            .context("Failed to retrieve Google API key")
    }

    pub fn delete_google_key(&self) -> Result<()> {
        self.google_entry.delete_credential()
            .context("Failed to delete Google API key")
    }
}
