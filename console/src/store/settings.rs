use chrono::Utc;
use parking_lot::RwLock;

use crate::models::{LiveKitCredentials, PlatformSettings};

/// Holder for the platform settings singleton
///
/// Readers get clones; [`PlatformSettings::masked`] is applied by the caller on
/// the way out.
pub struct SettingsStore {
    inner: RwLock<PlatformSettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(PlatformSettings::new(Utc::now())),
        }
    }

    /// Unmasked snapshot
    pub fn get(&self) -> PlatformSettings {
        self.inner.read().clone()
    }

    /// Platform LiveKit credentials when all three fields are set
    pub fn livekit(&self) -> Option<LiveKitCredentials> {
        self.inner.read().complete_livekit().cloned()
    }

    /// Apply a change under the write lock and stamp `updatedAt`
    pub fn update(&self, change: impl FnOnce(&mut PlatformSettings)) -> PlatformSettings {
        let mut settings = self.inner.write();
        change(&mut settings);
        settings.updated_at = Utc::now();
        settings.clone()
    }

    pub fn set_livekit(&self, credentials: Option<LiveKitCredentials>) -> PlatformSettings {
        self.update(|s| s.livekit = credentials)
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_livekit_roundtrip() {
        let store = SettingsStore::new();
        assert!(store.livekit().is_none());

        let before = store.get().updated_at;
        let updated = store.set_livekit(Some(LiveKitCredentials::new("k", "s", "wss://h")));
        assert!(updated.updated_at >= before);
        assert_eq!(store.livekit().unwrap().api_key, "k");

        store.set_livekit(None);
        assert!(store.livekit().is_none());
    }

    #[test]
    fn test_incomplete_livekit_is_not_offered() {
        let store = SettingsStore::new();
        store.set_livekit(Some(LiveKitCredentials::new("k", "", "wss://h")));
        assert!(store.livekit().is_none());
    }

    #[test]
    fn test_update_applies_provider_credentials() {
        let store = SettingsStore::new();
        store.update(|s| {
            s.twilio_account_sid = Some("AC1".into());
            s.twilio_auth_token = Some("tok".into());
        });
        let settings = store.get();
        assert_eq!(settings.twilio_auth_token.as_deref(), Some("tok"));
        assert!(settings.telnyx_api_key.is_none());
        assert!(settings.livekit.is_none());
    }
}
