use crate::error::{JournalError, Result};
use crate::push::platform::{PushPlatform, PushSubscription, SubscriptionKeys};
use crate::push::state::Permission;
use crate::push::worker::{ServiceWorker, WorkerEvent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

pub const DEVICE_FILE: &str = "push-device.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceRecord {
    #[serde(default)]
    permission: Permission,
    #[serde(default)]
    subscription: Option<PushSubscription>,
    #[serde(default)]
    application_server_key: Option<String>,
}

/// Push platform for the local device.
///
/// Subscriptions point at a relay that forwards pushes to this machine. The
/// permission and current subscription live in a small JSON file in the
/// cache directory. Without a relay URL the device reports push as
/// unsupported.
pub struct DevicePushPlatform {
    dir: PathBuf,
    relay_url: Option<String>,
    interactive: bool,
    worker: ServiceWorker,
    lock: Mutex<()>,
}

impl DevicePushPlatform {
    pub fn new(dir: impl Into<PathBuf>, relay_url: Option<String>, interactive: bool) -> Self {
        let platform = Self {
            dir: dir.into(),
            relay_url,
            interactive,
            worker: ServiceWorker::new(),
            lock: Mutex::new(()),
        };
        if platform.relay_url.is_some() {
            platform.register_worker();
        }
        platform
    }

    pub fn worker(&self) -> &ServiceWorker {
        &self.worker
    }

    fn register_worker(&self) {
        // Nothing to download for a local worker: install, then skip waiting
        let steps = [
            WorkerEvent::Register,
            WorkerEvent::Installed,
            WorkerEvent::SkipWaiting,
        ];
        for step in steps {
            if self.worker.handle(step).is_err() {
                let _ = self.worker.handle(WorkerEvent::InstallFailed);
                return;
            }
        }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(DEVICE_FILE)
    }

    /// Load the device record. A missing file is a fresh device. A corrupt
    /// one keeps its permission if that much can be read; otherwise it is an
    /// error, so a denial is never forgotten.
    fn read(&self) -> Result<DeviceRecord> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(DeviceRecord::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(record) => Ok(record),
            Err(e) => serde_json::from_str::<Value>(&content)
                .ok()
                .and_then(|value| value.get("permission").cloned())
                .and_then(|permission| serde_json::from_value::<Permission>(permission).ok())
                .map(|permission| DeviceRecord {
                    permission,
                    ..Default::default()
                })
                .ok_or_else(|| {
                    JournalError::PushError(format!(
                        "unreadable device state in {}: {}",
                        path.display(),
                        e
                    ))
                }),
        }
    }

    fn write(&self, record: &DeviceRecord) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let tmp = self.dir.join(format!("{}.tmp", DEVICE_FILE));
        fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        fs::rename(tmp, self.path())?;
        Ok(())
    }

    fn update<F>(&self, change: F) -> Result<DeviceRecord>
    where
        F: FnOnce(&mut DeviceRecord),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| JournalError::PushError("device state lock poisoned".to_string()))?;
        let mut record = self.read()?;
        change(&mut record);
        self.write(&record)?;
        Ok(record)
    }
}

#[async_trait]
impl PushPlatform for DevicePushPlatform {
    fn is_supported(&self) -> bool {
        self.relay_url.is_some()
    }

    fn permission(&self) -> Permission {
        // Unreadable state never re-opens the prompt
        self.read()
            .map(|record| record.permission)
            .unwrap_or(Permission::Denied)
    }

    async fn request_permission(&self) -> Result<Permission> {
        let current = self.permission();
        if current != Permission::Default {
            return Ok(current);
        }
        if !self.interactive {
            // Same as dismissing the prompt
            return Ok(Permission::Default);
        }

        let allowed = tokio::task::spawn_blocking(|| {
            dialoguer::Confirm::new()
                .with_prompt("Allow Journal to send you notifications?")
                .default(true)
                .interact()
        })
        .await
        .map_err(|e| JournalError::Other(format!("permission prompt failed: {}", e)))?
        .map_err(|e| JournalError::Other(format!("permission prompt failed: {}", e)))?;

        let permission = if allowed {
            Permission::Granted
        } else {
            Permission::Denied
        };
        self.update(|record| record.permission = permission)?;
        Ok(permission)
    }

    async fn ready(&self) -> Result<()> {
        self.worker.wait_active().await
    }

    async fn get_subscription(&self) -> Result<Option<PushSubscription>> {
        Ok(self.read()?.subscription)
    }

    async fn subscribe(&self, application_server_key: &str) -> Result<PushSubscription> {
        let relay = self.relay_url.as_deref().ok_or(JournalError::PushUnsupported)?;
        if self.permission() != Permission::Granted {
            return Err(JournalError::PermissionDenied);
        }

        let subscription = PushSubscription {
            endpoint: format!("{}/{}", relay, Uuid::new_v4().simple()),
            keys: SubscriptionKeys {
                p256dh: format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()),
                auth: Uuid::new_v4().simple().to_string(),
            },
        };

        let key = application_server_key.to_string();
        let stored = subscription.clone();
        self.update(move |record| {
            record.subscription = Some(stored);
            record.application_server_key = Some(key);
        })?;
        Ok(subscription)
    }

    async fn unsubscribe(&self, subscription: &PushSubscription) -> Result<bool> {
        let mut removed = false;
        self.update(|record| {
            if record.subscription.as_ref() == Some(subscription) {
                record.subscription = None;
                record.application_server_key = None;
                removed = true;
            }
        })?;
        Ok(removed)
    }
}
