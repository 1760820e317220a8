mod device;
mod manager;
mod platform;
mod state;
mod worker;

pub use device::{DevicePushPlatform, DEVICE_FILE};
pub use manager::{PushSettings, PushSubscriptionManager};
pub use platform::{PushPlatform, PushSubscription, SubscriptionKeys};
pub use state::{Permission, PushSubscriptionState};
pub use worker::{ServiceWorker, WorkerEvent, WorkerState};
