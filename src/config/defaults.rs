pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/v1";

pub fn default_enable_tools() -> bool {
    true
}

pub fn default_stream_timeout() -> u64 {
    60
}

pub fn default_request_timeout() -> u64 {
    30
}

pub fn default_ready_timeout_secs() -> u64 {
    10
}

pub fn default_vapid_retry_delay_ms() -> u64 {
    2_000
}

pub fn default_autosave_idle_secs() -> u64 {
    10
}
