use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub calendar_api_base_url: String,
    pub calendar_api_token: String,
    pub session_duration_minutes: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            calendar_api_base_url: env::var("CALENDAR_API_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("CALENDAR_API_BASE_URL not set, using empty value");
                    String::new()
                }),
            calendar_api_token: env::var("CALENDAR_API_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("CALENDAR_API_TOKEN not set, using empty value");
                    String::new()
                }),
            session_duration_minutes: env::var("SESSION_DURATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn is_calendar_configured(&self) -> bool {
        !self.calendar_api_base_url.is_empty() && !self.calendar_api_token.is_empty()
    }
}
