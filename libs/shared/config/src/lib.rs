use std::env;
use tracing::warn;

pub const DEFAULT_SLOT_MINUTES: u32 = 30;
pub const DEFAULT_CONFLICT_GRACE_MINUTES: u32 = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Ordered doctor display labels; registry slugs are derived from these.
    pub doctors: Vec<String>,
    pub slot_minutes: u32,
    pub conflict_grace_minutes: u32,
    pub bind_host: String,
    pub bind_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let doctors: Vec<String> = env::var("CLINIC_DOCTORS")
            .unwrap_or_else(|_| "Dr. Lina,Dr. Omar".to_string())
            .split(',')
            .map(|doc| doc.trim().to_string())
            .filter(|doc| !doc.is_empty())
            .collect();

        let doctors = if doctors.is_empty() {
            warn!("CLINIC_DOCTORS resolved to an empty list, falling back to on-call roster");
            vec!["On Call".to_string()]
        } else {
            doctors
        };

        Self {
            doctors,
            slot_minutes: env_u32("APPOINTMENT_SLOT_MINUTES", DEFAULT_SLOT_MINUTES),
            conflict_grace_minutes: env_u32(
                "APPOINTMENT_CONFLICT_GRACE_MINUTES",
                DEFAULT_CONFLICT_GRACE_MINUTES,
            ),
            bind_host: env::var("CLINIC_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            bind_port: env_u16("CLINIC_PORT", 3000),
        }
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid integer ({}), using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn env_u16(name: &str, default: u16) -> u16 {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid port ({}), using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}
