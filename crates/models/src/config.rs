use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub tenants: TenantsConfig,
    pub admin: AdminConfig,
    pub llm: LlmConfig,
    pub tts: TtsConfig,
    pub mailgun: MailgunConfig,
    pub dialog: DialogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_request_body_size_mb: u64,
    /// Served under `/demo` when the directory exists.
    pub public_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TenantsConfig {
    pub dir: String,
    pub header: String,
    pub from_did: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TtsConfig {
    pub model: String,
    pub voice: String,
    pub audio_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MailgunConfig {
    pub base_url: String,
    pub domain: String,
    pub api_key: String,
    pub from_name: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DialogConfig {
    pub opening_greeting: String,
    pub notifications_email: String,
    /// Name used in lead e-mails when a tenant file does not carry one.
    pub tenant_name: String,
    /// Offset of the businesses' local time from UTC, used for "next friday" style dates.
    pub utc_offset_hours: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 8000,
                max_request_body_size_mb: 2,
                public_dir: "public".to_string(),
            },
            tenants: TenantsConfig {
                dir: "tenants".to_string(),
                header: "X-Tenant".to_string(),
                from_did: true,
            },
            admin: AdminConfig {
                api_key: "".to_string(),
            },
            llm: LlmConfig {
                base_url: "https://api.openai.com".to_string(),
                api_key: "".to_string(),
                model: "gpt-4o-mini".to_string(),
                timeout_secs: 30,
                max_tokens: 150,
            },
            tts: TtsConfig {
                model: "gpt-4o-mini-tts".to_string(),
                voice: "alloy".to_string(),
                audio_dir: "audio_responses".to_string(),
            },
            mailgun: MailgunConfig {
                base_url: "https://api.mailgun.net".to_string(),
                domain: "".to_string(),
                api_key: "".to_string(),
                from_name: "Chatty.io Notifications".to_string(),
                timeout_secs: 10,
            },
            dialog: DialogConfig {
                opening_greeting: "Thanks for calling! Who am I speaking with today?".to_string(),
                notifications_email: "".to_string(),
                tenant_name: "our business".to_string(),
                utc_offset_hours: -8,
            },
        }
    }
}
