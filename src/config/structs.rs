use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub cors: CorsConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            system_name: "LMS Grading Gateway".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            unix_socket_path: String::new(),
            workers: 0,
            max_workers: 8,
            timeouts: TimeoutConfig::default(),
            limits: LimitConfig::default(),
        }
    }
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_request: 5000,
            client_disconnect: 1000,
            keep_alive: 30,
        }
    }
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 256 * 1024,
        }
    }
}

/// 后端（无头 CMS）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    #[serde(rename = "type")]
    pub backend_type: String,
    pub cms: CmsConfig,
    pub memory: MemoryBackendConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend_type: "cms".to_string(),
            cms: CmsConfig::default(),
            memory: MemoryBackendConfig::default(),
        }
    }
}

/// CMS REST 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub request_timeout_ms: u64,
    pub page_size: u32,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub jwt_secret: String,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:1337".to_string(),
            api_prefix: "/api".to_string(),
            request_timeout_ms: 10_000,
            page_size: 100,
            jwt_secret: String::new(),
        }
    }
}

/// 内存后端配置（本地开发、测试）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryBackendConfig {
    pub fixture_path: String, // 为空时使用空数据集
    #[serde(skip_serializing)]
    pub token_secret: String, // 签发令牌用
    pub token_ttl: i64,       // 秒
}

impl Default for MemoryBackendConfig {
    fn default() -> Self {
        Self {
            fixture_path: String::new(),
            token_secret: "lms-memory-backend-secret".to_string(),
            token_ttl: 28800,
        }
    }
}

/// 会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub ttl: u64, // 秒
    pub max_capacity: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: 8 * 60 * 60,
            max_capacity: 10_000,
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { max_age: 3600 }
    }
}
