use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("LMS")
                    .separator("_")
                    .try_parsing(true),
            );

        // 支持从常用环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("backend.type", std::env::var("BACKEND_TYPE").ok())?
            .set_override_option("backend.cms.base_url", std::env::var("CMS_URL").ok())?
            .set_override_option(
                "backend.cms.jwt_secret",
                std::env::var("CMS_JWT_SECRET").ok(),
            )?
            .set_override_option(
                "backend.memory.fixture_path",
                std::env::var("MEMORY_FIXTURE").ok(),
            )?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers.max(1));
        }

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }

    /// CMS 令牌本地校验密钥 (如果配置了)
    pub fn cms_jwt_secret(&self) -> Option<&str> {
        if self.backend.cms.jwt_secret.is_empty() {
            None
        } else {
            Some(&self.backend.cms.jwt_secret)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        let config: AppConfig = Config::builder()
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("empty sources should deserialize into defaults");

        assert_eq!(config.backend.backend_type, "cms");
        assert_eq!(config.backend.cms.api_prefix, "/api");
        assert_eq!(config.session.ttl, 8 * 60 * 60);
        assert!(config.is_development());
        assert!(config.cms_jwt_secret().is_none());
        assert_eq!(config.server_bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_nested_override() {
        let config: AppConfig = Config::builder()
            .set_override("backend.type", "memory")
            .and_then(|b| b.set_override("backend.cms.jwt_secret", "s3cret"))
            .and_then(|b| b.set_override("server.port", 9000))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("overrides should apply");

        assert_eq!(config.backend.backend_type, "memory");
        assert_eq!(config.cms_jwt_secret(), Some("s3cret"));
        assert_eq!(config.server.port, 9000);
        // 未覆盖的字段保持默认值
        assert_eq!(config.backend.cms.page_size, 100);
    }
}
