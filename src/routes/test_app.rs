//! 路由测试共用的应用环境

use std::sync::Arc;

use actix_service::ServiceFactory;
use actix_web::dev::ServiceRequest;
use actix_web::{App, Error, web};
use once_cell::sync::Lazy;

use crate::backend::Backend;
use crate::backend::memory::{MemoryBackend, MemoryData, MemoryUser};
use crate::cache::MokaCacheWrapper;
use crate::grading::test_support::{exam_sources, quiz_sources};
use crate::models::AppStartTime;
use crate::models::users::entities::{SessionUser, UserRole};
use crate::session::SessionStore;
use crate::utils::password::hash_password;
use crate::utils::{json_error_handler, query_error_handler};

pub const PASSWORD: &str = "rahasia";

static PASSWORD_HASH: Lazy<String> = Lazy::new(|| hash_password(PASSWORD).unwrap());

fn user(id: i64, username: &str, role: UserRole, nim: Option<&str>) -> MemoryUser {
    MemoryUser {
        profile: SessionUser {
            id,
            username: username.to_string(),
            email: Some(format!("{username}@kampus.ac.id")),
            role,
            nim: nim.map(str::to_string),
            full_name: None,
        },
        password_hash: PASSWORD_HASH.clone(),
    }
}

pub struct TestEnv {
    pub backend: Arc<dyn Backend>,
    pub sessions: SessionStore,
}

impl TestEnv {
    /// 讲师 dosen 负责课程 1，dosen2 负责课程 2，budi 是学生 202
    pub fn new() -> Self {
        let mut data = MemoryData::from_sources(&quiz_sources());
        data.absorb(&exam_sources());
        data.users = vec![
            user(1, "admin", UserRole::Admin, None),
            user(5, "dosen", UserRole::Lecturer, None),
            user(6, "dosen2", UserRole::Lecturer, None),
            user(202, "budi", UserRole::Student, Some("A02")),
        ];

        Self {
            backend: Arc::new(MemoryBackend::new(data)),
            sessions: SessionStore::new(Arc::new(MokaCacheWrapper::new(1000, 300)), 300, 1000),
        }
    }

    pub fn app_data<T>(&self, app: App<T>) -> App<T>
    where
        T: ServiceFactory<ServiceRequest, Config = (), Error = Error, InitError = ()>,
    {
        app.app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::Data::new(self.sessions.clone()))
            .app_data(web::Data::new(self.backend.clone()))
            .app_data(web::Data::new(AppStartTime {
                start_datetime: chrono::Utc::now(),
            }))
    }

    pub async fn token_for(&self, username: &str) -> String {
        self.backend
            .authenticate(username, PASSWORD)
            .await
            .unwrap()
            .token
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
