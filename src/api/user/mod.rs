mod crud;

use crate::http::ApiClient;

/// 用户管理接口，全部直接透传，错误由共享客户端统一提示。
#[derive(Clone)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}
