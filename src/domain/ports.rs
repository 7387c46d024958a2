use crate::domain::model::{RawSources, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn student_db_path(&self) -> &str;
    fn enrollments_path(&self) -> &str;
    fn departments_path(&self) -> &str;
    fn output_path(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawSources>;
    async fn transform(&self, data: RawSources) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
