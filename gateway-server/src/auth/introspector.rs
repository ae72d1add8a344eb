use async_trait::async_trait;
use hydra_client::{AdminApi, AdminError, FlowMediator, IntrospectionResult};

/// Live token introspection, one round trip per call
#[async_trait]
pub trait TokenIntrospector: Send + Sync {
    async fn introspect(
        &self,
        token: &str,
        scope: Option<&str>,
    ) -> Result<IntrospectionResult, AdminError>;
}

#[async_trait]
impl<A> TokenIntrospector for FlowMediator<A>
where
    A: AdminApi + Send + Sync,
{
    async fn introspect(
        &self,
        token: &str,
        scope: Option<&str>,
    ) -> Result<IntrospectionResult, AdminError> {
        FlowMediator::introspect(self, token, scope).await
    }
}
