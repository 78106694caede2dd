// ── Endpoint-backed entities ──
//
// A `Tunable` whose saves go to the HTTP save endpoint, which rewrites the
// literal in the entity's source file. Live updates are forwarded to a
// closure supplied by the owning UI.

use std::fmt;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tangent_api::SaveClient;
use tracing::{debug, warn};

use crate::convert::save_request;
use crate::error::CoreError;
use crate::model::{EntityId, TangentValue};
use crate::registry::Tunable;

type UpdateFn = Box<dyn Fn(&str, &TangentValue) + Send + Sync>;

/// Entity whose values live as literals in a source file.
pub struct SourceEntity {
    id: EntityId,
    file_path: Option<String>,
    client: SaveClient,
    on_update: UpdateFn,
}

impl SourceEntity {
    pub fn new(id: impl Into<EntityId>, client: SaveClient) -> Self {
        Self {
            id: id.into(),
            file_path: None,
            client,
            on_update: Box::new(|_, _| {}),
        }
    }

    /// Source file the endpoint should rewrite.
    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Callback for changes driven by undo, redo, or reset.
    #[must_use]
    pub fn on_update(mut self, f: impl Fn(&str, &TangentValue) + Send + Sync + 'static) -> Self {
        self.on_update = Box::new(f);
        self
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }
}

impl fmt::Debug for SourceEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceEntity")
            .field("id", &self.id)
            .field("file_path", &self.file_path)
            .field("endpoint", &self.client.endpoint().as_str())
            .finish_non_exhaustive()
    }
}

impl Tunable for SourceEntity {
    fn on_update(&self, key: &str, value: &TangentValue) {
        (self.on_update)(key, value);
    }

    fn on_save<'a>(
        &'a self,
        key: &'a str,
        value: &'a TangentValue,
    ) -> BoxFuture<'a, Result<(), CoreError>> {
        async move {
            let Some(file_path) = self.file_path.as_deref() else {
                warn!(entity = %self.id, key, "no source file known, save skipped");
                return Ok(());
            };
            let request = save_request(file_path, &self.id, key, value);
            self.client.save(&request).await?;
            debug!(entity = %self.id, key, file = file_path, "written to source");
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::registry::Registration;
    use crate::tuner::{SaveOutcome, Tuner};

    async fn client_for(server: &MockServer) -> SaveClient {
        SaveClient::from_endpoint(&format!("{}/__tangent/save", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn save_posts_to_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/__tangent/save"))
            .and(body_json(json!({
                "filePath": "src/Hero.tsx",
                "id": "hero",
                "key": "padding",
                "value": 24
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let entity = SourceEntity::new("hero", client_for(&server).await)
            .with_file_path("src/Hero.tsx");

        entity
            .on_save("padding", &TangentValue::Number(24.0))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_file_path_skips_without_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let entity = SourceEntity::new("hero", client_for(&server).await);

        assert!(entity.on_save("padding", &24.into()).await.is_ok());
    }

    #[tokio::test]
    async fn rejected_save_surfaces_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "literal not found"})),
            )
            .mount(&server)
            .await;

        let entity =
            SourceEntity::new("hero", client_for(&server).await).with_file_path("src/Hero.tsx");
        let err = entity.on_save("padding", &24.into()).await.unwrap_err();

        match err {
            CoreError::Api { message, status } => {
                assert_eq!(message, "literal not found");
                assert_eq!(status, Some(422));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tuner_save_goes_through_endpoint_and_update_reaches_closure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let entity = SourceEntity::new("hero", client_for(&server).await)
            .with_file_path("src/Hero.tsx")
            .on_update(move |key, value| sink.lock().unwrap().push(format!("{key}={value}")));

        let tuner = Tuner::default();
        let id = EntityId::from("hero");
        tuner.register(Registration::new(
            "hero",
            [("padding".to_owned(), TangentValue::from(16))].into_iter().collect(),
            Arc::new(entity),
        ));
        tuner.update_value(&id, "padding", 24);

        assert_eq!(
            tuner.save_all().await.unwrap(),
            SaveOutcome::Saved { count: 1 }
        );
        assert!(!tuner.has_unsaved_changes());
        assert_eq!(*seen.lock().unwrap(), ["padding=24"]);
    }
}
