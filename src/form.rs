//! Create/edit flow of one entity form.
//!
//! ```text
//! Idle ──load()──▶ Loading ──▶ Ready ──submit()──▶ Submitting ──▶ Success
//!                                ▲                     │
//!                                └──── (failed) ◀──────┘
//! ```
//!
//! `Loading` only happens in edit mode. A failed validation keeps the form
//! in `Ready` with field errors and never reaches the network. A failed
//! request is reported as [`SubmitOutcome::Failed`], keeps the message in
//! `last_error` and puts the form back in `Ready`. Dropping a `load` or
//! `submit` future midway leaves the form in `Idle` or `Ready` respectively.

use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::entities::{EntityDraft, EntityKind};
use crate::image::ImageResolver;
use crate::routes::Route;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Loading,
    Ready,
    Submitting,
    Success,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("a submission is already in flight")]
    Busy,

    #[error("form is not ready (state {0:?})")]
    NotReady(FormState),

    #[error("nothing to load: form was opened in create mode")]
    NotEditing,
}

/// Outcome of one submit attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Saved; navigate to the route
    Saved(Route),
    /// Validation failed; nothing was sent
    Invalid(ValidationErrors),
    /// Request failed; message for the user
    Failed(String),
}

/// Cached list responses per entity kind.
#[derive(Debug, Default)]
pub struct ListCache {
    lists: HashMap<EntityKind, serde_json::Value>,
}

impl ListCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: EntityKind) -> Option<&serde_json::Value> {
        self.lists.get(&kind)
    }

    pub fn put(&mut self, kind: EntityKind, list: serde_json::Value) {
        self.lists.insert(kind, list);
    }

    pub fn invalidate(&mut self, kind: EntityKind) {
        if self.lists.remove(&kind).is_some() {
            info!("Invalidated cached {} list", kind);
        }
    }

    /// Cached list, fetching it on a miss.
    pub async fn get_or_fetch(
        &mut self,
        api: &ApiClient,
        kind: EntityKind,
    ) -> Result<&serde_json::Value, ApiError> {
        if !self.lists.contains_key(&kind) {
            let list = api.list(kind).await?;
            self.lists.insert(kind, list);
        }
        self.lists
            .get(&kind)
            .ok_or_else(|| ApiError::Decode(format!("{} list missing from cache", kind)))
    }
}

/// Holds a form in a transient state; if dropped before `leave` (the
/// future was cancelled) the form falls back to `fallback`.
struct StateGuard<'a> {
    state: &'a mut FormState,
    during: FormState,
    fallback: FormState,
}

impl<'a> StateGuard<'a> {
    fn enter(state: &'a mut FormState, during: FormState, fallback: FormState) -> Self {
        *state = during;
        Self {
            state,
            during,
            fallback,
        }
    }

    fn leave(self, next: FormState) {
        *self.state = next;
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        if *self.state == self.during {
            *self.state = self.fallback;
        }
    }
}

/// Overlay `overrides` onto `target`; objects merge recursively, anything
/// else replaces.
fn merge_json(target: &mut serde_json::Value, overrides: &serde_json::Value) {
    match (target, overrides) {
        (serde_json::Value::Object(target), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge_json(
                    target.entry(key.clone()).or_insert(serde_json::Value::Null),
                    value,
                );
            }
        }
        (target, value) => *target = value.clone(),
    }
}

/// One open create/edit form.
#[derive(Debug)]
pub struct EntityForm<D: EntityDraft> {
    id: Option<String>,
    state: FormState,
    draft: D,
    errors: ValidationErrors,
    last_error: Option<String>,
    images: ImageResolver,
}

impl<D: EntityDraft> EntityForm<D> {
    /// "New" navigation: blank draft, ready immediately.
    pub fn new_create(images: ImageResolver) -> Self {
        Self {
            id: None,
            state: FormState::Ready,
            draft: D::blank(&images),
            errors: ValidationErrors::new(),
            last_error: None,
            images,
        }
    }

    /// "Edit" navigation: the record must be loaded before submitting.
    pub fn new_edit(id: &str, images: ImageResolver) -> Self {
        Self {
            id: Some(id.to_string()),
            state: FormState::Idle,
            draft: D::blank(&images),
            errors: ValidationErrors::new(),
            last_error: None,
            images,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetch the record being edited and populate the draft.
    pub async fn load(&mut self, api: &ApiClient) -> Result<(), FormError> {
        self.load_with(api, None).await
    }

    /// Like [`load`](Self::load), with `overrides` merged over the fetched
    /// record first. Objects merge key by key, so a partial draft keeps every
    /// stored field it does not mention.
    pub async fn load_with(
        &mut self,
        api: &ApiClient,
        overrides: Option<&serde_json::Value>,
    ) -> Result<(), FormError> {
        let id = self.id.clone().ok_or(FormError::NotEditing)?;
        if self.state != FormState::Idle {
            return Err(FormError::NotReady(self.state));
        }

        let guard = StateGuard::enter(&mut self.state, FormState::Loading, FormState::Idle);
        info!("Loading {} {}", D::KIND, id);

        let fetched = api
            .fetch::<serde_json::Value>(D::KIND, &id)
            .await
            .and_then(|mut record| {
                if let Some(overrides) = overrides {
                    merge_json(&mut record, overrides);
                }
                serde_json::from_value::<D::Record>(record)
                    .map_err(|e| ApiError::Decode(e.to_string()))
            });

        match fetched {
            Ok(record) => {
                self.draft = D::from_record(record, &self.images);
                guard.leave(FormState::Ready);
            }
            Err(e) => {
                warn!("Failed to load {} {}: {}", D::KIND, id, e);
                self.last_error = Some(e.user_message());
                guard.leave(FormState::Idle);
            }
        }
        Ok(())
    }

    /// Validate, then create or update.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        cache: &mut ListCache,
    ) -> Result<SubmitOutcome, FormError> {
        match self.state {
            FormState::Ready => {}
            FormState::Submitting => return Err(FormError::Busy),
            other => return Err(FormError::NotReady(other)),
        }

        self.errors = self.draft.validate();
        if !self.errors.is_empty() {
            info!("{} form has {} validation error(s)", D::KIND, self.errors.len());
            return Ok(SubmitOutcome::Invalid(self.errors.clone()));
        }

        let guard = StateGuard::enter(&mut self.state, FormState::Submitting, FormState::Ready);
        self.last_error = None;
        let body = self.draft.body();

        let result = match &self.id {
            Some(id) => api.update(D::KIND, id, body).await,
            None => api.create(D::KIND, body).await,
        };

        match result {
            Ok(()) => {
                guard.leave(FormState::Success);
                cache.invalidate(D::KIND);
                // Release the submitted draft and any preview it holds
                self.draft = D::blank(&self.images);
                info!("Saved {}", D::KIND);
                Ok(SubmitOutcome::Saved(Route::List(D::KIND)))
            }
            Err(e) => {
                let message = e.user_message();
                warn!("Failed to save {}: {}", D::KIND, e);
                self.last_error = Some(message.clone());
                guard.leave(FormState::Ready);
                Ok(SubmitOutcome::Failed(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FALLBACK_MESSAGE;
    use crate::config::Config;
    use crate::entities::{FaqDraft, GalleryDraft, NewsDraft};
    use crate::i18n::Language;
    use crate::image::{LocalFile, ObjectUrlStore};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn images() -> ImageResolver {
        ImageResolver::new("http://localhost:3000", Arc::new(ObjectUrlStore::new()))
    }

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&Config::for_api(&server.uri()))
    }

    // ==================== State Tests ====================

    #[test]
    fn test_create_starts_ready_edit_starts_idle() {
        let create = EntityForm::<FaqDraft>::new_create(images());
        assert_eq!(create.state(), FormState::Ready);
        assert_eq!(create.id(), None);

        let edit = EntityForm::<FaqDraft>::new_edit("f1", images());
        assert_eq!(edit.state(), FormState::Idle);
    }

    #[tokio::test]
    async fn test_submit_before_load_rejected() {
        let server = MockServer::start().await;
        let mut form = EntityForm::<FaqDraft>::new_edit("f1", images());
        let err = form
            .submit(&client(&server), &mut ListCache::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FormError::NotReady(FormState::Idle)));
    }

    #[tokio::test]
    async fn test_load_in_create_mode_rejected() {
        let server = MockServer::start().await;
        let mut form = EntityForm::<FaqDraft>::new_create(images());
        assert!(matches!(
            form.load(&client(&server)).await,
            Err(FormError::NotEditing)
        ));
    }

    // ==================== Load Tests ====================

    #[tokio::test]
    async fn test_load_populates_draft() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/faq/f1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "f1",
                "question": {"uz": "Savol", "ru": "Вопрос"},
                "answer": {"uz": "Javob"}
            })))
            .mount(&server)
            .await;

        let mut form = EntityForm::<FaqDraft>::new_edit("f1", images());
        form.load(&client(&server)).await.expect("load");

        assert_eq!(form.state(), FormState::Ready);
        assert_eq!(form.draft().question.get(Language::RUSSIAN), Some("Вопрос"));
    }

    #[tokio::test]
    async fn test_load_null_translation_reaches_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/faq/f2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "f2",
                "question": {"uz": null, "ru": "Вопрос"},
                "answer": null
            })))
            .mount(&server)
            .await;

        let mut form = EntityForm::<FaqDraft>::new_edit("f2", images());
        form.load(&client(&server)).await.expect("load");

        assert_eq!(form.state(), FormState::Ready);
        assert_eq!(form.last_error(), None);
        let errors = form.draft().validate();
        assert!(errors.has_error("question", Language::UZBEK));
        assert!(errors.has_error("answer", Language::UZBEK));
    }

    #[tokio::test]
    async fn test_load_failure_returns_to_idle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/faq/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "FAQ not found"})),
            )
            .mount(&server)
            .await;

        let mut form = EntityForm::<FaqDraft>::new_edit("missing", images());
        form.load(&client(&server)).await.expect("load call itself succeeds");

        assert_eq!(form.state(), FormState::Idle);
        assert_eq!(form.last_error(), Some("FAQ not found"));
    }

    // ==================== Submit Tests ====================

    #[tokio::test]
    async fn test_invalid_draft_never_hits_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let mut form = EntityForm::<NewsDraft>::new_create(images());
        let outcome = form
            .submit(&client(&server), &mut ListCache::new())
            .await
            .expect("submit");

        let SubmitOutcome::Invalid(errors) = outcome else {
            panic!("expected validation failure");
        };
        assert!(errors.has_error("title", Language::UZBEK));
        assert_eq!(form.state(), FormState::Ready);
        assert!(form.errors().has_error("title", Language::UZBEK));
    }

    #[tokio::test]
    async fn test_success_invalidates_cache_and_navigates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gallery"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(ObjectUrlStore::new());
        let resolver = ImageResolver::new("http://localhost:3000", store.clone());
        let mut cache = ListCache::new();
        cache.put(EntityKind::Gallery, serde_json::json!([]));
        cache.put(EntityKind::News, serde_json::json!([]));

        let mut form = EntityForm::<GalleryDraft>::new_create(resolver);
        form.draft_mut().title.set(Language::UZBEK, "Rasm");
        form.draft_mut()
            .attach_image(LocalFile::new("a.jpg", "image/jpeg", vec![1, 2, 3]));
        assert_eq!(store.live_count(), 1);

        let outcome = form.submit(&client(&server), &mut cache).await.expect("submit");

        assert!(matches!(outcome, SubmitOutcome::Saved(Route::List(EntityKind::Gallery))));
        assert_eq!(form.state(), FormState::Success);
        assert!(cache.get(EntityKind::Gallery).is_none());
        assert!(cache.get(EntityKind::News).is_some());
        assert_eq!(store.live_count(), 0);
    }

    #[tokio::test]
    async fn test_server_failure_allows_retry() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/faq/f1"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/faq/f1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/faq/f1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "f1",
                "question": {"uz": "Q"},
                "answer": {"uz": "A"}
            })))
            .mount(&server)
            .await;

        let api = client(&server);
        let mut cache = ListCache::new();
        let mut form = EntityForm::<FaqDraft>::new_edit("f1", images());
        form.load(&api).await.expect("load");

        let outcome = form.submit(&api, &mut cache).await.expect("first submit");
        match outcome {
            SubmitOutcome::Failed(message) => assert_eq!(message, FALLBACK_MESSAGE),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(form.state(), FormState::Ready);
        assert_eq!(form.last_error(), Some(FALLBACK_MESSAGE));

        let outcome = form.submit(&api, &mut cache).await.expect("retry");
        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        assert_eq!(form.last_error(), None);
    }

    #[tokio::test]
    async fn test_submit_after_success_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/faq"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let api = client(&server);
        let mut cache = ListCache::new();
        let mut form = EntityForm::<FaqDraft>::new_create(images());
        form.draft_mut().question.set(Language::UZBEK, "Q");
        form.draft_mut().answer.set(Language::UZBEK, "A");

        form.submit(&api, &mut cache).await.expect("submit");
        assert!(matches!(
            form.submit(&api, &mut cache).await,
            Err(FormError::NotReady(FormState::Success))
        ));
    }

    #[tokio::test]
    async fn test_submit_while_submitting_is_busy() {
        let server = MockServer::start().await;
        let mut form = EntityForm::<FaqDraft>::new_create(images());
        form.state = FormState::Submitting;

        assert!(matches!(
            form.submit(&client(&server), &mut ListCache::new()).await,
            Err(FormError::Busy)
        ));
    }

    #[tokio::test]
    async fn test_cancelled_submit_can_be_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/faq"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(5)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/faq"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let api = client(&server);
        let mut cache = ListCache::new();
        let mut form = EntityForm::<FaqDraft>::new_create(images());
        form.draft_mut().question.set(Language::UZBEK, "Q");
        form.draft_mut().answer.set(Language::UZBEK, "A");

        let timed_out =
            tokio::time::timeout(Duration::from_millis(100), form.submit(&api, &mut cache)).await;
        assert!(timed_out.is_err());
        assert_eq!(form.state(), FormState::Ready);

        let outcome = form.submit(&api, &mut cache).await.expect("retry");
        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
    }

    #[tokio::test]
    async fn test_cancelled_load_returns_to_idle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/faq/f1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"_id": "f1"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let mut form = EntityForm::<FaqDraft>::new_edit("f1", images());
        let timed_out =
            tokio::time::timeout(Duration::from_millis(100), form.load(&client(&server))).await;
        assert!(timed_out.is_err());
        assert_eq!(form.state(), FormState::Idle);
    }

    // ==================== Partial Edit Tests ====================

    #[tokio::test]
    async fn test_partial_overrides_keep_stored_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/n1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "n1",
                "title": {"uz": "Eski", "ru": "Старый"},
                "subtitle": {"uz": "Qisqa"},
                "description": {"uz": "Matn"},
                "category": "sport",
                "date": "2026-01-10",
                "image": "/uploads/n1.jpg"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/news/n1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server);
        let mut form = EntityForm::<NewsDraft>::new_edit("n1", images());
        let overrides = serde_json::json!({"title": {"uz": "Yangi"}});
        form.load_with(&api, Some(&overrides)).await.expect("load");
        assert_eq!(form.state(), FormState::Ready);

        let outcome = form.submit(&api, &mut ListCache::new()).await.expect("submit");
        assert!(matches!(outcome, SubmitOutcome::Saved(_)));

        let requests = server.received_requests().await.expect("request recording");
        let body = String::from_utf8_lossy(&requests.last().expect("patch").body).into_owned();
        assert!(body.contains("name=\"title[uz]\"\r\n\r\nYangi\r\n"));
        assert!(body.contains("name=\"title[ru]\"\r\n\r\nСтарый\r\n"));
        assert!(body.contains("name=\"subtitle[uz]\"\r\n\r\nQisqa\r\n"));
        assert!(body.contains("name=\"category\"\r\n\r\nsport\r\n"));
        assert!(body.contains("name=\"date\"\r\n\r\n2026-01-10\r\n"));
        assert!(body.contains("name=\"imageUrl\"\r\n\r\nhttp://localhost:3000/uploads/n1.jpg\r\n"));
    }

    #[test]
    fn test_merge_json_is_deep() {
        let mut record = serde_json::json!({"title": {"uz": "a", "ru": "b"}, "order": 1});
        merge_json(
            &mut record,
            &serde_json::json!({"title": {"uz": "c"}, "order": 2, "isActive": false}),
        );
        assert_eq!(
            record,
            serde_json::json!({"title": {"uz": "c", "ru": "b"}, "order": 2, "isActive": false})
        );
    }

    // ==================== ListCache Tests ====================

    #[tokio::test]
    async fn test_list_cache_fetches_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"_id": "n1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server);
        let mut cache = ListCache::new();
        let first = cache.get_or_fetch(&api, EntityKind::News).await.expect("fetch").clone();
        let second = cache.get_or_fetch(&api, EntityKind::News).await.expect("cached").clone();
        assert_eq!(first, second);
    }
}
