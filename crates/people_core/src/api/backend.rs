//! Backend contract consumed by the directory store.

use crate::api::error::ApiResult;
use crate::model::person::{PersonId, PersonPayload, PersonRecord};

/// People REST backend.
///
/// `page` is 1-based as on the wire. Create and update return the record the
/// backend echoed, or `None` when the body was not a person record; callers
/// re-fetch either way.
pub trait PeopleBackend {
    /// `GET /api/people?page=<page>&limit=<limit>`
    fn list_people(&self, page: u32, limit: u32) -> ApiResult<Vec<PersonRecord>>;
    /// `POST /api/people`
    fn create_person(&self, payload: &PersonPayload) -> ApiResult<Option<PersonRecord>>;
    /// `PUT /api/people/{id}`
    fn update_person(
        &self,
        id: &PersonId,
        payload: &PersonPayload,
    ) -> ApiResult<Option<PersonRecord>>;
    /// `DELETE /api/people/{id}`
    fn delete_person(&self, id: &PersonId) -> ApiResult<()>;
}

impl<B: PeopleBackend + ?Sized> PeopleBackend for &B {
    fn list_people(&self, page: u32, limit: u32) -> ApiResult<Vec<PersonRecord>> {
        (**self).list_people(page, limit)
    }

    fn create_person(&self, payload: &PersonPayload) -> ApiResult<Option<PersonRecord>> {
        (**self).create_person(payload)
    }

    fn update_person(
        &self,
        id: &PersonId,
        payload: &PersonPayload,
    ) -> ApiResult<Option<PersonRecord>> {
        (**self).update_person(id, payload)
    }

    fn delete_person(&self, id: &PersonId) -> ApiResult<()> {
        (**self).delete_person(id)
    }
}
