#![allow(dead_code)]

use chrono::NaiveDate;
use people_core::{
    ApiResult, NetworkError, PeopleBackend, PersonId, PersonPayload, PersonRecord,
};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { page: u32, limit: u32 },
    Create(PersonPayload),
    Update(PersonId, PersonPayload),
    Delete(PersonId),
}

/// In-memory backend that paginates like the REST service and records calls.
#[derive(Default)]
pub struct RecordingBackend {
    people: RefCell<Vec<PersonRecord>>,
    calls: RefCell<Vec<Call>>,
    failing: RefCell<HashSet<&'static str>>,
    next_id: Cell<i64>,
}

impl RecordingBackend {
    pub fn with_people(people: Vec<PersonRecord>) -> Self {
        let next_id = people.len() as i64 + 1;
        let backend = Self::default();
        *backend.people.borrow_mut() = people;
        backend.next_id.set(next_id);
        backend
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Makes `op` (`list|create|update|delete`) fail with HTTP 500.
    pub fn fail(&self, op: &'static str) {
        self.failing.borrow_mut().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.borrow_mut().remove(op);
    }

    pub fn people(&self) -> Vec<PersonRecord> {
        self.people.borrow().clone()
    }

    fn check(&self, op: &'static str) -> ApiResult<()> {
        if self.failing.borrow().contains(op) {
            return Err(NetworkError::status(500, "boom"));
        }
        Ok(())
    }
}

impl PeopleBackend for RecordingBackend {
    fn list_people(&self, page: u32, limit: u32) -> ApiResult<Vec<PersonRecord>> {
        self.calls.borrow_mut().push(Call::List { page, limit });
        self.check("list")?;
        let start = (page.saturating_sub(1) * limit) as usize;
        Ok(self
            .people
            .borrow()
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn create_person(&self, payload: &PersonPayload) -> ApiResult<Option<PersonRecord>> {
        self.calls.borrow_mut().push(Call::Create(payload.clone()));
        self.check("create")?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let record = PersonRecord {
            id: PersonId::Number(id),
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            date_of_birth: payload.date_of_birth,
            age: None,
            date_created: None,
        };
        self.people.borrow_mut().push(record.clone());
        Ok(Some(record))
    }

    fn update_person(
        &self,
        id: &PersonId,
        payload: &PersonPayload,
    ) -> ApiResult<Option<PersonRecord>> {
        self.calls
            .borrow_mut()
            .push(Call::Update(id.clone(), payload.clone()));
        self.check("update")?;
        let mut people = self.people.borrow_mut();
        let Some(record) = people.iter_mut().find(|record| &record.id == id) else {
            return Err(NetworkError::status(404, "not found"));
        };
        record.first_name = payload.first_name.clone();
        record.last_name = payload.last_name.clone();
        record.date_of_birth = payload.date_of_birth;
        Ok(Some(record.clone()))
    }

    fn delete_person(&self, id: &PersonId) -> ApiResult<()> {
        self.calls.borrow_mut().push(Call::Delete(id.clone()));
        self.check("delete")?;
        self.people.borrow_mut().retain(|record| &record.id != id);
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn person(id: i64, first: &str, last: &str) -> PersonRecord {
    PersonRecord {
        id: PersonId::Number(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        date_of_birth: date(1990, 1, 1),
        age: Some(34),
        date_created: None,
    }
}

/// `count` people named `P<n> Person`, ids 1..=count.
pub fn numbered_people(count: i64) -> Vec<PersonRecord> {
    (1..=count)
        .map(|i| person(i, &format!("P{i}"), "Person"))
        .collect()
}
