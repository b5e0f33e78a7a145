//! Criteria predicate used by the store's search.
//!
//! kind, sex, body type and age compare for equality against variety, sex,
//! build and age; color is a substring test against the hair type.
use crate::types::{Pet, SearchCriteria};

pub fn matches(pet: &Pet, criteria: &SearchCriteria) -> bool {
    exact(&criteria.kind, &pet.variety)
        && exact(&criteria.sex, &pet.sex)
        && exact(&criteria.body_type, &pet.build)
        && exact(&criteria.age, &pet.age)
        && contains(&criteria.color, &pet.hair_type)
}

/// Matching pets in input order.
pub fn filter<'a>(
    pets: &'a [Pet],
    criteria: &'a SearchCriteria,
) -> impl Iterator<Item = &'a Pet> + 'a {
    pets.iter().filter(move |p| matches(p, criteria))
}

fn wanted(field: &Option<String>) -> Option<&str> { field.as_deref().filter(|s| !s.is_empty()) }

fn exact(field: &Option<String>, value: &str) -> bool {
    wanted(field).map_or(true, |w| w == value)
}

fn contains(field: &Option<String>, value: &str) -> bool {
    wanted(field).map_or(true, |w| value.contains(w))
}
