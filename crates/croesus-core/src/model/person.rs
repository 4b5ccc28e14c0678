use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
}

/// Bank account known to belong to a [`Person`], keyed by IBAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonAccount {
    pub id: i64,
    pub person_id: i64,
    pub iban: String,
    pub bic: Option<String>,
}
