use serde::{Deserialize, Serialize};

/// One registered user as returned by the directory API.
///
/// The live API still carries a few misspelled field names (`_id`,
/// `student_parrent`, `parnet_full_name`); serde aliases accept both the
/// spelled-out names and the wire names so the client works against either.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub telegram_id: Option<i64>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default, alias = "student_parrent")]
    pub student_parent: Option<String>,
    #[serde(default, alias = "parnet_full_name")]
    pub parent_full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentParent {
    Father,
    Mother,
}

impl StudentParent {
    /// Parse the wire value; anything unrecognized is treated as unset.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "Father" => Some(StudentParent::Father),
            "Mother" => Some(StudentParent::Mother),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StudentParent::Father => "Father",
            StudentParent::Mother => "Mother",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Uz,
    Ru,
}

impl Language {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "uz" => Some(Language::Uz),
            "ru" => Some(Language::Ru),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::Uz => "Uzbek",
            Language::Ru => "Russian",
        }
    }
}

impl UserRecord {
    pub fn student_parent(&self) -> Option<StudentParent> {
        self.student_parent
            .as_deref()
            .and_then(StudentParent::from_wire)
    }

    pub fn language(&self) -> Option<Language> {
        self.language.as_deref().and_then(Language::from_wire)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of the approve call: the only mutation the console sends.
#[derive(Debug, Serialize)]
pub struct CheckedUpdate {
    pub checked: bool,
}
