use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{char_len, Fields, FieldErrors, Presence, Schema};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub const NAME_MIN: usize = 2;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("email regex compiles")
});

/// Syntactic email check. Uniqueness is the store's job.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, _)) = email.split_once('@') else {
        return false;
    };
    !local.starts_with('.') && !local.ends_with('.') && !local.contains("..") && EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
}

impl NewUser {
    pub fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            email: Set(self.email),
            name: Set(self.name),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
    }
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none()
    }

    /// Copy supplied fields onto `am`; unsupplied ones keep their value.
    pub fn apply(self, am: &mut ActiveModel) {
        if let Some(email) = self.email {
            am.email = Set(email);
        }
        if let Some(name) = self.name {
            am.name = Set(Some(name));
        }
    }
}

pub struct UserSchema;

fn read_email(fields: &mut Fields<'_>, presence: Presence) -> Option<String> {
    let email = fields.string("email", presence)?;
    if !is_valid_email(&email) {
        fields.reject("email", "Invalid email");
        return None;
    }
    Some(email)
}

fn read_name(fields: &mut Fields<'_>) -> Option<String> {
    let name = fields.string("name", Presence::Optional)?;
    if char_len(&name) < NAME_MIN {
        fields.reject("name", format!("String must contain at least {NAME_MIN} character(s)"));
        return None;
    }
    Some(name)
}

impl Schema for UserSchema {
    type Create = NewUser;
    type Patch = UserPatch;

    fn validate_create(candidate: &Value) -> Result<NewUser, FieldErrors> {
        let mut fields = Fields::new(candidate);
        let email = read_email(&mut fields, Presence::Required);
        let name = read_name(&mut fields);
        fields.finish(|| NewUser { email: email.unwrap_or_default(), name })
    }

    fn validate_patch(candidate: &Value) -> Result<UserPatch, FieldErrors> {
        let mut fields = Fields::new(candidate);
        let email = read_email(&mut fields, Presence::Optional);
        let name = read_name(&mut fields);
        fields.finish(|| UserPatch { email, name })
    }
}
