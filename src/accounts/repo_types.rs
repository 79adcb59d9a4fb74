use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_PROFILE_PICTURE: &str =
    "https://img.freepik.com/premium-vector/user-profile-icon-flat-style-member-avatar-vector-illustration-isolated-background-human-permission-sign-business-concept_157943-15752.jpg";

/// Account record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 PHC string, never exposed in JSON
    pub is_admin: bool,
    pub profile_picture: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields the caller supplies on insert; id and timestamps come from the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub profile_picture: String,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
    pub profile_picture: Option<String>,
}

impl AccountPatch {
    pub(crate) fn apply(self, account: &mut Account) {
        if let Some(v) = self.username {
            account.username = v;
        }
        if let Some(v) = self.email {
            account.email = v;
        }
        if let Some(v) = self.password_hash {
            account.password_hash = v;
        }
        if let Some(v) = self.is_admin {
            account.is_admin = v;
        }
        if let Some(v) = self.profile_picture {
            account.profile_picture = v;
        }
    }
}

/// Public part of the account returned to the session owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub profile_picture: String,
}

impl From<Account> for PublicAccount {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            username: a.username,
            email: a.email,
            is_admin: a.is_admin,
            profile_picture: a.profile_picture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Account {
        let now = OffsetDateTime::now_utc();
        Account {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            is_admin: false,
            profile_picture: DEFAULT_PROFILE_PICTURE.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn account_serialization_omits_password_hash() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2"));
        assert_eq!(json["username"], "alice");
        assert_eq!(json["isAdmin"], false);
        assert!(json.get("_id").is_some());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut account = sample();
        AccountPatch {
            profile_picture: Some("https://img/new.png".into()),
            ..Default::default()
        }
        .apply(&mut account);
        assert_eq!(account.profile_picture, "https://img/new.png");
        assert_eq!(account.username, "alice");
    }
}
