//! User accounts: registration, credential checks, the per-user device
//! limit, VIP gating and admin-side management.
//!
//! Passwords are stored as Argon2id PHC strings. Login is allowed from at
//! most [`MAX_DEVICES`] devices per user; a new device beyond that is
//! rejected until the user deregisters one.

use crate::error::{AccountError, Result as StoreResult};
use crate::store::UserStore;
use crate::types::Device;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const MAX_DEVICES: usize = 2;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"));

/// Stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub phone: String,
    pub is_vip: bool,
    pub vip_expiry_date: Option<NaiveDate>,
    pub devices: Vec<Device>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// VIP flag checked against the expiry date, inclusive of that day.
    /// A VIP without an expiry date never lapses.
    pub fn vip_active(&self, today: NaiveDate) -> bool {
        self.is_vip && self.vip_expiry_date.map_or(true, |expiry| today <= expiry)
    }

    /// VIP access, with the admin always allowed.
    pub fn has_vip_access(&self, admin_username: &str, today: NaiveDate) -> bool {
        self.username == admin_username || self.vip_active(today)
    }

    /// Public view without the password hash.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            is_vip: self.is_vip,
            vip_expiry_date: self.vip_expiry_date,
            devices: self.devices.clone(),
            created_at: self.created_at,
        }
    }
}

/// Account as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub is_vip: bool,
    pub vip_expiry_date: Option<NaiveDate>,
    pub devices: Vec<Device>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Admin edit of an account. `password: None` (or empty) keeps the current
/// password; `devices: None` keeps the device list.
#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default)]
    pub vip_expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub devices: Option<Vec<Device>>,
}

pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AccountError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AccountError::Hashing(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn require(value: &str, field: &'static str) -> Result<(), AccountError> {
    if value.trim().is_empty() {
        Err(AccountError::MissingField(field))
    } else {
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), AccountError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(AccountError::InvalidEmail(email.to_string()))
    }
}

/// Whether `value` is already a username, email or phone of an account
/// other than `except`. Login accepts any of the three, so they share one
/// namespace.
fn claimed_by_other<S: UserStore + ?Sized>(
    store: &S,
    value: &str,
    except: Option<&str>,
) -> StoreResult<bool> {
    let other = |user: Option<UserRecord>| user.is_some_and(|u| Some(u.username.as_str()) != except);
    Ok(other(store.get_user(value)?)
        || other(store.find_user_by_email(value)?)
        || other(store.find_user_by_phone(value)?))
}

/// Check username, email and phone are free, ignoring the account named `except`.
fn ensure_unique<S: UserStore + ?Sized>(
    store: &S,
    username: &str,
    email: &str,
    phone: &str,
    except: Option<&str>,
) -> Result<(), AccountError> {
    if claimed_by_other(store, username, except)? {
        return Err(AccountError::DuplicateUsername(username.to_string()));
    }
    if claimed_by_other(store, email, except)? {
        return Err(AccountError::DuplicateEmail(email.to_string()));
    }
    if claimed_by_other(store, phone, except)? {
        return Err(AccountError::DuplicatePhone(phone.to_string()));
    }
    Ok(())
}

/// Validate a registration form against the directory without hashing.
///
/// `admin_username` is reserved whether or not the admin account exists yet.
pub fn check_registration<S: UserStore + ?Sized>(
    store: &S,
    form: &RegistrationForm,
    admin_username: &str,
) -> Result<(), AccountError> {
    let username = form.username.trim();
    let email = form.email.trim();
    let phone = form.phone.trim();

    require(username, "username")?;
    require(&form.password, "password")?;
    require(&form.confirm_password, "confirm_password")?;
    require(email, "email")?;
    require(phone, "phone")?;

    if form.password != form.confirm_password {
        return Err(AccountError::PasswordMismatch);
    }
    validate_email(email)?;
    if username == admin_username {
        return Err(AccountError::ReservedUsername(username.to_string()));
    }
    ensure_unique(store, username, email, phone, None)
}

/// Insert a new, non-VIP account with no devices from a form and the
/// Argon2 hash of its password. The form is checked again before insert.
pub fn create_account<S: UserStore + ?Sized>(
    store: &S,
    form: &RegistrationForm,
    admin_username: &str,
    password_hash: String,
    now: DateTime<Utc>,
) -> Result<UserRecord, AccountError> {
    check_registration(store, form, admin_username)?;

    let user = UserRecord {
        username: form.username.trim().to_string(),
        password_hash,
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        is_vip: false,
        vip_expiry_date: None,
        devices: Vec::new(),
        created_at: now,
    };
    store.insert_user(&user)?;

    tracing::info!(username = %user.username, "registered user");
    Ok(user)
}

/// Create a new, non-VIP account with no devices.
pub fn register<S: UserStore + ?Sized>(
    store: &S,
    form: &RegistrationForm,
    admin_username: &str,
    now: DateTime<Utc>,
) -> Result<UserRecord, AccountError> {
    check_registration(store, form, admin_username)?;
    let password_hash = hash_password(&form.password)?;
    create_account(store, form, admin_username, password_hash, now)
}

/// Username first, then email, then phone.
fn find_by_identifier<S: UserStore + ?Sized>(store: &S, identifier: &str) -> StoreResult<Option<UserRecord>> {
    if let Some(user) = store.get_user(identifier)? {
        return Ok(Some(user));
    }
    if let Some(user) = store.find_user_by_email(identifier)? {
        return Ok(Some(user));
    }
    store.find_user_by_phone(identifier)
}

/// First half of a login: validate the fields and find the account the
/// identifier names. The password is not checked here.
pub fn login_account<S: UserStore + ?Sized>(
    store: &S,
    identifier: &str,
    password: &str,
    device_id: &str,
) -> Result<UserRecord, AccountError> {
    let identifier = identifier.trim();
    require(identifier, "identifier")?;
    require(password, "password")?;
    require(device_id, "device_id")?;

    find_by_identifier(store, identifier)?.ok_or(AccountError::InvalidCredentials)
}

/// Second half of a login, once the password has been verified: register
/// `device_id` against the device limit.
///
/// A known device has its `last_login` refreshed. A new device is added
/// while fewer than [`MAX_DEVICES`] are registered, otherwise the login is
/// refused and the stored devices stay as they were.
pub fn record_login<S: UserStore + ?Sized>(
    store: &S,
    username: &str,
    device_id: &str,
    now: DateTime<Utc>,
) -> Result<UserRecord, AccountError> {
    let mut user = store
        .get_user(username)?
        .ok_or(AccountError::InvalidCredentials)?;

    if let Some(device) = user.devices.iter_mut().find(|d| d.id == device_id) {
        device.last_login = now;
    } else if user.devices.len() < MAX_DEVICES {
        user.devices.push(Device {
            id: device_id.to_string(),
            last_login: now,
        });
    } else {
        tracing::warn!(username = %user.username, "login refused: device limit reached");
        return Err(AccountError::DeviceLimitReached { limit: MAX_DEVICES });
    }

    store.replace_user(username, &user)?;
    tracing::info!(username = %user.username, devices = user.devices.len(), "user logged in");
    Ok(user)
}

/// Check credentials and register `device_id` against the device limit.
pub fn login<S: UserStore + ?Sized>(
    store: &S,
    identifier: &str,
    password: &str,
    device_id: &str,
    now: DateTime<Utc>,
) -> Result<UserRecord, AccountError> {
    let user = login_account(store, identifier, password, device_id)?;
    if !verify_password(password, &user.password_hash)? {
        return Err(AccountError::InvalidCredentials);
    }
    record_login(store, &user.username, device_id, now)
}

/// Remove a device from the user's list. Unknown devices are ignored.
pub fn deregister_device<S: UserStore + ?Sized>(
    store: &S,
    username: &str,
    device_id: &str,
) -> Result<UserRecord, AccountError> {
    let mut user = store
        .get_user(username)?
        .ok_or_else(|| AccountError::UserNotFound(username.to_string()))?;

    let before = user.devices.len();
    user.devices.retain(|d| d.id != device_id);
    if user.devices.len() != before {
        store.replace_user(username, &user)?;
        tracing::info!(username, device_id, "device deregistered");
    }
    Ok(user)
}

/// Store a new password hash for an existing account.
pub fn set_password_hash<S: UserStore + ?Sized>(
    store: &S,
    username: &str,
    password_hash: String,
) -> Result<(), AccountError> {
    let mut user = store
        .get_user(username)?
        .ok_or_else(|| AccountError::UserNotFound(username.to_string()))?;
    user.password_hash = password_hash;
    store.replace_user(username, &user)?;
    tracing::info!(username, "password changed");
    Ok(())
}

pub fn check_new_password(new_password: &str) -> Result<(), AccountError> {
    require(new_password, "new_password")
}

pub fn change_password<S: UserStore + ?Sized>(
    store: &S,
    username: &str,
    current: &str,
    new_password: &str,
) -> Result<(), AccountError> {
    check_new_password(new_password)?;

    let user = store
        .get_user(username)?
        .ok_or_else(|| AccountError::UserNotFound(username.to_string()))?;
    if !verify_password(current, &user.password_hash)? {
        return Err(AccountError::InvalidCredentials);
    }
    set_password_hash(store, username, hash_password(new_password)?)
}

impl UserUpdate {
    /// The replacement password, if one was given.
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// Apply an admin edit with the new password already hashed.
///
/// A rename goes through a single [`UserStore::replace_user`], which moves
/// the account's progress, activity log and recent searches with it.
pub fn apply_user_update<S: UserStore + ?Sized>(
    store: &S,
    original_username: &str,
    update: &UserUpdate,
    password_hash: Option<String>,
) -> Result<UserRecord, AccountError> {
    let current = store
        .get_user(original_username)?
        .ok_or_else(|| AccountError::UserNotFound(original_username.to_string()))?;

    let username = update.username.trim();
    let email = update.email.trim();
    let phone = update.phone.trim();
    require(username, "username")?;
    require(email, "email")?;
    require(phone, "phone")?;
    validate_email(email)?;
    ensure_unique(store, username, email, phone, Some(original_username))?;

    let devices = update.devices.clone().unwrap_or(current.devices);
    if devices.len() > MAX_DEVICES {
        return Err(AccountError::DeviceLimitReached { limit: MAX_DEVICES });
    }

    let user = UserRecord {
        username: username.to_string(),
        password_hash: password_hash.unwrap_or(current.password_hash),
        email: email.to_string(),
        phone: phone.to_string(),
        is_vip: update.is_vip,
        vip_expiry_date: update.vip_expiry_date,
        devices,
        created_at: current.created_at,
    };
    store.replace_user(original_username, &user)?;

    if username != original_username {
        tracing::info!(from = original_username, to = username, "user renamed");
    }
    Ok(user)
}

/// Apply an admin edit. Renaming moves the user's progress, activity log and
/// recent searches.
pub fn update_user<S: UserStore + ?Sized>(
    store: &S,
    original_username: &str,
    update: &UserUpdate,
) -> Result<UserRecord, AccountError> {
    let password_hash = update.new_password().map(hash_password).transpose()?;
    apply_user_update(store, original_username, update, password_hash)
}

/// Remove an account together with its progress, activity log and recent searches.
pub fn delete_user<S: UserStore + ?Sized>(store: &S, username: &str) -> Result<(), AccountError> {
    if !store.delete_user(username)? {
        return Err(AccountError::UserNotFound(username.to_string()));
    }
    tracing::info!(username, "user deleted");
    Ok(())
}

/// Every account except the admin.
pub fn list_users<S: UserStore + ?Sized>(store: &S, admin_username: &str) -> StoreResult<Vec<UserRecord>> {
    Ok(store
        .list_users()?
        .into_iter()
        .filter(|u| u.username != admin_username)
        .collect())
}

/// Create the admin account if it does not exist yet. Returns whether it was created.
pub fn ensure_admin<S: UserStore + ?Sized>(
    store: &S,
    admin_username: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<bool, AccountError> {
    if store.get_user(admin_username)?.is_some() {
        return Ok(false);
    }
    require(password, "password")?;

    let admin = UserRecord {
        username: admin_username.to_string(),
        password_hash: hash_password(password)?,
        email: format!("{}@localhost.localdomain", admin_username),
        phone: format!("admin:{}", admin_username),
        is_vip: true,
        vip_expiry_date: None,
        devices: Vec::new(),
        created_at: now,
    };
    store.insert_user(&admin)?;
    tracing::info!(username = admin_username, "seeded admin account");
    Ok(true)
}
