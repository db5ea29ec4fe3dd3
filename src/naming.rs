//! Name derivation from raw field keys.
//!
//! ```text
//! birthday     -> BIRTHDAY       (store field key)
//!              -> UPDATE_BIRTHDAY (action type key)
//!              -> updateBirthday  (setter)
//!              -> getBirthday     (getter)
//! ```

/// Prefix of every action type key. Raw field keys may not start with it.
pub const ACTION_PREFIX: &str = "UPDATE";

/// Separator used inside constant names. Raw field keys may not start with it.
pub const SEPARATOR: char = '_';

const SETTER_PREFIX: &str = "update";
const GETTER_PREFIX: &str = "get";
const WORD_BREAK: char = '-';

/// `profileName` -> `PROFILE_NAME`
///
/// Every ASCII capital starts a new word, so acronyms are split letter by
/// letter (`userID` -> `USER_I_D`). No break is inserted at the start of the
/// key or right after an existing separator.
pub fn store_field_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() * 2);
    let mut prev: Option<char> = None;
    for c in raw.chars() {
        let after_separator = matches!(prev, None | Some(WORD_BREAK) | Some(SEPARATOR));
        if c.is_ascii_uppercase() && !after_separator {
            out.push(SEPARATOR);
        }
        out.push(if c == WORD_BREAK { SEPARATOR } else { c });
        prev = Some(c);
    }
    out.to_uppercase()
}

/// `profileName` -> `UPDATE_PROFILE_NAME`
pub fn action_type_key(raw: &str) -> String {
    format!("{}{}{}", ACTION_PREFIX, SEPARATOR, store_field_key(raw))
}

/// `profileName` -> `updateProfileName`, `userID` -> `updateUserID`
pub fn setter_method_name(raw: &str) -> String {
    let lowered = action_type_key(raw).to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut chars = lowered.chars();
    while let Some(c) = chars.next() {
        if c != SEPARATOR {
            out.push(c);
            continue;
        }
        // A separator upper-cases the character after it and is dropped.
        match chars.next() {
            Some(SEPARATOR) | None => out.push(WORD_BREAK),
            Some(next) => out.extend(next.to_uppercase()),
        }
    }
    out
}

/// `profileName` -> `getProfileName`
pub fn getter_method_name(raw: &str) -> String {
    let setter = setter_method_name(raw);
    match setter.strip_prefix(SETTER_PREFIX) {
        Some(rest) => format!("{}{}", GETTER_PREFIX, rest),
        None => setter,
    }
}

/// All four identifiers derived from one raw field key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    pub field: String,
    pub store_field_key: String,
    pub action_type_key: String,
    pub setter: String,
    pub getter: String,
}

impl DerivedNames {
    pub fn derive(raw: &str) -> Self {
        Self {
            field: raw.to_string(),
            store_field_key: store_field_key(raw),
            action_type_key: action_type_key(raw),
            setter: setter_method_name(raw),
            getter: getter_method_name(raw),
        }
    }
}

/// Check that a raw field key honours the naming contract.
///
/// Returns the reason on failure.
pub fn check_field_key(raw: &str) -> Result<(), String> {
    if raw.is_empty() {
        return Err("Data source key can not be empty".to_string());
    }
    if raw.starts_with(SEPARATOR) {
        return Err(format!(
            "Data source key can not start with '{}' (key: {})",
            SEPARATOR, raw
        ));
    }
    if raw.starts_with(ACTION_PREFIX) {
        return Err(format!(
            "Data source key can not start with '{}' (key: {})",
            ACTION_PREFIX, raw
        ));
    }
    if !raw.chars().any(|c| c.is_alphanumeric()) {
        return Err(format!("Data source key has no usable characters (key: {})", raw));
    }
    Ok(())
}
