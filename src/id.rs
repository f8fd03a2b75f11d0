//! Prefixed ID generation for SmartAICopy entities.
//!
//! All IDs use an `sc_` brand prefix to guarantee collision avoidance with
//! payment provider IDs (Stripe's `pi_`, `cus_`, etc.).
//!
//! Format: `sc_{entity}_{uuid_simple}` (32 hex chars, no hyphens)

use uuid::Uuid;

/// All known entity prefixes for validation.
const ALL_PREFIXES: &[&str] = &["sc_usr_", "sc_opt_", "sc_sess_"];

/// Validate that a string is a valid SmartAICopy prefixed ID.
///
/// This is a cheap check to reject garbage before hitting the database.
/// Validates format: `sc_{entity}_{32_hex_chars}`
pub fn is_valid_prefixed_id(s: &str) -> bool {
    let Some(prefix) = ALL_PREFIXES.iter().find(|p| s.starts_with(*p)) else {
        return false;
    };

    let hex_part = &s[prefix.len()..];
    hex_part.len() == 32 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

/// Entity types that have prefixed IDs.
#[derive(Debug, Clone, Copy)]
pub enum EntityType {
    User,
    Optimization,
    Session,
}

impl EntityType {
    /// Returns the prefix for this entity type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::User => "sc_usr",
            Self::Optimization => "sc_opt",
            Self::Session => "sc_sess",
        }
    }

    /// Generates a new prefixed ID for this entity type.
    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }
}
