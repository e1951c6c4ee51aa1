//! Database credential generation for new tenants

use rand::Rng;

use crate::types::DatabaseCredentials;

/// Length of generated database passwords
pub const PASSWORD_LENGTH: usize = 16;

/// Letters, digits and a punctuation subset that needs no escaping in
/// connection strings
const PASSWORD_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";

/// Derive the physical database name and role name for a tenant slug.
///
/// Deterministic: the same slug always yields the same pair.
pub fn derive_names(tenant_slug: &str) -> (String, String) {
    (
        format!("{}_compliance_db", tenant_slug),
        format!("{}_user", tenant_slug),
    )
}

/// Draw a random password from [`PASSWORD_ALPHABET`] using the thread-local
/// CSPRNG.
pub fn generate_password() -> String {
    let mut rng = rand::rng();
    (0..PASSWORD_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..PASSWORD_ALPHABET.len());
            char::from(PASSWORD_ALPHABET[idx])
        })
        .collect()
}

/// Generate the full credential set for an already normalized slug
pub fn generate_database_credentials(tenant_slug: &str) -> DatabaseCredentials {
    let (database_name, database_user) = derive_names(tenant_slug);
    DatabaseCredentials {
        database_name,
        database_user,
        password: generate_password(),
    }
}
