/// Authentication and authorization
///
/// Identity is three layers that deliberately stay separate:
///
/// - `password` - Argon2id hashing for stored credentials
/// - `jwt` - signed session tokens issued at login
/// - `tokens` - one-shot tokens mailed for confirmation and reset
///
/// On top of identity sit the access rules:
///
/// - `principal` - the authenticated caller, as middleware attaches it
/// - `authorization` - pure creator/collaborator permission checks
pub mod authorization;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod tokens;

// Re-export the types the API touches on every request
pub use authorization::AccessError;
pub use principal::Principal;
