/// One-shot account tokens
///
/// These are the short-lived secrets mailed to users for email
/// confirmation and password reset. A token lives in the user's `token`
/// column until the flow that issued it completes, at which point it is
/// cleared and can never be used again.
///
/// The token is an opaque hex string; it carries no structure and is
/// only ever matched by equality.
///
/// # Example
///
/// ```
/// use workroom_shared::auth::tokens::{generate_account_token, ACCOUNT_TOKEN_LENGTH};
///
/// let token = generate_account_token();
/// assert_eq!(token.len(), ACCOUNT_TOKEN_LENGTH);
/// assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
use rand::Rng;

/// Length of a generated token in characters
pub const ACCOUNT_TOKEN_LENGTH: usize = 40;

/// Generates a fresh one-shot token
///
/// 20 random bytes, hex encoded. The space is large enough that
/// collisions and guessing are not a practical concern.
pub fn generate_account_token() -> String {
    let bytes: [u8; ACCOUNT_TOKEN_LENGTH / 2] = rand::thread_rng().gen();
    hex::encode(bytes)
}
