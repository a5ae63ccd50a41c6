/// Email template functions
use super::{send_email, EmailResult};

/// Send the signup confirmation code.
///
/// The raw code is embedded in the plain-text body; it is the only
/// channel the code ever travels through.
pub async fn send_confirmation_code_email(
    to: &str,
    username: &str,
    code: &str,
) -> EmailResult<()> {
    let body_text = format!(
        r#"Hello {},

Your confirmation code for API access:

{}

Exchange it together with your username for a bearer token at
/api/v1/auth/token.

If you did not request this code, please ignore this email.

---
Critique
"#,
        username, code
    );

    send_email(to, "Your confirmation code", &body_text).await
}
