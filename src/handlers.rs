//! Built-in argument table used by the `argtable` binary.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::args::{ArgRegistry, HandlerError, RegistryError, ReusePolicy};

/// Most accounts one invocation may add.
pub const MAX_ACCOUNTS: u32 = 8;

/// State the built-in handlers write to.
#[derive(Debug, Default)]
pub struct Session {
    /// Accounts added with `-add-account=NAME`, in order.
    pub accounts: Vec<String>,
    /// Values given to `-arg2`, in order.
    pub values: Vec<String>,
    /// Switches seen, in order.
    pub switches: Vec<&'static str>,
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Build the built-in registry. Handlers print a line to `out` and record
/// what they saw in `session`.
pub fn builtin_registry<W>(
    session: SharedSession,
    out: Arc<Mutex<W>>,
) -> Result<ArgRegistry, RegistryError>
where
    W: Write + Send + 'static,
{
    let (s1, o1) = (session.clone(), out.clone());
    let (s2, o2) = (session.clone(), out.clone());
    let (s3, o3) = (session.clone(), out.clone());
    let (s4, o4) = (session, out);

    ArgRegistry::builder()
        .arg("-arg1", ReusePolicy::Forbidden, move |value| {
            reject_value(value)?;
            tracing::info!("arg1 switch set");
            s1.lock().switches.push("-arg1");
            writeln!(o1.lock(), "Hello from arg1")?;
            Ok(())
        })
        .arg("-arg2", ReusePolicy::AllowedUpTo(5), move |value| {
            let value = value.ok_or(HandlerError::MissingValue)?;
            tracing::info!(value, "arg2 value received");
            s2.lock().values.push(value.to_string());
            writeln!(o2.lock(), "arg2 val : {}", value)?;
            Ok(())
        })
        .arg("-arg3", ReusePolicy::Forbidden, move |value| {
            reject_value(value)?;
            tracing::info!("arg3 switch set");
            s3.lock().switches.push("-arg3");
            writeln!(o3.lock(), "Hello from arg3")?;
            Ok(())
        })
        .arg("-add-account", ReusePolicy::AllowedUpTo(MAX_ACCOUNTS), move |value| {
            let name = value.ok_or(HandlerError::MissingValue)?.trim();
            if name.is_empty() {
                return Err(HandlerError::Rejected("account name must not be empty".into()));
            }

            let mut session = s4.lock();
            if session.accounts.iter().any(|a| a == name) {
                return Err(HandlerError::Rejected(format!("account '{}' already added", name)));
            }
            session.accounts.push(name.to_string());
            tracing::info!(account = name, total = session.accounts.len(), "Account added");
            writeln!(o4.lock(), "Account added: {}", name)?;
            Ok(())
        })
        .build()
}

fn reject_value(value: Option<&str>) -> Result<(), HandlerError> {
    match value {
        Some(v) => Err(HandlerError::UnexpectedValue(v.to_string())),
        None => Ok(()),
    }
}
