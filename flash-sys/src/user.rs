// SPDX-License-Identifier: GPL-3.0-only

//! The account the flash script should hand files back to

use tracing::debug;

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn username_for_uid(uid: u32) -> Option<String> {
    unsafe {
        let pw = libc::getpwuid(uid as libc::uid_t);
        if pw.is_null() {
            return None;
        }
        let name = std::ffi::CStr::from_ptr((*pw).pw_name);
        name.to_str().ok().map(|name| name.to_string())
    }
}

/// Name of the user who launched the utility.
///
/// When started through `sudo` this is the original user, not root.
pub fn invoking_user() -> String {
    if let Some(user) = non_empty_env("SUDO_USER") {
        debug!("Invoking user from SUDO_USER: {}", user);
        return user;
    }

    let uid = unsafe { libc::getuid() };
    if let Some(user) = username_for_uid(uid) {
        return user;
    }

    non_empty_env("USER")
        .or_else(|| non_empty_env("LOGNAME"))
        .unwrap_or_else(|| uid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_uid_resolves() {
        assert_eq!(username_for_uid(0).as_deref(), Some("root"));
    }

    #[test]
    fn invoking_user_is_never_empty() {
        assert!(!invoking_user().is_empty());
    }
}
