//! Bearer credential kept in the browser's `localStorage`.

use mill_api::CredentialStore;
use web_sys::window;

/// `localStorage` key the login page writes the token to.
pub const TOKEN_KEY: &str = "token";
/// Where a rejected session is sent.
pub const LOGIN_PATH: &str = "/login";

fn get_local_storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

/// Reads the token on every request, so a fresh login is picked up without
/// rebuilding the data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageCredentials;

impl CredentialStore for LocalStorageCredentials {
    fn token(&self) -> Option<String> {
        get_local_storage()?
            .get_item(TOKEN_KEY)
            .ok()?
            .filter(|token| !token.trim().is_empty())
    }

    /// Forget the token and go to the login page.
    fn clear(&self) {
        if let Some(storage) = get_local_storage() {
            let _ = storage.remove_item(TOKEN_KEY);
        }
        log::warn!("[Mill] Session rejected; redirecting to {}", LOGIN_PATH);
        if let Some(window) = window() {
            let _ = window.location().set_href(LOGIN_PATH);
        }
    }
}
