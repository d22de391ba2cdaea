//! Session and navigation: which screen is active and who is using the app.
//!
//! The screen graph mirrors the window flow: `Welcome` fans out to login,
//! signup, guest browsing and admin login; entering `MainApp` or `AdminPanel`
//! requires the matching account-store check, everything else is
//! unconditional navigation. The session identity is transient process state,
//! set on successful login and cleared only by logout.

use crate::accounts::AccountStore;
use crate::model::Identity;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Login,
    Signup,
    AdminLogin,
    MainApp,
    Profile,
    AdminPanel,
    AdminProfile,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    #[error("no transition to {to:?} from {from:?}")]
    WrongScreen { from: Screen, to: Screen },
}

pub struct Navigator {
    screen: Screen,
    current_user: Option<String>,
}

impl Navigator {
    pub fn new() -> Self {
        Navigator {
            screen: Screen::Welcome,
            current_user: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    /// Identity used for watchlist storage: the session user, or the shared
    /// guest bucket.
    pub fn identity(&self) -> Identity {
        match &self.current_user {
            Some(name) => Identity::User(name.clone()),
            None => Identity::Guest,
        }
    }

    fn goto(&mut self, from: &[Screen], to: Screen) -> Result<(), NavError> {
        if from.contains(&self.screen) {
            self.screen = to;
            Ok(())
        } else {
            Err(NavError::WrongScreen {
                from: self.screen,
                to,
            })
        }
    }

    pub fn to_login(&mut self) -> Result<(), NavError> {
        self.goto(&[Screen::Welcome], Screen::Login)
    }

    pub fn to_signup(&mut self) -> Result<(), NavError> {
        self.goto(&[Screen::Welcome], Screen::Signup)
    }

    pub fn to_admin_login(&mut self) -> Result<(), NavError> {
        self.goto(&[Screen::Welcome], Screen::AdminLogin)
    }

    /// Guest browsing: straight to the main view without a session identity.
    pub fn browse_as_guest(&mut self) -> Result<(), NavError> {
        self.goto(&[Screen::Welcome], Screen::MainApp)?;
        self.current_user = None;
        Ok(())
    }

    /// Login attempt. On success the session identity becomes `username` and
    /// the main view opens; on failure the screen and session are unchanged.
    pub fn login(
        &mut self,
        accounts: &AccountStore,
        username: &str,
        password: &str,
    ) -> Result<bool, NavError> {
        if self.screen != Screen::Login {
            return Err(NavError::WrongScreen {
                from: self.screen,
                to: Screen::MainApp,
            });
        }
        match accounts.authenticate(username, password) {
            Some(account) => {
                self.current_user = Some(account.username.clone());
                self.screen = Screen::MainApp;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// After a successful registration the signup screen hands over to login.
    pub fn signup_complete(&mut self) -> Result<(), NavError> {
        self.goto(&[Screen::Signup], Screen::Login)
    }

    /// Admin login attempt; no session identity is established, the admin
    /// panel is gated purely by the credential check.
    pub fn admin_login(
        &mut self,
        accounts: &AccountStore,
        username: &str,
        password: &str,
    ) -> Result<bool, NavError> {
        if self.screen != Screen::AdminLogin {
            return Err(NavError::WrongScreen {
                from: self.screen,
                to: Screen::AdminPanel,
            });
        }
        if accounts.is_admin(username, password) {
            self.screen = Screen::AdminPanel;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn back_to_welcome(&mut self) -> Result<(), NavError> {
        self.goto(
            &[Screen::Login, Screen::Signup, Screen::AdminLogin, Screen::AdminPanel],
            Screen::Welcome,
        )
    }

    pub fn open_profile(&mut self) -> Result<(), NavError> {
        self.goto(&[Screen::MainApp], Screen::Profile)
    }

    pub fn back_to_main(&mut self) -> Result<(), NavError> {
        self.goto(&[Screen::Profile], Screen::MainApp)
    }

    /// Leaves the main view and clears the session identity.
    pub fn logout(&mut self) -> Result<(), NavError> {
        self.goto(&[Screen::MainApp], Screen::Welcome)?;
        self.current_user = None;
        Ok(())
    }

    pub fn open_admin_profile(&mut self) -> Result<(), NavError> {
        self.goto(&[Screen::AdminPanel], Screen::AdminProfile)
    }

    pub fn back_to_admin_panel(&mut self) -> Result<(), NavError> {
        self.goto(&[Screen::AdminProfile], Screen::AdminPanel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DataDir;

    fn accounts(tmp: &tempfile::TempDir) -> AccountStore {
        AccountStore::open(&DataDir::new(tmp.path()))
    }

    #[test]
    fn login_sets_session_only_on_success() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = accounts(&tmp);
        assert!(store.register("alice", "pw1"));

        let mut nav = Navigator::new();
        nav.to_login().unwrap();
        assert!(!nav.login(&store, "alice", "wrong").unwrap());
        assert_eq!(nav.screen(), Screen::Login);
        assert_eq!(nav.current_user(), None);

        assert!(nav.login(&store, "alice", "pw1").unwrap());
        assert_eq!(nav.screen(), Screen::MainApp);
        assert_eq!(nav.current_user(), Some("alice"));
        assert_eq!(nav.identity(), Identity::User("alice".to_owned()));
    }

    #[test]
    fn session_survives_profile_round_trip_but_not_logout() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = accounts(&tmp);
        store.register("alice", "pw1");

        let mut nav = Navigator::new();
        nav.to_login().unwrap();
        assert!(nav.login(&store, "alice", "pw1").unwrap());
        nav.open_profile().unwrap();
        assert_eq!(nav.current_user(), Some("alice"));
        nav.back_to_main().unwrap();
        assert_eq!(nav.current_user(), Some("alice"));
        nav.logout().unwrap();
        assert_eq!(nav.screen(), Screen::Welcome);
        assert_eq!(nav.current_user(), None);
    }

    #[test]
    fn guest_browsing_uses_the_guest_bucket() {
        let mut nav = Navigator::new();
        nav.browse_as_guest().unwrap();
        assert_eq!(nav.screen(), Screen::MainApp);
        assert_eq!(nav.identity(), Identity::Guest);
    }

    #[test]
    fn admin_panel_requires_admin_credentials() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = accounts(&tmp);
        store.register("alice", "pw1");

        let mut nav = Navigator::new();
        nav.to_admin_login().unwrap();
        assert!(!nav.admin_login(&store, "alice", "pw1").unwrap());
        assert_eq!(nav.screen(), Screen::AdminLogin);
        assert!(nav.admin_login(&store, "admin", "adminpass").unwrap());
        assert_eq!(nav.screen(), Screen::AdminPanel);
        nav.open_admin_profile().unwrap();
        nav.back_to_admin_panel().unwrap();
        nav.back_to_welcome().unwrap();
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let mut nav = Navigator::new();
        assert!(nav.open_profile().is_err());
        assert!(nav.logout().is_err());
        nav.to_signup().unwrap();
        assert!(nav.to_login().is_err());
        nav.signup_complete().unwrap();
        assert_eq!(nav.screen(), Screen::Login);
        nav.back_to_welcome().unwrap();
        assert_eq!(nav.screen(), Screen::Welcome);
    }
}
