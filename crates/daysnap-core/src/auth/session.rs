use crate::wallet::AuthorizationResult;

use super::{Account, AuthError, AuthToken, Base64Address};

/// One active wallet authorization.
///
/// `selected_account` is always an element of `accounts`. Apart from the
/// selection a session is never edited; a reauthorize builds a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    accounts: Vec<Account>,
    auth_token: AuthToken,
    selected_account: Account,
}

impl Session {
    /// Build a session from an authorize/reauthorize result.
    ///
    /// The previous selection survives when its address is still present in
    /// the new account list; otherwise the first returned account is selected.
    pub fn from_result(
        result: &AuthorizationResult,
        previous_selection: Option<&Account>,
    ) -> Result<Self, AuthError> {
        let accounts = result
            .accounts
            .iter()
            .map(Account::from_authorized)
            .collect::<Result<Vec<_>, _>>()?;

        let first = accounts.first().cloned().ok_or_else(|| {
            AuthError::AuthorizationFailed("wallet returned no accounts".to_string())
        })?;

        let selected_account = match previous_selection {
            Some(previous) if accounts.iter().any(|a| a.same_address(previous)) => previous.clone(),
            _ => first,
        };

        Ok(Self {
            accounts,
            auth_token: result.auth_token.clone(),
            selected_account,
        })
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn auth_token(&self) -> &AuthToken {
        &self.auth_token
    }

    pub fn selected_account(&self) -> &Account {
        &self.selected_account
    }

    pub fn contains(&self, address: &Base64Address) -> bool {
        self.accounts.iter().any(|a| &a.address == address)
    }

    /// Change the selection. The account must already be authorized.
    pub fn select(&mut self, next: &Account) -> Result<(), AuthError> {
        if !self.contains(&next.address) {
            return Err(AuthError::AccountNotAuthorized(next.address.clone()));
        }
        self.selected_account = next.clone();
        Ok(())
    }
}
