//! Named balances and the active-account pointer.

use std::collections::BTreeMap;

use crash_types::{
    AccountId, Amount, LedgerError, DEMO_STARTING_BALANCE, REAL_STARTING_BALANCE,
};
use tracing::debug;

/// In-memory account ledger.
///
/// `active` always names an entry of `balances`. Balances are unsigned, so no
/// operation can drive one below zero; debits that would are rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    balances: BTreeMap<AccountId, Amount>,
    active: AccountId,
}

impl Default for Ledger {
    /// Demo account with 1000.00 (active) and an empty real account.
    fn default() -> Self {
        let balances = BTreeMap::from([
            (AccountId::demo(), Amount::from_minor(DEMO_STARTING_BALANCE)),
            (AccountId::real(), Amount::from_minor(REAL_STARTING_BALANCE)),
        ]);
        Self {
            balances,
            active: AccountId::demo(),
        }
    }
}

impl Ledger {
    pub fn new(
        balances: impl IntoIterator<Item = (AccountId, Amount)>,
        active: AccountId,
    ) -> Result<Self, LedgerError> {
        let balances: BTreeMap<_, _> = balances.into_iter().collect();
        if !balances.contains_key(&active) {
            return Err(LedgerError::UnknownAccount(active));
        }
        Ok(Self { balances, active })
    }

    /// Balance of the active account.
    pub fn balance(&self) -> Amount {
        self.balances.get(&self.active).copied().unwrap_or_default()
    }

    pub fn balance_of(&self, account: &AccountId) -> Result<Amount, LedgerError> {
        self.balances
            .get(account)
            .copied()
            .ok_or_else(|| LedgerError::UnknownAccount(account.clone()))
    }

    pub fn active(&self) -> &AccountId {
        &self.active
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.balances.iter()
    }

    /// Point the ledger at another account. Balances are untouched.
    pub fn switch_account(&mut self, account: &AccountId) -> Result<(), LedgerError> {
        if !self.balances.contains_key(account) {
            return Err(LedgerError::UnknownAccount(account.clone()));
        }
        debug!(from = %self.active, to = %account, "switched account");
        self.active = account.clone();
        Ok(())
    }

    /// Replace the active account's balance; callers compute the new value.
    pub fn update_balance(&mut self, amount: Amount) {
        self.balances.insert(self.active.clone(), amount);
    }

    pub fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, LedgerError> {
        let balance = self.slot(account)?;
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(account.clone()))?;
        Ok(*balance)
    }

    pub fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, LedgerError> {
        let balance = self.slot(account)?;
        let available = *balance;
        *balance = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientFunds {
                account: account.clone(),
                requested: amount,
                available,
            })?;
        Ok(*balance)
    }

    pub fn deposit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }
        let balance = self.credit(account, amount)?;
        debug!(%account, %amount, %balance, "deposit");
        Ok(balance)
    }

    pub fn withdraw(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }
        let balance = self.debit(account, amount)?;
        debug!(%account, %amount, %balance, "withdrawal");
        Ok(balance)
    }

    fn slot(&mut self, account: &AccountId) -> Result<&mut Amount, LedgerError> {
        self.balances
            .get_mut(account)
            .ok_or_else(|| LedgerError::UnknownAccount(account.clone()))
    }
}
