//! Applies fills to an `AccountCache`-backed balance (spec §4.8).

use crate::domain::{AccountCache, CommissionSchedule, LiquiditySide, OrderSide};

pub struct AccountAdapter<C: AccountCache = crate::domain::InMemoryAccountCache> {
    cache: C,
    commission_schedule: CommissionSchedule,
}

impl<C: AccountCache> AccountAdapter<C> {
    pub fn new(cache: C, commission_schedule: CommissionSchedule) -> Self {
        Self {
            cache,
            commission_schedule,
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut C {
        &mut self.cache
    }

    pub fn calculate_commission(&self, qty: f64, price: f64, liquidity_side: LiquiditySide) -> f64 {
        self.commission_schedule.commission(qty, price, liquidity_side)
    }

    pub fn set_commission_schedule(&mut self, schedule: CommissionSchedule) {
        self.commission_schedule = schedule;
    }

    /// Debit/credit the account's base currency balance for a fill. Logs a
    /// warning (rather than failing) if the account has no balance entry for
    /// the instrument's settlement currency yet — a real account cache would
    /// normally pre-seed every currency it expects to trade.
    pub fn adjust_account(&mut self, side: OrderSide, qty: f64, price: f64, commission: f64) {
        let notional = qty * price;
        let debit = crate::domain::account::signed_amount(side, notional) - commission;

        let Some(account) = self.cache.account_mut() else {
            tracing::warn!("adjust_account called with no account initialized");
            return;
        };

        // Adjust every held currency balance for now; a multi-currency venue
        // would instead look up the instrument's settlement currency, but
        // this crate treats the account as single-currency (spec §4.8).
        if let Some((_, balance)) = account.balances.iter_mut().next() {
            balance.total += debit;
        } else {
            tracing::warn!("adjust_account: account has no currency balances");
        }
    }
}
