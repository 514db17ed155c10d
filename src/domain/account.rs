//! Account, balances, and commission — the surfaces `AccountAdapter` needs.

use super::order::{LiquiditySide, OrderSide};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Cash,
    Margin,
    Betting,
}

/// An amount denominated in a currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: String,
}

/// A single currency balance: total, locked, and free (= total - locked).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub total: f64,
    pub locked: f64,
}

impl Balance {
    pub fn free(&self) -> f64 {
        self.total - self.locked
    }
}

/// A full account snapshot, keyed by currency code (e.g. "USD").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountState {
    pub account_type: AccountType,
    pub is_frozen: bool,
    pub balances: HashMap<String, Balance>,
}

impl AccountState {
    pub fn new(account_type: AccountType, starting_balances: &[(String, f64)]) -> Self {
        let balances = starting_balances
            .iter()
            .map(|(ccy, amount)| {
                (
                    ccy.clone(),
                    Balance {
                        total: *amount,
                        locked: 0.0,
                    },
                )
            })
            .collect();
        Self {
            account_type,
            is_frozen: false,
            balances,
        }
    }
}

/// External account-cache contract: applying adjustments and producing fresh
/// `AccountState` snapshots is this crate's job (`AccountAdapter`); holding
/// the authoritative account record is the caller's (spec §3/§4.8).
pub trait AccountCache {
    fn account(&self) -> Option<&AccountState>;
    fn account_mut(&mut self) -> Option<&mut AccountState>;
}

/// In-memory default account cache, used when this crate is driven standalone
/// (spec §10.1 supplemental — a real execution client supplies its own).
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountCache {
    pub state: Option<AccountState>,
}

impl AccountCache for InMemoryAccountCache {
    fn account(&self) -> Option<&AccountState> {
        self.state.as_ref()
    }

    fn account_mut(&mut self) -> Option<&mut AccountState> {
        self.state.as_mut()
    }
}

/// Commission calculation policy. Spec §4.8 defers the actual calculation to
/// "account logic (external)"; this is the default the engine falls back on
/// so it is testable standalone (spec §10.3 supplemental).
#[derive(Debug, Clone, Copy)]
pub enum CommissionSchedule {
    /// Flat amount per unit of quantity, independent of liquidity side.
    PerShare { maker: f64, taker: f64 },
    /// Basis points of notional (price * qty).
    BpsOfNotional { maker_bps: f64, taker_bps: f64 },
}

impl CommissionSchedule {
    pub fn commission(&self, qty: f64, price: f64, liquidity_side: LiquiditySide) -> f64 {
        match self {
            CommissionSchedule::PerShare { maker, taker } => {
                qty * match liquidity_side {
                    LiquiditySide::Maker => *maker,
                    LiquiditySide::Taker => *taker,
                }
            }
            CommissionSchedule::BpsOfNotional {
                maker_bps,
                taker_bps,
            } => {
                let bps = match liquidity_side {
                    LiquiditySide::Maker => *maker_bps,
                    LiquiditySide::Taker => *taker_bps,
                };
                qty * price * (bps / 10_000.0)
            }
        }
    }
}

/// Used only to satisfy the `OrderSide`-adjacent API shape of `adjust_account`
/// callers that want to know whether an adjustment is a debit or credit.
pub fn signed_amount(side: OrderSide, amount: f64) -> f64 {
    match side {
        OrderSide::Buy => -amount,
        OrderSide::Sell => amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_free_is_total_minus_locked() {
        let b = Balance {
            total: 100.0,
            locked: 30.0,
        };
        assert_eq!(b.free(), 70.0);
    }

    #[test]
    fn account_state_starting_balances() {
        let acc = AccountState::new(
            AccountType::Cash,
            &[("USD".to_string(), 10_000.0)],
        );
        assert_eq!(acc.balances["USD"].total, 10_000.0);
        assert_eq!(acc.balances["USD"].locked, 0.0);
    }

    #[test]
    fn per_share_commission() {
        let sched = CommissionSchedule::PerShare {
            maker: 0.0,
            taker: 0.005,
        };
        assert_eq!(sched.commission(100.0, 50.0, LiquiditySide::Taker), 0.5);
        assert_eq!(sched.commission(100.0, 50.0, LiquiditySide::Maker), 0.0);
    }

    #[test]
    fn bps_commission() {
        let sched = CommissionSchedule::BpsOfNotional {
            maker_bps: 0.0,
            taker_bps: 10.0,
        };
        // 10 bps of (100 * 50) = 5.0
        assert_eq!(sched.commission(100.0, 50.0, LiquiditySide::Taker), 5.0);
    }
}
