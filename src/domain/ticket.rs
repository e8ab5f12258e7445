//! Trade entry ticket.
//!
//! Holds the fields a user is editing before a trade is booked. Editing the
//! spread reprices the trade yield and editing the trade yield reprices the
//! spread, so the two always agree with the closing yield at the precision
//! kept by [`reconcile`](crate::domain::reconcile).

use crate::domain::error::BlotterError;
use crate::domain::issue::Issue;
use crate::domain::ledger::{Trade, TradeLedger};
use crate::domain::reconcile::{
    round_to, spread_from_trade_yield, trade_yield_from_spread, YIELD_PLACES,
};

pub const DEFAULT_QUANTITY: f64 = 0.0001;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeTicket {
    pub issue: Option<String>,
    pub closing_yield: f64,
    pub spread_bp: f64,
    pub trade_yield: f64,
    pub quantity: f64,
}

impl Default for TradeTicket {
    fn default() -> Self {
        Self::with_quantity(DEFAULT_QUANTITY)
    }
}

impl TradeTicket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quantity(quantity: f64) -> Self {
        TradeTicket {
            issue: None,
            closing_yield: 0.0,
            spread_bp: 0.0,
            trade_yield: 0.0,
            quantity,
        }
    }

    /// Switch the ticket to `issue`. When the issue has a closing yield it
    /// replaces the ticket's, and the trade yield is repriced off the current
    /// spread.
    pub fn select_issue(&mut self, issue: &Issue) {
        self.issue = Some(issue.ticker.clone());
        if let Some(closing) = issue.closing_yield {
            self.closing_yield = round_to(closing, YIELD_PLACES);
            self.reprice_yield();
        }
    }

    pub fn set_closing_yield(&mut self, closing_yield: f64) {
        self.closing_yield = closing_yield;
    }

    pub fn set_spread(&mut self, spread_bp: f64) {
        self.spread_bp = spread_bp;
        self.reprice_yield();
    }

    pub fn set_trade_yield(&mut self, trade_yield: f64) {
        self.trade_yield = trade_yield;
        self.spread_bp = spread_from_trade_yield(Some(self.closing_yield), Some(trade_yield));
    }

    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = quantity;
    }

    fn reprice_yield(&mut self) {
        self.trade_yield = trade_yield_from_spread(Some(self.closing_yield), Some(self.spread_bp));
    }

    /// Append the ticket to `ledger`. The ticket is left as is so the next
    /// trade can be entered from the same values.
    pub fn book<'a>(&self, ledger: &'a mut TradeLedger) -> Result<&'a Trade, BlotterError> {
        let issue = self.issue.as_deref().ok_or(BlotterError::NoIssueSelected)?;
        Ok(ledger.add(
            issue,
            self.closing_yield,
            self.trade_yield,
            self.spread_bp,
            self.quantity,
        ))
    }
}
