//! In-memory trade ledger.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub id: u64,
    pub issue: String,
    pub closing_yield: f64,
    pub trade_yield: f64,
    pub spread_bp: f64,
    pub quantity: f64,
}

/// Ordered trades plus the set of ids currently selected for bulk removal.
///
/// Ids start at 1 and are never reused, even after the trade that held one
/// is removed. Trades are never modified after they are added.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeLedger {
    trades: Vec<Trade>,
    next_id: u64,
    selection: BTreeSet<u64>,
}

impl Default for TradeLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeLedger {
    pub fn new() -> Self {
        TradeLedger {
            trades: Vec::new(),
            next_id: 1,
            selection: BTreeSet::new(),
        }
    }

    /// Append a trade. No validation is applied to any field.
    pub fn add(
        &mut self,
        issue: impl Into<String>,
        closing_yield: f64,
        trade_yield: f64,
        spread_bp: f64,
        quantity: f64,
    ) -> &Trade {
        let id = self.next_id;
        self.next_id += 1;
        self.trades.push(Trade {
            id,
            issue: issue.into(),
            closing_yield,
            trade_yield,
            spread_bp,
            quantity,
        });
        &self.trades[self.trades.len() - 1]
    }

    /// Drop every selected trade and clear the selection. Returns how many
    /// trades were removed.
    pub fn remove_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let before = self.trades.len();
        let selection = &self.selection;
        self.trades.retain(|t| !selection.contains(&t.id));
        self.selection.clear();
        before - self.trades.len()
    }

    pub fn remove_by_id(&mut self, id: u64) -> Option<Trade> {
        let index = self.trades.iter().position(|t| t.id == id)?;
        Some(self.trades.remove(index))
    }

    /// Replace the selection. Ids need not exist in the ledger.
    pub fn update_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = u64>,
    {
        self.selection = ids.into_iter().collect();
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn get(&self, id: u64) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == id)
    }

    pub fn selection(&self) -> &BTreeSet<u64> {
        &self.selection
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.selection.contains(&id)
    }

    /// Id the next added trade will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(n: usize) -> TradeLedger {
        let mut ledger = TradeLedger::new();
        for i in 0..n {
            ledger.add(format!("JB{}", 370 + i), 1.0, 1.01, 1.0, 100.0);
        }
        ledger
    }

    fn ids(ledger: &TradeLedger) -> Vec<u64> {
        ledger.trades().iter().map(|t| t.id).collect()
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = TradeLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
        assert_eq!(ledger.next_id(), 1);
        assert!(ledger.selection().is_empty());
        assert_eq!(ledger, TradeLedger::default());
    }

    #[test]
    fn add_assigns_sequential_ids() {
        let ledger = ledger_with(5);
        assert_eq!(ledger.len(), 5);
        assert_eq!(ids(&ledger), vec![1, 2, 3, 4, 5]);
        assert_eq!(ledger.next_id(), 6);
    }

    #[test]
    fn add_returns_stored_trade() {
        let mut ledger = TradeLedger::new();
        let trade = ledger.add("JT123", 0.10, 0.12, 2.0, 100.0).clone();
        assert_eq!(
            trade,
            Trade {
                id: 1,
                issue: "JT123".into(),
                closing_yield: 0.10,
                trade_yield: 0.12,
                spread_bp: 2.0,
                quantity: 100.0,
            }
        );
        assert_eq!(ledger.get(1), Some(&trade));
    }

    #[test]
    fn add_accepts_any_values() {
        let mut ledger = TradeLedger::new();
        ledger.add("", -1.0, 0.0, 999.0, -5.0);
        ledger.add("NOT-A-TICKER", 0.0, 0.0, 0.0, 0.0);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn remove_selected_keeps_survivor_order() {
        let mut ledger = ledger_with(3);
        ledger.update_selection([2]);
        assert_eq!(ledger.remove_selected(), 1);
        assert_eq!(ids(&ledger), vec![1, 3]);
        assert!(ledger.selection().is_empty());
    }

    #[test]
    fn remove_selected_with_empty_selection_is_noop() {
        let mut ledger = ledger_with(3);
        assert_eq!(ledger.remove_selected(), 0);
        assert_eq!(ids(&ledger), vec![1, 2, 3]);
    }

    #[test]
    fn remove_selected_ignores_unknown_ids() {
        let mut ledger = ledger_with(4);
        ledger.update_selection([1, 4, 99]);
        assert_eq!(ledger.remove_selected(), 2);
        assert_eq!(ids(&ledger), vec![2, 3]);
        assert!(ledger.selection().is_empty());
    }

    #[test]
    fn update_selection_replaces_wholesale() {
        let mut ledger = ledger_with(3);
        ledger.update_selection([1, 2]);
        ledger.update_selection([3]);
        assert!(!ledger.is_selected(1));
        assert!(!ledger.is_selected(2));
        assert!(ledger.is_selected(3));
        ledger.update_selection(Vec::new());
        assert!(ledger.selection().is_empty());
    }

    #[test]
    fn remove_by_id_drops_one_trade() {
        let mut ledger = ledger_with(3);
        let removed = ledger.remove_by_id(2).unwrap();
        assert_eq!(removed.id, 2);
        assert_eq!(ids(&ledger), vec![1, 3]);
    }

    #[test]
    fn remove_by_id_missing_is_noop() {
        let mut ledger = ledger_with(2);
        assert!(ledger.remove_by_id(7).is_none());
        assert_eq!(ids(&ledger), vec![1, 2]);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut ledger = TradeLedger::new();
        ledger.add("JT123", 0.10, 0.12, 2.0, 100.0);
        ledger.remove_by_id(1);
        assert!(ledger.is_empty());
        assert_eq!(ledger.add("JT123", 0.10, 0.12, 2.0, 100.0).id, 2);

        ledger.update_selection([2]);
        ledger.remove_selected();
        assert_eq!(ledger.add("JB45", 1.0, 1.0, 0.0, 1.0).id, 3);
    }

    #[test]
    fn remove_by_id_leaves_selection_alone() {
        let mut ledger = ledger_with(3);
        ledger.update_selection([2, 3]);
        ledger.remove_by_id(2);
        assert!(ledger.is_selected(2));
        assert_eq!(ledger.remove_selected(), 1);
        assert_eq!(ids(&ledger), vec![1]);
    }
}
