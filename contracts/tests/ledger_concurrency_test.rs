//! Contention tests for the shared ledger.
//!
//! Many tasks on a multi-threaded runtime hammer one `Arc<Ledger>`. Every
//! operation runs under a single lock guard, so whatever the interleaving the
//! final state must satisfy the same accounting as a sequential run.

use std::sync::Arc;

use gridledger_contracts::{Ledger, ProjectStatus};
use gridledger_protocol::config::DEFAULT_OPERATOR;
use gridledger_protocol::Principal;

fn wallet(i: usize) -> Principal {
    Principal::new(format!("ST{:03}WALLET", i))
}

fn operator() -> Principal {
    Principal::from(DEFAULT_OPERATOR)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_conserve_supply() {
    let ledger = Arc::new(Ledger::default());
    let wallets = 8;
    for i in 0..wallets {
        ledger.mint(&operator(), &wallet(i), 10_000).unwrap();
    }

    let mut handles = Vec::new();
    for task in 0..16 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            for round in 0..500 {
                let from = wallet((task + round) % wallets);
                let to = wallet((task * 3 + round + 1) % wallets);
                // Overdrafts are expected under contention and simply fail.
                let _ = ledger.transfer(&from, &to, 7);
                tokio::task::yield_now().await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    ledger.read(|state| {
        let sum: u64 = state.credits.balances().map(|(_, b)| b).sum();
        assert_eq!(sum, 80_000);
        assert_eq!(state.credits.total_supply(), 80_000);
        for (principal, balance) in state.credits.balances() {
            assert_eq!(state.credits.offset_of(principal.as_str()), i128::from(balance));
        }
    });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_investors_fund_project_exactly_once() {
    let ledger = Arc::new(Ledger::default());
    let owner = wallet(0);
    let id = ledger.create_project(&owner, "Grid Battery", 1_000).unwrap();

    let investors = 20;
    for i in 1..=investors {
        ledger.mint(&operator(), &wallet(i), 100).unwrap();
    }

    let mut handles = Vec::new();
    for i in 1..=investors {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            ledger.invest(&wallet(i), id, 100).is_ok()
        }));
    }

    let mut accepted = 0u64;
    for handle in handles {
        if handle.await.unwrap() {
            accepted += 1;
        }
    }

    // Exactly enough investments to reach the target; the rest see Funded.
    assert_eq!(accepted, 10);
    let project = ledger.get_project(id).unwrap();
    assert_eq!(project.status, ProjectStatus::Funded);
    assert_eq!(project.current_amount, 1_000);
    assert_eq!(ledger.balance_of(owner.as_str()), 1_000);
    assert_eq!(ledger.total_supply(), 2_000 + 1_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reports_settle_to_last_figures() {
    let ledger = Arc::new(Ledger::default());
    ledger.update_grid_status(&operator(), 1, 100_000, 1_000).unwrap();

    let users = 12;
    let mut handles = Vec::new();
    for u in 0..users {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            for amount in 1..=50u64 {
                ledger.report_consumption(&wallet(u), 1, amount * 10).unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Each user's last report is 500; demand = baseline + sum of last reports.
    let status = ledger.get_grid_status(1).unwrap();
    assert_eq!(status.total_demand, 1_000 + 500 * users as i64);
    for u in 0..users {
        assert_eq!(ledger.get_user_consumption(wallet(u).as_str(), 1), Some(500));
    }
}
