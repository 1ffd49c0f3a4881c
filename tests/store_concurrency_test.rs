use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;
use teamtab::application::service::LedgerService;
use teamtab::application::session::Session;
use teamtab::domain::participant::{Participant, ParticipantId};
use teamtab::domain::ports::LedgerStoreBox;
use teamtab::infrastructure::in_memory::InMemoryLedgerStore;

fn roster() -> Vec<Participant> {
    vec![
        Participant::new(ParticipantId(1), "alice", "Alice Doe", ""),
        Participant::new(ParticipantId(2), "bob", "Bob Roe", ""),
        Participant::new(ParticipantId(3), "carol", "Carol Poe", ""),
    ]
}

#[tokio::test]
async fn test_store_as_trait_object_across_tasks() {
    let store: LedgerStoreBox = Box::new(InMemoryLedgerStore::new());
    let service = Arc::new(LedgerService::new(store));
    service.sync_roster(roster()).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..60u32 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let payer = ParticipantId(i % 3 + 1);
            if i % 2 == 0 {
                service
                    .add_expense(&Session::new(payer), "Coffee", dec!(3.00), Vec::new())
                    .await
                    .map(|e| e.id.0)
            } else {
                let receiver = ParticipantId((i + 1) % 3 + 1);
                service
                    .record_payment_between(payer, receiver, dec!(0.50))
                    .await
                    .map(|p| p.id.0)
            }
        }));
    }

    let mut expense_ids = HashSet::new();
    let mut payment_ids = HashSet::new();
    for (i, handle) in handles.into_iter().enumerate() {
        let id = handle.await.unwrap().unwrap();
        let fresh = if i % 2 == 0 {
            expense_ids.insert(id)
        } else {
            payment_ids.insert(id)
        };
        assert!(fresh, "id {id} was handed out twice");
    }
    assert_eq!(expense_ids, (1..=30).collect());
    assert_eq!(payment_ids, (1..=30).collect());

    let report = service.report().await.unwrap();
    let total: rust_decimal::Decimal = report.balances.iter().map(|b| b.balance.value()).sum();
    assert!(total.is_zero());
    assert_eq!(service.settlement_history().await.unwrap().len(), 30);
}
