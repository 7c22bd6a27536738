use club_ledger::{
    aggregation::accounting_date,
    config::ClubLedgerConfig,
    entities::{
        Athlete, AthleteDraft, AthleteId, AthleteUpdate, ElevatedAction, MonthIndex, NewRecord,
        PaymentKey, PaymentLedger, PaymentSnapshot, RecordCategory, RecordId, RecordType,
        Section, SectionId, SetPaymentRequest, AMOUNT_EPSILON,
    },
    stores::{Collection, DocumentStore as _, InMemoryDocumentStore},
    util::ClubLedgerUtil,
};

const PIN: &str = "2003";

fn month(i: u32) -> MonthIndex {
    MonthIndex::new(i).unwrap()
}

fn athlete(id: &str, price: f64) -> Athlete {
    Athlete {
        id: id.into(),
        name: format!("Athlete {id}"),
        parent: format!("Parent {id}"),
        phone: "6900000000".into(),
        price,
    }
}

fn junior() -> Section {
    Section {
        id: "junior".into(),
        title: "Junior".into(),
        players: vec![athlete("j1", 50.0), athlete("j2", 50.0)],
    }
}

fn paid(year: i32, m: u32, id: &str, amount: Option<f64>) -> SetPaymentRequest {
    SetPaymentRequest {
        year,
        month: month(m),
        athlete_id: id.into(),
        paid: true,
        snapshot: Some(PaymentSnapshot {
            athlete_name: format!("Athlete {id}"),
            parent_name: format!("Parent {id}"),
            department: "Junior".into(),
            amount,
        }),
    }
}

fn unpaid(year: i32, m: u32, id: &str) -> SetPaymentRequest {
    SetPaymentRequest {
        year,
        month: month(m),
        athlete_id: id.into(),
        paid: false,
        snapshot: None,
    }
}

async fn setup() -> ClubLedgerUtil<InMemoryDocumentStore> {
    let util = ClubLedgerUtil::in_memory(&ClubLedgerConfig::new(PIN)).unwrap();
    util.upsert_section(junior(), Some(PIN)).await.unwrap();
    util
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < AMOUNT_EPSILON
}

#[tokio::test]
async fn january_collections_and_subscription_fund() {
    let util = setup().await;

    // No payments yet.
    let report = util.monthly_report(2026, month(0)).await.unwrap();
    assert_eq!(report.stats.expected, 100.0);
    assert_eq!(report.stats.collected, 0.0);
    assert_eq!(report.stats.remaining, 100.0);

    // j1 pays 50.
    util.set_payment(paid(2026, 0, "j1", Some(50.0)), Some(PIN)).await.unwrap();
    let report = util.monthly_report(2026, month(0)).await.unwrap();
    assert_eq!(report.stats.collected, 50.0);
    assert!(close(report.split.club_share, 10.0));
    assert!(close(report.split.subscription_fund, 40.0));

    // Ball bought from the subscription fund.
    let ball = util
        .add_record_json(
            r#"{"type":"expense","amount":20,"reason":"ball","date":"2026-01-01","category":"subscription"}"#,
        )
        .await
        .unwrap();
    let report = util.monthly_report(2026, month(0)).await.unwrap();
    assert!(close(report.subscription_fund.balance, 20.0));
    assert!(close(report.general_fund.profit, 10.0));

    // Deleting it restores the balance.
    assert!(util.delete_record(&ball.id).await.unwrap());
    let report = util.monthly_report(2026, month(0)).await.unwrap();
    assert!(close(report.subscription_fund.balance, 40.0));
}

#[tokio::test]
async fn price_change_keeps_past_snapshots() {
    let util = setup().await;
    let j1 = AthleteId::from("j1");
    let junior = SectionId::from("junior");

    util.set_payment(paid(2026, 0, "j1", Some(50.0)), Some(PIN)).await.unwrap();
    util.edit_price(&junior, &j1, 70.0, Some(PIN)).await.unwrap();

    assert_eq!(util.monthly_report(2026, month(0)).await.unwrap().stats.collected, 50.0);
    assert_eq!(util.payment_amount(2026, month(0), &j1).await.unwrap(), 50.0);

    // A new month without an explicit amount snapshots the new price.
    util.set_payment(paid(2026, 1, "j1", None), Some(PIN)).await.unwrap();
    assert_eq!(util.monthly_report(2026, month(1)).await.unwrap().stats.collected, 70.0);
}

#[tokio::test]
async fn snapshot_amount_wins_over_later_price() {
    let util = setup().await;
    let j1 = AthleteId::from("j1");

    util.set_payment(paid(2026, 3, "j1", Some(40.0)), Some(PIN)).await.unwrap();
    util.update_athlete(
        &"junior".into(),
        &j1,
        AthleteUpdate {
            manual_price: Some(60.0),
            ..Default::default()
        },
        Some(PIN),
    )
    .await
    .unwrap();

    assert!(util.is_paid(2026, month(3), &j1).await.unwrap());
    assert_eq!(util.payment_amount(2026, month(3), &j1).await.unwrap(), 40.0);
    assert_eq!(util.payment_amount(2026, month(4), &j1).await.unwrap(), 60.0);
}

#[tokio::test]
async fn marking_paid_twice_changes_nothing() {
    let util = setup().await;
    util.set_payment(paid(2026, 0, "j1", Some(50.0)), Some(PIN)).await.unwrap();
    let once = util.monthly_report(2026, month(0)).await.unwrap();
    util.set_payment(paid(2026, 0, "j1", Some(50.0)), Some(PIN)).await.unwrap();
    let twice = util.monthly_report(2026, month(0)).await.unwrap();
    assert_eq!(once.stats, twice.stats);
    assert_eq!(util.aggregated_state(2026).await.unwrap().ledger.len(), 1);
}

#[tokio::test]
async fn marking_unpaid_removes_the_entry() {
    let util = setup().await;
    let j1 = AthleteId::from("j1");
    util.set_payment(paid(2026, 0, "j1", Some(50.0)), Some(PIN)).await.unwrap();
    util.set_payment(unpaid(2026, 0, "j1"), Some(PIN)).await.unwrap();

    assert!(!util.is_paid(2026, month(0), &j1).await.unwrap());
    assert_eq!(
        util.store().get(Collection::Payments, "2026_0_j1").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn elevated_actions_need_the_pin() {
    let util = setup().await;
    let junior = SectionId::from("junior");
    let j1 = AthleteId::from("j1");
    util.set_payment(paid(2026, 0, "j1", Some(50.0)), Some(PIN)).await.unwrap();

    assert!(util.set_payment(unpaid(2026, 0, "j1"), None).await.is_err());
    assert!(util.set_payment(unpaid(2026, 0, "j1"), Some("0000")).await.is_err());
    assert!(util.is_paid(2026, month(0), &j1).await.unwrap());

    assert!(util.edit_price(&junior, &j1, 10.0, Some("0000")).await.is_err());
    assert!(util.delete_athlete(&junior, &j1, None).await.is_err());
    // Rejected before lookup, whether or not the section exists.
    assert!(util
        .delete_athlete(&"nowhere".into(), &j1, Some("0000"))
        .await
        .is_err());

    let state = util.aggregated_state(2026).await.unwrap();
    assert_eq!(state.sections[0].players.len(), 2);
    assert_eq!(state.sections[0].players[0].price, 50.0);

    // Replacing a section wholesale needs the pin when it removes athletes.
    let mut smaller = junior_section(&state.sections);
    smaller.players.truncate(1);
    assert!(util.upsert_section(smaller.clone(), None).await.is_err());
    assert!(util.upsert_section(smaller, Some(PIN)).await.is_ok());
}

#[tokio::test]
async fn adding_athletes_and_marking_paid_need_the_pin_by_default() {
    let util = setup().await;
    let junior = SectionId::from("junior");
    let draft = || AthleteDraft {
        name: "New".into(),
        parent: "P".into(),
        phone: "697".into(),
        price: None,
    };

    assert!(util.add_athlete(&junior, draft(), None).await.is_err());
    assert!(util.add_athlete(&junior, draft(), Some("0000")).await.is_err());
    assert!(util.set_payment(paid(2026, 0, "j1", None), None).await.is_err());
    assert!(!util.is_paid(2026, month(0), &"j1".into()).await.unwrap());
    let state = util.aggregated_state(2026).await.unwrap();
    assert_eq!(state.sections[0].players.len(), 2);
    assert!(state.ledger.is_empty());

    util.add_athlete(&junior, draft(), Some(PIN)).await.unwrap();
    util.set_payment(paid(2026, 0, "j1", None), Some(PIN)).await.unwrap();
    assert!(util.is_paid(2026, month(0), &"j1".into()).await.unwrap());
}

fn junior_section(sections: &[Section]) -> Section {
    sections
        .iter()
        .find(|s| s.id.0 == "junior")
        .cloned()
        .unwrap()
}

#[tokio::test]
async fn configured_actions_are_gated() {
    let mut config = ClubLedgerConfig::new(PIN);
    config.elevated_actions = Some(vec![ElevatedAction::MarkPaid, ElevatedAction::AddAthlete]);
    let util = ClubLedgerUtil::in_memory(&config).unwrap();
    assert!(util.upsert_section(junior(), None).await.is_err());
    util.upsert_section(junior(), Some(PIN)).await.unwrap();

    assert!(util.set_payment(paid(2026, 0, "j1", None), None).await.is_err());
    util.set_payment(paid(2026, 0, "j1", None), Some(PIN)).await.unwrap();
    // Unpaid is no longer gated.
    util.set_payment(unpaid(2026, 0, "j1"), None).await.unwrap();
}

#[tokio::test]
async fn missing_targets() {
    let util = setup().await;
    let junior = SectionId::from("junior");

    assert!(!util.delete_record(&RecordId::from("missing")).await.unwrap());
    assert!(!util
        .delete_athlete(&junior, &"ghost".into(), Some(PIN))
        .await
        .unwrap());
    assert!(util
        .update_athlete(&junior, &"ghost".into(), AthleteUpdate::default(), None)
        .await
        .is_err());
    assert!(util
        .add_athlete(
            &"nowhere".into(),
            AthleteDraft {
                name: "New".into(),
                ..Default::default()
            },
            Some(PIN)
        )
        .await
        .is_err());
    assert!(util
        .section_monthly_stats(&"nowhere".into(), 2026, month(0))
        .await
        .is_err());
    // No snapshot and no roster entry to build one from.
    assert!(util.set_payment(
        SetPaymentRequest {
            snapshot: None,
            ..paid(2026, 0, "ghost", None)
        },
        Some(PIN)
    )
    .await
    .is_err());
}

#[tokio::test]
async fn deleting_an_athlete_keeps_their_payments() {
    let util = setup().await;
    let junior = SectionId::from("junior");
    util.set_payment(paid(2026, 0, "j2", Some(50.0)), Some(PIN)).await.unwrap();
    assert!(util
        .delete_athlete(&junior, &"j2".into(), Some(PIN))
        .await
        .unwrap());

    let state = util.aggregated_state(2026).await.unwrap();
    assert!(state
        .ledger
        .contains_key(&PaymentKey::new(2026, month(0), "j2".into())));
    assert_eq!(
        util.orphaned_payments().await.unwrap(),
        vec![PaymentKey::new(2026, month(0), "j2".into())]
    );

    let report = util.monthly_report(2026, month(0)).await.unwrap();
    assert_eq!(report.stats.expected, 50.0);
    assert_eq!(report.stats.collected, 0.0);
}

#[tokio::test]
async fn payment_without_snapshot_uses_the_roster() {
    let util = setup().await;
    let state = util
        .set_payment(
            SetPaymentRequest {
                snapshot: None,
                ..paid(2026, 5, "j2", None)
            },
            Some(PIN),
        )
        .await
        .unwrap();
    assert_eq!(state.amount(), Some(50.0));
    let stored = util
        .store()
        .get(Collection::Payments, "2026_5_j2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["isPaid"], serde_json::json!(true));
    assert_eq!(stored["department"], serde_json::json!("Junior"));
    assert_eq!(stored["athleteName"], serde_json::json!("Athlete j2"));
    assert!(stored["paymentDate"].is_string());
}

#[tokio::test]
async fn records_get_unique_ids_and_are_validated() {
    let util = setup().await;
    let date = accounting_date(2026, month(2)).unwrap();
    let new = || NewRecord {
        id: None,
        record_type: RecordType::Income,
        amount: 15.0,
        reason: "raffle".into(),
        date,
        transaction_date: None,
        category: None,
    };
    let a = util.add_record(new()).await.unwrap();
    let b = util.add_record(new()).await.unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.category, RecordCategory::General);

    assert!(util
        .add_record(NewRecord {
            id: Some(a.id.clone()),
            ..new()
        })
        .await
        .is_err());
    assert!(util
        .add_record(NewRecord {
            reason: "  ".into(),
            ..new()
        })
        .await
        .is_err());
    assert!(util
        .add_record_json(r#"{"type":"income","amount":"lots","reason":"x","date":"2026-03-01"}"#)
        .await
        .is_err());
    assert!(util.add_record_json("{ broken").await.is_err());

    let march = util.records_for_month(2026, month(2), None).await.unwrap();
    assert_eq!(march.len(), 2);
    let report = util.monthly_report(2026, month(2)).await.unwrap();
    assert!(close(report.general_fund.manual_income, 30.0));
}

#[tokio::test]
async fn subscription_expenses_can_be_excluded() {
    let util = setup().await;
    for (category, amount) in [("subscription", 20), ("general", 5)] {
        util.add_record_json(&format!(
            r#"{{"type":"expense","amount":{amount},"reason":"r","date":"2026-01-10","category":"{category}"}}"#
        ))
        .await
        .unwrap();
    }
    let general = util
        .records_for_month(2026, month(0), Some(RecordCategory::Subscription))
        .await
        .unwrap();
    assert_eq!(general.len(), 1);
    assert_eq!(general[0].amount, 5.0);
}

#[tokio::test]
async fn client_cache_merges_without_overwriting() {
    let util = setup().await;
    util.set_payment(paid(2026, 0, "j1", Some(50.0)), Some(PIN)).await.unwrap();

    let mut cached = PaymentLedger::new();
    let now = chrono::Utc::now();
    cached.set_payment(
        PaymentKey::new(2026, month(0), "j1".into()),
        true,
        PaymentSnapshot {
            amount: Some(5.0),
            ..Default::default()
        },
        now,
    );
    cached.set_payment(
        PaymentKey::new(2026, month(0), "j2".into()),
        true,
        PaymentSnapshot::default(),
        now,
    );

    let merged = util.aggregated_state_merged(2026, cached).await.unwrap();
    assert_eq!(merged.ledger.len(), 2);
    assert_eq!(merged.ledger.get_amount(2026, month(0), &"j1".into(), 0.0), 50.0);

    // Nothing was persisted.
    assert_eq!(util.aggregated_state(2026).await.unwrap().ledger.len(), 1);
}

#[tokio::test]
async fn section_ranking_and_reports() {
    let util = setup().await;
    util.upsert_section(
        Section {
            id: "u12".into(),
            title: "Under 12".into(),
            players: vec![athlete("u1", 40.0)],
        },
        Some(PIN),
    )
    .await
    .unwrap();
    for m in 0..12 {
        util.set_payment(paid(2026, m, "u1", None), Some(PIN)).await.unwrap();
    }
    util.set_payment(paid(2026, 0, "j1", None), Some(PIN)).await.unwrap();

    let ranking = util.section_performance(2026).await.unwrap();
    assert_eq!(ranking[0].section_id, SectionId::from("u12"));
    assert!(close(ranking[0].percentage, 100.0));
    assert_eq!(
        util.top_section(2026).await.unwrap().map(|s| s.title),
        Some("Under 12".to_string())
    );

    let annual = util.annual_report(2026).await.unwrap();
    assert!(close(annual.totals.collected, 40.0 * 12.0 + 50.0));

    let text = util.annual_report_text(2026).await.unwrap();
    assert!(text.contains("December"));
    let csv = util.monthly_breakdown_csv(2026).await.unwrap();
    assert_eq!(csv.lines().count(), 14);
}

#[tokio::test]
async fn new_athletes_get_the_default_price() {
    let mut config = ClubLedgerConfig::new(PIN);
    config.default_athlete_price = Some(45.0);
    let util = ClubLedgerUtil::in_memory(&config).unwrap();
    util.upsert_section(
        Section {
            id: "senior".into(),
            title: "Senior".into(),
            players: vec![],
        },
        None,
    )
    .await
    .unwrap();
    let added = util
        .add_athlete(
            &"senior".into(),
            AthleteDraft {
                name: "New".into(),
                parent: "P".into(),
                phone: "697".into(),
                price: None,
            },
            Some(PIN),
        )
        .await
        .unwrap();
    assert_eq!(added.price, 45.0);
    assert!(util
        .add_athlete(
            &"senior".into(),
            AthleteDraft {
                name: "Bad".into(),
                price: Some(-1.0),
                ..Default::default()
            },
            Some(PIN),
        )
        .await
        .is_err());
    let state = util.aggregated_state(2026).await.unwrap();
    assert_eq!(state.sections[0].players.len(), 1);
}
