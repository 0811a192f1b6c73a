// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rstest::{fixture, rstest};

use odontogram::bridge::{FolderBridge, MemoryBridge};
use odontogram::config::EditorConfig;
use odontogram::model::{Mark, Mode, PatientId, Surface, Symbol, ToothId};
use odontogram::selection::geometry::Rect;
use odontogram::selection::{MenuAction, Selection, SelectionEvent};
use odontogram::store::{FileStore, KeyValueStore, LocalCache, MemoryStore};
use odontogram::sync::{EditorSession, SaveStatus, Source, TickOutcome};

const CACHE_KEY: &str = "odontogram:patient-7";

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 8, 30, 0)
        .single()
        .expect("t0")
}

fn at(seconds: i64) -> DateTime<Utc> {
    t0() + TimeDelta::seconds(seconds)
}

fn tooth(code: u8) -> ToothId {
    ToothId::new(code).expect("tooth")
}

fn anchor() -> Rect {
    Rect::new(200.0, 120.0, 48.0, 48.0)
}

struct Clinic {
    bridge: MemoryBridge,
    store: MemoryStore,
    config: EditorConfig,
}

impl Clinic {
    async fn open(&self, now: DateTime<Utc>) -> EditorSession<MemoryBridge, MemoryStore> {
        EditorSession::open(
            PatientId::new("patient-7").expect("patient"),
            self.bridge.clone(),
            LocalCache::new(self.store.clone()),
            &self.config,
            now,
        )
        .await
    }
}

#[fixture]
fn clinic() -> Clinic {
    let bridge = MemoryBridge::new();
    bridge.pin_clock(t0());
    Clinic {
        bridge,
        store: MemoryStore::new(),
        config: EditorConfig::default(),
    }
}

fn mark_required_filling(
    session: &mut EditorSession<MemoryBridge, MemoryStore>,
    now: DateTime<Utc>,
) {
    let events = [
        SelectionEvent::SurfaceClicked {
            tooth: tooth(11),
            surface: Surface::Top,
            anchor: anchor(),
        },
        SelectionEvent::Choose(MenuAction::Symbol(Symbol::Filling)),
        SelectionEvent::Choose(MenuAction::Color(Mode::Required)),
    ];
    for event in events {
        session.handle(event, now);
    }
    assert_eq!(*session.selection(), Selection::Idle);
}

#[rstest]
#[tokio::test]
async fn first_open_without_any_data_is_empty_and_saved(clinic: Clinic) {
    let session = clinic.open(t0()).await;

    assert_eq!(session.source(), Source::Empty);
    assert_eq!(session.status(), SaveStatus::Saved);
    assert_eq!(session.snapshot().teeth().len(), 52);
    for state in session.snapshot().teeth().values() {
        assert!(!state.absent());
        assert!(state.surfaces().all(|(_, mark)| mark == Mark::Empty));
    }
}

#[rstest]
#[tokio::test]
async fn marked_chart_autosaves_after_thirty_seconds(clinic: Clinic) {
    let mut session = clinic.open(t0()).await;
    mark_required_filling(&mut session, at(2));

    assert_eq!(session.status(), SaveStatus::Unsaved);
    assert!(clinic.store.get(CACHE_KEY).expect("get").is_some());

    assert_eq!(session.tick(at(29)).await, TickOutcome::Idle);
    assert_eq!(session.tick(at(30)).await, TickOutcome::Saved);

    assert_eq!(session.status(), SaveStatus::Saved);
    assert_eq!(clinic.store.get(CACHE_KEY).expect("get"), None);

    let saved = clinic
        .bridge
        .document(&PatientId::new("patient-7").expect("patient"))
        .expect("remote document");
    assert_eq!(
        saved.piezas_dentales["11"].superficies["top"].as_deref(),
        Some("REQUERIDO:obturacion")
    );
}

#[rstest]
#[case::within_five_minutes(240, Source::Local)]
#[case::after_five_minutes(480, Source::Remote)]
#[tokio::test]
async fn closing_before_autosave_keeps_the_edit_for_a_quick_reopen(
    clinic: Clinic,
    #[case] reopen_after: i64,
    #[case] expected: Source,
) {
    let mut first = clinic.open(t0()).await;
    first.set_observations("baseline", t0());
    first.save_now(t0()).await.expect("baseline save");

    mark_required_filling(&mut first, at(120));
    first.close(at(120));
    drop(first);
    assert!(clinic.store.get(CACHE_KEY).expect("get").is_some());

    let reopened = clinic.open(at(120 + reopen_after)).await;
    let top = reopened.snapshot().tooth(tooth(11)).surface(Surface::Top);

    assert_eq!(reopened.source(), expected);
    assert_eq!(reopened.snapshot().observations(), "baseline");
    if expected == Source::Local {
        assert_eq!(top, Mark::treatment(Mode::Required, Symbol::Filling));
        assert_eq!(reopened.status(), SaveStatus::Unsaved);
    } else {
        assert_eq!(top, Mark::Empty);
        assert_eq!(reopened.status(), SaveStatus::Saved);
        assert_eq!(clinic.store.get(CACHE_KEY).expect("get"), None);
    }
}

#[rstest]
#[tokio::test]
async fn double_click_clears_a_whole_extraction(clinic: Clinic) {
    let mut session = clinic.open(t0()).await;
    let click = SelectionEvent::SurfaceClicked {
        tooth: tooth(38),
        surface: Surface::Left,
        anchor: anchor(),
    };
    session.handle(click, at(1));
    session.handle(SelectionEvent::Choose(MenuAction::Extraction), at(1));
    assert!(session.snapshot().tooth(tooth(38)).all_extracted());

    let double_click = SelectionEvent::SurfaceDoubleClicked {
        tooth: tooth(38),
        surface: Surface::Bottom,
    };
    session.handle(double_click, at(2));

    assert!(session.snapshot().tooth(tooth(38)).is_untouched());
}

#[rstest]
#[tokio::test]
async fn autosave_keeps_retrying_while_the_remote_is_down(clinic: Clinic) {
    let mut session = clinic.open(t0()).await;
    mark_required_filling(&mut session, at(1));
    clinic.bridge.set_fail_saves(true);

    assert_eq!(session.tick(at(30)).await, TickOutcome::Failed);
    assert_eq!(session.tick(at(60)).await, TickOutcome::Failed);
    assert_eq!(session.status(), SaveStatus::Unsaved);
    assert!(clinic.store.get(CACHE_KEY).expect("get").is_some());

    clinic.bridge.set_fail_saves(false);
    assert_eq!(session.tick(at(90)).await, TickOutcome::Saved);
    assert_eq!(clinic.bridge.save_count(), 1);
}

#[tokio::test]
async fn folder_backed_session_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = EditorConfig::default();
    let patient = PatientId::new("patient-7").expect("patient");
    let open = |now: DateTime<Utc>| {
        EditorSession::open(
            patient.clone(),
            FolderBridge::new(dir.path().join("charts")),
            LocalCache::new(FileStore::new(dir.path().join("cache"))),
            &config,
            now,
        )
    };

    let mut session = open(Utc::now()).await;
    let op = odontogram::ops::ChartOp::SetAbsent {
        tooth: tooth(46),
        absent: true,
    };
    session.apply(op, Utc::now());
    session.save_now(Utc::now()).await.expect("save");
    drop(session);

    let reopened = open(Utc::now()).await;
    assert_eq!(reopened.source(), Source::Remote);
    assert!(reopened.snapshot().tooth(tooth(46)).absent());
    assert!(reopened.snapshot().updated_at().is_some());
}
