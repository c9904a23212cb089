#![allow(dead_code)]

use condodesk::{
    CommentThread, CondoActions, CondoConfig, DemoBuilding, MemoryCondoStore, Notifier,
    OccurrenceBoard, PaymentGrid, Session, ThreadRef, ToastLog,
};
use std::sync::Arc;

pub const YEAR: i32 = 2026;

pub struct Fixture {
    pub store: Arc<MemoryCondoStore>,
    pub building: DemoBuilding,
    pub toasts: ToastLog,
    pub config: CondoConfig,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(CondoConfig::new()).await
    }

    pub async fn with_config(config: CondoConfig) -> Self {
        let store = Arc::new(MemoryCondoStore::new());
        let building = store.seed_demo(YEAR).await;
        Self {
            store,
            building,
            toasts: ToastLog::new(),
            config,
        }
    }

    pub fn actions(&self) -> Arc<dyn CondoActions> {
        self.store.clone()
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::new(self.toasts.clone())
    }

    pub fn apartment(&self, index: usize) -> uuid::Uuid {
        self.building.apartments[index]
    }

    pub async fn grid(&self) -> PaymentGrid {
        let grid = PaymentGrid::new(
            self.building.manager.clone(),
            YEAR,
            self.actions(),
            self.notifier(),
            &self.config,
        )
        .expect("manager may open the payment grid");
        grid.load().await.expect("initial load");
        grid
    }

    pub async fn thread(&self, session: &Session, thread: ThreadRef) -> CommentThread {
        let thread = CommentThread::new(
            session.clone(),
            thread,
            self.actions(),
            self.notifier(),
            &self.config,
        );
        thread.load().await.expect("initial load");
        thread
    }

    pub async fn board(&self, session: &Session) -> OccurrenceBoard {
        let board = OccurrenceBoard::new(
            session.clone(),
            self.actions(),
            self.notifier(),
            &self.config,
        );
        board.load().await.expect("initial load");
        board
    }
}
