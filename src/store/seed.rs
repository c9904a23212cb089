use super::memory::MemoryCondoStore;
use crate::actions::{Role, Session};
use crate::core::Period;
use crate::domain::{Comment, PaymentEntry, ThreadRef};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

pub const DEMO_UNITS: [&str; 6] = ["1A", "1B", "2A", "2B", "3A", "3B"];
pub const DEMO_MONTHLY_QUOTA_CENTS: u64 = 15_000;

/// Identifiers of a seeded demo building.
#[derive(Debug, Clone)]
pub struct DemoBuilding {
    pub building_id: Uuid,
    pub manager: Session,
    pub resident: Session,
    pub professional: Session,
    /// Apartment ids in `DEMO_UNITS` order.
    pub apartments: Vec<Uuid>,
    pub occurrence_id: Uuid,
    pub discussion_id: Uuid,
}

impl MemoryCondoStore {
    /// Seeds one building for `year`.
    ///
    /// Months 1–3 are paid for every unit except every third unit, which is
    /// late in March. Later months have no record, so they read as pending.
    pub async fn seed_demo(&self, year: i32) -> DemoBuilding {
        let building_id = Uuid::new_v4();

        let mut apartments = Vec::with_capacity(DEMO_UNITS.len());
        for (index, unit) in DEMO_UNITS.iter().enumerate() {
            let apartment_id = self
                .add_apartment(building_id, *unit, DEMO_MONTHLY_QUOTA_CENTS)
                .await;
            for month in 1..=3u8 {
                let entry = if month == 3 && index % 3 == 2 {
                    PaymentEntry::late()
                } else {
                    PaymentEntry::paid(DEMO_MONTHLY_QUOTA_CENTS)
                };
                self.set_payment(apartment_id, Period { year, month }, entry)
                    .await;
            }
            apartments.push(apartment_id);
        }

        let manager = Session::new(Uuid::new_v4(), Role::Manager, building_id);
        let resident = Session::new(Uuid::new_v4(), Role::Resident, building_id);
        let professional = Session::new(Uuid::new_v4(), Role::Professional, building_id);

        let occurrence_id = self
            .add_occurrence(building_id, "Water leak in the garage")
            .await;
        self.insert_comment(Comment {
            id: Uuid::new_v4(),
            thread: ThreadRef::occurrence(occurrence_id),
            author_id: resident.user_id,
            content: "Spotted it near parking space 12.".to_string(),
            created_at: Utc::now(),
        })
        .await;

        let discussion_id = Uuid::new_v4();

        info!(building = %building_id, apartments = apartments.len(), year, "demo building seeded");

        DemoBuilding {
            building_id,
            manager,
            resident,
            professional,
            apartments,
            occurrence_id,
            discussion_id,
        }
    }
}
